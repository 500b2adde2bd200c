//! WebSocket transport built on tokio-tungstenite.
//!
//! Each `open` spawns one connection task. The task reports through the
//! shared event channel and tags its reports with a generation number, so a
//! task left behind by a later `open` goes quiet instead of confusing the
//! session.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, trace};
use xray_proto::Frame;

use crate::{
    error::TransportError,
    transport::{ReadyState, Transport, TransportEvent},
};

#[derive(Debug)]
struct Link {
    state: ReadyState,
    generation: u64,
}

#[derive(Debug)]
struct Shared {
    link: Mutex<Link>,
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.link.lock().generation == generation
    }

    /// Move to `state` if `generation` still owns the link.
    fn transition(&self, generation: u64, state: ReadyState) -> bool {
        let mut link = self.link.lock();
        if link.generation != generation {
            return false;
        }
        link.state = state;
        true
    }

    fn report(&self, generation: u64, event: TransportEvent) {
        if self.is_current(generation) {
            let _ = self.events.send(event);
        }
    }

    /// Mark the link closed and report it, unless superseded.
    fn finish(&self, generation: u64, event: TransportEvent) {
        if self.transition(generation, ReadyState::Closed) {
            let _ = self.events.send(event);
        }
    }
}

/// [`Transport`] over a WebSocket connection.
///
/// `open` must be called from within a tokio runtime.
pub struct WsTransport {
    url: String,
    shared: Arc<Shared>,
    outbound: Option<mpsc::UnboundedSender<Message>>,
}

impl WsTransport {
    /// Create a transport for `url` and the receiver its events arrive on.
    pub fn new(url: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            link: Mutex::new(Link {
                state: ReadyState::Closed,
                generation: 0,
            }),
            events,
        });
        (
            Self {
                url: url.into(),
                shared,
                outbound: None,
            },
            rx,
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for WsTransport {
    fn open(&mut self) {
        let generation = {
            let mut link = self.shared.link.lock();
            link.generation += 1;
            link.state = ReadyState::Connecting;
            link.generation
        };

        let (tx, rx) = mpsc::unbounded_channel();
        // Dropping the old sender ends the previous connection task.
        self.outbound = Some(tx);

        tokio::spawn(run_connection(
            self.url.clone(),
            generation,
            Arc::clone(&self.shared),
            rx,
        ));
    }

    fn ready_state(&self) -> ReadyState {
        self.shared.link.lock().state
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        if self.ready_state() != ReadyState::Open {
            return Err(TransportError::NotOpen);
        }
        let outbound = self.outbound.as_ref().ok_or(TransportError::NotOpen)?;
        outbound
            .send(Message::text(text))
            .map_err(|_| TransportError::ConnectionLost("connection task has exited".into()))
    }

    /// Drop the current connection without reporting `Closed`; the task
    /// still sends a close frame if the socket is up.
    fn close(&mut self) {
        self.outbound = None;
        let mut link = self.shared.link.lock();
        link.generation += 1;
        link.state = ReadyState::Closed;
    }
}

async fn run_connection(
    url: String,
    generation: u64,
    shared: Arc<Shared>,
    mut outbound: mpsc::UnboundedReceiver<Message>,
) {
    debug!(%url, generation, "connecting");
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            debug!(%url, error = %e, "connect failed");
            let err = TransportError::ConnectionFailed(e.to_string());
            shared.finish(generation, TransportEvent::Error(err.to_string()));
            return;
        }
    };

    if !shared.transition(generation, ReadyState::Open) {
        debug!(generation, "connection superseded before open");
        return;
    }
    info!(%url, "websocket open");
    shared.report(generation, TransportEvent::Opened);

    let (mut sink, mut stream) = stream.split();
    let reason = loop {
        tokio::select! {
            outgoing = outbound.recv() => match outgoing {
                Some(message) => {
                    if let Err(e) = sink.send(message).await {
                        error!(error = %e, "websocket send failed");
                        let err = TransportError::ConnectionLost(e.to_string());
                        shared.finish(generation, TransportEvent::Error(err.to_string()));
                        return;
                    }
                }
                None => {
                    // Closed locally.
                    let _ = sink.close().await;
                    break None;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Binary(data))) => {
                    trace!(len = data.len(), "binary frame");
                    shared.report(generation, TransportEvent::Frame(Frame::Binary(data)));
                }
                Some(Ok(Message::Text(text))) => {
                    trace!(len = text.len(), "text frame");
                    shared.report(
                        generation,
                        TransportEvent::Frame(Frame::Text(text.as_str().to_owned())),
                    );
                }
                Some(Ok(Message::Close(frame))) => {
                    break frame.map(|f| f.reason.as_str().to_owned()).filter(|r| !r.is_empty());
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(e)) => {
                    let err = TransportError::ConnectionLost(e.to_string());
                    shared.finish(generation, TransportEvent::Error(err.to_string()));
                    return;
                }
                None => break None,
            },
        }
    };

    debug!(generation, ?reason, "websocket closed");
    shared.finish(generation, TransportEvent::Closed { reason });
}
