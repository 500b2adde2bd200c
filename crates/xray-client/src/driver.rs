//! Async loop around a [`ProtocolSession`].

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use crate::{
    session::{ClientCommand, ProtocolSession},
    transport::{Transport, TransportEvent},
};

/// Outcome of one [`SessionDriver::turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Continue,
    Stopped,
}

/// Runs a session on the current task: one timer, one transport event
/// queue, one command queue, handled strictly one at a time.
pub struct SessionDriver<T> {
    session: ProtocolSession<T>,
    transport_events: mpsc::UnboundedReceiver<TransportEvent>,
    commands: mpsc::Receiver<ClientCommand>,
    next_tick: Instant,
}

impl<T: Transport> SessionDriver<T> {
    /// The first turn ticks immediately, which opens the transport.
    pub fn new(
        session: ProtocolSession<T>,
        transport_events: mpsc::UnboundedReceiver<TransportEvent>,
        commands: mpsc::Receiver<ClientCommand>,
    ) -> Self {
        Self {
            session,
            transport_events,
            commands,
            next_tick: Instant::now(),
        }
    }

    pub fn session(&self) -> &ProtocolSession<T> {
        &self.session
    }

    /// Wait for the next transport event, client command or timer expiry and
    /// handle it.
    pub async fn turn(&mut self) -> Turn {
        // Inbound frames first so intents act on the freshest mirror.
        tokio::select! {
            biased;

            event = self.transport_events.recv() => match event {
                Some(event) => self.session.handle_transport_event(event),
                None => {
                    debug!("transport event channel closed");
                    self.session.shutdown();
                    return Turn::Stopped;
                }
            },
            command = self.commands.recv() => match command {
                Some(ClientCommand::Shutdown) | None => {
                    self.session.shutdown();
                    return Turn::Stopped;
                }
                Some(command) => {
                    if let Err(e) = self.session.dispatch(command) {
                        warn!(error = %e, "command failed");
                    }
                }
            },
            _ = sleep_until(self.next_tick) => {
                let delay = self.session.tick();
                self.next_tick = Instant::now() + delay;
            }
        }
        Turn::Continue
    }

    /// Turn until shut down.
    pub async fn run(mut self) -> ProtocolSession<T> {
        while self.turn().await == Turn::Continue {}
        self.session
    }
}
