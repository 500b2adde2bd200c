//! Transport seam between the session and the socket.

use xray_proto::Frame;

use crate::error::TransportError;

/// Lifecycle of the underlying connection, mirroring the WebSocket ready
/// states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closing,
    /// No connection, either never opened or gone.
    Closed,
}

impl ReadyState {
    /// Whether a fresh `open` is needed.
    pub fn is_down(self) -> bool {
        matches!(self, Self::Closing | Self::Closed)
    }
}

/// Notifications a transport delivers to the session, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Frame(Frame),
    Error(String),
    Closed { reason: Option<String> },
}

/// A bidirectional message channel.
///
/// Implementations never block: `open` only starts a connection attempt and
/// its outcome arrives later as [`TransportEvent::Opened`] or
/// [`TransportEvent::Error`].
pub trait Transport {
    /// Start a new connection, abandoning any previous one.
    fn open(&mut self);

    fn ready_state(&self) -> ReadyState;

    fn send(&mut self, text: String) -> Result<(), TransportError>;

    fn close(&mut self);
}
