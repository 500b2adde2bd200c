//! Client error types.

use thiserror::Error;
use xray_core::CoreError;
use xray_proto::ProtoError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("connection lost: {0}")]
    ConnectionLost(String),

    #[error("transport is not open")]
    NotOpen,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("not connected to target")]
    NotConnected,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtoError),

    #[error("rejected update: {0}")]
    Core(#[from] CoreError),

    #[error("no address selected")]
    NoSelection,
}

impl SessionError {
    /// Errors that mean one inbound frame was dropped; the session keeps going.
    pub fn is_dropped_frame(&self) -> bool {
        match self {
            Self::Protocol(e) => e.is_malformed_frame(),
            Self::Core(CoreError::OutOfRange { .. }) => true,
            _ => false,
        }
    }
}
