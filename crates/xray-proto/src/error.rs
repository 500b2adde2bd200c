use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("binary frame too short: {len} bytes")]
    TooShort { len: usize },
    #[error("control frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("control frame is not a JSON object")]
    NotAnObject,
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

impl ProtoError {
    /// Errors that mean an inbound frame must be dropped.
    pub fn is_malformed_frame(&self) -> bool {
        matches!(self, Self::TooShort { .. } | Self::Json(_) | Self::NotAnObject)
    }
}
