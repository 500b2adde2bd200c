use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A memory block would write past the end of the 64 KiB address space.
    #[error("memory update out of range: start={start:#06x}, len={len}")]
    OutOfRange { start: u16, len: usize },
}
