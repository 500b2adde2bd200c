//! Wire protocol between the debugger client and the emulator endpoint.
//!
//! - [`command`]: outgoing `verb[/arg]*` commands
//! - [`frame`]: inbound binary memory blocks and JSON control messages
//! - [`error`]: protocol errors

pub mod command;
pub mod error;
pub mod frame;

pub use command::{Command, MemoryMode};
pub use error::ProtoError;
pub use frame::{ControlMessage, Frame, Inbound, MemoryBlock};
