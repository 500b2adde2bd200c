//! Client side of the debugger link.
//!
//! [`ProtocolSession`] is a synchronous state machine over an injected
//! [`Transport`]; [`SessionDriver`] runs it on a tokio task, and
//! [`WsTransport`] is the WebSocket implementation used against a live
//! emulator.

pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod session;
pub mod transport;
pub mod ws;

pub use config::SessionConfig;
pub use driver::{SessionDriver, Turn};
pub use error::{SessionError, TransportError};
pub use events::{SessionEvent, StateFacets};
pub use session::{ClientCommand, ConnectionState, ProtocolSession};
pub use transport::{ReadyState, Transport, TransportEvent};
pub use ws::WsTransport;
