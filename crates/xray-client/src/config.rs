use std::time::Duration;

use serde::Deserialize;
use xray_core::BreakpointEquality;
use xray_proto::MemoryMode;

pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/channel";
/// Path segment the emulator endpoint expects in front of every command.
pub const DEFAULT_COMMAND_PREFIX: &str = "action";

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// WebSocket endpoint of the emulator.
    pub url: String,
    /// Heartbeat period while not connected (fast retry).
    pub reconnect_interval_ms: u64,
    /// Heartbeat period while connected.
    pub heartbeat_interval_ms: u64,
    /// Leading path segment for outgoing commands, `None` to send bare commands.
    pub command_prefix: Option<String>,
    pub memory_mode: MemoryMode,
    /// Ask for a memory image right after the initial `refresh`.
    pub request_memory_on_connect: bool,
    pub breakpoint_equality: BreakpointEquality,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            reconnect_interval_ms: 200,
            heartbeat_interval_ms: 500,
            command_prefix: Some(DEFAULT_COMMAND_PREFIX.to_string()),
            memory_mode: MemoryMode::Full,
            request_memory_on_connect: true,
            breakpoint_equality: BreakpointEquality::Ordered,
        }
    }
}

impl SessionConfig {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}
