use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::Level;
use xray_client::SessionConfig;
use xray_core::BreakpointEquality;
use xray_proto::MemoryMode;

/// Remote memory and register viewer for a TRS-80 emulator
#[derive(Parser, Debug)]
#[command(name = "xray", version, long_about = None)]
pub struct Args {
    /// Session settings as JSON; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// WebSocket endpoint of the emulator
    #[arg(short, long)]
    pub url: Option<String>,

    /// Retry period while disconnected, in milliseconds
    #[arg(long)]
    pub reconnect_ms: Option<u64>,

    /// Keep-alive period while connected, in milliseconds
    #[arg(long)]
    pub heartbeat_ms: Option<u64>,

    /// Send commands without the `action/` prefix
    #[arg(long)]
    pub no_prefix: bool,

    /// Memory window fetched on refresh and after each step
    #[arg(long, value_enum)]
    pub memory: Option<MemoryArg>,

    /// How incoming breakpoint lists are compared
    #[arg(long, value_enum)]
    pub breakpoint_equality: Option<EqualityArg>,

    /// Region table (JSON array of descriptors) replacing the built-in one
    #[arg(long)]
    pub regions: Option<PathBuf>,

    /// Only classify with regions that apply to this model code
    #[arg(long)]
    pub model: Option<u8>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: Level,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum MemoryArg {
    Full,
    Video,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum EqualityArg {
    Ordered,
    Unordered,
}

impl Args {
    /// Fold the command-line overrides into `config`.
    pub fn apply_to(&self, config: &mut SessionConfig) {
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(ms) = self.reconnect_ms {
            config.reconnect_interval_ms = ms;
        }
        if let Some(ms) = self.heartbeat_ms {
            config.heartbeat_interval_ms = ms;
        }
        if self.no_prefix {
            config.command_prefix = None;
        }
        if let Some(memory) = self.memory {
            config.memory_mode = match memory {
                MemoryArg::Full => MemoryMode::Full,
                MemoryArg::Video => MemoryMode::VideoWindow,
            };
        }
        if let Some(equality) = self.breakpoint_equality {
            config.breakpoint_equality = match equality {
                EqualityArg::Ordered => BreakpointEquality::Ordered,
                EqualityArg::Unordered => BreakpointEquality::Unordered,
            };
        }
    }
}
