//! Client-side mirror of a remote TRS-80 debugger target.
//!
//! Pure state, no I/O:
//!
//! - [`region`]: static address classification ([`RegionIndex`])
//! - [`memory`]: the 64 KiB image and its per-update change mask
//! - [`breakpoint`]: last authoritative breakpoint set
//! - [`registers`]: register file, flag decoding, PC transition
//! - [`mirror`]: the aggregate a renderer reads
//! - [`trs80`]: built-in memory map data

pub mod breakpoint;
pub mod context;
pub mod error;
pub mod grid;
pub mod memory;
pub mod mirror;
pub mod region;
pub mod registers;
pub mod selection;
pub mod trs80;

pub use breakpoint::{Breakpoint, BreakpointEquality, BreakpointKind, BreakpointRegistry};
pub use context::{ModelType, SystemContext};
pub use error::CoreError;
pub use grid::MemoryGrid;
pub use memory::{ADDRESS_SPACE, MemoryDelta, MemoryImage};
pub use mirror::{CellState, Mirror};
pub use region::{RegionDescriptor, RegionIndex};
pub use registers::{FlagBits, RegisterBundle, RegisterPair, RegisterSnapshot, Registers};
pub use selection::SelectionState;
