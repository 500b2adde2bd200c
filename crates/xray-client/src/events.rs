use bitflags::bitflags;
use xray_core::MemoryDelta;

use crate::session::ConnectionState;

bitflags! {
    /// Facets of the mirror touched by one control frame or client intent.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StateFacets: u8 {
        const CONTEXT = 1 << 0;
        const REGISTERS = 1 << 1;
        const BREAKPOINTS = 1 << 2;
        const SELECTION = 1 << 3;
        const MEMORY_MODE = 1 << 4;
    }
}

/// Redraw hints published by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StatusChanged(ConnectionState),
    /// A memory block was applied; at most one per binary frame.
    MemoryUpdated(MemoryDelta),
    /// At most one per text frame, covering every facet it changed.
    StateChanged(StateFacets),
}
