//! Local mirror of the target's 64 KiB address space.
//!
//! Every update cycle starts from a clean change mask, so after
//! [`MemoryImage::apply_update`] the mask holds exactly the addresses whose
//! value that one call altered. The list of changed addresses is kept next to
//! the mask; clearing and iterating both cost O(changes) instead of O(65536).

use crate::error::CoreError;
use crate::trs80::{SCREEN_COLUMNS, SCREEN_ROWS, VIDEO_RAM_START};

/// Number of addressable bytes.
pub const ADDRESS_SPACE: usize = 0x1_0000;

/// Summary of one applied memory block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryDelta {
    pub start: u16,
    pub len: usize,
    /// Number of addresses whose value differed from the previous image.
    pub changed: usize,
}

impl MemoryDelta {
    pub fn is_empty(&self) -> bool {
        self.changed == 0
    }
}

#[derive(Debug, Clone)]
pub struct MemoryImage {
    bytes: Box<[u8]>,
    changed_mask: Box<[bool]>,
    changed: Vec<u16>,
    /// Addresses the update before the most recent one had marked.
    previous_changed: Vec<u16>,
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryImage {
    /// A zero-filled image with an empty change mask.
    pub fn new() -> Self {
        Self {
            bytes: vec![0; ADDRESS_SPACE].into_boxed_slice(),
            changed_mask: vec![false; ADDRESS_SPACE].into_boxed_slice(),
            changed: Vec::new(),
            previous_changed: Vec::new(),
        }
    }

    /// Merge `payload` at `start` and recompute the change mask.
    ///
    /// A block reaching past 0xFFFF is rejected before anything is touched,
    /// including the mask of the previous cycle.
    pub fn apply_update(&mut self, start: u16, payload: &[u8]) -> Result<MemoryDelta, CoreError> {
        let base = start as usize;
        if base + payload.len() > ADDRESS_SPACE {
            return Err(CoreError::OutOfRange {
                start,
                len: payload.len(),
            });
        }

        self.clear_changes();

        let window = &mut self.bytes[base..base + payload.len()];
        for (offset, (current, &incoming)) in window.iter_mut().zip(payload).enumerate() {
            if *current != incoming {
                *current = incoming;
                let addr = base + offset;
                self.changed_mask[addr] = true;
                self.changed.push(addr as u16);
            }
        }

        Ok(MemoryDelta {
            start,
            len: payload.len(),
            changed: self.changed.len(),
        })
    }

    fn clear_changes(&mut self) {
        for &addr in &self.changed {
            self.changed_mask[addr as usize] = false;
        }
        // Keep the old list for redraw; reuse the other allocation.
        std::mem::swap(&mut self.changed, &mut self.previous_changed);
        self.changed.clear();
    }

    pub fn value_at(&self, address: u16) -> u8 {
        self.bytes[address as usize]
    }

    pub fn changed_at(&self, address: u16) -> bool {
        self.changed_mask[address as usize]
    }

    /// Addresses changed by the most recent update, in ascending order.
    pub fn changed_addresses(&self) -> &[u16] {
        &self.changed
    }

    /// Addresses that were marked before the most recent update cleared
    /// the mask, in ascending order.
    pub fn previously_changed_addresses(&self) -> &[u16] {
        &self.previous_changed
    }

    pub fn changed_count(&self) -> usize {
        self.changed.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `len` bytes starting at `start`, clamped to the address space.
    pub fn read(&self, start: u16, len: usize) -> &[u8] {
        let base = start as usize;
        let end = (base + len).min(ADDRESS_SPACE);
        &self.bytes[base..end]
    }

    /// Raw character codes of the text screen, one slice per row.
    pub fn screen_rows(&self) -> impl Iterator<Item = &[u8]> {
        let base = VIDEO_RAM_START as usize;
        self.bytes[base..base + SCREEN_COLUMNS * SCREEN_ROWS].chunks(SCREEN_COLUMNS)
    }
}
