//! Address ↔ cell geometry of the memory map.

/// Cells per row of the memory map.
pub const DEFAULT_COLUMNS: u16 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryGrid {
    columns: u16,
}

impl Default for MemoryGrid {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS)
    }
}

impl MemoryGrid {
    pub fn new(columns: u16) -> Self {
        debug_assert!(columns > 0);
        Self {
            columns: columns.max(1),
        }
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn rows(&self) -> usize {
        crate::memory::ADDRESS_SPACE.div_ceil(self.columns as usize)
    }

    /// `(column, row)` of an address.
    pub fn cell_of(&self, address: u16) -> (u16, u16) {
        (address % self.columns, address / self.columns)
    }

    /// Address under a cell, `None` past the end of memory or the row width.
    pub fn address_at(&self, column: u16, row: u16) -> Option<u16> {
        if column >= self.columns {
            return None;
        }
        let addr = row as u32 * self.columns as u32 + column as u32;
        u16::try_from(addr).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_round_trip() {
        let grid = MemoryGrid::default();
        assert_eq!(grid.cell_of(0x0000), (0, 0));
        assert_eq!(grid.cell_of(0x3C05), (5, 0x3C));
        assert_eq!(grid.address_at(5, 0x3C), Some(0x3C05));
        assert_eq!(grid.rows(), 256);
    }

    #[test]
    fn out_of_grid_cells() {
        let grid = MemoryGrid::new(100);
        assert_eq!(grid.address_at(100, 0), None);
        assert_eq!(grid.address_at(0, 656), None);
        assert_eq!(grid.address_at(35, 655), Some(65535));
        assert_eq!(grid.rows(), 656);
    }
}
