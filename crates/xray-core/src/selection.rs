//! Client-local pointer state. Never sent to the target on its own.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    hovered: Option<u16>,
    selected: Option<u16>,
    selected_region: Option<usize>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hovered cell, returning the one it replaces so it can be repainted.
    pub fn hover(&mut self, address: Option<u16>) -> Option<u16> {
        std::mem::replace(&mut self.hovered, address)
    }

    /// Set the selected cell, returning the one it replaces.
    pub fn select(&mut self, address: Option<u16>) -> Option<u16> {
        std::mem::replace(&mut self.selected, address)
    }

    pub fn select_region(&mut self, region: Option<usize>) -> Option<usize> {
        std::mem::replace(&mut self.selected_region, region)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn hovered(&self) -> Option<u16> {
        self.hovered
    }

    pub fn selected(&self) -> Option<u16> {
        self.selected
    }

    pub fn selected_region(&self) -> Option<usize> {
        self.selected_region
    }

    /// High and low byte of the selected address, as shown in the address readout.
    pub fn selected_bytes(&self) -> Option<(u8, u8)> {
        self.selected.map(|addr| ((addr >> 8) as u8, (addr & 0xFF) as u8))
    }
}
