//! Everything the client knows about the target, in one place.
//!
//! A renderer reads this; only the frame-handling path writes it.

use crate::breakpoint::{BreakpointEquality, BreakpointRegistry};
use crate::context::SystemContext;
use crate::memory::MemoryImage;
use crate::region::RegionIndex;
use crate::registers::RegisterSnapshot;
use crate::selection::SelectionState;

/// What a memory-map cell should show, strongest reason first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    StackPointer,
    ProgramCounter,
    /// Value changed in the most recent memory update.
    Changed,
    /// Inside the region picked from the region list.
    SelectedRegion,
    Zero,
    /// Inside a documented region.
    Classified,
    Plain,
}

#[derive(Debug, Clone, Default)]
pub struct Mirror {
    pub regions: RegionIndex,
    pub memory: MemoryImage,
    pub breakpoints: BreakpointRegistry,
    pub registers: RegisterSnapshot,
    pub context: Option<SystemContext>,
    pub selection: SelectionState,
}

impl Mirror {
    pub fn new(regions: RegionIndex, equality: BreakpointEquality) -> Self {
        Self {
            regions,
            breakpoints: BreakpointRegistry::new(equality),
            ..Self::default()
        }
    }

    /// Replace the stored context. Returns `true` if it differs.
    pub fn set_context(&mut self, context: SystemContext) -> bool {
        if self.context.as_ref() == Some(&context) {
            return false;
        }
        self.context = Some(context);
        true
    }

    pub fn cell_state(&self, address: u16) -> CellState {
        if self.registers.is_populated() {
            if address == self.registers.sp() {
                return CellState::StackPointer;
            }
            if address == self.registers.pc() {
                return CellState::ProgramCounter;
            }
        }
        if self.memory.changed_at(address) {
            return CellState::Changed;
        }
        let in_selected_region = self
            .selection
            .selected_region()
            .and_then(|idx| self.regions.descriptor(idx))
            .is_some_and(|region| region.contains(address));
        if in_selected_region {
            return CellState::SelectedRegion;
        }
        if self.memory.value_at(address) == 0 {
            return CellState::Zero;
        }
        if self.regions.classify(address).is_some() {
            return CellState::Classified;
        }
        CellState::Plain
    }

    /// Cells whose [`CellState`] may differ from the previous cycle: the
    /// current and previous change lists plus the old and new PC/SP cells.
    /// Sorted, no duplicates.
    pub fn dirty_addresses(&self) -> Vec<u16> {
        let mut dirty = self.memory.changed_addresses().to_vec();
        dirty.extend_from_slice(self.memory.previously_changed_addresses());
        if self.registers.is_populated() {
            dirty.extend([
                self.registers.previous_pc(),
                self.registers.pc(),
                self.registers.previous_sp(),
                self.registers.sp(),
            ]);
        }
        dirty.sort_unstable();
        dirty.dedup();
        dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionDescriptor;
    use crate::registers::RegisterBundle;

    fn mirror() -> Mirror {
        Mirror::new(
            RegionIndex::build(vec![
                RegionDescriptor::new(0x3C00..=0x3FFF, &[], "Video RAM"),
                RegionDescriptor::new(0x4000..=0x4010, &[], "Vectors"),
            ]),
            BreakpointEquality::Ordered,
        )
    }

    #[test]
    fn cell_state_priority() {
        let mut m = mirror();
        m.memory.apply_update(0x3C00, &[0x41, 0x00, 0x20]).unwrap();
        m.registers.apply(RegisterBundle {
            pc: 0x3C00,
            sp: 0x3C01,
            ..Default::default()
        });

        assert_eq!(m.cell_state(0x3C00), CellState::ProgramCounter);
        assert_eq!(m.cell_state(0x3C01), CellState::StackPointer);
        assert_eq!(m.cell_state(0x3C02), CellState::Changed);
        assert_eq!(m.cell_state(0x3C03), CellState::Zero);
        assert_eq!(m.cell_state(0x9000), CellState::Zero);

        m.memory.apply_update(0x4000, &[1]).unwrap();
        m.memory.apply_update(0x9000, &[1]).unwrap();
        assert_eq!(m.cell_state(0x4000), CellState::Classified);
        assert_eq!(m.cell_state(0x3C02), CellState::Classified);

        m.selection.select_region(Some(0));
        assert_eq!(m.cell_state(0x3C02), CellState::SelectedRegion);
        assert_eq!(m.cell_state(0x9000), CellState::Changed);
    }

    #[test]
    fn dirty_set_is_changes_plus_pointer_cells() {
        let mut m = mirror();
        assert!(m.dirty_addresses().is_empty());

        m.registers.apply(RegisterBundle {
            pc: 0x0010,
            sp: 0xFFFF,
            ..Default::default()
        });
        m.registers.apply(RegisterBundle {
            pc: 0x0012,
            sp: 0xFFFF,
            ..Default::default()
        });
        m.memory.apply_update(0x0012, &[7, 7]).unwrap();

        assert_eq!(m.dirty_addresses(), vec![0x0010, 0x0012, 0x0013, 0xFFFF]);
    }

    #[test]
    fn dirty_set_includes_cells_leaving_changed_state() {
        let mut m = mirror();
        m.memory.apply_update(0x0010, &[5]).unwrap();
        assert_eq!(m.cell_state(0x0010), CellState::Changed);

        m.memory.apply_update(0x0020, &[6]).unwrap();
        assert_eq!(m.cell_state(0x0010), CellState::Plain);
        assert_eq!(m.dirty_addresses(), vec![0x0010, 0x0020]);

        m.memory.apply_update(0x0020, &[6]).unwrap();
        assert_eq!(m.cell_state(0x0020), CellState::Plain);
        assert_eq!(m.dirty_addresses(), vec![0x0020]);
    }

    #[test]
    fn context_change_detection() {
        let mut m = mirror();
        let ctx = SystemContext {
            system_name: "sdlTRS".into(),
            model: 3,
        };
        assert!(m.set_context(ctx.clone()));
        assert!(!m.set_context(ctx));
        assert!(m.set_context(SystemContext {
            system_name: "sdlTRS".into(),
            model: 1,
        }));
    }
}
