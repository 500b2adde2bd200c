//! Last authoritative breakpoint set reported by the target.
//!
//! The registry is never edited locally. Add/remove requests go out as
//! commands and only show up here once the target echoes its new set.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr};

#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromRepr, Display, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum BreakpointKind {
    #[strum(to_string = "Program Counter")]
    ProgramCounter = 0,
    #[strum(to_string = "Memory Watch")]
    MemoryWatch = 1,
    #[strum(to_string = "IO Watch")]
    IoWatch = 2,
}

impl BreakpointKind {
    /// Path segment used by `add_breakpoint/<kind>/<address>`.
    pub const fn token(self) -> &'static str {
        match self {
            Self::ProgramCounter => "pc",
            Self::MemoryWatch => "mem",
            Self::IoWatch => "io",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "pc" => Some(Self::ProgramCounter),
            "mem" => Some(Self::MemoryWatch),
            "io" => Some(Self::IoWatch),
            _ => None,
        }
    }
}

impl From<BreakpointKind> for u8 {
    fn from(kind: BreakpointKind) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for BreakpointKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_repr(value).ok_or_else(|| format!("unknown breakpoint type {value}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Breakpoint {
    pub id: u32,
    pub address: u16,
    #[serde(rename = "type")]
    pub kind: BreakpointKind,
}

/// How two reported sets are compared before deciding to re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakpointEquality {
    /// Same length, same elements, same order. A reordered set counts as a change.
    #[default]
    Ordered,
    /// Same elements regardless of order.
    Unordered,
}

#[derive(Debug, Clone)]
pub struct BreakpointRegistry {
    current: Arc<[Breakpoint]>,
    equality: BreakpointEquality,
}

impl Default for BreakpointRegistry {
    fn default() -> Self {
        Self::new(BreakpointEquality::default())
    }
}

impl BreakpointRegistry {
    pub fn new(equality: BreakpointEquality) -> Self {
        Self {
            current: Arc::from(Vec::new()),
            equality,
        }
    }

    /// Replace the stored set if `incoming` differs from it.
    ///
    /// Returns `true` when the set was replaced.
    pub fn reconcile(&mut self, incoming: Vec<Breakpoint>) -> bool {
        if self.same_as(&incoming) {
            return false;
        }
        self.current = Arc::from(incoming);
        true
    }

    fn same_as(&self, incoming: &[Breakpoint]) -> bool {
        match self.equality {
            BreakpointEquality::Ordered => *self.current == *incoming,
            BreakpointEquality::Unordered => {
                if self.current.len() != incoming.len() {
                    return false;
                }
                let mut ours = self.current.to_vec();
                let mut theirs = incoming.to_vec();
                ours.sort_unstable();
                theirs.sort_unstable();
                ours == theirs
            }
        }
    }

    /// Immutable snapshot of the current set.
    pub fn snapshot(&self) -> Arc<[Breakpoint]> {
        Arc::clone(&self.current)
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.current
    }

    pub fn equality(&self) -> BreakpointEquality {
        self.equality
    }

    pub fn at_address(&self, address: u16) -> impl Iterator<Item = &Breakpoint> {
        self.current.iter().filter(move |bp| bp.address == address)
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(id: u32, address: u16, kind: BreakpointKind) -> Breakpoint {
        Breakpoint { id, address, kind }
    }

    #[test]
    fn identical_set_is_not_a_change() {
        let mut registry = BreakpointRegistry::default();
        let bp1 = bp(0, 0x1230, BreakpointKind::ProgramCounter);
        let bp2 = bp(1, 0x1813, BreakpointKind::MemoryWatch);

        assert!(registry.reconcile(vec![bp1, bp2]));
        assert!(!registry.reconcile(vec![bp1, bp2]));
        assert_eq!(registry.breakpoints(), &[bp1, bp2]);
    }

    #[test]
    fn reordered_set_counts_as_change_when_ordered() {
        let mut registry = BreakpointRegistry::default();
        let bp1 = bp(0, 0x1230, BreakpointKind::ProgramCounter);
        let bp2 = bp(1, 0x1813, BreakpointKind::ProgramCounter);

        registry.reconcile(vec![bp1, bp2]);
        assert!(registry.reconcile(vec![bp2, bp1]));
        assert_eq!(registry.breakpoints(), &[bp2, bp1]);
    }

    #[test]
    fn reordered_set_is_stable_when_unordered() {
        let mut registry = BreakpointRegistry::new(BreakpointEquality::Unordered);
        let bp1 = bp(0, 0x1230, BreakpointKind::ProgramCounter);
        let bp2 = bp(1, 0x1813, BreakpointKind::ProgramCounter);

        registry.reconcile(vec![bp1, bp2]);
        assert!(!registry.reconcile(vec![bp2, bp1]));
        assert!(registry.reconcile(vec![bp2]));
    }

    #[test]
    fn field_difference_is_a_change() {
        let mut registry = BreakpointRegistry::default();
        registry.reconcile(vec![bp(0, 0x10, BreakpointKind::ProgramCounter)]);
        assert!(registry.reconcile(vec![bp(0, 0x10, BreakpointKind::IoWatch)]));
        assert!(registry.reconcile(vec![bp(1, 0x10, BreakpointKind::IoWatch)]));
        assert!(registry.reconcile(vec![bp(1, 0x11, BreakpointKind::IoWatch)]));
    }

    #[test]
    fn empty_to_empty_is_not_a_change() {
        let mut registry = BreakpointRegistry::default();
        assert!(!registry.reconcile(Vec::new()));
        registry.reconcile(vec![bp(0, 1, BreakpointKind::ProgramCounter)]);
        assert!(registry.reconcile(Vec::new()));
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshots_are_not_affected_by_later_reconcile() {
        let mut registry = BreakpointRegistry::default();
        registry.reconcile(vec![bp(0, 1, BreakpointKind::ProgramCounter)]);
        let before = registry.snapshot();
        registry.reconcile(vec![bp(3, 9, BreakpointKind::MemoryWatch)]);
        assert_eq!(before[0].address, 1);
        assert_eq!(registry.snapshot()[0].address, 9);
    }

    #[test]
    fn deserializes_wire_shape() {
        let json = r#"[{"id":0,"address":4656,"type":0},{"id":2,"address":9545,"type":1}]"#;
        let set: Vec<Breakpoint> = serde_json::from_str(json).unwrap();
        assert_eq!(set[0], bp(0, 4656, BreakpointKind::ProgramCounter));
        assert_eq!(set[1], bp(2, 9545, BreakpointKind::MemoryWatch));

        let bad = r#"{"id":0,"address":1,"type":7}"#;
        assert!(serde_json::from_str::<Breakpoint>(bad).is_err());
    }

    #[test]
    fn kind_tokens_and_labels() {
        assert_eq!(BreakpointKind::MemoryWatch.token(), "mem");
        assert_eq!(BreakpointKind::from_token("io"), Some(BreakpointKind::IoWatch));
        assert_eq!(BreakpointKind::from_token("x"), None);
        assert_eq!(BreakpointKind::ProgramCounter.to_string(), "Program Counter");
    }
}
