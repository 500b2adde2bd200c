//! Static address-to-region classification.
//!
//! A region table is an ordered list of [`RegionDescriptor`]s. Descriptors may
//! overlap; the index is built so that the descriptor declared later in the
//! table owns any address it shares with an earlier one.

use std::ops::RangeInclusive;

use serde::Deserialize;

use crate::memory::ADDRESS_SPACE;

const UNCLASSIFIED: u32 = u32::MAX;

/// A named, possibly model-specific, address range.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct RegionDescriptor {
    start: u16,
    end: u16,
    /// Model codes this entry documents. Empty means every model.
    models: Vec<u8>,
    description: String,
}

impl RegionDescriptor {
    pub fn new(range: RangeInclusive<u16>, models: &[u8], description: impl Into<String>) -> Self {
        Self {
            start: *range.start(),
            end: *range.end(),
            models: models.to_vec(),
            description: description.into(),
        }
    }

    /// Single-address descriptor.
    pub fn at(address: u16, models: &[u8], description: impl Into<String>) -> Self {
        Self::new(address..=address, models, description)
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn range(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }

    pub fn contains(&self, address: u16) -> bool {
        self.range().contains(&address)
    }

    pub fn models(&self) -> &[u8] {
        &self.models
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether this entry documents the given model.
    pub fn applies_to(&self, model: u8) -> bool {
        self.models.is_empty() || self.models.contains(&model)
    }
}

/// Wire/file shape of a descriptor: `address` is `[addr]` or `[start, end]`,
/// `model_code` is either a list or a bare number.
#[derive(Deserialize)]
struct RawDescriptor {
    address: Vec<u16>,
    #[serde(default)]
    model_code: ModelCodes,
    description: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelCodes {
    One(u8),
    Many(Vec<u8>),
}

impl Default for ModelCodes {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl TryFrom<RawDescriptor> for RegionDescriptor {
    type Error = String;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        let (start, end) = match raw.address.as_slice() {
            [addr] => (*addr, *addr),
            [start, end] => (*start, *end),
            other => {
                return Err(format!(
                    "address must be [addr] or [start, end], got {} values",
                    other.len()
                ));
            }
        };
        if start > end {
            return Err(format!("address range {start:#06x}..={end:#06x} is reversed"));
        }
        let models = match raw.model_code {
            ModelCodes::One(code) => vec![code],
            ModelCodes::Many(codes) => codes,
        };
        Ok(Self {
            start,
            end,
            models,
            description: raw.description,
        })
    }
}

/// Address → descriptor position lookup, built once and immutable afterwards.
#[derive(Debug, Clone)]
pub struct RegionIndex {
    descriptors: Vec<RegionDescriptor>,
    slots: Box<[u32]>,
}

impl RegionIndex {
    /// Index every descriptor in table order; later entries win on overlap.
    pub fn build(descriptors: Vec<RegionDescriptor>) -> Self {
        Self::build_filtered(descriptors, |_| true)
    }

    /// Index only the descriptors that document `model`.
    ///
    /// Positions returned by [`RegionIndex::classify`] still refer to the full
    /// table, so a region list rendered from [`RegionIndex::descriptors`] keeps
    /// its numbering.
    pub fn build_for_model(descriptors: Vec<RegionDescriptor>, model: u8) -> Self {
        Self::build_filtered(descriptors, |d| d.applies_to(model))
    }

    fn build_filtered(
        descriptors: Vec<RegionDescriptor>,
        include: impl Fn(&RegionDescriptor) -> bool,
    ) -> Self {
        let mut slots = vec![UNCLASSIFIED; ADDRESS_SPACE].into_boxed_slice();
        for (idx, descriptor) in descriptors.iter().enumerate() {
            debug_assert!(
                descriptor.start <= descriptor.end,
                "reversed region {:?}",
                descriptor.range()
            );
            if !include(descriptor) {
                continue;
            }
            let idx = idx as u32;
            for slot in &mut slots[descriptor.start as usize..=descriptor.end as usize] {
                *slot = idx;
            }
        }
        Self { descriptors, slots }
    }

    /// Table position of the region owning `address`, or `None` for plain RAM.
    pub fn classify(&self, address: u16) -> Option<usize> {
        match self.slots[address as usize] {
            UNCLASSIFIED => None,
            idx => Some(idx as usize),
        }
    }

    pub fn region_at(&self, address: u16) -> Option<&RegionDescriptor> {
        self.classify(address).map(|idx| &self.descriptors[idx])
    }

    pub fn descriptor(&self, idx: usize) -> Option<&RegionDescriptor> {
        self.descriptors.get(idx)
    }

    pub fn descriptors(&self) -> &[RegionDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for RegionIndex {
    fn default() -> Self {
        Self::build(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_descriptor_wins_overlap() {
        let index = RegionIndex::build(vec![
            RegionDescriptor::at(0x4024, &[], "A"),
            RegionDescriptor::at(0x4024, &[], "B"),
        ]);
        assert_eq!(index.classify(0x4024), Some(1));
        assert_eq!(index.region_at(0x4024).map(|d| d.description()), Some("B"));
    }

    #[test]
    fn narrower_later_entry_refines_broad_range() {
        let index = RegionIndex::build(vec![
            RegionDescriptor::new(0x401D..=0x4024, &[1, 3], "Video DCB"),
            RegionDescriptor::at(0x4020, &[3], "Cursor"),
        ]);
        assert_eq!(index.classify(0x401D), Some(0));
        assert_eq!(index.classify(0x4020), Some(1));
        assert_eq!(index.classify(0x4024), Some(0));
    }

    #[test]
    fn unclassified_addresses_are_none() {
        let index = RegionIndex::build(vec![RegionDescriptor::new(0x3C00..=0x3FFF, &[], "Video")]);
        assert_eq!(index.classify(0x3BFF), None);
        assert_eq!(index.classify(0x4000), None);
        assert_eq!(index.classify(0x0000), None);
        assert_eq!(index.classify(0xFFFF), None);
        assert_eq!(index.classify(0x3C00), Some(0));
        assert_eq!(index.classify(0x3FFF), Some(0));
    }

    #[test]
    fn range_reaching_top_of_memory() {
        let index = RegionIndex::build(vec![RegionDescriptor::new(0xFF00..=0xFFFF, &[], "Top")]);
        assert_eq!(index.classify(0xFFFF), Some(0));
        assert_eq!(index.classify(0xFEFF), None);
    }

    #[test]
    fn model_filter_keeps_table_positions() {
        let table = vec![
            RegionDescriptor::at(0x37E1, &[1], "Disk drive select"),
            RegionDescriptor::at(0x4019, &[3], "Caps Lock Toggle"),
            RegionDescriptor::at(0x4022, &[], "Cursor"),
        ];
        let index = RegionIndex::build_for_model(table, 3);
        assert_eq!(index.classify(0x37E1), None);
        assert_eq!(index.classify(0x4019), Some(1));
        assert_eq!(index.classify(0x4022), Some(2));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn model_filter_skips_overriding_entry_for_other_models() {
        let table = vec![
            RegionDescriptor::at(0x4024, &[], "FLAG"),
            RegionDescriptor::at(0x4024, &[3], "Character set"),
        ];
        let model_one = RegionIndex::build_for_model(table.clone(), 1);
        assert_eq!(model_one.classify(0x4024), Some(0));
        let model_three = RegionIndex::build_for_model(table, 3);
        assert_eq!(model_three.classify(0x4024), Some(1));
    }

    #[test]
    fn deserializes_single_and_ranged_addresses() {
        let json = r#"[
            {"address": [15360, 16383], "model_code": [1, 3], "description": "Video RAM"},
            {"address": [16420], "model_code": 3, "description": "Character Set"},
            {"address": [16384], "description": "RST 08"}
        ]"#;
        let table: Vec<RegionDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(table[0].range(), 0x3C00..=0x3FFF);
        assert_eq!(table[0].models(), &[1, 3]);
        assert_eq!(table[1].range(), 0x4024..=0x4024);
        assert_eq!(table[1].models(), &[3]);
        assert!(table[2].models().is_empty());
        assert!(table[2].applies_to(4));
    }

    #[test]
    fn rejects_reversed_or_empty_address() {
        let reversed = r#"{"address": [10, 5], "description": "x"}"#;
        assert!(serde_json::from_str::<RegionDescriptor>(reversed).is_err());
        let empty = r#"{"address": [], "description": "x"}"#;
        assert!(serde_json::from_str::<RegionDescriptor>(empty).is_err());
    }
}
