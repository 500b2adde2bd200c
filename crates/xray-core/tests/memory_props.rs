use proptest::prelude::*;
use xray_core::{ADDRESS_SPACE, CoreError, MemoryImage};

fn block() -> impl Strategy<Value = (u16, Vec<u8>)> {
    (any::<u16>(), prop::collection::vec(any::<u8>(), 0..512))
        .prop_filter("fits in address space", |(start, payload)| {
            *start as usize + payload.len() <= ADDRESS_SPACE
        })
}

proptest! {
    #[test]
    fn second_application_changes_nothing((start, payload) in block()) {
        let mut image = MemoryImage::new();
        image.apply_update(start, &payload).unwrap();
        let delta = image.apply_update(start, &payload).unwrap();
        prop_assert_eq!(delta.changed, 0);
        prop_assert!(image.changed_addresses().is_empty());
        prop_assert!((0..=u16::MAX).all(|a| !image.changed_at(a)));
    }

    #[test]
    fn mask_equals_exact_diff(
        (first_start, first) in block(),
        (start, payload) in block(),
    ) {
        let mut image = MemoryImage::new();
        image.apply_update(first_start, &first).unwrap();
        let before = image.bytes().to_vec();

        image.apply_update(start, &payload).unwrap();
        let after = image.bytes();

        for addr in 0..=u16::MAX {
            let i = addr as usize;
            prop_assert_eq!(image.changed_at(addr), before[i] != after[i], "address {:#06x}", addr);
        }
        let expected: Vec<u16> = (0..=u16::MAX)
            .filter(|&a| before[a as usize] != after[a as usize])
            .collect();
        prop_assert_eq!(image.changed_addresses(), expected.as_slice());
    }

    #[test]
    fn oversized_block_leaves_image_untouched(
        start in 0xFF00u16..=0xFFFF,
        extra in 1usize..64,
        seed in any::<u8>(),
    ) {
        let mut image = MemoryImage::new();
        image.apply_update(0xFF00, &[seed; 0x100]).unwrap();
        let before = image.bytes().to_vec();
        let mask_before = image.changed_addresses().to_vec();

        let len = (ADDRESS_SPACE - start as usize) + extra;
        let err = image.apply_update(start, &vec![seed.wrapping_add(1); len]).unwrap_err();
        prop_assert_eq!(err, CoreError::OutOfRange { start, len });
        prop_assert_eq!(image.bytes(), before.as_slice());
        prop_assert_eq!(image.changed_addresses(), mask_before.as_slice());
    }
}
