use proptest::prelude::*;
use wire::{ext_tag, ExtKind, Tag, Width};

fn ext_kind_strategy() -> impl Strategy<Value = ExtKind> {
    prop_oneof![
        Just(ExtKind::Uint),
        Just(ExtKind::Int),
        Just(ExtKind::Raw),
        Just(ExtKind::Str),
        Just(ExtKind::Ref),
        Just(ExtKind::Arr),
        Just(ExtKind::Map),
        Just(ExtKind::Set),
    ]
}

fn width_strategy() -> impl Strategy<Value = Width> {
    prop_oneof![
        Just(Width::W8),
        Just(Width::W16),
        Just(Width::W32),
        Just(Width::W64),
    ]
}

proptest! {
    #[test]
    fn prop_ext_tag_classifies_back(kind in ext_kind_strategy(), width in width_strategy()) {
        let byte = ext_tag(kind, width);
        prop_assert!((0x80..=0x9F).contains(&byte));
        prop_assert_eq!(Tag::classify(byte), Ok(Tag::Ext { kind, width }));
    }

    #[test]
    fn prop_classify_is_total_and_consistent(byte in any::<u8>()) {
        // Either a classification or a reserved error carrying the byte
        // itself; never a panic, and always the same answer twice.
        let first = Tag::classify(byte);
        prop_assert_eq!(first, Tag::classify(byte));
        if let Err(err) = first {
            prop_assert_eq!(err, wire::TagError::Reserved { tag: byte });
        }
    }

    #[test]
    fn prop_width_selection_is_minimal(value in any::<u64>()) {
        let width = Width::for_uint(value);
        let fits = |w: Width| match w {
            Width::W8 => value <= u64::from(u8::MAX),
            Width::W16 => value <= u64::from(u16::MAX),
            Width::W32 => value <= u64::from(u32::MAX),
            Width::W64 => true,
        };
        prop_assert!(fits(width));
        // No narrower width would do.
        let narrower = match width {
            Width::W8 => None,
            Width::W16 => Some(Width::W8),
            Width::W32 => Some(Width::W16),
            Width::W64 => Some(Width::W32),
        };
        if let Some(narrower) = narrower {
            prop_assert!(!fits(narrower));
        }
    }
}
