use proptest::prelude::*;
use serde_json::json;
use symposium_engine::memory::MemoryStore;
use symposium_engine::participants::base::strip_speaker_prefix;
use symposium_engine::tools::calculator::{evaluate, Number};

// The store never holds more than max_entries, and the most recent write
// always survives eviction.
proptest! {
    #[test]
    fn test_memory_bound_holds(
        max_entries in 1usize..=8,
        keys in prop::collection::vec("[a-e]{1,2}", 1..40),
    ) {
        let mut store = MemoryStore::new(max_entries);

        for (i, key) in keys.iter().enumerate() {
            store.add(key.clone(), json!(i), "prop");

            prop_assert!(store.len() <= max_entries);
            prop_assert_eq!(store.get(key), Some(&json!(i)));
        }

        let newest = store.recent(1);
        prop_assert_eq!(&newest[0].key, keys.last().unwrap());
    }

    #[test]
    fn test_memory_upsert_keeps_keys_unique(
        keys in prop::collection::vec("[a-c]", 1..30),
    ) {
        let mut store = MemoryStore::new(100);
        for key in &keys {
            store.add(key.clone(), json!(key), "prop");
        }

        let mut distinct = keys.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(store.len(), distinct.len());
    }
}

// Integer arithmetic agrees with Rust's own for small operands
proptest! {
    #[test]
    fn test_calculator_integer_ops(a in -1000i64..1000, b in 1i64..1000) {
        prop_assert_eq!(evaluate(&format!("{} + {}", a, b)), Ok(Number::Int(a + b)));
        prop_assert_eq!(evaluate(&format!("{} * {}", a, b)), Ok(Number::Int(a * b)));
        prop_assert_eq!(
            evaluate(&format!("{} // {}", a, b)),
            Ok(Number::Int(a.div_euclid(b)))
        );
        prop_assert_eq!(
            evaluate(&format!("{} % {}", a, b)),
            Ok(Number::Int(a.rem_euclid(b)))
        );
    }

    #[test]
    fn test_calculator_never_panics(input in "[0-9+\\-*/%(). ]{0,24}") {
        let _ = evaluate(&input);
    }
}

// Stripping a speaker label only ever removes a prefix
proptest! {
    #[test]
    fn test_strip_speaker_prefix_is_suffix(body in "[a-zA-Z ,.]{0,40}") {
        let labelled = format!("Plato:{}", body);
        prop_assert_eq!(strip_speaker_prefix(&labelled, "plato", false), body.as_str());
        prop_assert_eq!(strip_speaker_prefix(&labelled, "plato", true), labelled.as_str());
        prop_assert!(labelled.ends_with(strip_speaker_prefix(&labelled, "Plato", true)));
    }
}
