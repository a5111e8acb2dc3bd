//! Property-Based Testing for Bindery
//!
//! Uses proptest to fuzz-test parsing and store invariants.
//! Coverage targets:
//! - Key paths and nested writes (store/paths.rs)
//! - Placeholder scanning (binding/template.rs)
//! - Markup parsing (dom/parser.rs)

use proptest::prelude::*;
use serde_json::json;

// =============================================================================
// TEST 1: Store paths
// =============================================================================

mod store_fuzzing {
    use super::*;
    use bindery::store::PathStore;

    prop_compose! {
        /// Generate valid dotted keys of 1..=4 segments
        fn arb_key()(segments in prop::collection::vec(r"[a-z][a-z0-9_]{0,8}", 1..=4)) -> String {
            segments.join(".")
        }
    }

    proptest! {
        /// Property: a value written at a fresh key reads back unchanged
        #[test]
        fn test_set_then_get(key in arb_key(), n in any::<i64>()) {
            let mut store = PathStore::new();
            store.set(&key, json!(n)).unwrap();
            prop_assert_eq!(store.get(&key), Some(&json!(n)));
        }

        /// Property: ensure never changes an existing value
        #[test]
        fn test_ensure_is_idempotent(key in arb_key(), s in "[ -~]{0,12}") {
            let mut store = PathStore::new();
            store.set(&key, json!(s)).unwrap();
            let before = store.print().clone();
            let _ = store.ensure(&key);
            prop_assert_eq!(store.print(), &before);
        }

        /// Property: a failed write leaves the tree untouched
        #[test]
        fn test_conflict_is_atomic(parent in r"[a-z]{1,6}", child in arb_key()) {
            let mut store = PathStore::new();
            store.set(&parent, json!(42)).unwrap();
            let before = store.print().clone();
            let result = store.set(&format!("{parent}.{child}"), json!("x"));
            prop_assert!(result.is_err());
            prop_assert_eq!(store.print(), &before);
        }

        /// Property: malformed keys never panic
        #[test]
        fn test_arbitrary_keys_never_panic(key in ".*") {
            let mut store = PathStore::new();
            let _ = store.set(&key, json!(1));
            let _ = store.get(&key);
            let _ = store.ensure(&key);
        }
    }
}

// =============================================================================
// TEST 2: Placeholder scanning
// =============================================================================

mod template_fuzzing {
    use super::*;
    use bindery::binding::{first_placeholder, qualify, strip_markup};

    proptest! {
        /// Property: scanning arbitrary text never panics
        #[test]
        fn test_scan_never_panics(text in ".*") {
            let _ = first_placeholder(&strip_markup(&text));
        }

        /// Property: the first placeholder is found behind markup-free text
        #[test]
        fn test_first_placeholder_found(
            prefix in "[a-z ]{0,10}",
            key in r"[a-z][a-z0-9_.]{0,12}",
            suffix in "[a-z ]{0,10}"
        ) {
            let text = format!("{prefix}{{{{{key}}}}}{suffix}");
            prop_assert_eq!(first_placeholder(&text), Some(key.trim()));
        }

        /// Property: a namespace is prefixed exactly once, whatever the key
        #[test]
        fn test_qualify_prefixes_once(ns in r"[a-z]{1,6}", key in r"[a-z]{1,6}(\.[a-z]{1,6}){0,2}") {
            prop_assert_eq!(qualify(&key, Some(&ns), '.'), format!("{ns}.{key}"));
            let nested = format!("{ns}.{key}");
            prop_assert_eq!(qualify(&nested, Some(&ns), '.'), format!("{ns}.{ns}.{key}"));
        }
    }
}

// =============================================================================
// TEST 3: Markup parsing
// =============================================================================

mod markup_fuzzing {
    use super::*;
    use bindery::{FragmentParser, MarkupParser};

    proptest! {
        /// Property: parsing arbitrary input returns Ok or Err, never panics
        #[test]
        fn test_parse_never_panics(markup in ".*") {
            let _ = MarkupParser.parse_fragment(&markup);
        }

        /// Property: serialized output parses back to the same markup
        #[test]
        fn test_serialize_is_stable(
            tag in "(div|span|p|b)",
            text in "[a-zA-Z0-9 &<>]{0,20}",
            class in "[a-z \"]{0,10}"
        ) {
            let mut doc = bindery::Document::new();
            let mut element = bindery::dom::Element::new(&tag);
            element.set_attribute("class", &class);
            let node = doc.create_element(element);
            let text_node = doc.create_text(&text);
            doc.append_child(node, text_node);
            let root = doc.root();
            doc.append_child(root, node);

            let html = doc.to_html();
            let reparsed = MarkupParser.parse_fragment(&html).unwrap();
            prop_assert_eq!(reparsed.to_html(), html);
        }
    }
}
