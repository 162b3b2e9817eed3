//! Property-based tests for reference rewriting and document patching.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::config::Config;
    use crate::patch::{patch_node, rewrite_reference, SchemaPatcher};
    use crate::path::{encode_fragment_carets, escape_pointer_token, percent_decode, split_reference};
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};

    /// Keys that trigger patch rules, mixed with ordinary ones.
    fn key() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("$ref".to_string()),
            Just("$id".to_string()),
            Just("additionalProperties".to_string()),
            Just("properties".to_string()),
            "[a-z]{1,6}",
        ]
    }

    fn reference() -> impl Strategy<Value = String> {
        ("[a-z/.]{0,12}", proptest::option::of("[a-z/^ %~]{0,10}"))
            .prop_map(|(base, fragment)| match fragment {
                Some(fragment) => format!("{}.spec.yml#{}", base, fragment),
                None => format!("{}.spec.yml", base),
            })
    }

    fn document() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            reference().prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::vec((key(), inner), 0..6)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
            ]
        })
    }

    fn has_forbidden_nodes(value: &Value, is_root: bool) -> bool {
        match value {
            Value::Object(map) => {
                (!is_root && map.contains_key("$id"))
                    || map.get("additionalProperties") == Some(&Value::Bool(true))
                    || map.iter().any(|(key, child)| {
                        key != "$ref" && has_forbidden_nodes(child, false)
                    })
            }
            Value::Array(items) => items.iter().any(|item| has_forbidden_nodes(item, false)),
            _ => false,
        }
    }

    proptest! {
        /// Property: patching a patched document changes nothing
        #[test]
        fn patch_is_idempotent(body in prop::collection::vec((key(), document()), 0..6)) {
            let config = Config::new("/tmp/work", "/tmp/out", "https://example.com/spec.git");
            let patcher = SchemaPatcher::new(&config, "1.0.0");
            let body = Value::Object(body.into_iter().collect());

            let (path, once) = patcher.patch("a/b.spec.yml", body);
            let (path_again, twice) = patcher.patch(&path, once.clone());
            prop_assert_eq!(path, path_again);
            prop_assert_eq!(once, twice);
        }

        /// Property: no nested `$id` and no `additionalProperties: true` survive
        #[test]
        fn patch_removes_forbidden_nodes(mut value in document()) {
            patch_node(&mut value, true);
            prop_assert!(!has_forbidden_nodes(&value, true));
        }

        /// Property: carets are the only characters encoded
        #[test]
        fn caret_encoding_is_narrow(fragment in "[a-z/^ %~#\\[\\]]{0,20}") {
            let encoded = encode_fragment_carets(&fragment);
            prop_assert!(!encoded.contains('^'));
            prop_assert_eq!(encoded.replace("%5E", "^"), fragment.clone());
            if !fragment.contains('%') {
                prop_assert_eq!(percent_decode(&encoded), fragment);
            }
        }

        /// Property: the base of a rewritten reference never contains the input suffix
        #[test]
        fn rewrite_reference_changes_suffix_and_fragment_only(reference in reference()) {
            let rewritten = rewrite_reference(&reference);
            let (base, fragment) = split_reference(&rewritten);
            prop_assert!(base.ends_with(".jsonschema.json"));
            if let Some(fragment) = fragment {
                prop_assert!(!fragment.contains('^'));
            }
            prop_assert_eq!(rewrite_reference(&rewritten), rewritten);
        }

        /// Property: an escaped token addresses the key it was built from
        #[test]
        fn escaped_pointer_token_resolves(token in "[a-z/~.]{1,16}") {
            let document = json!({ token.clone(): true });
            let pointer = format!("/{}", escape_pointer_token(&token));
            prop_assert_eq!(document.pointer(&pointer), Some(&Value::Bool(true)));
        }
    }
}
