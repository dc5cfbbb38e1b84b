// Copyright 2025 Cowboy AI, LLC.

//! Property-based tests for the tag merge algebra and deferred outputs

use proptest::prelude::*;
use std::collections::BTreeMap;

use infra_topology::output::Output;
use infra_topology::tags::TagSet;

fn tag_map() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::btree_map("[a-z]{1,4}", "[a-z0-9]{0,6}", 0..8)
}

fn tag_set(map: &BTreeMap<String, String>) -> TagSet {
    TagSet::from_pairs(map.iter().map(|(k, v)| (k.clone(), v.clone())))
}

proptest! {
    /// Override keys always win on collision
    #[test]
    fn merge_is_right_biased(base in tag_map(), overrides in tag_map()) {
        let merged = tag_set(&base).merge(&tag_set(&overrides));

        for (key, value) in &overrides {
            prop_assert_eq!(merged.get(key), Some(value.as_str()));
        }
        for (key, value) in &base {
            if !overrides.contains_key(key) {
                prop_assert_eq!(merged.get(key), Some(value.as_str()));
            }
        }
    }

    /// Inputs are unchanged by merging
    #[test]
    fn merge_preserves_inputs(base in tag_map(), overrides in tag_map()) {
        let base_set = tag_set(&base);
        let override_set = tag_set(&overrides);

        let _ = base_set.merge(&override_set);

        prop_assert_eq!(base_set, tag_set(&base));
        prop_assert_eq!(override_set, tag_set(&overrides));
    }

    /// (a ⊕ b) ⊕ c == a ⊕ (b ⊕ c)
    #[test]
    fn merge_is_associative(a in tag_map(), b in tag_map(), c in tag_map()) {
        let (a, b, c) = (tag_set(&a), tag_set(&b), tag_set(&c));

        prop_assert_eq!(a.merge(&b).merge(&c), a.merge(&b.merge(&c)));
    }

    /// Merged key set is the union of both inputs
    #[test]
    fn merge_key_set_is_union(base in tag_map(), overrides in tag_map()) {
        let merged = tag_set(&base).merge(&tag_set(&overrides));

        let union: std::collections::BTreeSet<_> =
            base.keys().chain(overrides.keys()).collect();
        prop_assert_eq!(merged.len(), union.len());
    }

    /// map on a deferred value equals applying the function directly
    #[test]
    fn output_map_matches_direct_application(value in "[a-z0-9.]{0,20}", prefix in "[a-z:/]{0,8}") {
        let (output, resolver) = Output::<String>::pending();
        let composed = output.concat(prefix.clone());

        resolver.resolve(value.clone()).unwrap();
        prop_assert_eq!(composed.get(), Some(format!("{}{}", prefix, value)));
    }
}
