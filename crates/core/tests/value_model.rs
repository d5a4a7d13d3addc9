//! Container invariants and output-tree ordering under random input.

use kvbridge_core::{HashValue, OutputNode, SetValue, Value, ZSetValue};
use proptest::prelude::*;

proptest! {
    #[test]
    fn array_node_preserves_element_order(items in proptest::collection::vec("[a-z]{0,6}", 0..12)) {
        let value = Value::Array(items.iter().map(|s| Value::from(s.as_str())).collect());
        let node = OutputNode::array(value, " ");
        let back: Vec<String> = node.child_values().iter().map(|v| v.to_display_string()).collect();
        prop_assert_eq!(back, items);
    }

    #[test]
    fn set_members_stay_unique(members in proptest::collection::vec(0i64..8, 0..32)) {
        let mut set = SetValue::new();
        for m in &members {
            set.insert(Value::from(*m));
        }
        let mut distinct = members.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(set.len(), distinct.len());
    }

    #[test]
    fn hash_fields_stay_unique(fields in proptest::collection::vec(("[a-c]", any::<i64>()), 0..24)) {
        let mut hash = HashValue::new();
        for (field, value) in &fields {
            hash.insert(field.as_str(), Value::from(*value));
        }
        let mut names: Vec<&str> = fields.iter().map(|(f, _)| f.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(hash.len(), names.len());
        if let Some((field, value)) = fields.last() {
            prop_assert_eq!(hash.get(field.as_bytes()), Some(&Value::from(*value)));
        }
    }

    #[test]
    fn zset_iterates_by_score_then_member(entries in proptest::collection::vec(("[a-d]", -5i32..5), 0..24)) {
        let mut zset = ZSetValue::new();
        for (member, score) in &entries {
            zset.insert(member.as_str(), f64::from(*score));
        }
        let ordered: Vec<(Vec<u8>, f64)> = zset.iter().map(|(m, s)| (m.to_vec(), s)).collect();
        for pair in ordered.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.1 < b.1 || (a.1 == b.1 && a.0 < b.0));
        }
    }
}
