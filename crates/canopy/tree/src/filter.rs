//! Recursive falsey-branch filtering.

use crate::{apply, Hooks, Map, Truthy, TreeResult};

/// Recursively drop falsey nodes and leaves.
///
/// Leaves decide emptiness through [`Truthy`]; a node is dropped once all of
/// its children have been filtered away. Filtering is idempotent:
/// `filt(filt(t)) == filt(t)`.
pub fn filt<L>(map: &Map<L>) -> TreeResult<Map<L>>
where
    L: Clone + PartialEq + Truthy,
{
    let hooks = Hooks::new()
        .should_delete_node(|node: &Map<L>| node.is_empty())
        .should_delete_leaf(|leaf: &L| !leaf.is_truthy());
    apply(map, &hooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{map_from_json, Json};
    use proptest::prelude::*;
    use serde_json::json;

    fn tree(value: Json) -> Map<Json> {
        map_from_json(value).expect("test fixtures are objects")
    }

    #[test]
    fn empty_branches_are_stripped_bottom_up() {
        let out = filt(&tree(json!({"a": {}, "b": {"c": 0}, "d": {"e": 1}}))).unwrap();
        assert_eq!(out, tree(json!({"d": {"e": 1}})));
    }

    #[test]
    fn nodes_emptied_by_filtering_are_themselves_dropped() {
        let out = filt(&tree(json!({"a": {"b": {"c": ""}}, "d": 1}))).unwrap();
        assert_eq!(out, tree(json!({"d": 1})));
    }

    #[test]
    fn arrays_survive_when_any_element_is_truthy() {
        let out = filt(&tree(json!({"dead": [0, false], "live": [0, 2]}))).unwrap();
        assert_eq!(out, tree(json!({"live": [0, 2]})));
    }

    fn arb_map() -> impl Strategy<Value = Map<Json>> {
        let leaf = prop_oneof![
            Just(json!(0)),
            Just(json!(1)),
            Just(json!("")),
            Just(json!("x")),
            Just(json!(null)),
            Just(json!(true)),
        ]
        .prop_map(crate::Tree::leaf);
        let tree = leaf.prop_recursive(3, 24, 4, |inner| {
            proptest::collection::vec(("[a-e]", inner), 0..4)
                .prop_map(|entries| crate::Tree::node(entries.into_iter().collect()))
        });
        proptest::collection::vec(("[a-e]", tree), 0..4)
            .prop_map(|entries| entries.into_iter().collect())
    }

    proptest! {
        #[test]
        fn filtering_is_idempotent(map in arb_map()) {
            let once = filt(&map).unwrap();
            let twice = filt(&once).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
