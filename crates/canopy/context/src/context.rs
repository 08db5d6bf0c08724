//! The context value: an open, ordered key/value side-channel.

use canopy_tree::{Json, Map, Tree};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Propagated side-channel configuration.
///
/// Contexts are value-like: recomputed per call, merged by shallow union with
/// the right-hand source overriding the left on key collision. Non-colliding
/// keys from all sources are retained.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    entries: IndexMap<String, Json>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&Json> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Json) -> Option<Json> {
        self.entries.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Json> {
        self.entries.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Json)> {
        self.entries.iter()
    }

    /// Shallow union: `other`'s keys override this context's on collision.
    pub fn merge_from(&mut self, other: &Context) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Shallow union into a fresh context, `other` winning on collision.
    pub fn merged(&self, other: &Context) -> Context {
        let mut out = self.clone();
        out.merge_from(other);
        out
    }

    /// Read a context out of an embedded tree node.
    pub fn from_node(node: &Map<Json>) -> Self {
        Self {
            entries: node
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        }
    }

    /// Emit the context as a tree node for embedding in raw data.
    pub fn to_node(&self) -> Map<Json> {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), Tree::from_json(value.clone())))
            .collect()
    }
}

impl FromIterator<(String, Json)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Json)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[(&str, Json); N]> for Context {
    fn from(entries: [(&str, Json); N]) -> Self {
        entries
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value))
            .collect()
    }
}

impl IntoIterator for Context {
    type Item = (String, Json);
    type IntoIter = indexmap::map::IntoIter<String, Json>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn right_hand_source_wins_on_collision() {
        let base = Context::from([("a", json!(1)), ("b", json!(1))]);
        let over = Context::from([("b", json!(2)), ("c", json!(2))]);
        let merged = base.merged(&over);
        assert_eq!(
            merged,
            Context::from([("a", json!(1)), ("b", json!(2)), ("c", json!(2))])
        );
    }

    #[test]
    fn precedence_chain_resolves_lowest_to_highest() {
        let declared = Context::from([("a", json!(1))]);
        let ancestor = Context::from([("a", json!(2)), ("b", json!(2))]);
        let embedded = Context::from([("b", json!(3)), ("c", json!(3))]);
        let explicit = Context::from([("c", json!(4))]);
        let resolved = declared
            .merged(&ancestor)
            .merged(&embedded)
            .merged(&explicit);
        assert_eq!(
            resolved,
            Context::from([("a", json!(2)), ("b", json!(3)), ("c", json!(4))])
        );
    }

    #[test]
    fn node_round_trip_preserves_nested_values() {
        let context = Context::from([("unit", json!("m")), ("limits", json!({"max": 3}))]);
        assert_eq!(Context::from_node(&context.to_node()), context);
    }

    fn arb_context() -> impl Strategy<Value = Context> {
        let value = prop_oneof![Just(json!(0)), Just(json!(1)), Just(json!("x"))];
        proptest::collection::vec(("[a-e]", value), 0..5)
            .prop_map(|entries| entries.into_iter().collect())
    }

    proptest! {
        #[test]
        fn merge_is_associative(a in arb_context(), b in arb_context(), c in arb_context()) {
            prop_assert_eq!(a.merged(&b).merged(&c), a.merged(&b.merged(&c)));
        }

        #[test]
        fn the_later_source_always_wins(a in arb_context(), b in arb_context()) {
            let merged = a.merged(&b);
            for (key, value) in b.iter() {
                prop_assert_eq!(merged.get(key), Some(value));
            }
            for (key, value) in a.iter() {
                if !b.contains_key(key) {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
        }
    }
}
