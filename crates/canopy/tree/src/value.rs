//! Tree values: ordered nodes terminating in opaque leaves.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{TreeError, TreeResult};

/// Open-ended leaf payload used by the context layer and JSON conversions.
pub type Json = serde_json::Value;

/// An associative branch: unique keys, insertion order preserved for output.
pub type Map<L> = IndexMap<String, Tree<L>>;

/// A tree value: an associative [`Map`] node or an opaque terminal leaf.
///
/// Leaves only need equality and a non-deep copy (`Clone + PartialEq`); the
/// engine never inspects them beyond that.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tree<L> {
    Node(Map<L>),
    Leaf(L),
}

impl<L> Tree<L> {
    /// Wrap a map as a node.
    pub fn node(map: Map<L>) -> Self {
        Tree::Node(map)
    }

    /// Wrap a terminal value as a leaf.
    pub fn leaf(value: L) -> Self {
        Tree::Leaf(value)
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Tree::Node(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Tree::Leaf(_))
    }

    pub fn as_node(&self) -> Option<&Map<L>> {
        match self {
            Tree::Node(map) => Some(map),
            Tree::Leaf(_) => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut Map<L>> {
        match self {
            Tree::Node(map) => Some(map),
            Tree::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&L> {
        match self {
            Tree::Node(_) => None,
            Tree::Leaf(value) => Some(value),
        }
    }
}

impl Tree<Json> {
    /// Decompose a JSON value: objects become nodes, everything else a leaf.
    pub fn from_json(value: Json) -> Self {
        match value {
            Json::Object(entries) => Tree::Node(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Tree::from_json(value)))
                    .collect(),
            ),
            other => Tree::Leaf(other),
        }
    }

    /// Re-emit the tree as a JSON value, preserving entry order.
    pub fn to_json(&self) -> Json {
        match self {
            Tree::Node(map) => Json::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Tree::Leaf(value) => value.clone(),
        }
    }
}

/// Decompose a JSON value into a [`Map`], failing unless it is an object.
pub fn map_from_json(value: Json) -> TreeResult<Map<Json>> {
    match Tree::from_json(value) {
        Tree::Node(map) => Ok(map),
        Tree::Leaf(other) => Err(TreeError::UnsupportedShape {
            reason: format!("expected an object, found {}", json_kind(&other)),
        }),
    }
}

/// Re-emit a [`Map`] as a JSON object.
pub fn map_to_json(map: &Map<Json>) -> Json {
    Tree::Node(map.clone()).to_json()
}

/// Decode every string leaf as JSON, replacing it with the decoded value.
///
/// Decoded objects become nodes, so string-encoded sub-trees expand in place.
/// Fails with [`TreeError::InvalidJson`] on the first leaf that does not
/// parse.
pub fn decode_string_leaves(map: &Map<Json>) -> TreeResult<Map<Json>> {
    decode_string_leaves_at(map, 0)
}

fn decode_string_leaves_at(map: &Map<Json>, depth: usize) -> TreeResult<Map<Json>> {
    if depth >= crate::DEFAULT_MAX_DEPTH {
        return Err(TreeError::DepthExceeded {
            limit: crate::DEFAULT_MAX_DEPTH,
        });
    }
    map.iter()
        .map(|(key, value)| {
            let decoded = match value {
                Tree::Node(inner) => Tree::Node(decode_string_leaves_at(inner, depth + 1)?),
                Tree::Leaf(Json::String(text)) => Tree::from_json(serde_json::from_str(text)?),
                Tree::Leaf(other) => Tree::Leaf(other.clone()),
            };
            Ok((key.clone(), decoded))
        })
        .collect()
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// Emptiness convention for leaf values.
///
/// A node is falsey once it has no children; a leaf decides for itself. For
/// array-like values the whole value is truthy as soon as any element is.
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for Json {
    fn is_truthy(&self) -> bool {
        match self {
            Json::Null => false,
            Json::Bool(b) => *b,
            Json::Number(n) => {
                n.as_f64().map(|v| v != 0.0).unwrap_or(true)
            }
            Json::String(s) => !s.is_empty(),
            Json::Array(items) => items.iter().any(Truthy::is_truthy),
            Json::Object(entries) => !entries.is_empty(),
        }
    }
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for i64 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for u64 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Truthy> Truthy for Vec<T> {
    fn is_truthy(&self) -> bool {
        self.iter().any(Truthy::is_truthy)
    }
}
