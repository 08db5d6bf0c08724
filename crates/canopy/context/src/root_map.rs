//! A validated entity that behaves as a plain mapping.
//!
//! Instead of virtually aliasing a synthetic root field onto the container
//! type itself, `RootMap` is an explicit wrapper owning the underlying map
//! and delegating the mapping interface to it. The context embedded in the
//! input (under [`CONTEXT_KEY`]) is lifted out at construction and kept
//! alongside the data.

use std::ops::BitOr;

use canopy_tree::{map_from_json, Json, Map, Tree};
use serde::{Deserialize, Serialize};

use crate::{Context, ContextError, ContextResult, StoredContext, CONTEXT_KEY};

/// Mapping-shaped entity with its resolved context.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RootMap {
    root: Map<Json>,
    #[serde(skip)]
    context: Context,
}

impl RootMap {
    /// Wrap a map, lifting out any embedded transient context.
    pub fn new(mut root: Map<Json>) -> Self {
        let context = match root.shift_remove(CONTEXT_KEY) {
            Some(Tree::Node(embedded)) => Context::from_node(&embedded),
            _ => Context::new(),
        };
        Self { root, context }
    }

    /// Construct from either a whole root map or keyed entries.
    ///
    /// Supplying both at once fails with
    /// [`ContextError::ConflictingConstructionArguments`].
    pub fn from_parts(root: Option<Map<Json>>, entries: Map<Json>) -> ContextResult<Self> {
        match root {
            Some(_) if !entries.is_empty() => Err(ContextError::ConflictingConstructionArguments),
            Some(root) => Ok(Self::new(root)),
            None => Ok(Self::new(entries)),
        }
    }

    /// Construct from any JSON object.
    pub fn from_json(value: Json) -> ContextResult<Self> {
        Ok(Self::new(map_from_json(value)?))
    }

    /// Build a map with every key holding the same value.
    pub fn from_keys<I>(keys: I, value: Tree<Json>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(
            keys.into_iter()
                .map(|key| (key.into(), value.clone()))
                .collect(),
        )
    }

    /// The context lifted out of the input at construction.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Tree<Json>> {
        self.root.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.root.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Tree<Json>) -> Option<Tree<Json>> {
        self.root.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Tree<Json>> {
        self.root.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.root.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Tree<Json>)> {
        self.root.iter()
    }

    /// The underlying map.
    pub fn as_map(&self) -> &Map<Json> {
        &self.root
    }

    pub fn into_map(self) -> Map<Json> {
        self.root
    }
}

impl StoredContext for RootMap {
    fn stored_context(&self) -> &Context {
        &self.context
    }
}

impl PartialEq<Map<Json>> for RootMap {
    fn eq(&self, other: &Map<Json>) -> bool {
        self.root == *other
    }
}

impl IntoIterator for RootMap {
    type Item = (String, Tree<Json>);
    type IntoIter = indexmap::map::IntoIter<String, Tree<Json>>;

    fn into_iter(self) -> Self::IntoIter {
        self.root.into_iter()
    }
}

impl BitOr for &RootMap {
    type Output = RootMap;

    /// Merge operator: right-hand entries win on collision; the left-hand
    /// context is kept.
    fn bitor(self, other: &RootMap) -> RootMap {
        let mut root = self.root.clone();
        for (key, value) in &other.root {
            root.insert(key.clone(), value.clone());
        }
        RootMap {
            root,
            context: self.context.clone(),
        }
    }
}
