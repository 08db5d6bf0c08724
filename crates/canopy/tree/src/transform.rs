//! Hook-driven recursive tree walk.
//!
//! One walk serves every utility in this crate: callers install optional
//! callbacks per node and per leaf, and the engine visits each entry in
//! insertion order. Deletion is deferred: hooks only mark a key, and marked
//! keys are removed after the full pass over that node's children, so sibling
//! iteration is never perturbed mid-pass.

use tracing::trace;

use crate::{Map, Tree, TreeError, TreeResult, DEFAULT_MAX_DEPTH};

type KeyPred<'h> = Box<dyn Fn(&str) -> bool + 'h>;
type NodeFn<'h, L> = Box<dyn Fn(Map<L>) -> Map<L> + 'h>;
type NodePred<'h, L> = Box<dyn Fn(&Map<L>) -> bool + 'h>;
type LeafFn<'h, L> = Box<dyn Fn(L) -> L + 'h>;
type LeafPred<'h, L> = Box<dyn Fn(&L) -> bool + 'h>;

/// Optional callbacks for one transform pass.
///
/// Unset hooks behave as identity (visitors) or `false` (predicates), so
/// `Hooks::default()` is a no-op hook set. Visitors receive owned values;
/// every leaf is copied before a hook observes it and every node is handed
/// over before descent, so sibling trees shared with the caller are never
/// mutated through aliasing.
pub struct Hooks<'h, L> {
    skip_key: Option<KeyPred<'h>>,
    pre_visit_node: Option<NodeFn<'h, L>>,
    skip_node: Option<NodePred<'h, L>>,
    pre_should_delete_node: Option<NodePred<'h, L>>,
    post_visit_node: Option<NodeFn<'h, L>>,
    should_delete_node: Option<NodePred<'h, L>>,
    pre_visit_leaf: Option<LeafFn<'h, L>>,
    skip_leaf: Option<LeafPred<'h, L>>,
    pre_should_delete_leaf: Option<LeafPred<'h, L>>,
    post_visit_leaf: Option<LeafFn<'h, L>>,
    should_delete_leaf: Option<LeafPred<'h, L>>,
    max_depth: usize,
}

impl<L> Default for Hooks<'_, L> {
    fn default() -> Self {
        Self {
            skip_key: None,
            pre_visit_node: None,
            skip_node: None,
            pre_should_delete_node: None,
            post_visit_node: None,
            should_delete_node: None,
            pre_visit_leaf: None,
            skip_leaf: None,
            pre_should_delete_leaf: None,
            post_visit_leaf: None,
            should_delete_leaf: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl<'h, L> Hooks<'h, L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave entries with matching keys untouched.
    pub fn skip_key(mut self, f: impl Fn(&str) -> bool + 'h) -> Self {
        self.skip_key = Some(Box::new(f));
        self
    }

    /// Rewrite a node before descent.
    pub fn pre_visit_node(mut self, f: impl Fn(Map<L>) -> Map<L> + 'h) -> Self {
        self.pre_visit_node = Some(Box::new(f));
        self
    }

    /// Keep the pre-visited node without descending into it.
    pub fn skip_node(mut self, f: impl Fn(&Map<L>) -> bool + 'h) -> Self {
        self.skip_node = Some(Box::new(f));
        self
    }

    /// Mark a node for deferred deletion before descent.
    pub fn pre_should_delete_node(mut self, f: impl Fn(&Map<L>) -> bool + 'h) -> Self {
        self.pre_should_delete_node = Some(Box::new(f));
        self
    }

    /// Rewrite a node after its children have been fully recursed.
    pub fn post_visit_node(mut self, f: impl Fn(Map<L>) -> Map<L> + 'h) -> Self {
        self.post_visit_node = Some(Box::new(f));
        self
    }

    /// Mark the fully-recursed node for deferred deletion.
    pub fn should_delete_node(mut self, f: impl Fn(&Map<L>) -> bool + 'h) -> Self {
        self.should_delete_node = Some(Box::new(f));
        self
    }

    /// Rewrite a leaf copy before the remaining leaf hooks observe it.
    pub fn pre_visit_leaf(mut self, f: impl Fn(L) -> L + 'h) -> Self {
        self.pre_visit_leaf = Some(Box::new(f));
        self
    }

    /// Keep the pre-visited leaf without further processing.
    pub fn skip_leaf(mut self, f: impl Fn(&L) -> bool + 'h) -> Self {
        self.skip_leaf = Some(Box::new(f));
        self
    }

    /// Mark a leaf for deferred deletion before the post-visit.
    pub fn pre_should_delete_leaf(mut self, f: impl Fn(&L) -> bool + 'h) -> Self {
        self.pre_should_delete_leaf = Some(Box::new(f));
        self
    }

    /// Rewrite a leaf after the pre-visit stage.
    pub fn post_visit_leaf(mut self, f: impl Fn(L) -> L + 'h) -> Self {
        self.post_visit_leaf = Some(Box::new(f));
        self
    }

    /// Mark a leaf for deferred deletion. The predicate sees the pre-visited
    /// value; the post-visit rewrite still runs on kept leaves.
    pub fn should_delete_leaf(mut self, f: impl Fn(&L) -> bool + 'h) -> Self {
        self.should_delete_leaf = Some(Box::new(f));
        self
    }

    /// Replace the recursion guard (defaults to [`DEFAULT_MAX_DEPTH`]).
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    fn skips_key(&self, key: &str) -> bool {
        self.skip_key.as_ref().is_some_and(|f| f(key))
    }

    fn run_pre_visit_node(&self, node: Map<L>) -> Map<L> {
        match &self.pre_visit_node {
            Some(f) => f(node),
            None => node,
        }
    }

    fn skips_node(&self, node: &Map<L>) -> bool {
        self.skip_node.as_ref().is_some_and(|f| f(node))
    }

    fn pre_deletes_node(&self, node: &Map<L>) -> bool {
        self.pre_should_delete_node.as_ref().is_some_and(|f| f(node))
    }

    fn run_post_visit_node(&self, node: Map<L>) -> Map<L> {
        match &self.post_visit_node {
            Some(f) => f(node),
            None => node,
        }
    }

    fn deletes_node(&self, node: &Map<L>) -> bool {
        self.should_delete_node.as_ref().is_some_and(|f| f(node))
    }

    fn run_pre_visit_leaf(&self, leaf: L) -> L {
        match &self.pre_visit_leaf {
            Some(f) => f(leaf),
            None => leaf,
        }
    }

    fn skips_leaf(&self, leaf: &L) -> bool {
        self.skip_leaf.as_ref().is_some_and(|f| f(leaf))
    }

    fn pre_deletes_leaf(&self, leaf: &L) -> bool {
        self.pre_should_delete_leaf.as_ref().is_some_and(|f| f(leaf))
    }

    fn run_post_visit_leaf(&self, leaf: L) -> L {
        match &self.post_visit_leaf {
            Some(f) => f(leaf),
            None => leaf,
        }
    }

    fn deletes_leaf(&self, leaf: &L) -> bool {
        self.should_delete_leaf.as_ref().is_some_and(|f| f(leaf))
    }
}

/// Pure transform: rebuild `map` through one hook pass, leaving it untouched.
pub fn apply<L>(map: &Map<L>, hooks: &Hooks<'_, L>) -> TreeResult<Map<L>>
where
    L: Clone + PartialEq,
{
    let mut out = map.clone();
    update(&mut out, hooks)?;
    Ok(out)
}

/// In-place transform: run one hook pass over `map`, mutating it directly.
pub fn update<L>(map: &mut Map<L>, hooks: &Hooks<'_, L>) -> TreeResult<()>
where
    L: Clone + PartialEq,
{
    update_at(map, hooks, 0)
}

fn update_at<L>(map: &mut Map<L>, hooks: &Hooks<'_, L>, depth: usize) -> TreeResult<()>
where
    L: Clone + PartialEq,
{
    if depth >= hooks.max_depth {
        return Err(TreeError::DepthExceeded {
            limit: hooks.max_depth,
        });
    }
    let mut marks: Vec<String> = Vec::new();
    for index in 0..map.len() {
        let key = match map.get_index(index) {
            Some((key, _)) => key.clone(),
            None => break,
        };
        if hooks.skips_key(&key) {
            continue;
        }
        let Some((_, slot)) = map.get_index_mut(index) else {
            break;
        };
        match slot {
            Tree::Node(existing) => {
                let node = hooks.run_pre_visit_node(std::mem::take(existing));
                if hooks.skips_node(&node) {
                    *slot = Tree::Node(node);
                    continue;
                }
                if hooks.pre_deletes_node(&node) {
                    *slot = Tree::Node(node);
                    marks.push(key);
                    continue;
                }
                let mut node = node;
                update_at(&mut node, hooks, depth + 1)?;
                let node = hooks.run_post_visit_node(node);
                let delete = hooks.deletes_node(&node);
                *slot = Tree::Node(node);
                if delete {
                    marks.push(key);
                }
            }
            Tree::Leaf(existing) => {
                let leaf = hooks.run_pre_visit_leaf(existing.clone());
                if hooks.skips_leaf(&leaf) {
                    *slot = Tree::Leaf(leaf);
                    continue;
                }
                if hooks.pre_deletes_leaf(&leaf) {
                    *slot = Tree::Leaf(leaf);
                    marks.push(key);
                    continue;
                }
                // The deletion decision is made on the pre-visit value; the
                // post-visit rewrite does not change it.
                let delete = hooks.deletes_leaf(&leaf);
                let leaf = hooks.run_post_visit_leaf(leaf);
                *slot = Tree::Leaf(leaf);
                if delete {
                    marks.push(key);
                }
            }
        }
    }
    if !marks.is_empty() {
        trace!(count = marks.len(), depth, "removing marked keys after pass");
    }
    for mark in marks {
        map.shift_remove(&mark);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{map_from_json, Json};
    use serde_json::json;
    use std::cell::RefCell;

    fn tree(value: Json) -> Map<Json> {
        map_from_json(value).expect("test fixtures are objects")
    }

    #[test]
    fn identity_apply_rebuilds_without_mutating_the_input() {
        let original = tree(json!({"a": {"b": 1}, "c": [1, 2], "d": "x"}));
        let hooks = Hooks::default();
        let mut rebuilt = apply(&original, &hooks).unwrap();
        assert_eq!(rebuilt, original);

        rebuilt.insert("extra".into(), Tree::leaf(json!(true)));
        assert!(!original.contains_key("extra"));
    }

    #[test]
    fn update_mutates_in_place() {
        let mut map = tree(json!({"a": 1, "b": {"c": 2}}));
        let hooks = Hooks::new().post_visit_leaf(|leaf: Json| {
            leaf.as_i64().map(|n| json!(n * 10)).unwrap_or(leaf)
        });
        update(&mut map, &hooks).unwrap();
        assert_eq!(map, tree(json!({"a": 10, "b": {"c": 20}})));
    }

    #[test]
    fn skip_key_leaves_entries_untouched() {
        let map = tree(json!({"keep": 1, "bump": 2}));
        let hooks = Hooks::new()
            .skip_key(|key| key == "keep")
            .post_visit_leaf(|leaf: Json| leaf.as_i64().map(|n| json!(n + 1)).unwrap_or(leaf));
        let out = apply(&map, &hooks).unwrap();
        assert_eq!(out, tree(json!({"keep": 1, "bump": 3})));
    }

    #[test]
    fn skipped_nodes_keep_their_pre_visited_value_without_descent() {
        let map = tree(json!({"n": {"inner": 1}}));
        let hooks = Hooks::new()
            .pre_visit_node(|mut node: Map<Json>| {
                node.insert("tag".into(), Tree::leaf(json!(true)));
                node
            })
            .skip_node(|node| node.contains_key("tag"))
            .post_visit_leaf(|_| json!(99));
        let out = apply(&map, &hooks).unwrap();
        // Descent never happened, so the inner leaf is unrewritten.
        assert_eq!(out, tree(json!({"n": {"inner": 1, "tag": true}})));
    }

    #[test]
    fn deletion_is_deferred_until_the_pass_completes() {
        let visited = RefCell::new(Vec::new());
        let map = tree(json!({"a": 1, "b": 2, "c": 3}));
        let hooks = Hooks::new().should_delete_leaf(|leaf: &Json| {
            visited.borrow_mut().push(leaf.clone());
            leaf == &json!(1)
        });
        let out = apply(&map, &hooks).unwrap();
        // Every sibling was still visited even though "a" was marked first.
        assert_eq!(*visited.borrow(), vec![json!(1), json!(2), json!(3)]);
        assert_eq!(out, tree(json!({"b": 2, "c": 3})));
    }

    #[test]
    fn pre_delete_skips_descent() {
        let descended = RefCell::new(false);
        let map = tree(json!({"drop": {"x": 1}, "keep": {"y": 2}}));
        let hooks = Hooks::new()
            .pre_should_delete_node(|node: &Map<Json>| node.contains_key("x"))
            .post_visit_leaf(|leaf: Json| {
                *descended.borrow_mut() = true;
                leaf
            });
        let out = apply(&map, &hooks).unwrap();
        assert_eq!(out, tree(json!({"keep": {"y": 2}})));
        // Only "keep" was descended into.
        assert!(*descended.borrow());
    }

    #[test]
    fn leaf_deletion_decides_on_the_pre_visit_value() {
        let map = tree(json!({"a": 1}));
        let hooks = Hooks::new()
            .post_visit_leaf(|_| json!(0))
            .should_delete_leaf(|leaf: &Json| !crate::Truthy::is_truthy(leaf));
        let out = apply(&map, &hooks).unwrap();
        // The predicate saw the original truthy leaf, not the rewritten zero.
        assert_eq!(out, tree(json!({"a": 0})));
    }

    #[test]
    fn depth_guard_fails_past_the_limit() {
        let map = tree(json!({"a": {"b": {"c": {"d": 1}}}}));
        let hooks = Hooks::<Json>::new().max_depth(2);
        let err = apply(&map, &hooks).unwrap_err();
        assert!(matches!(err, TreeError::DepthExceeded { limit: 2 }));
    }

    #[test]
    fn failure_mid_transform_leaves_the_input_unchanged() {
        let original = tree(json!({"a": {"b": {"c": 1}}}));
        let hooks = Hooks::<Json>::new().max_depth(1);
        assert!(apply(&original, &hooks).is_err());
        assert_eq!(original, tree(json!({"a": {"b": {"c": 1}}})));
    }
}
