//! Static per-type context trees.
//!
//! A context tree records which declared fields of an entity type carry
//! nested entities that need context propagation, along with each type's
//! static configuration and declared default context. It derives solely from
//! descriptors — it never inspects instance data — so it is computed once per
//! type and treated as read-only (see [`EntityDescriptor::context_tree`]).

use canopy_tree::Json;
use indexmap::IndexMap;

use crate::{Context, EntityDescriptor, CONTEXT_FIELD, ROOT_FIELD};

/// One node of a context tree: the declared settings of an entity type plus
/// the nested fields that themselves require propagation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContextTreeNode {
    pub config: IndexMap<String, Json>,
    pub default_context: Context,
    pub children: IndexMap<String, ContextTreeNode>,
}

impl ContextTreeNode {
    /// A node carrying no settings and no children contributes nothing to
    /// propagation and is pruned by the builder.
    pub fn is_empty(&self) -> bool {
        self.config.is_empty() && self.default_context.is_empty() && self.children.is_empty()
    }
}

/// Build the context tree for an entity type.
///
/// Synthetic `root`/`context` fields and scalar fields are excluded; a nested
/// field is included only when its recursively-built tree is non-empty.
pub fn build_context_tree(descriptor: &EntityDescriptor) -> ContextTreeNode {
    let mut children = IndexMap::new();
    for field in &descriptor.fields {
        if field.name == ROOT_FIELD || field.name == CONTEXT_FIELD {
            continue;
        }
        let Some(entity) = &field.entity else {
            continue;
        };
        let node = build_context_tree(entity);
        if !node.is_empty() {
            children.insert(field.name.clone(), node);
        }
    }
    ContextTreeNode {
        config: descriptor.settings.config.clone(),
        default_context: descriptor.settings.default_context.clone(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn root_and_context_fields_never_appear() {
        let nested = EntityDescriptor::new("Nested")
            .with_default_context(Context::from([("k", json!(1))]))
            .shared();
        let descriptor = EntityDescriptor::new("Entity")
            .nested(ROOT_FIELD, nested.clone())
            .nested(CONTEXT_FIELD, nested.clone())
            .nested("payload", nested);
        let tree = build_context_tree(&descriptor);
        assert!(!tree.children.contains_key(ROOT_FIELD));
        assert!(!tree.children.contains_key(CONTEXT_FIELD));
        assert!(tree.children.contains_key("payload"));
    }

    #[test]
    fn scalar_fields_are_excluded() {
        let descriptor = EntityDescriptor::new("Entity").field("count").field("name");
        let tree = build_context_tree(&descriptor);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn empty_nested_trees_are_pruned() {
        let bare = EntityDescriptor::new("Bare").field("value").shared();
        let configured = EntityDescriptor::new("Configured")
            .with_default_context(Context::from([("unit", json!("m"))]))
            .shared();
        let descriptor = EntityDescriptor::new("Entity")
            .nested("bare", bare)
            .nested("configured", configured);
        let tree = build_context_tree(&descriptor);
        assert!(!tree.children.contains_key("bare"));
        assert!(tree.children.contains_key("configured"));
    }

    #[test]
    fn deeply_nested_defaults_keep_the_chain_alive() {
        let leaf = EntityDescriptor::new("Leaf")
            .with_default_context(Context::from([("k", json!(1))]))
            .shared();
        let middle = EntityDescriptor::new("Middle").nested("leaf", leaf).shared();
        let descriptor = EntityDescriptor::new("Entity").nested("middle", middle);
        let tree = build_context_tree(&descriptor);
        let middle_node = &tree.children["middle"];
        // Middle declares nothing itself but stays because its child does.
        assert!(middle_node.default_context.is_empty());
        assert!(middle_node.children.contains_key("leaf"));
    }
}
