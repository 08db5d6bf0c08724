//! Static entity schema descriptors.
//!
//! Replaces runtime type reflection with an explicit descriptor per entity
//! type: field names, nested entity types, and the type's declared settings
//! slot (static configuration plus a declared default context). Descriptors
//! are built once, shared behind [`Arc`], and treated as read-only.

use std::sync::{Arc, OnceLock};

use canopy_tree::Json;
use indexmap::IndexMap;

use crate::{build_context_tree, Context, ContextTreeNode};

/// Synthetic field holding a wrapper entity's underlying value.
pub const ROOT_FIELD: &str = "root";
/// Persistent field carrying a stored context on the entity itself.
pub const CONTEXT_FIELD: &str = "context";
/// Transient key carrying the resolved context inside raw data.
pub const CONTEXT_KEY: &str = "_context";

/// A declared field: its name and, for nested records, the entity type.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub entity: Option<Arc<EntityDescriptor>>,
}

/// The settings slot declared on an entity type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntitySettings {
    /// Declared default context, lowest-precedence source during resolution.
    pub default_context: Context,
    /// Static configuration carried alongside the context tree.
    pub config: IndexMap<String, Json>,
}

/// Static schema for one entity type.
///
/// Descriptor graphs must be acyclic; the context tree derived from a
/// descriptor is memoized for the descriptor's lifetime.
#[derive(Debug, Default)]
pub struct EntityDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub settings: EntitySettings,
    context_tree: OnceLock<ContextTreeNode>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declare the type's default context.
    pub fn with_default_context(mut self, context: Context) -> Self {
        self.settings.default_context = context;
        self
    }

    /// Attach a static configuration entry.
    pub fn with_config(mut self, key: impl Into<String>, value: Json) -> Self {
        self.settings.config.insert(key.into(), value);
        self
    }

    /// Declare a scalar field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            entity: None,
        });
        self
    }

    /// Declare a field holding a nested entity.
    pub fn nested(mut self, name: impl Into<String>, entity: Arc<EntityDescriptor>) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            entity: Some(entity),
        });
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The type's context tree, built on first use and cached thereafter.
    pub fn context_tree(&self) -> &ContextTreeNode {
        self.context_tree.get_or_init(|| build_context_tree(self))
    }
}

/// Introspection capability: an entity type exposes its static descriptor.
pub trait Introspect {
    fn descriptor() -> Arc<EntityDescriptor>;
}
