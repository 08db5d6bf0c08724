//! Context resolution and injection.
//!
//! Per construction/emission call the resolver recomputes a merged context
//! from scratch: declared default < ancestor-supplied < embedded transient <
//! caller-supplied explicit. `pre_init` then rewrites raw input so every
//! nested sub-tree named by the type's context tree carries its resolved
//! context under the transient [`CONTEXT_KEY`], ready for the validation
//! engine to thread through nested decode steps.

use std::sync::Arc;

use canopy_tree::{Json, Map, Tree, DEFAULT_MAX_DEPTH};
use indexmap::IndexMap;
use tracing::debug;

use crate::{
    Context, ContextError, ContextResult, ContextTreeNode, EntityDescriptor, CONTEXT_FIELD,
    CONTEXT_KEY,
};

/// Input to a construction call: raw tree data, or an already-constructed
/// entity (whose context is already resolved).
#[derive(Clone, Debug, PartialEq)]
pub enum Data<E> {
    Raw(Map<Json>),
    Entity(E),
}

impl<E> Data<E> {
    /// Decompose a JSON value into raw data, failing unless it is an object.
    pub fn from_json(value: Json) -> ContextResult<Self> {
        match Tree::from_json(value) {
            Tree::Node(map) => Ok(Data::Raw(map)),
            Tree::Leaf(other) => Err(ContextError::UnsupportedShape {
                reason: format!("raw input must be an associative structure, got {other}"),
            }),
        }
    }

    /// Decompose a JSON value whose leaves may themselves be JSON-encoded
    /// strings, decoding them in place before construction.
    pub fn from_string_leaves(value: Json) -> ContextResult<Self> {
        match Self::from_json(value)? {
            Data::Raw(map) => Ok(Data::Raw(canopy_tree::decode_string_leaves(&map)?)),
            entity => Ok(entity),
        }
    }

    pub fn as_raw(&self) -> Option<&Map<Json>> {
        match self {
            Data::Raw(map) => Some(map),
            Data::Entity(_) => None,
        }
    }
}

/// Whether the resolved context travels only transiently or is also stored
/// as ordinary entity data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContextMode {
    /// Inject only the transient [`CONTEXT_KEY`] carrier.
    #[default]
    Transient,
    /// Additionally fold in and write the persistent [`CONTEXT_FIELD`], so
    /// the context remains introspectable after construction.
    Stored,
}

/// Resolves and injects contexts for one entity type.
pub struct ContextResolver {
    descriptor: Arc<EntityDescriptor>,
    mode: ContextMode,
    max_depth: usize,
}

impl ContextResolver {
    pub fn new(descriptor: Arc<EntityDescriptor>) -> Self {
        Self {
            descriptor,
            mode: ContextMode::Transient,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// A resolver whose entities store their resolved context persistently.
    pub fn stored(descriptor: Arc<EntityDescriptor>) -> Self {
        Self {
            mode: ContextMode::Stored,
            ..Self::new(descriptor)
        }
    }

    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    pub fn descriptor(&self) -> &Arc<EntityDescriptor> {
        &self.descriptor
    }

    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    /// Resolve the context for `data`.
    ///
    /// Already-constructed entities resolve to the empty context. For raw
    /// data the precedence is: `base` (defaulting to the type's declared
    /// default) < embedded transient context < stored context (stored mode
    /// only) < `explicit`. An embedded or stored context that is not an
    /// associative structure fails with [`ContextError::UnsupportedShape`].
    pub fn context_get<E>(
        &self,
        data: &Data<E>,
        explicit: Option<&Context>,
        base: Option<&Context>,
    ) -> ContextResult<Context> {
        match data {
            Data::Entity(_) => Ok(Context::new()),
            Data::Raw(raw) => self.raw_context_get(raw, explicit, base),
        }
    }

    /// Merge an entity's own stored context with a later override, for use
    /// when re-emitting the entity.
    pub fn context_get_own(&self, stored: &Context, explicit: Option<&Context>) -> Context {
        match explicit {
            Some(explicit) => stored.merged(explicit),
            None => stored.clone(),
        }
    }

    /// Resolve and inject contexts into raw data before construction.
    ///
    /// Entities pass through unchanged. Raw data is rewritten so that every
    /// nested sub-tree named by the type's context tree carries its merged
    /// context: each child resolves its declared default, the parent's
    /// resolved context, its own embedded context, and the caller's explicit
    /// context, in that precedence, recursively.
    pub fn pre_init<E>(&self, data: Data<E>, explicit: Option<&Context>) -> ContextResult<Data<E>> {
        match data {
            Data::Entity(_) => Ok(data),
            Data::Raw(raw) => {
                let context = self.raw_context_get(&raw, explicit, None)?;
                debug!(
                    entity = self.descriptor.name.as_str(),
                    keys = context.len(),
                    "resolved construction context"
                );
                let tree = self.descriptor.context_tree();
                let injected = self.inject(raw, &tree.children, context, explicit, 0)?;
                Ok(Data::Raw(injected))
            }
        }
    }

    fn raw_context_get(
        &self,
        raw: &Map<Json>,
        explicit: Option<&Context>,
        base: Option<&Context>,
    ) -> ContextResult<Context> {
        let mut context = base
            .cloned()
            .unwrap_or_else(|| self.descriptor.settings.default_context.clone());
        if let Some(embedded) = raw.get(CONTEXT_KEY) {
            context.merge_from(&Self::context_node(embedded, CONTEXT_KEY)?);
        }
        if self.mode == ContextMode::Stored {
            if let Some(stored) = raw.get(CONTEXT_FIELD) {
                context.merge_from(&Self::context_node(stored, CONTEXT_FIELD)?);
            }
        }
        if let Some(explicit) = explicit {
            context.merge_from(explicit);
        }
        Ok(context)
    }

    fn context_node(value: &Tree<Json>, key: &str) -> ContextResult<Context> {
        match value {
            Tree::Node(node) => Ok(Context::from_node(node)),
            Tree::Leaf(other) => Err(ContextError::UnsupportedShape {
                reason: format!("context under '{key}' must be an associative structure, got {other}"),
            }),
        }
    }

    fn inject(
        &self,
        mut data: Map<Json>,
        tree: &IndexMap<String, ContextTreeNode>,
        context: Context,
        explicit: Option<&Context>,
        depth: usize,
    ) -> ContextResult<Map<Json>> {
        if depth >= self.max_depth {
            return Err(ContextError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        for (field, node) in tree {
            let inner = match data.get(field) {
                Some(Tree::Node(inner)) => inner.clone(),
                // A leaf here is the engine's problem to report; absent
                // fields still receive their inherited context.
                Some(Tree::Leaf(_)) => continue,
                None => Map::new(),
            };
            // Child precedence: declared default < ancestor < the child's
            // own embedded context < the caller's explicit context.
            let base = node.default_context.merged(&context);
            let child_context = self.raw_context_get(&inner, explicit, Some(&base))?;
            let injected = self.inject(inner, &node.children, child_context, explicit, depth + 1)?;
            data.insert(field.clone(), Tree::Node(injected));
        }
        data.insert(CONTEXT_KEY.to_owned(), Tree::Node(context.to_node()));
        if self.mode == ContextMode::Stored {
            data.insert(CONTEXT_FIELD.to_owned(), Tree::Node(context.to_node()));
        }
        Ok(data)
    }
}

/// Remove the transient context carrier from one level of raw data, once the
/// engine has consumed it.
pub fn strip_transient(data: &mut Map<Json>) {
    data.shift_remove(CONTEXT_KEY);
}

/// An entity that kept its resolved context as ordinary data, so it remains
/// introspectable after construction.
pub trait StoredContext {
    fn stored_context(&self) -> &Context;
}
