//! Hook registration and the engine boundary.
//!
//! The external validation/serialization engine interacts with this crate
//! through two capability traits, and entity types register their own hooks
//! in an explicit ordered table rather than through decorators or reflection.
//! Stages run in the fixed order [`HookStage::ORDER`]; within a stage, hooks
//! run in registration order. Every hook receives the resolved context.

use canopy_tree::{Json, Map, Tree};

use crate::{Context, ContextResolver, ContextResult, Data, StoredContext};

/// When a registered hook runs relative to the engine's own work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookStage {
    /// Before the engine decodes the value.
    Before,
    /// Around the engine's decoding (the hook brackets the engine's pass).
    Wrap,
    /// After the engine has decoded the value.
    After,
    /// Instead of the engine's own serialization.
    Plain,
}

impl HookStage {
    /// The documented invocation order across stages.
    pub const ORDER: [HookStage; 4] = [
        HookStage::Before,
        HookStage::Wrap,
        HookStage::After,
        HookStage::Plain,
    ];
}

type ModelHook = Box<dyn Fn(Map<Json>, &Context) -> ContextResult<Map<Json>> + Send + Sync>;
type FieldHook = Box<dyn Fn(Tree<Json>, &Context) -> ContextResult<Tree<Json>> + Send + Sync>;

enum HookKind {
    Model(ModelHook),
    Field { field: String, hook: FieldHook },
}

struct HookEntry {
    stage: HookStage,
    kind: HookKind,
}

/// Ordered table of hooks registered at type-definition time.
#[derive(Default)]
pub struct HookRegistry {
    entries: Vec<HookEntry>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a whole-record hook for one stage.
    pub fn model(
        mut self,
        stage: HookStage,
        hook: impl Fn(Map<Json>, &Context) -> ContextResult<Map<Json>> + Send + Sync + 'static,
    ) -> Self {
        self.entries.push(HookEntry {
            stage,
            kind: HookKind::Model(Box::new(hook)),
        });
        self
    }

    /// Register a single-field hook for one stage.
    pub fn field(
        mut self,
        stage: HookStage,
        field: impl Into<String>,
        hook: impl Fn(Tree<Json>, &Context) -> ContextResult<Tree<Json>> + Send + Sync + 'static,
    ) -> Self {
        self.entries.push(HookEntry {
            stage,
            kind: HookKind::Field {
                field: field.into(),
                hook: Box::new(hook),
            },
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every model hook registered for `stage`, in registration order.
    pub fn run_model(
        &self,
        stage: HookStage,
        mut data: Map<Json>,
        context: &Context,
    ) -> ContextResult<Map<Json>> {
        for entry in &self.entries {
            if entry.stage != stage {
                continue;
            }
            if let HookKind::Model(hook) = &entry.kind {
                data = hook(data, context)?;
            }
        }
        Ok(data)
    }

    /// Run every hook registered for `stage` and `field`, in registration
    /// order.
    pub fn run_field(
        &self,
        stage: HookStage,
        field: &str,
        mut value: Tree<Json>,
        context: &Context,
    ) -> ContextResult<Tree<Json>> {
        for entry in &self.entries {
            if entry.stage != stage {
                continue;
            }
            if let HookKind::Field {
                field: name,
                hook,
            } = &entry.kind
            {
                if name == field {
                    value = hook(value, context)?;
                }
            }
        }
        Ok(value)
    }
}

/// Capability the engine invokes before constructing an entity: resolve and
/// inject context into raw data, threading the result through every nested
/// decode step.
pub trait ConstructionHook {
    fn pre_validate(&self, data: Map<Json>, context: &Context) -> ContextResult<Map<Json>>;
}

/// Capability the engine invokes before serializing an entity: recompute the
/// merged context to pass to every nested serialize step.
pub trait EmissionHook<E> {
    fn pre_serialize(&self, entity: &E, context: &Context) -> Context;
}

impl ConstructionHook for ContextResolver {
    fn pre_validate(&self, data: Map<Json>, context: &Context) -> ContextResult<Map<Json>> {
        match self.pre_init(Data::<()>::Raw(data), Some(context))? {
            Data::Raw(injected) => Ok(injected),
            Data::Entity(()) => unreachable!("raw data stays raw through pre_init"),
        }
    }
}

impl<E: StoredContext> EmissionHook<E> for ContextResolver {
    fn pre_serialize(&self, entity: &E, context: &Context) -> Context {
        self.context_get_own(entity.stored_context(), Some(context))
    }
}
