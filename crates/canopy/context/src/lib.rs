//! Inherited context resolution for nested entity construction and emission.
//!
//! A *context* is an open key/value side-channel that ancestors supply to
//! every nested sub-record an external validation engine constructs, without
//! each caller threading it explicitly. This crate provides:
//!
//! - [`Context`]: the merged side-channel value itself
//! - [`EntityDescriptor`]: explicit static schema per entity type
//! - [`ContextTreeNode`]: the per-type map of which nested fields propagate
//!   context, built once from descriptors and cached
//! - [`ContextResolver`]: merges declared-default, ancestor, embedded, and
//!   caller-supplied context with defined precedence, and injects the result
//!   into every nested raw sub-tree before construction
//! - [`HookRegistry`]: the ordered table of validation/serialization hooks
//!   the engine invokes with the resolved context
//! - [`RootMap`]: a validated entity that behaves as a plain mapping

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod context;
mod descriptor;
mod errors;
mod hooks;
mod resolver;
mod root_map;
mod tree;

pub use context::*;
pub use descriptor::*;
pub use errors::*;
pub use hooks::*;
pub use resolver::*;
pub use root_map::*;
pub use tree::*;
