//! Generic recursive tree transforms.
//!
//! The engine operates on [`Tree`] values: insertion-ordered associative nodes
//! terminating in opaque leaves. A single hook-driven walk ([`apply`]/[`update`])
//! underpins every utility in this crate:
//!
//! - [`filt`]: recursively drop falsey branches and leaves
//! - [`sort_by_keys_pattern`]: reorder entries by a pattern-derived sort key
//! - [`replace`]/[`replace_pattern`]: entry-to-entry substitution rules
//! - [`sync`]: reconcile a target tree against a reference tree
//!
//! All operations are synchronous and copy-on-visit: a failure mid-transform
//! never leaves the caller's input mutated.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod errors;
mod filter;
mod replace;
mod sort;
mod sync;
mod transform;
mod value;

pub use errors::*;
pub use filter::*;
pub use replace::*;
pub use sort::*;
pub use sync::*;
pub use transform::*;
pub use value::*;

/// Default recursion guard for tree walks.
pub const DEFAULT_MAX_DEPTH: usize = 128;
