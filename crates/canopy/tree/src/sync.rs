//! Structural reconciliation of a target tree against a reference tree.

use crate::{Map, Tree, TreeError, TreeResult, DEFAULT_MAX_DEPTH};

/// Reconcile `target` to `reference`'s shape and values.
///
/// - Keys present only in the target are removed.
/// - Missing or unequal entries adopt the reference value; adoption clones,
///   so the result never aliases mutable reference leaves.
/// - Unequal node/node pairs are reconciled recursively; equality
///   short-circuits, so an unchanged sub-tree is never rebuilt.
///
/// The result never introduces keys absent from the reference. Recursion is
/// guarded at [`DEFAULT_MAX_DEPTH`].
pub fn sync<L>(reference: &Map<L>, target: &Map<L>) -> TreeResult<Map<L>>
where
    L: Clone + PartialEq,
{
    sync_with_depth(reference, target, DEFAULT_MAX_DEPTH)
}

/// [`sync`] with a caller-chosen recursion limit.
pub fn sync_with_depth<L>(
    reference: &Map<L>,
    target: &Map<L>,
    max_depth: usize,
) -> TreeResult<Map<L>>
where
    L: Clone + PartialEq,
{
    sync_at(reference, target, 0, max_depth)
}

fn sync_at<L>(
    reference: &Map<L>,
    target: &Map<L>,
    depth: usize,
    max_depth: usize,
) -> TreeResult<Map<L>>
where
    L: Clone + PartialEq,
{
    if depth >= max_depth {
        return Err(TreeError::DepthExceeded { limit: max_depth });
    }
    let mut synced: Map<L> = target
        .iter()
        .filter(|(key, _)| reference.contains_key(*key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    for (key, ref_value) in reference {
        if let Some(target_value) = synced.get(key) {
            if ref_value == target_value {
                continue;
            }
            if let (Tree::Node(ref_node), Tree::Node(target_node)) = (ref_value, target_value) {
                let merged = sync_at(ref_node, target_node, depth + 1, max_depth)?;
                synced.insert(key.clone(), Tree::Node(merged));
                continue;
            }
        }
        synced.insert(key.clone(), ref_value.clone());
    }
    Ok(synced)
}
