//! History rewrite operations: reset, revert, cherry-pick, rebase, stash (§4.8).
//!
//! Each submodule is a plain function over [`ObjectStore`] and [`RefStore`]
//! digests — no knowledge of the façade's `tracing` spans or config lives
//! here, matching the teacher's layering (object/ref primitives stay free of
//! presentation concerns; [`crate::repo::Repository`] wraps them).

pub mod cherry_pick;
pub mod rebase;
pub mod reset;
pub mod revert;
pub mod stash;

use crate::hash::ObjectHash;
use crate::object::Tree;

/// The items a commit added or removed relative to a comparison tree, by
/// identifier, preserving the position each added item held in the newer tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDelta {
    pub added: Vec<(String, ObjectHash, String)>,
    pub removed: Vec<String>,
}

/// `new \ old` (added) and `old \ new` (removed), by item id (§4.8's revert
/// and cherry-pick both start from this).
pub fn diff_trees(old: &Tree, new: &Tree) -> TreeDelta {
    let added = new
        .entries
        .iter()
        .filter(|e| !old.contains(&e.item_id))
        .map(|e| (e.item_id.clone(), e.blob, e.display_name.clone()))
        .collect();
    let removed = old
        .entries
        .iter()
        .filter(|e| !new.contains(&e.item_id))
        .map(|e| e.item_id.clone())
        .collect();
    TreeDelta { added, removed }
}

/// Apply a delta to `base`: append `delta.added` (skipping ids already
/// present) and drop any entry named in `delta.removed`.
pub fn apply_delta(base: &Tree, delta: &TreeDelta) -> Tree {
    let mut entries: Vec<(String, ObjectHash, String)> = base
        .entries
        .iter()
        .filter(|e| !delta.removed.contains(&e.item_id))
        .map(|e| (e.item_id.clone(), e.blob, e.display_name.clone()))
        .collect();
    for (id, blob, name) in &delta.added {
        if !entries.iter().any(|(existing_id, _, _)| existing_id == id) {
            entries.push((id.clone(), *blob, name.clone()));
        }
    }
    Tree::new(entries)
}

/// Swap added/removed, for revert's "invert the delta" step (§4.8).
pub fn invert_delta(delta: &TreeDelta, original_tree: &Tree) -> TreeDelta {
    let added = delta
        .removed
        .iter()
        .filter_map(|id| {
            original_tree
                .entries
                .iter()
                .find(|e| &e.item_id == id)
                .map(|e| (e.item_id.clone(), e.blob, e.display_name.clone()))
        })
        .collect();
    TreeDelta {
        added,
        removed: delta.added.iter().map(|(id, _, _)| id.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    fn hash(seed: &str) -> ObjectHash {
        ObjectHash::of(ObjectKind::Blob, seed.as_bytes())
    }

    #[test]
    fn diff_trees_finds_additions_and_removals() {
        let old = Tree::new(vec![("a".into(), hash("a"), "A".into()), ("b".into(), hash("b"), "B".into())]);
        let new = Tree::new(vec![("a".into(), hash("a"), "A".into()), ("c".into(), hash("c"), "C".into())]);
        let delta = diff_trees(&old, &new);
        assert_eq!(delta.added, vec![("c".to_string(), hash("c"), "C".to_string())]);
        assert_eq!(delta.removed, vec!["b".to_string()]);
    }

    #[test]
    fn apply_then_invert_round_trips_to_original() {
        let old = Tree::new(vec![("a".into(), hash("a"), "A".into()), ("b".into(), hash("b"), "B".into())]);
        let new = Tree::new(vec![("a".into(), hash("a"), "A".into()), ("c".into(), hash("c"), "C".into())]);
        let delta = diff_trees(&old, &new);

        let applied = apply_delta(&old, &delta);
        assert_eq!(applied.item_ids(), new.item_ids());

        let inverted = invert_delta(&delta, &old);
        let reverted = apply_delta(&new, &inverted);
        assert_eq!(reverted.item_ids(), old.item_ids());
    }
}
