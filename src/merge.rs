//! Three-way merge under pluggable strategies, fast-forward, and up-to-date detection (§4.7).
//!
//! Operates purely on trees and ordered item-id sequences; callers (the
//! façade) resolve branch names to commits and hand this module digests.
//! Grounded on §4.7's algebra directly — there is no prior-art merge engine
//! in the teacher crate (git-internal stops at the object model), so this is
//! new, written in the same plain-function, explicit-`Result` style as
//! [`crate::walk`].

use crate::errors::RepoError;
use crate::hash::ObjectHash;
use crate::object::signature::Signature;
use crate::object::{Commit, Object, Tree};
use crate::store::ObjectStore;
use crate::walk::{is_ancestor, merge_base};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Current order, novel incoming items appended in incoming order, deduplicated.
    Union,
    /// Same as union but without deduplication.
    Append,
    /// Items present in both, in current order.
    Intersection,
}

impl Default for MergeStrategy {
    fn default() -> Self {
        MergeStrategy::Union
    }
}

/// Combine two ordered item-id sequences under `strategy` (§4.7's set algebra,
/// order-preserving).
pub fn combine_items(current: &[&str], incoming: &[&str], strategy: MergeStrategy) -> Vec<String> {
    match strategy {
        MergeStrategy::Union => {
            let mut combined: Vec<String> = current.iter().map(|s| s.to_string()).collect();
            for item in incoming {
                if !current.contains(item) {
                    combined.push(item.to_string());
                }
            }
            combined
        }
        MergeStrategy::Append => {
            let mut combined: Vec<String> = current.iter().map(|s| s.to_string()).collect();
            combined.extend(incoming.iter().map(|s| s.to_string()));
            combined
        }
        MergeStrategy::Intersection => current
            .iter()
            .filter(|item| incoming.contains(item))
            .map(|s| s.to_string())
            .collect(),
    }
}

pub enum MergeOutcome {
    /// `current` already contains everything `incoming` has; no change made.
    UpToDate,
    /// `current` advanced directly to `incoming`'s commit; no merge commit created.
    FastForward { new_head: ObjectHash },
    /// A new merge commit was created with two parents.
    Merged { new_head: ObjectHash },
}

/// Merge `incoming` into `current` (§4.7). Both are commit digests; the
/// merge-base, fast-forward, and up-to-date checks all walk the object graph
/// via `store`. `committer` stamps the merge commit, if one is created.
pub fn merge(
    store: &ObjectStore,
    current: ObjectHash,
    incoming: ObjectHash,
    incoming_branch_name: &str,
    strategy: MergeStrategy,
    committer: Signature,
) -> Result<MergeOutcome, RepoError> {
    if is_ancestor(store, incoming, current)? {
        return Ok(MergeOutcome::UpToDate);
    }

    let base = merge_base(store, current, incoming)?;
    if base == Some(current) {
        return Ok(MergeOutcome::FastForward { new_head: incoming });
    }

    let current_commit = store.get(&current)?.as_commit().cloned().ok_or_else(|| {
        RepoError::user(format!("`{current}` is not a commit"))
    })?;
    let incoming_commit = store.get(&incoming)?.as_commit().cloned().ok_or_else(|| {
        RepoError::user(format!("`{incoming}` is not a commit"))
    })?;

    let current_tree = store.get(&current_commit.tree_id)?.as_tree().cloned().unwrap();
    let incoming_tree = store.get(&incoming_commit.tree_id)?.as_tree().cloned().unwrap();

    let current_ids = current_tree.item_ids();
    let incoming_ids = incoming_tree.item_ids();
    let combined_ids = combine_items(&current_ids, &incoming_ids, strategy);

    let mut entries = Vec::with_capacity(combined_ids.len());
    for id in &combined_ids {
        let (blob, display_name) = lookup_entry(&current_tree, &incoming_tree, id);
        entries.push((id.clone(), blob, display_name));
    }
    let merged_tree = Tree::new(entries);
    let tree_id = store.put(&Object::Tree(merged_tree))?;

    let message = format!("Merge branch '{incoming_branch_name}'");
    let commit = Commit::new(
        committer.clone(),
        committer,
        tree_id,
        vec![current, incoming],
        message,
    );
    let new_head = store.put(&Object::Commit(commit))?;
    Ok(MergeOutcome::Merged { new_head })
}

fn lookup_entry(current: &Tree, incoming: &Tree, item_id: &str) -> (ObjectHash, String) {
    if let Some(entry) = current.entries.iter().find(|e| e.item_id == item_id) {
        (entry.blob, entry.display_name.clone())
    } else {
        let entry = incoming
            .entries
            .iter()
            .find(|e| e.item_id == item_id)
            .expect("combine_items only returns ids present in at least one side");
        (entry.blob, entry.display_name.clone())
    }
}

/// Used by stash apply/pop (§4.8), which three-way-merges a stash tree
/// against `HEAD` unconditionally under [`MergeStrategy::Union`], without
/// involving commit graph ancestry.
pub fn union_tree_items(current_tree: &Tree, incoming_tree: &Tree) -> Vec<(String, ObjectHash, String)> {
    let current_ids = current_tree.item_ids();
    let incoming_ids = incoming_tree.item_ids();
    let combined_ids = combine_items(&current_ids, &incoming_ids, MergeStrategy::Union);
    combined_ids
        .into_iter()
        .map(|id| {
            let (blob, display_name) = lookup_entry(current_tree, incoming_tree, &id);
            (id, blob, display_name)
        })
        .collect()
}
