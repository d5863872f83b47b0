//! `revert <commit>` (§4.8): undo the effect of a commit, recorded as a new commit.

use crate::errors::RepoError;
use crate::hash::ObjectHash;
use crate::object::signature::Signature;
use crate::object::{Commit, Object};
use crate::ops::{apply_delta, diff_trees, invert_delta};
use crate::store::ObjectStore;

/// Revert `target` on top of `head`: compute `target`'s delta versus its
/// first parent, invert it, apply to `head`'s tree, and create a new commit
/// whose parent is `head` (not `target`'s parent — revert moves history
/// forward, it doesn't rewind it).
pub fn revert(
    store: &ObjectStore,
    head: ObjectHash,
    target: ObjectHash,
    committer: Signature,
) -> Result<ObjectHash, RepoError> {
    let target_commit = store
        .get(&target)?
        .as_commit()
        .cloned()
        .ok_or_else(|| RepoError::user(format!("`{target}` is not a commit")))?;
    let parent_id = target_commit
        .first_parent()
        .ok_or_else(|| RepoError::user(format!("`{target}` is a root commit; nothing to revert against")))?;

    let target_tree = store.get(&target_commit.tree_id)?.as_tree().cloned().unwrap();
    let parent_tree = store.get(&store.get(&parent_id)?.as_commit().unwrap().tree_id)?.as_tree().cloned().unwrap();

    let delta = diff_trees(&parent_tree, &target_tree);
    let inverted = invert_delta(&delta, &target_tree);

    let head_commit = store
        .get(&head)?
        .as_commit()
        .cloned()
        .ok_or_else(|| RepoError::user(format!("`{head}` is not a commit")))?;
    let head_tree = store.get(&head_commit.tree_id)?.as_tree().cloned().unwrap();

    let reverted_tree = apply_delta(&head_tree, &inverted);
    let tree_id = store.put(&Object::Tree(reverted_tree))?;

    let message = format!("Revert \"{}\"", target_commit.subject());
    let commit = Commit::new(committer.clone(), committer, tree_id, vec![head], message);
    Ok(store.put(&Object::Commit(commit))?)
}
