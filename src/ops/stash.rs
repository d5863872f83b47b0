//! `stash save|pop|apply|list|drop` (§4.8).
//!
//! The stash is a stack of commits whose parent is the `HEAD` they were
//! saved against, addressed by `refs/stash` plus a reflog recording each
//! push (mirroring git's own stash-as-reflog-stack representation). This
//! module is pure: it has no knowledge of `refs/stash`'s on-disk form — the
//! façade owns reading/writing that ref and its reflog, and hands this
//! module the stack as a `Vec<ObjectHash>` plus the commit bodies.

use crate::errors::RepoError;
use crate::hash::ObjectHash;
use crate::merge::union_tree_items;
use crate::object::signature::Signature;
use crate::object::{Commit, Object, Tree};
use crate::store::ObjectStore;

/// Create a stash commit: tree = the current index snapshot, parent = `head`.
/// The caller is responsible for pushing the returned digest onto the stash
/// stack and then resetting the index to `head`'s tree.
pub fn save(store: &ObjectStore, head: ObjectHash, index_tree: Tree, committer: Signature, message: &str) -> Result<ObjectHash, RepoError> {
    let tree_id = store.put(&Object::Tree(index_tree))?;
    let commit = Commit::new(committer.clone(), committer, tree_id, vec![head], message);
    Ok(store.put(&Object::Commit(commit))?)
}

/// Apply a stashed entry onto `head`'s tree unconditionally via the union
/// strategy (§4.8, §9: "this spec commits to union"), returning the merged
/// tree. Does not touch `refs/stash`; `pop` additionally removes the entry,
/// `apply` leaves it.
pub fn apply(store: &ObjectStore, head: ObjectHash, stash_entry: ObjectHash) -> Result<Tree, RepoError> {
    let head_commit = store
        .get(&head)?
        .as_commit()
        .cloned()
        .ok_or_else(|| RepoError::user(format!("`{head}` is not a commit")))?;
    let head_tree = store.get(&head_commit.tree_id)?.as_tree().cloned().unwrap();

    let stash_commit = store
        .get(&stash_entry)?
        .as_commit()
        .cloned()
        .ok_or_else(|| RepoError::user(format!("`{stash_entry}` is not a stash entry")))?;
    let stash_tree = store.get(&stash_commit.tree_id)?.as_tree().cloned().unwrap();

    Ok(Tree::new(union_tree_items(&head_tree, &stash_tree)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    fn sig() -> Signature {
        Signature::new("Jane", "jane@example.com", 1, "+0000")
    }

    fn store() -> (tempfile::TempDir, ObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::init(dir.path().join(".spgit")).unwrap();
        (dir, store)
    }

    fn blob(seed: &str) -> ObjectHash {
        ObjectHash::of(ObjectKind::Blob, seed.as_bytes())
    }

    fn tree(entries: Vec<&str>) -> Tree {
        Tree::new(entries.into_iter().map(|id| (id.to_string(), blob(id), id.to_string())).collect())
    }

    fn commit(store: &ObjectStore, parents: Vec<ObjectHash>, entries: Vec<&str>) -> ObjectHash {
        let tree_id = store.put(&Object::Tree(tree(entries))).unwrap();
        let commit = Commit::new(sig(), sig(), tree_id, parents, "msg");
        store.put(&Object::Commit(commit)).unwrap()
    }

    #[test]
    fn save_creates_a_commit_parented_on_head() {
        let (_dir, store) = store();
        let head = commit(&store, vec![], vec!["a"]);
        let stash_entry = save(&store, head, tree(vec!["a", "wip"]), sig(), "WIP on main").unwrap();
        let stash_commit = store.get(&stash_entry).unwrap().as_commit().cloned().unwrap();
        assert_eq!(stash_commit.parent_commit_ids, vec![head]);
    }

    #[test]
    fn apply_union_merges_stash_onto_head() {
        let (_dir, store) = store();
        let head = commit(&store, vec![], vec!["a", "b"]);
        let stash_entry = save(&store, head, tree(vec!["a", "b", "wip"]), sig(), "WIP").unwrap();

        let new_head = commit(&store, vec![head], vec!["a", "b", "c"]);
        let merged = apply(&store, new_head, stash_entry).unwrap();
        assert_eq!(merged.item_ids(), vec!["a", "b", "c", "wip"]);
    }
}
