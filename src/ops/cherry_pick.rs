//! `cherry-pick <commit>` (§4.8): replay one commit's delta onto `HEAD`.

use crate::errors::RepoError;
use crate::hash::ObjectHash;
use crate::object::signature::Signature;
use crate::object::{Commit, Object};
use crate::ops::{apply_delta, diff_trees};
use crate::store::ObjectStore;

/// Apply `target`'s delta versus its first parent onto `head`'s tree, and
/// create a commit whose message is the original, annotated with the
/// `(cherry picked from commit <digest>)` trailer (§4.8).
pub fn cherry_pick(
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
    let target_tree = store.get(&target_commit.tree_id)?.as_tree().cloned().unwrap();

    let parent_tree = match target_commit.first_parent() {
        Some(parent_id) => {
            let parent_commit = store.get(&parent_id)?.as_commit().cloned().unwrap();
            store.get(&parent_commit.tree_id)?.as_tree().cloned().unwrap()
        }
        None => crate::object::Tree::default(),
    };
    let delta = diff_trees(&parent_tree, &target_tree);

    let head_commit = store
        .get(&head)?
        .as_commit()
        .cloned()
        .ok_or_else(|| RepoError::user(format!("`{head}` is not a commit")))?;
    let head_tree = store.get(&head_commit.tree_id)?.as_tree().cloned().unwrap();

    let new_tree = apply_delta(&head_tree, &delta);
    let tree_id = store.put(&Object::Tree(new_tree))?;

    let message = format!("{}\n\n(cherry picked from commit {target})", target_commit.message);
    let commit = Commit::new(committer.clone(), committer, tree_id, vec![head], message);
    Ok(store.put(&Object::Commit(commit))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectKind, Tree};

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

    fn commit(store: &ObjectStore, parents: Vec<ObjectHash>, entries: Vec<&str>) -> ObjectHash {
        let tree = Tree::new(entries.into_iter().map(|id| (id.to_string(), blob(id), id.to_string())).collect());
        let tree_id = store.put(&Object::Tree(tree)).unwrap();
        let commit = Commit::new(sig(), sig(), tree_id, parents, "add item");
        store.put(&Object::Commit(commit)).unwrap()
    }

    #[test]
    fn cherry_pick_applies_the_added_item_onto_head() {
        let (_dir, store) = store();
        let base = commit(&store, vec![], vec!["a"]);
        let feature_commit = commit(&store, vec![base], vec!["a", "d"]);
        let main_head = commit(&store, vec![base], vec!["a", "e"]);

        let picked = cherry_pick(&store, main_head, feature_commit, sig()).unwrap();
        let picked_commit = store.get(&picked).unwrap().as_commit().cloned().unwrap();
        let picked_tree = store.get(&picked_commit.tree_id).unwrap().as_tree().cloned().unwrap();

        assert_eq!(picked_tree.item_ids(), vec!["a", "e", "d"]);
        assert_eq!(picked_commit.parent_commit_ids, vec![main_head]);
        assert!(picked_commit.message.contains("cherry picked from commit"));
    }

    #[test]
    fn cherry_picking_a_noop_delta_leaves_tree_unchanged() {
        let (_dir, store) = store();
        let base = commit(&store, vec![], vec!["a"]);
        let noop_commit = commit(&store, vec![base], vec!["a"]);

        let picked = cherry_pick(&store, base, noop_commit, sig()).unwrap();
        let picked_commit = store.get(&picked).unwrap().as_commit().cloned().unwrap();
        let picked_tree = store.get(&picked_commit.tree_id).unwrap().as_tree().cloned().unwrap();
        assert_eq!(picked_tree.item_ids(), vec!["a"]);
    }
}
