//! Commit-graph traversal: ancestor enumeration and lowest-common-ancestor search (§4.6).
//!
//! All traversal goes through [`ObjectStore`], so this module has no notion
//! of refs — callers resolve a ref to a starting digest first. New module;
//! grounded on the teacher's object-store-as-single-source-of-truth pattern
//! (no separate graph cache) and the BFS shape spec'd directly in §4.6.

use std::collections::{HashSet, VecDeque};

use crate::errors::StoreError;
use crate::hash::ObjectHash;
use crate::store::ObjectStore;

/// Breadth-first iterator over `commit` and every commit reachable from it
/// via parent links (§4.6's `ancestors`).
pub struct Ancestors<'a> {
    store: &'a ObjectStore,
    queue: VecDeque<ObjectHash>,
    seen: HashSet<ObjectHash>,
}

impl<'a> Ancestors<'a> {
    pub fn new(store: &'a ObjectStore, commit: ObjectHash) -> Self {
        let mut seen = HashSet::new();
        seen.insert(commit);
        Ancestors {
            store,
            queue: VecDeque::from([commit]),
            seen,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = Result<ObjectHash, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.queue.pop_front()?;
        let object = match self.store.get(&hash) {
            Ok(object) => object,
            Err(e) => return Some(Err(e)),
        };
        if let Some(commit) = object.as_commit() {
            for parent in &commit.parent_commit_ids {
                if self.seen.insert(*parent) {
                    self.queue.push_back(*parent);
                }
            }
        }
        Some(Ok(hash))
    }
}

/// Every commit reachable from `commit`, collected into a set.
pub fn ancestor_set(store: &ObjectStore, commit: ObjectHash) -> Result<HashSet<ObjectHash>, StoreError> {
    Ancestors::new(store, commit).collect()
}

/// `a ∈ ancestors(b)`.
pub fn is_ancestor(store: &ObjectStore, a: ObjectHash, b: ObjectHash) -> Result<bool, StoreError> {
    for candidate in Ancestors::new(store, b) {
        if candidate? == a {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The first commit encountered in a breadth-first walk from `a` that is also
/// an ancestor of `b`, breaking ties by greatest commit timestamp then digest
/// string (§4.6). `None` if the histories are disjoint.
pub fn merge_base(store: &ObjectStore, a: ObjectHash, b: ObjectHash) -> Result<Option<ObjectHash>, StoreError> {
    let ancestors_of_b = ancestor_set(store, b)?;

    let mut best: Option<ObjectHash> = None;
    let mut best_timestamp = i64::MIN;

    for candidate in Ancestors::new(store, a) {
        let candidate = candidate?;
        if !ancestors_of_b.contains(&candidate) {
            continue;
        }
        let timestamp = store.get(&candidate)?.as_commit().map(|c| c.committer.timestamp).unwrap_or(i64::MIN);
        let better = match best {
            None => true,
            Some(current_best) => {
                (timestamp, candidate.to_string()) > (best_timestamp, current_best.to_string())
            }
        };
        if better {
            best = Some(candidate);
            best_timestamp = timestamp;
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::signature::Signature;
    use crate::object::{Commit, Object, Tree};

    fn store() -> (tempfile::TempDir, ObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::init(dir.path().join(".spgit")).unwrap();
        (dir, store)
    }

    fn commit_at(store: &ObjectStore, parents: Vec<ObjectHash>, timestamp: i64, seed: &str) -> ObjectHash {
        let tree = Tree::new(vec![]);
        let tree_id = store.put(&Object::Tree(tree)).unwrap();
        let sig = Signature::new("Jane", "jane@example.com", timestamp, "+0000");
        let commit = Commit::new(sig.clone(), sig, tree_id, parents, seed);
        store.put(&Object::Commit(commit)).unwrap()
    }

    #[test]
    fn ancestors_includes_self_and_all_parents() {
        let (_dir, store) = store();
        let root = commit_at(&store, vec![], 1, "root");
        let child = commit_at(&store, vec![root], 2, "child");
        let found = ancestor_set(&store, child).unwrap();
        assert!(found.contains(&root));
        assert!(found.contains(&child));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn is_ancestor_detects_linear_history() {
        let (_dir, store) = store();
        let root = commit_at(&store, vec![], 1, "root");
        let child = commit_at(&store, vec![root], 2, "child");
        assert!(is_ancestor(&store, root, child).unwrap());
        assert!(!is_ancestor(&store, child, root).unwrap());
    }

    #[test]
    fn merge_base_of_commit_with_itself_is_itself() {
        let (_dir, store) = store();
        let root = commit_at(&store, vec![], 1, "root");
        assert_eq!(merge_base(&store, root, root).unwrap(), Some(root));
    }

    #[test]
    fn merge_base_finds_common_ancestor_of_diverged_branches() {
        let (_dir, store) = store();
        let base = commit_at(&store, vec![], 1, "base");
        let main = commit_at(&store, vec![base], 2, "main");
        let feature = commit_at(&store, vec![base], 2, "feature");
        assert_eq!(merge_base(&store, main, feature).unwrap(), Some(base));
    }

    #[test]
    fn merge_base_of_disjoint_histories_is_none() {
        let (_dir, store) = store();
        let a = commit_at(&store, vec![], 1, "a");
        let b = commit_at(&store, vec![], 1, "b");
        assert_eq!(merge_base(&store, a, b).unwrap(), None);
    }

    #[test]
    fn is_ancestor_of_merge_base_holds_for_both_sides() {
        let (_dir, store) = store();
        let base = commit_at(&store, vec![], 1, "base");
        let main = commit_at(&store, vec![base], 2, "main");
        let feature = commit_at(&store, vec![base], 3, "feature");
        let mb = merge_base(&store, main, feature).unwrap().unwrap();
        assert!(is_ancestor(&store, mb, main).unwrap());
        assert!(is_ancestor(&store, mb, feature).unwrap());
    }
}
