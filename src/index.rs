//! The staging index: the ordered list of items that will form the next commit (§4.5).
//!
//! Persisted to a single file, one `<item_id>\t<blob-digest>` line per
//! position. Grounded on the teacher's hash-then-store object write pattern
//! (`internal/object/mod.rs`), applied here per staged item, and on
//! [`crate::store::ObjectStore`]'s temp-then-rename helper for the file write.

use std::fs;
use std::path::PathBuf;

use crate::errors::IndexError;
use crate::hash::ObjectHash;
use crate::item::Item;
use crate::object::{Blob, Object, ObjectData, Tree};
use crate::store::ObjectStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub item_id: String,
    pub blob: ObjectHash,
    pub display_name: String,
}

/// The result of [`Index::diff_against`]: items only on this side, items
/// only on the compared tree, and items present on both sides but at a
/// different position (`old_position`, `new_position`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDiff {
    pub added: Vec<(String, ObjectHash, String)>,
    pub removed: Vec<String>,
    pub reordered: Vec<(String, usize, usize)>,
}

#[derive(Debug, Clone, Default)]
pub struct Index {
    entries: Vec<IndexEntry>,
}

impl Index {
    fn path(root: &std::path::Path) -> PathBuf {
        root.join("index")
    }

    /// Load the index from `root` (the repository's `.spgit` directory), or
    /// an empty index if none has been written yet.
    pub fn load(root: &std::path::Path) -> Result<Self, IndexError> {
        let path = Self::path(root);
        if !path.exists() {
            return Ok(Index::default());
        }
        let contents = fs::read_to_string(&path)?;
        let mut entries = Vec::new();
        for (lineno, line) in contents.lines().enumerate() {
            let mut fields = line.splitn(3, '\t');
            let item_id = fields
                .next()
                .ok_or_else(|| IndexError::Malformed(format!("missing item id on line {lineno}")))?
                .to_string();
            let blob_hex = fields
                .next()
                .ok_or_else(|| IndexError::Malformed(format!("missing blob digest on line {lineno}")))?;
            let blob = blob_hex
                .parse::<ObjectHash>()
                .map_err(IndexError::Malformed)?;
            let display_name = fields
                .next()
                .ok_or_else(|| IndexError::Malformed(format!("missing display name on line {lineno}")))?
                .to_string();
            entries.push(IndexEntry { item_id, blob, display_name });
        }
        Ok(Index { entries })
    }

    pub fn save(&self, root: &std::path::Path) -> Result<(), IndexError> {
        let path = Self::path(root);
        let mut contents = String::new();
        for entry in &self.entries {
            contents.push_str(&format!("{}\t{}\t{}\n", entry.item_id, entry.blob, entry.display_name));
        }
        let mut tmp = tempfile::NamedTempFile::new_in(root)?;
        std::io::Write::write_all(&mut tmp, contents.as_bytes())?;
        tmp.persist(&path).map_err(|e| IndexError::Io(e.error))?;
        Ok(())
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn item_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.item_id.as_str()).collect()
    }

    /// Replace the index wholesale with `items`, storing each item's blob in
    /// `store` and recording its digest. This is `add` staging the entire
    /// incoming ordered list (§4.5's "stage" operation, §9's decision that
    /// `add` always replaces the whole staged list rather than merging it).
    pub fn stage_all(&mut self, store: &ObjectStore, items: &[Item]) -> Result<(), IndexError> {
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let blob = store.put(&Object::Blob(Blob::new(item.clone())))?;
            entries.push(IndexEntry {
                item_id: item.id.clone(),
                blob,
                display_name: item.display_name.clone(),
            });
        }
        self.entries = entries;
        Ok(())
    }

    /// `add <item-id>...`: apply only the named identifiers, leaving every
    /// other already-staged entry untouched (§4.5). An id present in
    /// `remote_items` is staged (or re-staged, keeping its existing position
    /// if it was already staged); an id absent from `remote_items` is
    /// removed if present.
    pub fn stage_selected(&mut self, store: &ObjectStore, remote_items: &[Item], item_ids: &[String]) -> Result<(), IndexError> {
        for id in item_ids {
            match remote_items.iter().find(|i| &i.id == id) {
                Some(item) => {
                    let blob = store.put(&Object::Blob(Blob::new(item.clone())))?;
                    let entry = IndexEntry {
                        item_id: item.id.clone(),
                        blob,
                        display_name: item.display_name.clone(),
                    };
                    match self.entries.iter_mut().find(|e| &e.item_id == id) {
                        Some(existing) => *existing = entry,
                        None => self.entries.push(entry),
                    }
                }
                None => self.entries.retain(|e| &e.item_id != id),
            }
        }
        Ok(())
    }

    /// Build a [`Tree`] snapshot from the current staged order, for `commit`
    /// to store (§4.6).
    pub fn to_tree(&self) -> Tree {
        Tree::new(
            self.entries
                .iter()
                .map(|e| (e.item_id.clone(), e.blob, e.display_name.clone()))
                .collect(),
        )
    }

    /// Load staged content from an existing tree, e.g. to seed the index from
    /// `HEAD` on `reset --mixed` (§4.8).
    pub fn load_from_tree(tree: &Tree) -> Self {
        Index {
            entries: tree
                .entries
                .iter()
                .map(|e| IndexEntry {
                    item_id: e.item_id.clone(),
                    blob: e.blob,
                    display_name: e.display_name.clone(),
                })
                .collect(),
        }
    }

    /// Whether the staged content differs from `head_tree` — the "modified
    /// since HEAD" flag `status` reports (§4.5).
    pub fn is_modified_since(&self, head_tree: &Tree) -> bool {
        let staged: Vec<_> = self.entries.iter().map(|e| (&e.item_id, e.blob)).collect();
        let head: Vec<_> = head_tree.entries.iter().map(|e| (&e.item_id, e.blob)).collect();
        staged != head
    }

    /// Diff the staged order against a stored tree digest (§4.5): items
    /// added, items removed, and items present on both sides but reordered,
    /// with their old and new positions.
    pub fn diff_against(&self, store: &ObjectStore, tree_digest: ObjectHash) -> Result<IndexDiff, IndexError> {
        let other = store
            .get(&tree_digest)?
            .as_tree()
            .cloned()
            .ok_or_else(|| IndexError::Malformed(format!("`{tree_digest}` is not a tree")))?;

        let mut added = Vec::new();
        let mut reordered = Vec::new();
        for (new_pos, entry) in self.entries.iter().enumerate() {
            match other.entries.iter().position(|e| e.item_id == entry.item_id) {
                Some(old_pos) => {
                    if old_pos != new_pos {
                        reordered.push((entry.item_id.clone(), old_pos, new_pos));
                    }
                }
                None => added.push((entry.item_id.clone(), entry.blob, entry.display_name.clone())),
            }
        }
        let removed = other
            .entries
            .iter()
            .filter(|e| !self.entries.iter().any(|s| s.item_id == e.item_id))
            .map(|e| e.item_id.clone())
            .collect();

        Ok(IndexDiff { added, removed, reordered })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    fn temp_store_root() -> (tempfile::TempDir, ObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::init(dir.path().join(".spgit")).unwrap();
        (dir, store)
    }

    #[test]
    fn stage_all_then_save_round_trips() {
        let (dir, store) = temp_store_root();
        let root = dir.path().join(".spgit");
        let mut index = Index::default();
        index
            .stage_all(&store, &[Item::new("uri:1", "Song A", "Artist", "Album", 1000)])
            .unwrap();
        index.save(&root).unwrap();

        let loaded = Index::load(&root).unwrap();
        assert_eq!(loaded.item_ids(), vec!["uri:1"]);
    }

    #[test]
    fn empty_index_loads_when_no_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let index = Index::load(dir.path()).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn to_tree_preserves_staged_order() {
        let (_dir, store) = temp_store_root();
        let mut index = Index::default();
        index
            .stage_all(
                &store,
                &[
                    Item::new("uri:1", "A", "X", "Y", 1),
                    Item::new("uri:2", "B", "X", "Y", 1),
                ],
            )
            .unwrap();
        let tree = index.to_tree();
        assert_eq!(tree.item_ids(), vec!["uri:1", "uri:2"]);
    }

    #[test]
    fn is_modified_since_detects_changes() {
        let empty_tree = Tree::default();
        let mut index = Index::default();
        let (_dir, store) = temp_store_root();
        index.stage_all(&store, &[Item::new("uri:1", "A", "X", "Y", 1)]).unwrap();
        assert!(index.is_modified_since(&empty_tree));

        let same_tree = index.to_tree();
        assert!(!index.is_modified_since(&same_tree));
    }

    #[test]
    fn rejects_malformed_index_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index"), "only-one-field\n").unwrap();
        assert!(Index::load(dir.path()).is_err());
    }

    #[test]
    fn load_from_tree_seeds_entries() {
        let tree = Tree::new(vec![("uri:1".into(), ObjectHash::of(ObjectKind::Blob, b"x"), "A".into())]);
        let index = Index::load_from_tree(&tree);
        assert_eq!(index.item_ids(), vec!["uri:1"]);
    }

    #[test]
    fn stage_selected_adds_present_and_removes_absent_without_touching_the_rest() {
        let (_dir, store) = temp_store_root();
        let mut index = Index::default();
        index
            .stage_all(&store, &[Item::new("uri:1", "A", "X", "Y", 1), Item::new("uri:2", "B", "X", "Y", 1)])
            .unwrap();

        let remote_items = vec![Item::new("uri:3", "C", "X", "Y", 1)];
        index.stage_selected(&store, &remote_items, &["uri:3".to_string(), "uri:1".to_string()]).unwrap();

        // uri:3 is present remotely, so it's added; uri:1 is absent from the
        // remote snapshot passed in, so it's removed; uri:2 was never named
        // and survives untouched.
        assert_eq!(index.item_ids(), vec!["uri:2", "uri:3"]);
    }

    #[test]
    fn stage_selected_on_an_empty_index_only_adds_present_items() {
        let (_dir, store) = temp_store_root();
        let mut index = Index::default();
        let remote_items = vec![Item::new("uri:1", "A", "X", "Y", 1)];
        index.stage_selected(&store, &remote_items, &["uri:1".to_string()]).unwrap();
        assert_eq!(index.item_ids(), vec!["uri:1"]);
    }

    #[test]
    fn diff_against_reports_added_removed_and_reordered() {
        let (_dir, store) = temp_store_root();
        let old_tree = Tree::new(vec![
            ("uri:1".into(), ObjectHash::of(ObjectKind::Blob, b"1"), "A".into()),
            ("uri:2".into(), ObjectHash::of(ObjectKind::Blob, b"2"), "B".into()),
            ("uri:3".into(), ObjectHash::of(ObjectKind::Blob, b"3"), "C".into()),
        ]);
        let old_digest = store.put(&Object::Tree(old_tree)).unwrap();

        // New order: drop uri:2, add uri:4, and swap uri:1/uri:3's positions.
        let mut index = Index::default();
        index
            .stage_all(
                &store,
                &[
                    Item::new("uri:3", "C", "X", "Y", 1),
                    Item::new("uri:1", "A", "X", "Y", 1),
                    Item::new("uri:4", "D", "X", "Y", 1),
                ],
            )
            .unwrap();

        let diff = index.diff_against(&store, old_digest).unwrap();
        assert_eq!(diff.removed, vec!["uri:2"]);
        assert_eq!(diff.added.iter().map(|(id, _, _)| id.as_str()).collect::<Vec<_>>(), vec!["uri:4"]);
        assert_eq!(diff.reordered, vec![("uri:3".to_string(), 2, 0), ("uri:1".to_string(), 0, 1)]);
    }
}
