//! The `Tree` object: an ordered playlist snapshot (§3, §4.1).
//!
//! Ordering is significant and part of the content hash — the canonical form
//! is one line per entry, sorted by ascending position, so two trees with the
//! same items in different order hash differently. Position is encoded
//! explicitly rather than implied only by line order, so a corrupt or
//! hand-edited tree file is caught rather than silently reinterpreted.

use crate::errors::ObjectError;
use crate::hash::ObjectHash;
use crate::object::{ObjectData, ObjectKind};

/// One entry in a tree: the item it names, the digest of its blob, and its
/// position within the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub position: u32,
    pub item_id: String,
    pub blob: ObjectHash,
    pub display_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct Tree {
    /// Always sorted by ascending `position`, with `position` equal to the
    /// entry's index — enforced by [`Tree::new`].
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a tree from an ordered sequence of `(item_id, blob, display_name)`,
    /// assigning positions `0..n` in the order given.
    pub fn new(ordered: Vec<(String, ObjectHash, String)>) -> Self {
        let entries = ordered
            .into_iter()
            .enumerate()
            .map(|(i, (item_id, blob, display_name))| TreeEntry {
                position: i as u32,
                item_id,
                blob,
                display_name,
            })
            .collect();
        Tree { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The ordered sequence of item identifiers this tree names, as consumed
    /// by the merge engine (§4.7).
    pub fn item_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.item_id.as_str()).collect()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.entries.iter().any(|e| e.item_id == item_id)
    }
}

impl ObjectData for Tree {
    const KIND: ObjectKind = ObjectKind::Tree;

    fn to_data(&self) -> Result<Vec<u8>, ObjectError> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.extend_from_slice(
                format!(
                    "{}\t{}\t{}\t{}\n",
                    entry.position, entry.item_id, entry.blob, entry.display_name
                )
                .as_bytes(),
            );
        }
        Ok(out)
    }

    fn from_data(bytes: &[u8]) -> Result<Self, ObjectError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ObjectError::InvalidTree(e.to_string()))?;
        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let mut fields = line.splitn(4, '\t');
            let position: u32 = fields
                .next()
                .ok_or_else(|| ObjectError::InvalidTree(format!("missing position on line {idx}")))?
                .parse()
                .map_err(|_| ObjectError::InvalidTree(format!("non-numeric position on line {idx}")))?;
            let item_id = fields
                .next()
                .ok_or_else(|| ObjectError::InvalidTree(format!("missing item id on line {idx}")))?
                .to_string();
            let blob_hex = fields
                .next()
                .ok_or_else(|| ObjectError::InvalidTree(format!("missing blob digest on line {idx}")))?;
            let blob: ObjectHash = blob_hex
                .parse()
                .map_err(|e: String| ObjectError::InvalidTree(e))?;
            let display_name = fields
                .next()
                .ok_or_else(|| ObjectError::InvalidTree(format!("missing display name on line {idx}")))?
                .to_string();

            if position as usize != idx {
                return Err(ObjectError::InvalidTree(format!(
                    "out-of-order or missing position: expected {idx}, found {position}"
                )));
            }

            entries.push(TreeEntry {
                position,
                item_id,
                blob,
                display_name,
            });
        }
        Ok(Tree { entries })
    }
}
