//! The domain value the engine versions (§3: "Item").
//!
//! An `Item` is an opaque identifier plus display metadata. Equality and
//! hashing are by identifier alone, since metadata is carried only for
//! human-readable diffs and must not affect set membership (union/
//! intersection) or content addressing beyond what the canonical blob form
//! records.

use serde::{Deserialize, Serialize};

/// A single entry in a playlist: an opaque catalog identifier plus the
/// display metadata needed to render a human-readable diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// The catalog's URI for this item. The only field equality considers.
    pub id: String,
    pub display_name: String,
    pub creator: String,
    pub container_name: String,
    pub duration_ms: u64,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        creator: impl Into<String>,
        container_name: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Item {
            id: id.into(),
            display_name: display_name.into(),
            creator: creator.into(),
            container_name: container_name.into(),
            duration_ms,
        }
    }

    /// A minimal item carrying only an identifier, for tests and for items
    /// whose metadata hasn't been resolved yet.
    pub fn bare(id: impl Into<String>) -> Self {
        let id = id.into();
        Item {
            display_name: id.clone(),
            id,
            creator: String::new(),
            container_name: String::new(),
            duration_ms: 0,
        }
    }

    /// Canonical UTF-8 JSON form used as a blob's content (§4.1). `serde_json`
    /// preserves struct field declaration order, giving the "stable key
    /// order" the spec requires.
    pub fn canonical_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_canonical_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Item {}

impl std::hash::Hash for Item {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_identifier_only() {
        let a = Item::new("uri:1", "Song A", "Artist", "Album", 1000);
        let b = Item::new("uri:1", "Different Name", "Other", "Other Album", 9999);
        assert_eq!(a, b);
    }

    #[test]
    fn canonical_json_round_trips() {
        let item = Item::new("uri:1", "Song A", "Artist", "Album", 210_000);
        let bytes = item.canonical_json().unwrap();
        let parsed = Item::from_canonical_json(&bytes).unwrap();
        assert_eq!(item.id, parsed.id);
        assert_eq!(item.display_name, parsed.display_name);
    }

    #[test]
    fn canonical_json_is_deterministic() {
        let item = Item::new("uri:1", "Song A", "Artist", "Album", 210_000);
        assert_eq!(item.canonical_json().unwrap(), item.canonical_json().unwrap());
    }
}
