//! The `Blob` object: the raw serialized form of a single [`crate::item::Item`] (§3, §4.1).
//!
//! Canonical form is the item's stable-key-order UTF-8 JSON. Content-addressed
//! and immutable: two identical items hash to the same blob, giving natural
//! deduplication (§4.2's "put ... otherwise no-op").

use crate::errors::ObjectError;
use crate::item::Item;
use crate::object::{ObjectData, ObjectKind};

#[derive(Debug, Clone)]
pub struct Blob {
    pub item: Item,
}

impl Blob {
    pub fn new(item: Item) -> Self {
        Blob { item }
    }
}

impl ObjectData for Blob {
    const KIND: ObjectKind = ObjectKind::Blob;

    fn to_data(&self) -> Result<Vec<u8>, ObjectError> {
        self.item.canonical_json().map_err(|e| ObjectError::InvalidBlob(e.to_string()))
    }

    fn from_data(bytes: &[u8]) -> Result<Self, ObjectError> {
        let item = Item::from_canonical_json(bytes).map_err(|e| ObjectError::InvalidBlob(e.to_string()))?;
        Ok(Blob { item })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_canonical_bytes() {
        let blob = Blob::new(Item::new("uri:1", "Song", "Artist", "Album", 1000));
        let data = blob.to_data().unwrap();
        let parsed = Blob::from_data(&data).unwrap();
        assert_eq!(blob.item.id, parsed.item.id);
        assert_eq!(blob.item.display_name, parsed.item.display_name);
    }

    #[test]
    fn rejects_garbage_bytes() {
        assert!(Blob::from_data(b"not json").is_err());
    }
}
