//! SHA-1 object digests.
//!
//! A digest is computed over `<kind> <byte-length>\0<bytes>`, matching the
//! standard git object model, so it is reproducible regardless of
//! compression settings (§4.1).

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::Digest;

use crate::object::ObjectKind;

/// A 40-hex SHA-1 object digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHash([u8; 20]);

impl std::fmt::Debug for ObjectHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectHash({self})")
    }
}

impl ObjectHash {
    /// The all-zero digest used as the reflog's "old" value for a ref's first entry.
    pub const ZERO: ObjectHash = ObjectHash([0u8; 20]);

    /// Hash raw bytes directly (no kind/length header). Used internally by
    /// [`ObjectHash::of`].
    fn of_bytes(data: &[u8]) -> ObjectHash {
        let digest = sha1::Sha1::digest(data);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(digest.as_ref());
        ObjectHash(bytes)
    }

    /// Hash an object's canonical bytes, prefixed with its `<kind> <len>\0` header.
    pub fn of(kind: ObjectKind, canonical: &[u8]) -> ObjectHash {
        let mut framed = Vec::with_capacity(canonical.len() + 16);
        framed.extend_from_slice(kind.as_str().as_bytes());
        framed.push(b' ');
        framed.extend_from_slice(canonical.len().to_string().as_bytes());
        framed.push(0);
        framed.extend_from_slice(canonical);
        ObjectHash::of_bytes(&framed)
    }

    /// Raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl AsRef<[u8]> for ObjectHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for ObjectHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ObjectHash {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 40 {
            return Err(format!("expected 40 hex characters, got {}", s.len()));
        }
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        let mut h = [0u8; 20];
        h.copy_from_slice(&bytes);
        Ok(ObjectHash(h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_framed_bytes_like_git() {
        // git hash-object --stdin with an empty blob: "blob 0\0"
        let hash = ObjectHash::of(ObjectKind::Blob, b"");
        assert_eq!(hash.to_string(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[test]
    fn round_trips_through_hex() {
        let hash = ObjectHash::of(ObjectKind::Tree, b"hello");
        let text = hash.to_string();
        let parsed: ObjectHash = text.parse().unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!("deadbeef".parse::<ObjectHash>().is_err());
    }

    #[test]
    fn same_kind_and_bytes_hash_identically() {
        let a = ObjectHash::of(ObjectKind::Blob, b"same content");
        let b = ObjectHash::of(ObjectKind::Blob, b"same content");
        assert_eq!(a, b);
    }

    #[test]
    fn different_kinds_hash_differently() {
        let a = ObjectHash::of(ObjectKind::Blob, b"x");
        let b = ObjectHash::of(ObjectKind::Tree, b"x");
        assert_ne!(a, b);
    }
}
