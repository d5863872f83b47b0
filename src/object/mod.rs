//! Object model: the four content-addressed kinds the engine stores (§3, §4.1).
//!
//! Grounded on the teacher's `internal::object::ObjectTrait` /
//! `internal::object::types::ObjectType` pair, collapsed from a trait-object
//! hierarchy plus a large AI-process type lattice down to the tagged sum
//! `{Blob, Tree, Commit, Tag}` the REDESIGN FLAGS call for — "a systems
//! implementation should use a tagged sum ... no virtual hierarchy".

pub mod blob;
pub mod commit;
pub mod signature;
pub mod tag;
pub mod tree;

pub use blob::Blob;
pub use commit::Commit;
pub use tag::Tag;
pub use tree::Tree;

use crate::errors::{ObjectError, StoreError};
use crate::hash::ObjectHash;

/// The four object kinds the store knows how to frame and address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Commit => "commit",
            ObjectKind::Tree => "tree",
            ObjectKind::Blob => "blob",
            ObjectKind::Tag => "tag",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => Ok(ObjectKind::Commit),
            "tree" => Ok(ObjectKind::Tree),
            "blob" => Ok(ObjectKind::Blob),
            "tag" => Ok(ObjectKind::Tag),
            other => Err(StoreError::UnknownKind(other.to_string())),
        }
    }
}

/// The common interface every object kind implements: produce canonical
/// bytes, and parse them back. Mirrors the grounding crate's `ObjectTrait`.
pub trait ObjectData: Sized {
    const KIND: ObjectKind;

    /// Canonical serialized form (§4.1). This is what gets hashed and, once
    /// framed with the `<kind> <len>\0` header, compressed to disk.
    fn to_data(&self) -> Result<Vec<u8>, ObjectError>;

    fn from_data(bytes: &[u8]) -> Result<Self, ObjectError>;
}

/// A fully-typed object of any kind, as stored or loaded from the object store.
#[derive(Debug, Clone)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Blob(_) => ObjectKind::Blob,
            Object::Tree(_) => ObjectKind::Tree,
            Object::Commit(_) => ObjectKind::Commit,
            Object::Tag(_) => ObjectKind::Tag,
        }
    }

    pub fn to_data(&self) -> Result<Vec<u8>, ObjectError> {
        match self {
            Object::Blob(b) => b.to_data(),
            Object::Tree(t) => t.to_data(),
            Object::Commit(c) => c.to_data(),
            Object::Tag(t) => t.to_data(),
        }
    }

    /// The object's content digest: SHA-1 over `<kind> <len>\0<canonical bytes>`.
    pub fn hash(&self) -> Result<ObjectHash, ObjectError> {
        let data = self.to_data()?;
        Ok(ObjectHash::of(self.kind(), &data))
    }

    /// Frame canonical bytes with the `<kind> <len>\0` header used both for
    /// hashing and for what gets zlib-deflated to disk (§4.1, §4.2).
    pub fn frame(kind: ObjectKind, canonical: &[u8]) -> Vec<u8> {
        let mut framed = Vec::with_capacity(canonical.len() + 16);
        framed.extend_from_slice(kind.as_str().as_bytes());
        framed.push(b' ');
        framed.extend_from_slice(canonical.len().to_string().as_bytes());
        framed.push(0);
        framed.extend_from_slice(canonical);
        framed
    }

    /// Reverse of [`Object::frame`]: split the header off, and validate that
    /// the declared length matches the trailing payload.
    pub fn parse_frame(framed: &[u8]) -> Result<(ObjectKind, Vec<u8>), StoreError> {
        let header_end = framed
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| StoreError::UnknownKind("missing NUL header terminator".into()))?;
        let header = std::str::from_utf8(&framed[..header_end])
            .map_err(|e| StoreError::UnknownKind(e.to_string()))?;
        let (kind_str, len_str) = header
            .split_once(' ')
            .ok_or_else(|| StoreError::UnknownKind(format!("malformed header `{header}`")))?;
        let kind: ObjectKind = kind_str.parse()?;
        let declared_len: usize = len_str
            .parse()
            .map_err(|_| StoreError::UnknownKind(format!("non-numeric length in `{header}`")))?;
        let payload = &framed[header_end + 1..];
        if payload.len() != declared_len {
            return Err(StoreError::UnknownKind(format!(
                "declared length {declared_len} does not match payload length {}",
                payload.len()
            )));
        }
        Ok((kind, payload.to_vec()))
    }

    /// Decode a kind-tagged payload into a fully-typed [`Object`].
    pub fn decode(kind: ObjectKind, payload: &[u8]) -> Result<Object, ObjectError> {
        Ok(match kind {
            ObjectKind::Blob => Object::Blob(Blob::from_data(payload)?),
            ObjectKind::Tree => Object::Tree(Tree::from_data(payload)?),
            ObjectKind::Commit => Object::Commit(Commit::from_data(payload)?),
            ObjectKind::Tag => Object::Tag(Tag::from_data(payload)?),
        })
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            Object::Commit(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Object::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Object::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Object::Tag(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trips() {
        let framed = Object::frame(ObjectKind::Blob, b"hello");
        let (kind, payload) = Object::parse_frame(&framed).unwrap();
        assert_eq!(kind, ObjectKind::Blob);
        assert_eq!(payload, b"hello");
    }

    #[test]
    fn rejects_length_mismatch() {
        let mut framed = Object::frame(ObjectKind::Blob, b"hello");
        framed.push(b'x'); // corrupt: payload now longer than declared length
        assert!(Object::parse_frame(&framed).is_err());
    }

    #[test]
    fn rejects_unknown_kind() {
        let framed = b"widget 5\0hello".to_vec();
        assert!(Object::parse_frame(&framed).is_err());
    }
}
