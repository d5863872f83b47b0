//! The `Tag` object: a named, optionally annotated pointer at a commit (§3, §4.1).
//!
//! Mirrors `Commit`'s header/blank-line/body shape. A lightweight tag is just
//! a ref pointing directly at a commit and never becomes a `Tag` object; this
//! type only models *annotated* tags, which carry their own tagger, message,
//! and content hash distinct from the commit they point at.

use crate::errors::ObjectError;
use crate::hash::ObjectHash;
use crate::object::signature::Signature;
use crate::object::{ObjectData, ObjectKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub object: ObjectHash,
    pub target_kind: ObjectKind,
    pub name: String,
    pub tagger: Signature,
    pub message: String,
}

impl Tag {
    pub fn new(
        object: ObjectHash,
        target_kind: ObjectKind,
        name: impl Into<String>,
        tagger: Signature,
        message: impl Into<String>,
    ) -> Self {
        Tag {
            object,
            target_kind,
            name: name.into(),
            tagger,
            message: message.into(),
        }
    }
}

impl ObjectData for Tag {
    const KIND: ObjectKind = ObjectKind::Tag;

    fn to_data(&self) -> Result<Vec<u8>, ObjectError> {
        let mut data = Vec::new();
        data.extend(b"object ");
        data.extend(self.object.to_string().as_bytes());
        data.push(b'\n');
        data.extend(b"type ");
        data.extend(self.target_kind.as_str().as_bytes());
        data.push(b'\n');
        data.extend(b"tag ");
        data.extend(self.name.as_bytes());
        data.push(b'\n');
        data.extend(b"tagger ");
        data.extend(self.tagger.to_data());
        data.push(b'\n');
        data.push(b'\n');
        data.extend(self.message.as_bytes());
        Ok(data)
    }

    fn from_data(bytes: &[u8]) -> Result<Self, ObjectError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ObjectError::InvalidTag(e.to_string()))?;

        let mut object = None;
        let mut target_kind = None;
        let mut name = None;
        let mut tagger = None;
        let mut lines = text.split('\n');

        for line in &mut lines {
            if line.is_empty() {
                break;
            }
            if let Some(rest) = line.strip_prefix("object ") {
                object = Some(rest.parse::<ObjectHash>().map_err(ObjectError::InvalidTag)?);
            } else if let Some(rest) = line.strip_prefix("type ") {
                target_kind = Some(rest.parse::<ObjectKind>().map_err(|e| ObjectError::InvalidTag(e.to_string()))?);
            } else if let Some(rest) = line.strip_prefix("tag ") {
                name = Some(rest.to_string());
            } else if let Some(rest) = line.strip_prefix("tagger ") {
                tagger = Some(Signature::from_fields(rest.as_bytes())?);
            } else {
                return Err(ObjectError::InvalidTag(format!("unrecognized header line `{line}`")));
            }
        }

        let object = object.ok_or_else(|| ObjectError::InvalidTag("missing object".into()))?;
        let target_kind = target_kind.ok_or_else(|| ObjectError::InvalidTag("missing type".into()))?;
        let name = name.ok_or_else(|| ObjectError::InvalidTag("missing tag name".into()))?;
        let tagger = tagger.ok_or_else(|| ObjectError::InvalidTag("missing tagger".into()))?;
        let message = lines.collect::<Vec<_>>().join("\n");

        Ok(Tag {
            object,
            target_kind,
            name,
            tagger,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig() -> Signature {
        Signature::new("Jane Doe", "jane@example.com", 1_700_000_000, "+0000")
    }

    #[test]
    fn round_trips_through_canonical_bytes() {
        let target = ObjectHash::of(ObjectKind::Commit, b"some commit");
        let tag = Tag::new(target, ObjectKind::Commit, "v1.0", sig(), "Release 1.0\n");
        let parsed = Tag::from_data(&tag.to_data().unwrap()).unwrap();
        assert_eq!(tag, parsed);
    }

    #[test]
    fn rejects_missing_object() {
        assert!(Tag::from_data(b"type commit\ntag v1.0\ntagger Jane <jane@x> 1 +0000\n\nmsg").is_err());
    }
}
