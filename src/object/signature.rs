//! Author/committer identity attached to a [`crate::object::commit::Commit`].
//!
//! Format: `<name> <email> <unix-ts> <tz>` (§4.1), e.g.
//! `Jane Doe <jane@example.com> 1700000000 +0000`. The grounding crate's
//! `Signature` parses this same shape out of a commit's `author`/`committer`
//! line; that file wasn't present in the retrieved pack, so this is rebuilt
//! directly from how `commit.rs` calls it (`Signature::from_data`/`to_data`,
//! one instance per role, the role prefix written by the commit codec).

use bstr::ByteSlice;

use crate::errors::ObjectError;

/// A named, timestamped actor: the author or committer of a commit, or the
/// tagger of an annotated tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub timestamp: i64,
    pub timezone: String,
}

impl Signature {
    pub fn new(name: impl Into<String>, email: impl Into<String>, timestamp: i64, timezone: impl Into<String>) -> Self {
        Signature {
            name: name.into(),
            email: email.into(),
            timestamp,
            timezone: timezone.into(),
        }
    }

    /// Build a signature stamped with the current time in the repository's
    /// configured timezone offset (e.g. from [`crate::config::RepoConfig`]),
    /// falling back to `+0000` when none is configured.
    pub fn now(name: impl Into<String>, email: impl Into<String>, timezone: Option<&str>) -> Self {
        Signature::new(name, email, chrono::Utc::now().timestamp(), timezone.unwrap_or("+0000"))
    }

    /// Serialize the fields that follow the role keyword: `<name> <email> <ts> <tz>`.
    pub fn to_data(&self) -> Vec<u8> {
        format!("{} <{}> {} {}", self.name, self.email, self.timestamp, self.timezone).into_bytes()
    }

    /// Parse a full commit/tag header line, e.g. `author Jane Doe <jane@x> 1700000000 +0000`.
    /// `role` is the expected leading keyword (`"author"`, `"committer"`, `"tagger"`).
    pub fn from_line(role: &str, line: &[u8]) -> Result<Self, ObjectError> {
        let prefix = format!("{role} ");
        let rest = line
            .strip_prefix(prefix.as_bytes())
            .ok_or_else(|| ObjectError::InvalidSignature(format!("expected `{role} `")))?;
        Self::from_fields(rest)
    }

    /// Parse just the `<name> <email> <ts> <tz>` fields, with no role keyword.
    pub fn from_fields(fields: &[u8]) -> Result<Self, ObjectError> {
        let open = fields
            .find_byte(b'<')
            .ok_or_else(|| ObjectError::InvalidSignature("missing `<email>`".into()))?;
        let close = fields
            .find_byte(b'>')
            .ok_or_else(|| ObjectError::InvalidSignature("unterminated `<email>`".into()))?;
        if close < open {
            return Err(ObjectError::InvalidSignature("malformed email bracket".into()));
        }

        let name = String::from_utf8(fields[..open].trim().to_vec())
            .map_err(|e| ObjectError::InvalidSignature(e.to_string()))?;
        let email = String::from_utf8(fields[open + 1..close].to_vec())
            .map_err(|e| ObjectError::InvalidSignature(e.to_string()))?;

        let tail = String::from_utf8(fields[close + 1..].trim().to_vec())
            .map_err(|e| ObjectError::InvalidSignature(e.to_string()))?;
        let mut parts = tail.split_whitespace();
        let ts = parts
            .next()
            .ok_or_else(|| ObjectError::InvalidSignature("missing timestamp".into()))?
            .parse::<i64>()
            .map_err(|e| ObjectError::InvalidSignature(e.to_string()))?;
        let tz = parts.next().unwrap_or("+0000").to_string();

        Ok(Signature {
            name,
            email,
            timestamp: ts,
            timezone: tz,
        })
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_line() {
        let sig = Signature::new("Jane Doe", "jane@example.com", 1_700_000_000, "+0000");
        let mut line = b"author ".to_vec();
        line.extend(sig.to_data());
        let parsed = Signature::from_line("author", &line).unwrap();
        assert_eq!(sig, parsed);
    }

    #[test]
    fn rejects_wrong_role() {
        let sig = Signature::new("Jane Doe", "jane@example.com", 1_700_000_000, "+0000");
        let mut line = b"author ".to_vec();
        line.extend(sig.to_data());
        assert!(Signature::from_line("committer", &line).is_err());
    }
}
