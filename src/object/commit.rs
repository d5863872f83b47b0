//! The `Commit` object: a named point in the playlist's history (§3, §4.1).
//!
//! Grounded on the teacher's `internal/object/commit.rs` (`Commit::new`,
//! `to_data`/`from_bytes`, `format_message`), generalized from a file-tree
//! commit to a playlist-tree commit: `tree_id` now points at a [`super::Tree`]
//! snapshot of ordered items rather than a directory tree. The zero/one/many
//! parent shape (root commit, ordinary commit, merge commit) is unchanged.

use crate::errors::ObjectError;
use crate::hash::ObjectHash;
use crate::object::signature::Signature;
use crate::object::{ObjectData, ObjectKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree_id: ObjectHash,
    pub parent_commit_ids: Vec<ObjectHash>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    pub fn new(
        author: Signature,
        committer: Signature,
        tree_id: ObjectHash,
        parent_commit_ids: Vec<ObjectHash>,
        message: impl Into<String>,
    ) -> Self {
        Commit {
            tree_id,
            parent_commit_ids,
            author,
            committer,
            message: message.into(),
        }
    }

    /// The first non-empty line of the message, used for one-line log output
    /// (§4.6's `log`) and stash entry labels.
    pub fn subject(&self) -> &str {
        self.message
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or(self.message.as_str())
    }

    pub fn is_merge(&self) -> bool {
        self.parent_commit_ids.len() > 1
    }

    pub fn is_root(&self) -> bool {
        self.parent_commit_ids.is_empty()
    }

    /// The first parent, which every history walk (§4.7) and `reset`/`revert`
    /// treat as the commit's "mainline" predecessor.
    pub fn first_parent(&self) -> Option<ObjectHash> {
        self.parent_commit_ids.first().copied()
    }
}

impl std::fmt::Display for Commit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "tree {}", self.tree_id)?;
        for parent in &self.parent_commit_ids {
            writeln!(f, "parent {parent}")?;
        }
        writeln!(f, "author {}", self.author)?;
        writeln!(f, "committer {}", self.committer)?;
        write!(f, "{}", self.message)
    }
}

impl ObjectData for Commit {
    const KIND: ObjectKind = ObjectKind::Commit;

    fn to_data(&self) -> Result<Vec<u8>, ObjectError> {
        let mut data = Vec::new();
        data.extend(b"tree ");
        data.extend(self.tree_id.to_string().as_bytes());
        data.push(b'\n');

        for parent in &self.parent_commit_ids {
            data.extend(b"parent ");
            data.extend(parent.to_string().as_bytes());
            data.push(b'\n');
        }

        data.extend(b"author ");
        data.extend(self.author.to_data());
        data.push(b'\n');
        data.extend(b"committer ");
        data.extend(self.committer.to_data());
        data.push(b'\n');
        data.push(b'\n');
        data.extend(self.message.as_bytes());
        Ok(data)
    }

    fn from_data(bytes: &[u8]) -> Result<Self, ObjectError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ObjectError::InvalidCommit(e.to_string()))?;

        let mut tree_id = None;
        let mut parent_commit_ids = Vec::new();
        let mut author = None;
        let mut committer = None;
        let mut lines = text.split('\n');

        for line in &mut lines {
            if line.is_empty() {
                // blank line ends the header block; the rest is the message
                break;
            }
            if let Some(rest) = line.strip_prefix("tree ") {
                tree_id = Some(
                    rest.parse::<ObjectHash>()
                        .map_err(ObjectError::InvalidCommit)?,
                );
            } else if let Some(rest) = line.strip_prefix("parent ") {
                parent_commit_ids.push(rest.parse::<ObjectHash>().map_err(ObjectError::InvalidCommit)?);
            } else if let Some(rest) = line.strip_prefix("author ") {
                author = Some(Signature::from_fields(rest.as_bytes())?);
            } else if let Some(rest) = line.strip_prefix("committer ") {
                committer = Some(Signature::from_fields(rest.as_bytes())?);
            } else {
                return Err(ObjectError::InvalidCommit(format!("unrecognized header line `{line}`")));
            }
        }

        let tree_id = tree_id.ok_or_else(|| ObjectError::InvalidCommit("missing tree".into()))?;
        let author = author.ok_or_else(|| ObjectError::InvalidCommit("missing author".into()))?;
        let committer = committer.ok_or_else(|| ObjectError::InvalidCommit("missing committer".into()))?;
        let message = lines.collect::<Vec<_>>().join("\n");

        Ok(Commit {
            tree_id,
            parent_commit_ids,
            author,
            committer,
            message,
        })
    }
}
