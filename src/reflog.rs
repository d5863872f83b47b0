//! Per-ref reflog: an append-only audit trail of every value a ref has held (§4.4).
//!
//! One log file per ref under `.spgit/logs/<ref-name>`, one line per update:
//! `<old> <new> <actor-name> <actor-email> <unix-ts> <tz>\t<action>: <message>`.
//! New module — the format is spec'd directly in §4.4 (mirroring git's own
//! `logs/HEAD` convention) — written in the teacher's `thiserror`/error-enum
//! idiom used throughout the rest of this crate.

use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::PathBuf;

use crate::errors::RefError;
use crate::hash::ObjectHash;
use crate::object::signature::Signature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    pub old: ObjectHash,
    pub new: ObjectHash,
    pub actor: Signature,
    pub action: String,
    pub message: String,
}

impl ReflogEntry {
    fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {} {}\t{}: {}\n",
            self.old,
            self.new,
            self.actor.name,
            self.actor.email,
            self.actor.timestamp,
            self.actor.timezone,
            self.action,
            self.message
        )
    }

    fn parse(line: &str) -> Option<ReflogEntry> {
        let (header, rest) = line.split_once('\t')?;
        let (action, message) = rest.split_once(": ")?;
        let mut fields = header.split_whitespace();
        let old = fields.next()?.parse::<ObjectHash>().ok()?;
        let new = fields.next()?.parse::<ObjectHash>().ok()?;
        let name = fields.next()?.to_string();
        let email = fields.next()?.to_string();
        let timestamp = fields.next()?.parse::<i64>().ok()?;
        let timezone = fields.next()?.to_string();
        Some(ReflogEntry {
            old,
            new,
            actor: Signature::new(name, email, timestamp, timezone),
            action: action.to_string(),
            message: message.trim_end().to_string(),
        })
    }
}

pub struct Reflog {
    root: PathBuf,
}

impl Reflog {
    /// `root` is the repository's `.spgit` directory.
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Reflog { root: root.into() }
    }

    fn path_for(&self, ref_name: &str) -> PathBuf {
        self.root.join("logs").join(ref_name)
    }

    /// Append one entry to `ref_name`'s log, creating the log and any missing
    /// parent directories on first use.
    pub fn append(&self, ref_name: &str, entry: &ReflogEntry) -> Result<(), RefError> {
        let path = self.path_for(ref_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(entry.to_line().as_bytes())?;
        Ok(())
    }

    /// All entries for `ref_name`, oldest first. Empty if the ref has never
    /// been logged.
    pub fn entries(&self, ref_name: &str) -> Result<Vec<ReflogEntry>, RefError> {
        let path = self.path_for(ref_name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path)?;
        Ok(contents.lines().filter_map(ReflogEntry::parse).collect())
    }

    /// Entries newest first, the order `git reflog` displays and the order
    /// rebase rollback (§4.9) walks to find the pre-rebase state.
    pub fn entries_newest_first(&self, ref_name: &str) -> Result<Vec<ReflogEntry>, RefError> {
        let mut entries = self.entries(ref_name)?;
        entries.reverse();
        Ok(entries)
    }
}
