//! `reset --soft|--mixed|--hard` (§4.8).
//!
//! All three modes move the current branch ref to `target`; they differ only
//! in whether (and how loudly) the index follows. The "external catalog"
//! working tree is never touched here — `push`/`pull` are the only
//! operations that talk to [`crate::remote::RemoteList`] (§4.8's hard-reset
//! note: "on subsequent push the remote will be overwritten").

use crate::errors::RepoError;
use crate::hash::ObjectHash;
use crate::index::Index;
use crate::store::ObjectStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Move the ref only; index and working tree untouched.
    Soft,
    /// Move the ref and reset the index to the target's tree (the default).
    Mixed,
    /// Same as mixed; the distinction only matters once a working tree exists
    /// to discard local edits from, which this engine's "working tree" (the
    /// external catalog) never holds uncommitted edits in.
    Hard,
}

/// Compute the index reset requires, if any, for `target`'s tree under `mode`.
/// Returns `None` for [`ResetMode::Soft`] (index stays as-is).
pub fn index_for_reset(store: &ObjectStore, target: ObjectHash, mode: ResetMode) -> Result<Option<Index>, RepoError> {
    match mode {
        ResetMode::Soft => Ok(None),
        ResetMode::Mixed | ResetMode::Hard => {
            let commit = store
                .get(&target)?
                .as_commit()
                .cloned()
                .ok_or_else(|| RepoError::user(format!("`{target}` is not a commit")))?;
            let tree = store
                .get(&commit.tree_id)?
                .as_tree()
                .cloned()
                .expect("a commit's tree_id always points at a tree object");
            Ok(Some(Index::load_from_tree(&tree)))
        }
    }
}
