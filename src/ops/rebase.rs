//! `rebase <upstream>` (§4.8): replay `HEAD`'s unique commits onto `upstream`.
//!
//! Enumerates commits reachable from `HEAD` but not from `upstream`, oldest
//! first, resets onto `upstream`, then cherry-picks each in turn. The caller
//! (the façade) is responsible for moving the branch ref; this function
//! returns the new tip or an error, never partially mutates refs itself —
//! the reflog-based rollback §4.8 calls for is the façade's job once a ref
//! has actually moved, which this pure function never does.

use crate::errors::RepoError;
use crate::hash::ObjectHash;
use crate::object::signature::Signature;
use crate::ops::cherry_pick::cherry_pick;
use crate::store::ObjectStore;
use crate::walk::Ancestors;

/// Commits reachable from `head` but not from `upstream`, oldest first —
/// the set rebase needs to replay.
pub fn commits_to_replay(store: &ObjectStore, head: ObjectHash, upstream: ObjectHash) -> Result<Vec<ObjectHash>, RepoError> {
    let upstream_ancestors: std::collections::HashSet<ObjectHash> = Ancestors::new(store, upstream).collect::<Result<_, _>>()?;
    let mut unique = Vec::new();
    for candidate in Ancestors::new(store, head) {
        let candidate = candidate?;
        if !upstream_ancestors.contains(&candidate) {
            unique.push(candidate);
        }
    }
    // Ancestors walks newest-first (BFS from head); rebase replays oldest-first.
    unique.reverse();
    Ok(unique)
}

/// Replay `commits` (oldest first) onto `upstream` via repeated cherry-pick.
/// Returns the new tip. On any failure partway through, the already-created
/// intermediate commits are simply unreferenced garbage — no ref was ever
/// moved to them — so there is nothing to roll back at this layer.
pub fn rebase_onto(
    store: &ObjectStore,
    upstream: ObjectHash,
    commits: &[ObjectHash],
    committer: Signature,
) -> Result<ObjectHash, RepoError> {
    let mut tip = upstream;
    for &commit in commits {
        tip = cherry_pick(store, tip, commit, committer.clone())?;
    }
    Ok(tip)
}
