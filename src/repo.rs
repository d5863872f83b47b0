//! The repository façade: the one thing callers actually hold (§4.9).
//!
//! Every mutation that changes a ref follows the same order: persist objects,
//! then atomically update the ref, then append the reflog — so a crash never
//! leaves a ref pointing at an absent object (§4.9's invariant). Grounded on
//! the teacher's general shape of a top-level handle that owns the repo root
//! and composes the lower layers, with `tracing` calls at each operation
//! boundary in the same plain-macro style the teacher uses throughout
//! `protocol/` and `internal/object/`.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::RepoConfig;
use crate::errors::{RefError, RepoError};
use crate::hash::ObjectHash;
use crate::index::Index;
use crate::item::Item;
use crate::merge::{merge as merge_commits, MergeOutcome, MergeStrategy};
use crate::object::signature::Signature;
use crate::object::{Commit, Object, Tag};
use crate::ops;
use crate::ops::cherry_pick::cherry_pick as cherry_pick_commit;
use crate::ops::rebase::{commits_to_replay, rebase_onto};
use crate::ops::reset::{index_for_reset, ResetMode};
use crate::ops::revert::revert as revert_commit;
use crate::reflog::{Reflog, ReflogEntry};
use crate::refs::{RefStore, RefTarget, HEAD};
use crate::remote::RemoteList;
use crate::store::ObjectStore;
use crate::walk::{is_ancestor, Ancestors};

const STASH_REF: &str = "refs/stash";

/// A log entry for `log`/`show`: the commit plus its digest.
pub struct LogEntry {
    pub hash: ObjectHash,
    pub commit: Commit,
}

/// The result of `status`: what's staged and whether it differs from `HEAD`.
pub struct Status {
    pub branch: Option<String>,
    pub head: Option<ObjectHash>,
    pub staged_item_ids: Vec<String>,
    pub modified_since_head: bool,
}

pub struct Repository {
    root: PathBuf,
    spgit_dir: PathBuf,
    store: ObjectStore,
    refs: RefStore,
    reflog: Reflog,
}

impl Repository {
    fn spgit_dir_for(root: &Path) -> PathBuf {
        root.join(".spgit")
    }

    /// `init`: create a fresh, empty repository rooted at `root` (§8 scenario 1).
    pub fn init(root: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let root = root.into();
        let spgit_dir = Self::spgit_dir_for(&root);
        if spgit_dir.exists() {
            return Err(RepoError::user("a repository already exists here"));
        }
        let store = ObjectStore::init(&spgit_dir)?;
        let refs = RefStore::init(&spgit_dir, "main")?;
        let reflog = Reflog::new(&spgit_dir);
        RepoConfig::default().save(&spgit_dir)?;
        Index::default().save(&spgit_dir)?;
        info!(root = %root.display(), "initialized repository");
        Ok(Repository { root, spgit_dir, store, refs, reflog })
    }

    /// Open an existing repository, walking up from `start` to find `.spgit`.
    pub fn open(start: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let mut dir = start.into();
        loop {
            let candidate = Self::spgit_dir_for(&dir);
            if candidate.exists() {
                let store = ObjectStore::new(&candidate);
                let refs = RefStore::new(&candidate);
                let reflog = Reflog::new(&candidate);
                return Ok(Repository { root: dir, spgit_dir: candidate, store, refs, reflog });
            }
            if !dir.pop() {
                return Err(RepoError::NotARepository);
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn config(&self) -> Result<RepoConfig, RepoError> {
        RepoConfig::load(&self.spgit_dir)
    }

    fn index(&self) -> Result<Index, RepoError> {
        Ok(Index::load(&self.spgit_dir)?)
    }

    fn head_branch_ref(&self) -> Result<String, RepoError> {
        self.refs
            .current_branch()?
            .map(|b| format!("refs/heads/{b}"))
            .ok_or_else(|| RepoError::user("HEAD is detached; this operation requires a branch"))
    }

    fn head_commit(&self) -> Result<Option<ObjectHash>, RepoError> {
        match self.refs.resolve(HEAD) {
            Ok(hash) => Ok(Some(hash)),
            Err(RefError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn record_ref_update(&self, ref_name: &str, old: ObjectHash, new: ObjectHash, action: &str, message: &str) -> Result<(), RepoError> {
        let entry = ReflogEntry {
            old,
            new,
            actor: Signature::now("spgit", "spgit@localhost", None),
            action: action.to_string(),
            message: message.to_string(),
        };
        self.reflog.append(ref_name, &entry)?;
        self.reflog.append(HEAD, &entry)?;
        Ok(())
    }

    /// `add .` (reconcile with the remote snapshot) or `add <item-uris...>`
    /// (selective staging) per §9's resolved open question.
    pub fn add_all(&self, remote: &dyn RemoteList, list_id: &str) -> Result<(), RepoError> {
        let items = remote.fetch_items(list_id)?;
        self.stage(&items)
    }

    /// `add <item-id>...`: stage exactly the named identifiers, adding those
    /// present in the remote snapshot and removing those absent from it,
    /// leaving every other already-staged entry untouched (§4.5).
    pub fn add_items(&self, remote: &dyn RemoteList, list_id: &str, item_ids: &[String]) -> Result<(), RepoError> {
        let remote_items = remote.fetch_items(list_id)?;
        let mut index = self.index()?;
        index.stage_selected(&self.store, &remote_items, item_ids)?;
        index.save(&self.spgit_dir)?;
        info!(count = item_ids.len(), "staged selected items");
        Ok(())
    }

    fn stage(&self, items: &[Item]) -> Result<(), RepoError> {
        let mut index = self.index()?;
        index.stage_all(&self.store, items)?;
        index.save(&self.spgit_dir)?;
        info!(count = items.len(), "staged items");
        Ok(())
    }

    /// `diff`: compare the staged index against `HEAD`'s tree (§4.5, §4.9).
    pub fn diff(&self) -> Result<crate::index::IndexDiff, RepoError> {
        let index = self.index()?;
        let head_tree_id = match self.head_commit()? {
            Some(hash) => self.store.get(&hash)?.as_commit().unwrap().tree_id,
            None => return Ok(crate::index::IndexDiff {
                added: index
                    .entries()
                    .iter()
                    .map(|e| (e.item_id.clone(), e.blob, e.display_name.clone()))
                    .collect(),
                removed: Vec::new(),
                reordered: Vec::new(),
            }),
        };
        Ok(index.diff_against(&self.store, head_tree_id)?)
    }

    /// `commit`: snapshot the index as a new commit on the current branch (§8 scenario 2).
    pub fn commit(&self, message: &str, author: Signature) -> Result<ObjectHash, RepoError> {
        let index = self.index()?;
        if index.is_empty() {
            return Err(RepoError::user("nothing to commit: the index is empty"));
        }

        let parent = self.head_commit()?;
        let tree = index.to_tree();
        let tree_id = self.store.put(&Object::Tree(tree))?;
        let commit = Commit::new(author.clone(), author, tree_id, parent.into_iter().collect(), message);
        let commit_id = self.store.put(&Object::Commit(commit))?;

        let branch_ref = self.head_branch_ref()?;
        let expected = self.refs.read_raw(&branch_ref).ok();
        self.refs.update(&branch_ref, expected.as_ref(), RefTarget::Direct(commit_id))?;
        self.record_ref_update(&branch_ref, parent.unwrap_or(ObjectHash::ZERO), commit_id, "commit", message)?;
        info!(commit = %commit_id, "committed");
        Ok(commit_id)
    }

    pub fn status(&self) -> Result<Status, RepoError> {
        let index = self.index()?;
        let head = self.head_commit()?;
        let head_tree = match head {
            Some(hash) => self.store.get(&self.store.get(&hash)?.as_commit().unwrap().tree_id)?.as_tree().cloned(),
            None => None,
        };
        let modified_since_head = match &head_tree {
            Some(tree) => index.is_modified_since(tree),
            None => !index.is_empty(),
        };
        Ok(Status {
            branch: self.refs.current_branch()?,
            head,
            staged_item_ids: index.item_ids().into_iter().map(str::to_string).collect(),
            modified_since_head,
        })
    }

    /// `log`: `HEAD`'s ancestry, newest first.
    pub fn log(&self) -> Result<Vec<LogEntry>, RepoError> {
        let Some(head) = self.head_commit()? else { return Ok(Vec::new()) };
        let mut entries = Vec::new();
        for hash in Ancestors::new(&self.store, head) {
            let hash = hash?;
            let commit = self.store.get(&hash)?.as_commit().cloned().unwrap();
            entries.push(LogEntry { hash, commit });
        }
        Ok(entries)
    }

    pub fn show(&self, hash: ObjectHash) -> Result<Commit, RepoError> {
        Ok(self
            .store
            .get(&hash)?
            .as_commit()
            .cloned()
            .ok_or_else(|| RepoError::user(format!("`{hash}` is not a commit")))?)
    }

    /// `branch <name>`: create a new branch at `HEAD`.
    pub fn branch(&self, name: &str) -> Result<(), RepoError> {
        let ref_name = format!("refs/heads/{name}");
        if self.refs.exists(&ref_name) {
            return Err(RefError::AlreadyExists(ref_name).into());
        }
        let head = self.head_commit()?.ok_or_else(|| RepoError::user("HEAD has no commit yet"))?;
        self.refs.set(&ref_name, RefTarget::Direct(head))?;
        Ok(())
    }

    pub fn branches(&self) -> Result<Vec<String>, RepoError> {
        Ok(self
            .refs
            .list("refs/heads")?
            .into_iter()
            .filter_map(|r| r.strip_prefix("refs/heads/").map(str::to_string))
            .collect())
    }

    pub fn delete_branch(&self, name: &str, force: bool) -> Result<(), RepoError> {
        let ref_name = format!("refs/heads/{name}");
        if self.refs.current_branch()?.as_deref() == Some(name) {
            return Err(RefError::CannotDeleteCheckedOut(name.to_string()).into());
        }
        if !force {
            let head = self.head_commit()?;
            let target = self.refs.resolve(&ref_name)?;
            if let Some(head) = head {
                if !is_ancestor(&self.store, target, head)? {
                    return Err(RefError::NotMerged(name.to_string()).into());
                }
            }
        }
        self.refs.delete(&ref_name)?;
        Ok(())
    }

    /// `checkout <branch>`: move `HEAD` to point at `branch` and reset the
    /// index to its tree. Refuses if doing so would discard staged changes
    /// (§7's "uncommitted changes blocking checkout").
    pub fn checkout(&self, branch: &str) -> Result<(), RepoError> {
        let ref_name = format!("refs/heads/{branch}");
        let target = self.refs.resolve(&ref_name)?;
        let previous_branch = self.refs.current_branch()?;
        let previous_head = self.head_commit()?;

        if let Some(head) = previous_head {
            let head_tree = self.store.get(&self.store.get(&head)?.as_commit().unwrap().tree_id)?.as_tree().cloned().unwrap();
            if self.index()?.is_modified_since(&head_tree) {
                return Err(RepoError::user("cannot checkout: you have staged changes, commit or stash them first"));
            }
        }

        self.refs.set(HEAD, RefTarget::Symbolic(ref_name.clone()))?;
        let message = match &previous_branch {
            Some(from) => format!("checkout: moving from {from} to {branch}"),
            None => format!("checkout: moving to {branch}"),
        };
        self.record_ref_update(&ref_name, previous_head.unwrap_or(ObjectHash::ZERO), target, "checkout", &message)?;

        if let Some(index) = index_for_reset(&self.store, target, ResetMode::Mixed)? {
            index.save(&self.spgit_dir)?;
        }
        Ok(())
    }

    /// `merge <branch>` (§4.7, §8 scenarios 3-5).
    pub fn merge(&self, branch: &str, strategy: MergeStrategy) -> Result<MergeOutcome, RepoError> {
        let branch_ref = self.head_branch_ref()?;
        let current = self.refs.resolve(&branch_ref)?;
        let incoming = self.refs.resolve(&format!("refs/heads/{branch}"))?;

        let committer = Signature::now("spgit", "spgit@localhost", None);
        let outcome = merge_commits(&self.store, current, incoming, branch, strategy, committer)?;

        let (new_head, action, message) = match outcome {
            MergeOutcome::UpToDate => return Ok(outcome),
            MergeOutcome::FastForward { new_head } => (new_head, "merge", format!("merge {branch}: fast-forward")),
            MergeOutcome::Merged { new_head } => (new_head, "merge", format!("Merge branch '{branch}'")),
        };

        let expected = self.refs.read_raw(&branch_ref).ok();
        self.refs.update(&branch_ref, expected.as_ref(), RefTarget::Direct(new_head))?;
        self.record_ref_update(&branch_ref, current, new_head, action, &message)?;

        if let Some(index) = index_for_reset(&self.store, new_head, ResetMode::Mixed)? {
            index.save(&self.spgit_dir)?;
        }
        Ok(outcome)
    }

    /// `reset --soft|--mixed|--hard <target>` (§4.8).
    pub fn reset(&self, target: ObjectHash, mode: ResetMode) -> Result<(), RepoError> {
        let branch_ref = self.head_branch_ref()?;
        let current = self.refs.resolve(&branch_ref)?;
        let expected = self.refs.read_raw(&branch_ref).ok();
        self.refs.update(&branch_ref, expected.as_ref(), RefTarget::Direct(target))?;
        self.record_ref_update(&branch_ref, current, target, "reset", &format!("reset: moving to {target}"))?;

        if let Some(index) = index_for_reset(&self.store, target, mode)? {
            index.save(&self.spgit_dir)?;
        }
        Ok(())
    }

    /// `revert <commit>` (§4.8, §8 scenario 6).
    pub fn revert(&self, target: ObjectHash) -> Result<ObjectHash, RepoError> {
        let branch_ref = self.head_branch_ref()?;
        let head = self.refs.resolve(&branch_ref)?;
        let committer = Signature::now("spgit", "spgit@localhost", None);
        let new_head = revert_commit(&self.store, head, target, committer)?;

        let expected = self.refs.read_raw(&branch_ref).ok();
        self.refs.update(&branch_ref, expected.as_ref(), RefTarget::Direct(new_head))?;
        self.record_ref_update(&branch_ref, head, new_head, "revert", &format!("revert: {target}"))?;
        Ok(new_head)
    }

    /// `cherry-pick <commit>` (§4.8).
    pub fn cherry_pick(&self, target: ObjectHash) -> Result<ObjectHash, RepoError> {
        let branch_ref = self.head_branch_ref()?;
        let head = self.refs.resolve(&branch_ref)?;
        let committer = Signature::now("spgit", "spgit@localhost", None);
        let new_head = cherry_pick_commit(&self.store, head, target, committer)?;

        let expected = self.refs.read_raw(&branch_ref).ok();
        self.refs.update(&branch_ref, expected.as_ref(), RefTarget::Direct(new_head))?;
        self.record_ref_update(&branch_ref, head, new_head, "cherry-pick", &format!("cherry-pick: {target}"))?;
        Ok(new_head)
    }

    /// `rebase <upstream>` (§4.8): on failure, rolls `HEAD` back to its
    /// pre-rebase value using the reflog (§9's resolved open question).
    pub fn rebase(&self, upstream_branch: &str) -> Result<ObjectHash, RepoError> {
        let branch_ref = self.head_branch_ref()?;
        let starting_head = self.refs.resolve(&branch_ref)?;
        let upstream = self.refs.resolve(&format!("refs/heads/{upstream_branch}"))?;

        let to_replay = commits_to_replay(&self.store, starting_head, upstream)?;
        let committer = Signature::now("spgit", "spgit@localhost", None);

        match rebase_onto(&self.store, upstream, &to_replay, committer) {
            Ok(new_head) => {
                let expected = self.refs.read_raw(&branch_ref).ok();
                self.refs.update(&branch_ref, expected.as_ref(), RefTarget::Direct(new_head))?;
                self.record_ref_update(&branch_ref, starting_head, new_head, "rebase", &format!("rebase finished onto {upstream}"))?;
                if let Some(index) = index_for_reset(&self.store, new_head, ResetMode::Mixed)? {
                    index.save(&self.spgit_dir)?;
                }
                Ok(new_head)
            }
            Err(e) => {
                // `branch_ref` is only ever updated after `rebase_onto` returns Ok, so HEAD
                // is still at `starting_head` here; there is nothing to roll back.
                warn!(error = %e, head = %starting_head, "rebase failed before any ref moved");
                Err(e)
            }
        }
    }

    /// `stash save [message]` (§4.8).
    pub fn stash_save(&self, message: Option<&str>) -> Result<ObjectHash, RepoError> {
        let head = self.head_commit()?.ok_or_else(|| RepoError::user("HEAD has no commit yet"))?;
        let index = self.index()?;
        if index.is_empty() {
            return Err(RepoError::user("nothing to stash"));
        }
        let committer = Signature::now("spgit", "spgit@localhost", None);
        let label = message.map(str::to_string).unwrap_or_else(|| format!("WIP on {}", self.refs.current_branch().ok().flatten().unwrap_or_default()));
        let stash_entry = ops::stash::save(&self.store, head, index.to_tree(), committer, &label)?;

        let top = self.refs.read_raw(STASH_REF).ok();
        self.refs.set(STASH_REF, RefTarget::Direct(stash_entry))?;
        self.reflog.append(
            STASH_REF,
            &ReflogEntry {
                old: match &top {
                    Some(RefTarget::Direct(h)) => *h,
                    _ => ObjectHash::ZERO,
                },
                new: stash_entry,
                actor: Signature::now("spgit", "spgit@localhost", None),
                action: "stash".to_string(),
                message: label,
            },
        )?;

        if let Some(index) = index_for_reset(&self.store, head, ResetMode::Mixed)? {
            index.save(&self.spgit_dir)?;
        }
        Ok(stash_entry)
    }

    fn stash_list(&self) -> Result<Vec<ObjectHash>, RepoError> {
        if !self.refs.exists(STASH_REF) {
            return Ok(Vec::new());
        }
        Ok(self
            .reflog
            .entries_newest_first(STASH_REF)?
            .into_iter()
            .map(|e| e.new)
            .collect())
    }

    pub fn stash_apply(&self, index_from_top: usize) -> Result<(), RepoError> {
        let stack = self.stash_list()?;
        let entry = *stack.get(index_from_top).ok_or_else(|| RepoError::user("no such stash entry"))?;
        let head = self.head_commit()?.ok_or_else(|| RepoError::user("HEAD has no commit yet"))?;
        let merged = ops::stash::apply(&self.store, head, entry)?;
        let index = Index::load_from_tree(&merged);
        index.save(&self.spgit_dir)?;
        Ok(())
    }

    pub fn stash_pop(&self) -> Result<(), RepoError> {
        self.stash_apply(0)?;
        let stack = self.stash_list()?;
        match stack.get(1) {
            Some(&next) => self.refs.set(STASH_REF, RefTarget::Direct(next))?,
            None => {
                let _ = self.refs.delete(STASH_REF);
            }
        }
        Ok(())
    }

    pub fn stash_drop(&self, index_from_top: usize) -> Result<(), RepoError> {
        let mut stack = self.stash_list()?;
        if index_from_top >= stack.len() {
            return Err(RepoError::user("no such stash entry"));
        }
        stack.remove(index_from_top);
        match stack.first() {
            Some(&top) => self.refs.set(STASH_REF, RefTarget::Direct(top))?,
            None => {
                let _ = self.refs.delete(STASH_REF);
            }
        }
        Ok(())
    }

    /// `tag <name> [commit]`: a lightweight tag (a plain ref at a commit).
    pub fn tag_lightweight(&self, name: &str, target: Option<ObjectHash>) -> Result<(), RepoError> {
        let target = match target {
            Some(t) => t,
            None => self.head_commit()?.ok_or_else(|| RepoError::user("HEAD has no commit yet"))?,
        };
        let ref_name = format!("refs/tags/{name}");
        if self.refs.exists(&ref_name) {
            return Err(RefError::AlreadyExists(ref_name).into());
        }
        self.refs.set(&ref_name, RefTarget::Direct(target))?;
        Ok(())
    }

    /// `tag -a <name> -m <message> [commit]`: an annotated [`Tag`] object.
    pub fn tag_annotated(&self, name: &str, message: &str, tagger: Signature, target: Option<ObjectHash>) -> Result<ObjectHash, RepoError> {
        let target = match target {
            Some(t) => t,
            None => self.head_commit()?.ok_or_else(|| RepoError::user("HEAD has no commit yet"))?,
        };
        let ref_name = format!("refs/tags/{name}");
        if self.refs.exists(&ref_name) {
            return Err(RefError::AlreadyExists(ref_name).into());
        }
        let tag = Tag::new(target, crate::object::ObjectKind::Commit, name, tagger, message);
        let tag_hash = self.store.put(&Object::Tag(tag))?;
        self.refs.set(&ref_name, RefTarget::Direct(tag_hash))?;
        Ok(tag_hash)
    }

    /// `reflog [ref]`: defaults to `HEAD`.
    pub fn reflog(&self, ref_name: Option<&str>) -> Result<Vec<ReflogEntry>, RepoError> {
        Ok(self.reflog.entries_newest_first(ref_name.unwrap_or(HEAD))?)
    }

    /// `blame <item-id>` (§4.9): the earliest ancestor of `HEAD` whose tree
    /// contains the item while its parent's tree does not.
    pub fn blame(&self, item_id: &str) -> Result<Option<LogEntry>, RepoError> {
        let Some(head) = self.head_commit()? else { return Ok(None) };
        let mut ancestors = Vec::new();
        for hash in Ancestors::new(&self.store, head) {
            ancestors.push(hash?);
        }
        // Newest first from the walk; check oldest-contiguous introduction by
        // scanning from the end (oldest) forward isn't correct either, since
        // §4.9 asks for the earliest commit that *introduces* the item, found
        // by walking in reverse chronological order and keeping the last hit.
        let mut earliest_introducing: Option<ObjectHash> = None;
        for &hash in &ancestors {
            let commit = self.store.get(&hash)?.as_commit().cloned().unwrap();
            let tree = self.store.get(&commit.tree_id)?.as_tree().cloned().unwrap();
            if !tree.contains(item_id) {
                continue;
            }
            let parent_has_it = match commit.first_parent() {
                Some(parent) => {
                    let parent_tree = self.store.get(&self.store.get(&parent)?.as_commit().unwrap().tree_id)?.as_tree().cloned().unwrap();
                    parent_tree.contains(item_id)
                }
                None => false,
            };
            if !parent_has_it {
                earliest_introducing = Some(hash);
            }
        }
        match earliest_introducing {
            Some(hash) => {
                let commit = self.store.get(&hash)?.as_commit().cloned().unwrap();
                Ok(Some(LogEntry { hash, commit }))
            }
            None => Ok(None),
        }
    }

    /// `pull`: fetch the tracked remote's current items and fast-forward-or-merge
    /// them in as a commit, the mirror image of `push`.
    pub fn pull(&self, remote: &dyn RemoteList, list_id: &str, author: Signature) -> Result<ObjectHash, RepoError> {
        let items = remote.fetch_items(list_id)?;
        self.stage(&items)?;
        self.commit(&format!("pull from {list_id}"), author)
    }

    /// `push`: publish `HEAD`'s tree to the remote, overwriting its order (§6).
    pub fn push(&self, remote: &dyn RemoteList, list_id: &str) -> Result<(), RepoError> {
        let head = self.head_commit()?.ok_or_else(|| RepoError::user("HEAD has no commit yet"))?;
        let tree = self.store.get(&self.store.get(&head)?.as_commit().unwrap().tree_id)?.as_tree().cloned().unwrap();
        let ids: Vec<String> = tree.item_ids().into_iter().map(str::to_string).collect();
        remote.replace_items(list_id, &ids)?;
        Ok(())
    }

    /// `fetch`: read the remote's current items without touching local refs.
    pub fn fetch(&self, remote: &dyn RemoteList, list_id: &str) -> Result<Vec<Item>, RepoError> {
        Ok(remote.fetch_items(list_id)?)
    }

    /// `remote add <name> <url>`: register a named remote in the per-repo config.
    pub fn remote_add(&self, name: &str, url: &str) -> Result<(), RepoError> {
        let mut config = self.config()?;
        config.remotes.insert(name.to_string(), url.to_string());
        config.save(&self.spgit_dir)
    }

    pub fn remotes(&self) -> Result<std::collections::HashMap<String, String>, RepoError> {
        Ok(self.config()?.remotes)
    }
}
