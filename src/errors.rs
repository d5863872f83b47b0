//! Error types for the `spgit` engine.
//!
//! Each layer gets its own `thiserror` enum, composed into a top-level
//! [`RepoError`] at the façade boundary. This mirrors the grounding crate's
//! single `GitError` enum, split per layer since this engine has more
//! independently testable layers (store, refs, index, remote) than a plain
//! object-model library does.

use thiserror::Error;

use crate::hash::ObjectHash;

/// Errors from encoding/decoding the four object kinds.
#[derive(Error, Debug)]
pub enum ObjectError {
    #[error("the `{0}` is not a valid object type")]
    InvalidKind(String),

    #[error("not a valid blob object: {0}")]
    InvalidBlob(String),

    #[error("not a valid tree object: {0}")]
    InvalidTree(String),

    #[error("not a valid commit object: {0}")]
    InvalidCommit(String),

    #[error("not a valid tag object: {0}")]
    InvalidTag(String),

    #[error("invalid actor signature: {0}")]
    InvalidSignature(String),

    #[error("UTF-8 conversion error: {0}")]
    Conversion(#[from] std::string::FromUtf8Error),
}

/// Errors from the content-addressed object store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error("object `{0}` is corrupt: {1}")]
    CorruptObject(ObjectHash, String),

    #[error("object `{0}` not found")]
    NotFound(ObjectHash),

    #[error("unknown object kind byte `{0}`")]
    UnknownKind(String),
}

/// Errors from the ref store (branches, tags, remotes, `HEAD`).
#[derive(Error, Debug)]
pub enum RefError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ref `{0}` does not exist")]
    NotFound(String),

    #[error("ref `{0}` is not a valid 40-hex digest or symbolic ref: {1}")]
    Malformed(String, String),

    #[error("compare-and-swap failed updating `{name}`: expected {expected}, found {actual}")]
    RaceLost {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("cannot delete `HEAD`")]
    CannotDeleteHead,

    #[error("cannot delete the currently checked-out branch `{0}`")]
    CannotDeleteCheckedOut(String),

    #[error("branch `{0}` is not fully merged; use force to delete anyway")]
    NotMerged(String),

    #[error("ref `{0}` already exists")]
    AlreadyExists(String),
}

/// Errors from the staging index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed index file: {0}")]
    Malformed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors surfaced by the external item-catalog collaborator.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("remote list `{0}` not found")]
    ListNotFound(String),

    #[error("remote catalog unreachable: {0}")]
    Unreachable(String),

    #[error("remote catalog rejected the request: {0}")]
    Rejected(String),
}

/// Classification used to map a [`RepoError`] onto a process exit code,
/// without this crate knowing what a process exit code is (§1: CLI is an
/// external collaborator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    /// Bad arguments, unknown ref, nothing to commit, etc. (exit code 1).
    User,
    /// Corruption, I/O failure, ref race (exit code 2).
    Repository,
    /// The external catalog failed or was unreachable (exit code 3).
    Remote,
}

/// The façade-level error type every [`crate::repo::Repository`] method returns.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("not a spgit repository (no `.spgit` directory found)")]
    NotARepository,

    #[error("{0}")]
    User(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ref(#[from] RefError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("merge is not possible: {0}")]
    MergeImpossible(String),
}

impl RepoError {
    /// A user-facing error, for bad arguments / unknown refs / nothing-to-commit
    /// situations the façade detects directly (not bubbled up from a layer).
    pub fn user(msg: impl Into<String>) -> Self {
        RepoError::User(msg.into())
    }

    /// Classify this error for a collaborator that needs an exit code.
    pub fn exit_class(&self) -> ExitClass {
        match self {
            RepoError::NotARepository | RepoError::User(_) => ExitClass::User,
            RepoError::Ref(RefError::RaceLost { .. }) => ExitClass::Repository,
            RepoError::Ref(RefError::Io(_)) => ExitClass::Repository,
            RepoError::Ref(RefError::NotFound(_))
            | RepoError::Ref(RefError::AlreadyExists(_))
            | RepoError::Ref(RefError::CannotDeleteCheckedOut(_))
            | RepoError::Ref(RefError::CannotDeleteHead)
            | RepoError::Ref(RefError::NotMerged(_))
            | RepoError::Ref(RefError::Malformed(_, _)) => ExitClass::User,
            RepoError::Store(_) | RepoError::Object(_) | RepoError::Index(_) | RepoError::Io(_) => {
                ExitClass::Repository
            }
            RepoError::Remote(_) => ExitClass::Remote,
            RepoError::MergeImpossible(_) => ExitClass::Repository,
        }
    }
}
