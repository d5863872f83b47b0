//! Config as an explicit value, not ambient global state (§9 REDESIGN FLAGS).
//!
//! Two scopes, both JSON (§6): a global file under `~/.spgit/config`
//! (credentials, default actor identity) and a per-repo `.spgit/config`
//! (playlist id, remote tracking). Grounded on
//! `examples/wegel-zub/src/config.rs`'s load-or-default-then-save pattern,
//! adapted from TOML to JSON per §6's schema, with `serde`/`serde_json` kept
//! from the teacher's own stack.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::RepoError;

/// Credentials and default actor identity, shared across every repository on
/// this machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub actor_name: String,
    pub actor_email: String,
    /// Opaque bearer credentials per remote host, handed to the
    /// [`crate::remote::RemoteList`] implementation by the caller — this
    /// crate never inspects or transmits them itself.
    #[serde(default)]
    pub credentials: HashMap<String, String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        GlobalConfig {
            actor_name: "spgit".to_string(),
            actor_email: "spgit@localhost".to_string(),
            credentials: HashMap::new(),
        }
    }
}

impl GlobalConfig {
    pub fn path() -> Option<PathBuf> {
        dirs_home().map(|home| home.join(".spgit").join("config"))
    }

    /// Load from `~/.spgit/config`, or the default if it doesn't exist or the
    /// home directory can't be determined.
    pub fn load() -> Result<Self, RepoError> {
        match Self::path() {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(&path)?;
                serde_json::from_str(&contents).map_err(|e| RepoError::user(e.to_string()))
            }
            _ => Ok(GlobalConfig::default()),
        }
    }

    pub fn save(&self) -> Result<(), RepoError> {
        let Some(path) = Self::path() else {
            return Err(RepoError::user("cannot determine home directory"));
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self).map_err(|e| RepoError::user(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }
}

/// Per-repository configuration: which remote playlist this repo tracks, and
/// named remote aliases.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RepoConfig {
    /// The remote `RemoteList` id this repository was created from or is
    /// tracking, if any.
    pub playlist_id: Option<String>,
    /// Named remotes, e.g. `"origin" -> "https://catalog.example/lists/abc123"`.
    #[serde(default)]
    pub remotes: HashMap<String, String>,
    /// Which local branch tracks which `(remote, playlist_id)` pair.
    #[serde(default)]
    pub tracking: HashMap<String, (String, String)>,
}

impl RepoConfig {
    fn path(repo_root: &Path) -> PathBuf {
        repo_root.join("config")
    }

    /// Load from `<repo>/.spgit/config`, or an empty default if absent (a
    /// freshly `init`ed repository has none yet).
    pub fn load(repo_root: &Path) -> Result<Self, RepoError> {
        let path = Self::path(repo_root);
        if !path.exists() {
            return Ok(RepoConfig::default());
        }
        let contents = fs::read_to_string(&path)?;
        serde_json::from_str(&contents).map_err(|e| RepoError::user(e.to_string()))
    }

    pub fn save(&self, repo_root: &Path) -> Result<(), RepoError> {
        let contents = serde_json::to_string_pretty(self).map_err(|e| RepoError::user(e.to_string()))?;
        fs::write(Self::path(repo_root), contents)?;
        Ok(())
    }
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
