//! Local mirror cache of dependency repositories
//!
//! Each observed dependency gets one bare mirror under the cache root,
//! named `<name>.git`. An existing mirror is fetched, never re-cloned; a
//! missing one is cloned into a staging directory and renamed so a failed
//! or interrupted clone leaves no partially written mirror behind.
//! Acquisitions for the same name are serialized by a per-name lock;
//! distinct names may clone or fetch concurrently.

use crate::error::CacheError;
use git2::build::RepoBuilder;
use git2::Repository;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Cache of bare dependency repository mirrors, keyed by dependency name
pub struct RepositoryCache {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RepositoryCache {
    /// Create a cache rooted at an explicit directory.
    ///
    /// The root is threaded in rather than read from a process-wide
    /// constant so tests can point it at an ephemeral directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalize a configured dependency URL for cloning: prepend
    /// `https://` when there is no scheme and no `git@` prefix, append
    /// `.git` when absent.
    pub fn normalize_url(url: &str) -> String {
        let mut url = url.to_string();
        if !url.contains("://") && !url.starts_with("git@") {
            url = format!("https://{url}");
        }
        if !url.ends_with(".git") {
            url.push_str(".git");
        }
        url
    }

    /// Open the mirror for `name`, cloning it from `url` on first use and
    /// fetching `origin` on every later one.
    pub fn acquire(&self, name: &str, url: &str) -> Result<Repository, CacheError> {
        fs::create_dir_all(&self.root).map_err(|e| CacheError::io(&self.root, e))?;

        let lock = self.lock_for(name);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mirror = self.root.join(format!("{name}.git"));
        if mirror.exists() {
            debug!(name, "reusing existing mirror, fetching origin");
            return self.fetch_existing(name, url, &mirror);
        }

        let url = Self::normalize_url(url);
        debug!(name, url, "cloning into {}", mirror.display());
        self.clone_new(name, &url, &mirror)
    }

    /// One lock per dependency name; two mirrors must never be written
    /// concurrently to the same directory.
    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(name.to_string()).or_default().clone()
    }

    fn fetch_existing(
        &self,
        name: &str,
        url: &str,
        mirror: &Path,
    ) -> Result<Repository, CacheError> {
        let repo = Repository::open_bare(mirror)
            .map_err(|e| CacheError::unavailable(name, url, e.message()))?;
        {
            let mut remote = repo
                .find_remote("origin")
                .map_err(|e| CacheError::unavailable(name, url, e.message()))?;
            remote
                .fetch(&[] as &[&str], None, None)
                .map_err(|e| CacheError::unavailable(name, url, e.message()))?;
        }
        Ok(repo)
    }

    fn clone_new(&self, name: &str, url: &str, mirror: &Path) -> Result<Repository, CacheError> {
        let staging = self.root.join(format!("{name}.git.partial"));
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| CacheError::io(&staging, e))?;
        }

        match RepoBuilder::new().bare(true).clone(url, &staging) {
            Ok(_) => {
                fs::rename(&staging, mirror).map_err(|e| CacheError::io(mirror, e))?;
                Repository::open_bare(mirror)
                    .map_err(|e| CacheError::unavailable(name, url, e.message()))
            }
            Err(e) => {
                let _ = fs::remove_dir_all(&staging);
                Err(CacheError::unavailable(name, url, e.message()))
            }
        }
    }
}
