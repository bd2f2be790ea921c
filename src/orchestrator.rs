//! End-to-end upgrade detection pipeline
//!
//! Ties the stages together: resolve the base revision, enumerate changed
//! files, parse manifest snapshots on both sides, match them into upgrades,
//! detect submodule pointer moves, then resolve commit messages against the
//! mirror cache and extract ticket names.
//!
//! Failures before matching are fatal (everything depends on the base
//! revision); failures while resolving one upgrade's messages are isolated
//! to that upgrade so its siblings still report.

use crate::cache::RepositoryCache;
use crate::config::Config;
use crate::domain::Upgrade;
use crate::error::{AppError, ManifestError};
use crate::matcher::match_upgrades;
use crate::parser::parser_for;
use crate::repo::ProjectRepo;
use crate::submodule;
use crate::tickets::collect_ticket_names;
use crate::walker;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// An upgrade with its extracted ticket names
#[derive(Debug, Clone)]
pub struct ResolvedUpgrade {
    /// The underlying version change, messages resolved where possible
    pub upgrade: Upgrade,
    /// Ticket names found in the commit messages, deduplicated and sorted
    pub tickets: BTreeSet<String>,
}

/// Drives one detection run against a project repository
pub struct Orchestrator {
    config: Config,
    cache: Arc<RepositoryCache>,
    limit: usize,
}

impl Orchestrator {
    /// Create an orchestrator with an explicit cache root and walk limit
    pub fn new(config: Config, cache_root: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            config,
            cache: Arc::new(RepositoryCache::new(cache_root)),
            limit,
        }
    }

    /// Detect upgrades between the base revision and the working tree and
    /// resolve their ticket names
    pub async fn run(
        &self,
        repo_path: &Path,
        rev: Option<&str>,
    ) -> Result<Vec<ResolvedUpgrade>, AppError> {
        let repo = ProjectRepo::open(repo_path, rev)?;
        let changed = repo.changed_files()?;
        debug!(rev = repo.resolved_rev(), files = changed.len(), "diffing");

        let mut upgrades = self.manifest_upgrades(&repo, &changed);
        if self.config.submodules {
            upgrades.extend(submodule::detect(&repo, &changed, self.limit));
        }
        drop(repo);

        let mut resolved = Vec::new();
        for task in self.spawn_message_walks(upgrades) {
            match task.await {
                Ok(Some(upgrade)) => {
                    let tickets = collect_ticket_names(upgrade.messages.as_slice());
                    resolved.push(ResolvedUpgrade { upgrade, tickets });
                }
                Ok(None) => {}
                Err(e) => warn!("message walk task failed: {e}"),
            }
        }
        Ok(resolved)
    }

    /// Parse every changed manifest on both sides and match the snapshots.
    ///
    /// Files without a parser are silently ignored; a file missing on one
    /// side (added or deleted manifests) only drops that file's
    /// contribution.
    fn manifest_upgrades(
        &self,
        repo: &ProjectRepo,
        changed: &BTreeSet<PathBuf>,
    ) -> Vec<Upgrade> {
        let observed: BTreeSet<String> = self
            .config
            .observed()
            .into_iter()
            .map(|dep| dep.name)
            .collect();
        let mut upgrades = Vec::new();

        for path in changed {
            let Some(parser) = parser_for(path) else {
                // expected for most changed files, so not worth a warning
                debug!("{}", ManifestError::unsupported_format(path));
                continue;
            };
            let old = match repo.old_content(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("skipping {}: {e}", path.display());
                    continue;
                }
            };
            let new = match repo.current_content(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("skipping {}: {e}", path.display());
                    continue;
                }
            };
            let pre = parser.parse(path, &old, &observed);
            let post = parser.parse(path, &new, &observed);
            upgrades.extend(match_upgrades(&pre, &post));
        }
        upgrades
    }

    /// One blocking task per upgrade that still needs its history walked.
    ///
    /// Tasks returning `None` hit a clone/fetch or walk failure and were
    /// logged; the upgrade is dropped rather than reported with unknown
    /// messages. Already-resolved upgrades (submodules) pass through on a
    /// trivial task so result order matches detection order.
    fn spawn_message_walks(
        &self,
        upgrades: Vec<Upgrade>,
    ) -> Vec<tokio::task::JoinHandle<Option<Upgrade>>> {
        upgrades
            .into_iter()
            .map(|mut upgrade| {
                if upgrade.messages.is_resolved() {
                    return tokio::spawn(async move { Some(upgrade) });
                }
                let Some(url) = self.config.observe.get(&upgrade.name).cloned() else {
                    warn!("no repository url configured for {}", upgrade.name);
                    return tokio::spawn(async move { None });
                };
                let cache = Arc::clone(&self.cache);
                let limit = self.limit;
                tokio::task::spawn_blocking(move || {
                    let mirror = match cache.acquire(&upgrade.name, &url) {
                        Ok(mirror) => mirror,
                        Err(e) => {
                            warn!("skipping {}: {e}", upgrade.name);
                            return None;
                        }
                    };
                    match walker::messages(
                        &mirror,
                        &upgrade.old_version,
                        &upgrade.new_version,
                        limit,
                    ) {
                        Ok(messages) => {
                            upgrade.resolve_messages(messages);
                            Some(upgrade)
                        }
                        Err(e) => {
                            warn!("skipping {}: {e}", upgrade.name);
                            None
                        }
                    }
                })
            })
            .collect()
    }
}
