//! Submodule pointer-change detection
//!
//! A moved submodule pointer shows up in the diff as a pair of
//! `Subproject commit <sha>` lines. The removed line carries the old
//! commit, the added line the new one. Unlike manifest upgrades, the
//! submodule's repository is already materialized locally, so its history
//! is walked immediately and the repository cache is bypassed entirely.

use crate::domain::Upgrade;
use crate::repo::ProjectRepo;
use crate::walker;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Produce upgrades for every changed path that is a registered submodule
pub fn detect(repo: &ProjectRepo, changed: &BTreeSet<PathBuf>, limit: usize) -> Vec<Upgrade> {
    let submodules = repo.submodules();
    if submodules.is_empty() {
        return Vec::new();
    }

    let mut upgrades = Vec::new();
    for submodule in &submodules {
        if !changed.contains(&submodule.path) {
            continue;
        }
        debug!(name = %submodule.name, "submodule pointer changed");

        let lines = match repo.pointer_diff_lines(&submodule.path) {
            Ok(lines) => lines,
            Err(e) => {
                warn!("could not read submodule diff for {}: {e}", submodule.name);
                continue;
            }
        };
        let Some((old_sha, new_sha)) = pointer_change(&lines) else {
            warn!("no pointer change found in diff for {}", submodule.name);
            continue;
        };

        let messages = submodule_messages(repo, &submodule.path, &old_sha, &new_sha, limit);
        upgrades.push(Upgrade::new(&submodule.name, old_sha, new_sha).with_messages(messages));
    }
    upgrades
}

/// Extract the old and new commit hashes from a pointer diff.
///
/// The removed line's trailing token is the old commit, the added line's
/// the new one.
fn pointer_change(lines: &[(char, String)]) -> Option<(String, String)> {
    let mut old_sha = None;
    let mut new_sha = None;
    for (origin, content) in lines {
        if *origin != '-' && *origin != '+' {
            continue;
        }
        let Some(token) = content.split_whitespace().last() else {
            continue;
        };
        if *origin == '-' {
            old_sha = Some(token.to_string());
        } else {
            new_sha = Some(token.to_string());
        }
    }
    Some((old_sha?, new_sha?))
}

/// Walk the already-present local submodule repository between the two
/// pointers. Failures degrade to an empty message list so the upgrade is
/// still reported.
fn submodule_messages(
    repo: &ProjectRepo,
    path: &Path,
    old_sha: &str,
    new_sha: &str,
    limit: usize,
) -> Vec<String> {
    let subrepo = match repo.open_submodule(path) {
        Ok(subrepo) => subrepo,
        Err(e) => {
            warn!("could not open submodule at {}: {e}", path.display());
            return Vec::new();
        }
    };
    match walker::messages(&subrepo, old_sha, new_sha, limit) {
        Ok(messages) => messages,
        Err(e) => {
            warn!("could not walk submodule history at {}: {e}", path.display());
            Vec::new()
        }
    }
}
