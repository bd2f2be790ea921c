//! Bounded commit-history walk between two revisions
//!
//! Walks a dependency repository newest-first from the new version down to
//! the old one, collecting commit messages. The walk is bounded and
//! failure-tolerant: a downgrade yields no messages instead of walking the
//! wrong direction, and hitting the bound returns what was collected so far.

use crate::error::RepoError;
use crate::repo::peel_to_commit;
use git2::{Repository, Sort};
use tracing::warn;

/// Default bound on the number of commits walked per upgrade
pub const DEFAULT_MESSAGE_LIMIT: usize = 250;

/// Collect trimmed commit messages between `from_rev` (older) and `to_rev`
/// (newer), newest-first, `from_rev` inclusive.
///
/// Both endpoints are resolved as revspecs and peeled to commits, so tags
/// and annotated tag objects work. If the "from" commit is newer than the
/// "to" commit the change is a downgrade: a warning is logged and no
/// messages are returned. Reaching `limit` before finding `from_rev` logs a
/// warning and returns the partial sequence.
pub fn messages(
    repo: &Repository,
    from_rev: &str,
    to_rev: &str,
    limit: usize,
) -> Result<Vec<String>, RepoError> {
    let from = peel_to_commit(repo, from_rev)?;
    let to = peel_to_commit(repo, to_rev)?;

    if from.time().seconds() > to.time().seconds() {
        warn!("{from_rev} is newer than {to_rev}, looks like a downgrade, not walking");
        return Ok(Vec::new());
    }

    let mut walk = repo.revwalk()?;
    walk.push(to.id())?;
    walk.set_sorting(Sort::TIME)?;

    let mut collected = Vec::new();
    let mut found = false;
    for oid in walk {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;
        collected.push(commit.message().unwrap_or("").trim().to_string());
        if oid == from.id() {
            found = true;
            break;
        }
        if collected.len() >= limit {
            break;
        }
    }

    if !found && collected.len() >= limit {
        warn!("reached limit of {limit} commits walking from {to_rev} to {from_rev}");
    }

    Ok(collected)
}
