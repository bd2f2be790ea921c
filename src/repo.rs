//! Project repository access: revision resolution and diff extraction
//!
//! This module provides:
//! - Heuristic resolution of a user-supplied (or absent) ref string
//! - Changed-file enumeration between the resolved revision and the working tree
//! - Blob content at the resolved revision and on disk
//! - Submodule listing and pointer-diff access
//!
//! The project's repository is read-only to this tool; nothing here writes
//! to it.

use crate::error::RepoError;
use git2::{DiffOptions, ObjectType, Oid, Repository};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A registered submodule of the project repository
#[derive(Debug, Clone)]
pub struct SubmoduleInfo {
    /// Submodule name from .gitmodules
    pub name: String,
    /// Repository-relative path of the submodule working tree
    pub path: PathBuf,
}

/// An opened project repository bound to one resolved revision
pub struct ProjectRepo {
    repo: Repository,
    resolved: String,
}

impl ProjectRepo {
    /// Open the repository at `path` and resolve `rev` against it.
    ///
    /// Resolution never verifies a guessed branch name; an unresolvable
    /// guess surfaces as [`RepoError::RevisionNotFound`] at first diff use.
    pub fn open(path: &Path, rev: Option<&str>) -> Result<Self, RepoError> {
        let repo = Repository::open(path)?;
        let resolved = resolve(&repo, rev)?;
        debug!(rev = %resolved, "resolved base revision");
        Ok(Self { repo, resolved })
    }

    /// The concrete revision string this repository is bound to
    pub fn resolved_rev(&self) -> &str {
        &self.resolved
    }

    /// List paths that differ between the resolved revision and the working
    /// tree (staged and unstaged changes included).
    ///
    /// Uses a zero-context diff: only file enumeration happens here, parsers
    /// later re-read whole files rather than hunks.
    pub fn changed_files(&self) -> Result<BTreeSet<PathBuf>, RepoError> {
        let commit = self.commit_for(&self.resolved)?;
        let tree = commit.tree()?;
        let mut opts = DiffOptions::new();
        opts.context_lines(0);
        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(Some(&tree), Some(&mut opts))?;

        let mut files = BTreeSet::new();
        for delta in diff.deltas() {
            if let Some(path) = delta.new_file().path() {
                files.insert(path.to_path_buf());
            }
        }
        Ok(files)
    }

    /// Content of `path` at the resolved revision
    pub fn old_content(&self, path: &Path) -> Result<String, RepoError> {
        let commit = self.commit_for(&self.resolved)?;
        let tree = commit.tree()?;
        let entry = tree
            .get_path(path)
            .map_err(|_| RepoError::file_not_found(path))?;
        let object = entry.to_object(&self.repo)?;
        let blob = object
            .into_blob()
            .map_err(|_| RepoError::file_not_found(path))?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }

    /// Content of `path` as it is on disk right now
    pub fn current_content(&self, path: &Path) -> Result<String, RepoError> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| RepoError::file_not_found(path))?;
        std::fs::read_to_string(workdir.join(path))
            .map_err(|_| RepoError::file_not_found(path))
    }

    /// Registered submodules of the repository, empty when there are none
    pub fn submodules(&self) -> Vec<SubmoduleInfo> {
        match self.repo.submodules() {
            Ok(submodules) => submodules
                .iter()
                .filter_map(|s| {
                    Some(SubmoduleInfo {
                        name: s.name()?.to_string(),
                        path: s.path().to_path_buf(),
                    })
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Open the locally materialized repository of the submodule at `path`
    pub fn open_submodule(&self, path: &Path) -> Result<Repository, RepoError> {
        let submodule = self
            .repo
            .find_submodule(&path.to_string_lossy())
            .map_err(|_| RepoError::file_not_found(path))?;
        Ok(submodule.open()?)
    }

    /// Raw patch lines of the diff for a single path between the resolved
    /// revision and the working tree, as `(origin, content)` pairs.
    ///
    /// For submodule pointer changes the lines read
    /// `Subproject commit <sha>` with `-`/`+` origins.
    pub fn pointer_diff_lines(&self, path: &Path) -> Result<Vec<(char, String)>, RepoError> {
        let commit = self.commit_for(&self.resolved)?;
        let tree = commit.tree()?;
        let mut opts = DiffOptions::new();
        opts.context_lines(0);
        opts.pathspec(path);
        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(Some(&tree), Some(&mut opts))?;

        let mut lines = Vec::new();
        diff.print(git2::DiffFormat::Patch, |_delta, _hunk, line| {
            let content = String::from_utf8_lossy(line.content()).into_owned();
            lines.push((line.origin(), content));
            true
        })?;
        Ok(lines)
    }

    /// Look up a revision string as a commit.
    ///
    /// A 40-character hex string is treated as a commit id directly, anything
    /// else as a revspec that must be peeled to a commit.
    fn commit_for(&self, rev: &str) -> Result<git2::Commit<'_>, RepoError> {
        if is_commit_hash(rev) {
            let oid =
                Oid::from_str(rev).map_err(|_| RepoError::revision_not_found(rev))?;
            return self
                .repo
                .find_commit(oid)
                .map_err(|_| RepoError::revision_not_found(rev));
        }
        peel_to_commit(&self.repo, rev)
    }
}

/// Resolve a revspec to a commit, peeling annotated tags to their target
pub fn peel_to_commit<'r>(
    repo: &'r Repository,
    rev: &str,
) -> Result<git2::Commit<'r>, RepoError> {
    let object = repo
        .revparse_single(rev)
        .map_err(|_| RepoError::revision_not_found(rev))?;
    object
        .peel(ObjectType::Commit)
        .map_err(|_| RepoError::revision_not_found(rev))?
        .into_commit()
        .map_err(|_| RepoError::revision_not_found(rev))
}

/// Whether a ref string is a full commit hash
fn is_commit_hash(rev: &str) -> bool {
    rev.len() == 40 && rev.chars().all(|c| c.is_ascii_hexdigit())
}

/// Turn a user-supplied or absent ref string into a concrete revision.
///
/// In order, first match wins:
/// 1. a 40-character hex string is a commit hash, returned verbatim
/// 2. `HEAD*` and `refs/*` are already qualified, returned verbatim
/// 3. any other name tries `refs/tags/<rev>` first and falls back to
///    `refs/heads/<rev>` without verifying the branch exists
/// 4. no ref: `HEAD` when the working tree has changes, `HEAD^` when it is
///    clean (so the tool can run right after a commit lands)
fn resolve(repo: &Repository, rev: Option<&str>) -> Result<String, RepoError> {
    let rev = rev.unwrap_or("").trim();

    if is_commit_hash(rev) {
        return Ok(rev.to_string());
    }
    if rev.starts_with("HEAD") || rev.starts_with("refs/") {
        return Ok(rev.to_string());
    }
    if !rev.is_empty() {
        let tag = format!("refs/tags/{rev}");
        if peel_to_commit(repo, &tag).is_ok() {
            return Ok(tag);
        }
        // existence of the guessed branch is deferred to the first diff use
        return Ok(format!("refs/heads/{rev}"));
    }

    let head = peel_to_commit(repo, "HEAD")?;
    let tree = head.tree()?;
    let diff = repo.diff_tree_to_workdir_with_index(Some(&tree), None)?;
    if diff.deltas().len() == 0 {
        Ok("HEAD^".to_string())
    } else {
        Ok("HEAD".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        repo
    }

    fn commit_all(repo: &Repository, message: &str) -> Oid {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_resolve_commit_hash_verbatim() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        commit_all(&repo, "initial");

        let hash = "1234567890abcdef1234567890abcdef12345678";
        assert_eq!(resolve(&repo, Some(hash)).unwrap(), hash);
    }

    #[test]
    fn test_resolve_head_and_refs_verbatim() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        commit_all(&repo, "initial");

        assert_eq!(resolve(&repo, Some("HEAD~2")).unwrap(), "HEAD~2");
        assert_eq!(
            resolve(&repo, Some("refs/heads/main")).unwrap(),
            "refs/heads/main"
        );
    }

    #[test]
    fn test_resolve_prefers_tag_over_branch() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        let oid = commit_all(&repo, "initial");
        let object = repo.find_object(oid, None).unwrap();
        repo.tag_lightweight("v1.0.0", &object, false).unwrap();

        assert_eq!(resolve(&repo, Some("v1.0.0")).unwrap(), "refs/tags/v1.0.0");
    }

    #[test]
    fn test_resolve_falls_back_to_branch_without_verifying() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        commit_all(&repo, "initial");

        assert_eq!(
            resolve(&repo, Some("feature-x")).unwrap(),
            "refs/heads/feature-x"
        );
    }

    #[test]
    fn test_resolve_clean_tree_uses_parent() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        commit_all(&repo, "initial");

        assert_eq!(resolve(&repo, None).unwrap(), "HEAD^");
    }

    #[test]
    fn test_resolve_dirty_tree_uses_head() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        commit_all(&repo, "initial");
        fs::write(dir.path().join("a.txt"), "changed").unwrap();

        assert_eq!(resolve(&repo, None).unwrap(), "HEAD");
    }

    #[test]
    fn test_changed_files_and_contents() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        fs::write(dir.path().join("pyproject.toml"), "old").unwrap();
        commit_all(&repo, "initial");
        fs::write(dir.path().join("pyproject.toml"), "new").unwrap();

        let project = ProjectRepo::open(dir.path(), None).unwrap();
        assert_eq!(project.resolved_rev(), "HEAD");

        let files = project.changed_files().unwrap();
        assert!(files.contains(Path::new("pyproject.toml")));

        let old = project.old_content(Path::new("pyproject.toml")).unwrap();
        assert_eq!(old, "old");
        let current = project
            .current_content(Path::new("pyproject.toml"))
            .unwrap();
        assert_eq!(current, "new");
    }

    #[test]
    fn test_old_content_missing_path() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        commit_all(&repo, "initial");

        let project = ProjectRepo::open(dir.path(), Some("HEAD")).unwrap();
        let err = project.old_content(Path::new("missing.toml")).unwrap_err();
        assert!(matches!(err, RepoError::FileNotFound { .. }));
    }

    #[test]
    fn test_current_content_missing_path() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        commit_all(&repo, "initial");

        let project = ProjectRepo::open(dir.path(), Some("HEAD")).unwrap();
        let err = project
            .current_content(Path::new("missing.toml"))
            .unwrap_err();
        assert!(matches!(err, RepoError::FileNotFound { .. }));
    }

    #[test]
    fn test_changed_files_unknown_branch_guess_fails_late() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        commit_all(&repo, "initial");

        // resolution succeeds, the first diff surfaces the missing branch
        let project = ProjectRepo::open(dir.path(), Some("no-such-branch")).unwrap();
        assert_eq!(project.resolved_rev(), "refs/heads/no-such-branch");
        let err = project.changed_files().unwrap_err();
        assert!(matches!(err, RepoError::RevisionNotFound { .. }));
    }
}
