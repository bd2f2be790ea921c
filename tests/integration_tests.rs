//! Integration tests for deptrack
//!
//! These tests verify:
//! - Ref resolution against real repositories
//! - The parse/match pipeline on changed manifests
//! - The cache/walk pipeline against a local dependency repository
//! - Submodule pointer-change detection against a real submodule

use deptrack::cache::RepositoryCache;
use deptrack::matcher::match_upgrades;
use deptrack::parser::parser_for;
use deptrack::repo::ProjectRepo;
use deptrack::submodule;
use deptrack::tickets::collect_ticket_names;
use deptrack::walker;
use git2::{Oid, Repository, Signature};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

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

mod manifest_pipeline {
    use super::*;

    /// Project with a committed pyproject.toml and an uncommitted version
    /// bump on disk
    fn bumped_project(dir: &Path) -> PathBuf {
        let path = dir.join("project");
        fs::create_dir_all(&path).unwrap();
        let repo = Repository::init(&path).unwrap();
        fs::write(
            path.join("pyproject.toml"),
            "[project]\nname = \"app\"\ndependencies = [\"django==3.2.1\", \"requests==2.28.0\"]\n",
        )
        .unwrap();
        commit_all(&repo, "pin dependencies");
        fs::write(
            path.join("pyproject.toml"),
            "[project]\nname = \"app\"\ndependencies = [\"django==4.0.0\", \"requests==2.28.0\"]\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_uncommitted_bump_is_detected_against_head() {
        let dir = TempDir::new().unwrap();
        let project = bumped_project(dir.path());

        let repo = ProjectRepo::open(&project, None).unwrap();
        assert_eq!(repo.resolved_rev(), "HEAD");

        let changed = repo.changed_files().unwrap();
        assert!(changed.contains(Path::new("pyproject.toml")));

        let path = Path::new("pyproject.toml");
        let parser = parser_for(path).unwrap();
        let observed: BTreeSet<String> =
            ["django".to_string(), "requests".to_string()].into();

        let pre = parser.parse(path, &repo.old_content(path).unwrap(), &observed);
        let post = parser.parse(path, &repo.current_content(path).unwrap(), &observed);
        let upgrades = match_upgrades(&pre, &post);

        // requests is unchanged and must not be reported
        assert_eq!(upgrades.len(), 1);
        assert_eq!(upgrades[0].name, "django");
        assert_eq!(upgrades[0].old_version, "v3.2.1");
        assert_eq!(upgrades[0].new_version, "v4.0.0");
    }

    #[test]
    fn test_committed_bump_is_detected_on_clean_tree() {
        let dir = TempDir::new().unwrap();
        let project = bumped_project(dir.path());
        let repo = Repository::open(&project).unwrap();
        commit_all(&repo, "bump django");

        // clean tree resolves to HEAD^ so the just-landed commit is diffed
        let repo = ProjectRepo::open(&project, None).unwrap();
        assert_eq!(repo.resolved_rev(), "HEAD^");

        let changed = repo.changed_files().unwrap();
        assert!(changed.contains(Path::new("pyproject.toml")));
    }

    #[test]
    fn test_unobserved_dependencies_are_ignored() {
        let dir = TempDir::new().unwrap();
        let project = bumped_project(dir.path());

        let repo = ProjectRepo::open(&project, None).unwrap();
        let path = Path::new("pyproject.toml");
        let parser = parser_for(path).unwrap();
        let observed: BTreeSet<String> = ["requests".to_string()].into();

        let pre = parser.parse(path, &repo.old_content(path).unwrap(), &observed);
        let post = parser.parse(path, &repo.current_content(path).unwrap(), &observed);
        assert!(match_upgrades(&pre, &post).is_empty());
    }
}

mod cache_and_walk {
    use super::*;

    /// Dependency repository with two tagged releases
    fn tagged_dependency(dir: &Path) -> PathBuf {
        let path = dir.join("protocol.git");
        fs::create_dir_all(&path).unwrap();
        let repo = Repository::init(&path).unwrap();

        fs::write(path.join("lib.py"), "one").unwrap();
        let first = commit_all(&repo, "Initial version ABC-100");
        repo.tag_lightweight("v1.0.0", &repo.find_object(first, None).unwrap(), false)
            .unwrap();

        fs::write(path.join("lib.py"), "two").unwrap();
        commit_all(&repo, "Unrelated refactor");

        fs::write(path.join("lib.py"), "three").unwrap();
        let third = commit_all(&repo, "Fix framing ABC-101\n\nCloses ABC-102");
        repo.tag_lightweight("v1.1.0", &repo.find_object(third, None).unwrap(), false)
            .unwrap();
        path
    }

    #[test]
    fn test_clone_walk_and_extract_tickets() {
        let dir = TempDir::new().unwrap();
        let upstream = tagged_dependency(dir.path());
        let cache = RepositoryCache::new(dir.path().join("cache"));

        let mirror = cache
            .acquire("protocol", &format!("file://{}", upstream.display()))
            .unwrap();
        let messages =
            walker::messages(&mirror, "v1.0.0", "v1.1.0", walker::DEFAULT_MESSAGE_LIMIT)
                .unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], "Fix framing ABC-101\n\nCloses ABC-102");

        let tickets = collect_ticket_names(&messages);
        let names: Vec<_> = tickets.iter().map(String::as_str).collect();
        assert_eq!(names, ["ABC-100", "ABC-101", "ABC-102"]);
    }

    #[test]
    fn test_clone_walk_and_extract_tickets_from_lockfile_bump() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("locked");
        fs::create_dir_all(&project).unwrap();
        let repo = Repository::init(&project).unwrap();
        fs::write(
            project.join("poetry.lock"),
            "[[package]]\nname = \"protocol\"\nversion = \"1.0.0\"\n",
        )
        .unwrap();
        commit_all(&repo, "lock dependencies");
        fs::write(
            project.join("poetry.lock"),
            "[[package]]\nname = \"protocol\"\nversion = \"1.1.0\"\n",
        )
        .unwrap();

        let repo = ProjectRepo::open(&project, None).unwrap();
        let path = Path::new("poetry.lock");
        let parser = parser_for(path).unwrap();
        let observed: BTreeSet<String> = ["protocol".to_string()].into();

        let pre = parser.parse(path, &repo.old_content(path).unwrap(), &observed);
        let post = parser.parse(path, &repo.current_content(path).unwrap(), &observed);
        let upgrades = match_upgrades(&pre, &post);
        assert_eq!(upgrades.len(), 1);
        assert_eq!(upgrades[0].old_version, "v1.0.0");
        assert_eq!(upgrades[0].new_version, "v1.1.0");
    }

    #[test]
    fn test_second_acquire_sees_new_upstream_tags() {
        let dir = TempDir::new().unwrap();
        let upstream = tagged_dependency(dir.path());
        let url = format!("file://{}", upstream.display());
        let cache = RepositoryCache::new(dir.path().join("cache"));

        cache.acquire("protocol", &url).unwrap();

        // tag a new release upstream after the first clone
        let repo = Repository::open(&upstream).unwrap();
        fs::write(upstream.join("lib.py"), "four").unwrap();
        let next = commit_all(&repo, "Harden retries ABC-103");
        repo.tag_lightweight("v1.2.0", &repo.find_object(next, None).unwrap(), false)
            .unwrap();

        let mirror = cache.acquire("protocol", &url).unwrap();
        let messages =
            walker::messages(&mirror, "v1.1.0", "v1.2.0", walker::DEFAULT_MESSAGE_LIMIT)
                .unwrap();
        assert_eq!(messages[0], "Harden retries ABC-103");
    }
}

mod submodule_detection {
    use super::*;
    use git2::build::CheckoutBuilder;
    use git2::Time;

    /// Commit with an explicit timestamp so the walk chronology is
    /// deterministic
    fn commit_at(repo: &Repository, dir: &Path, message: &str, seconds: i64) -> Oid {
        fs::write(dir.join("lib.c"), message).unwrap();
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::new("Test", "test@example.com", &Time::new(seconds, 0)).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Upstream repository for the submodule with two commits
    fn submodule_upstream(dir: &Path) -> (PathBuf, Oid, Oid) {
        let path = dir.join("vendored-upstream");
        fs::create_dir_all(&path).unwrap();
        let repo = Repository::init(&path).unwrap();
        let old = commit_at(&repo, &path, "Base release ABC-500", 1_000_000);
        let new = commit_at(&repo, &path, "Tighten bounds ABC-501", 1_000_100);
        (path, old, new)
    }

    /// Host repository with `vendored` registered as a submodule, committed
    /// at `old`, then the submodule HEAD moved to `new` without committing
    fn host_with_moved_pointer(dir: &Path, upstream: &Path, old: Oid, new: Oid) -> PathBuf {
        let path = dir.join("host");
        fs::create_dir_all(&path).unwrap();
        let repo = Repository::init(&path).unwrap();
        fs::write(path.join("README.md"), "host").unwrap();
        commit_all(&repo, "initial");

        let url = format!("file://{}", upstream.display());
        let mut added = repo
            .submodule(&url, Path::new("vendored"), true)
            .unwrap();
        let subrepo = added.clone(None).unwrap();
        subrepo.set_head_detached(old).unwrap();
        subrepo
            .checkout_head(Some(CheckoutBuilder::new().force()))
            .unwrap();
        added.add_to_index(true).unwrap();
        added.add_finalize().unwrap();
        commit_all(&repo, "add vendored submodule");

        // move the pointer in the working tree only
        let subrepo = Repository::open(path.join("vendored")).unwrap();
        subrepo.set_head_detached(new).unwrap();
        subrepo
            .checkout_head(Some(CheckoutBuilder::new().force()))
            .unwrap();
        path
    }

    #[test]
    fn test_moved_pointer_produces_resolved_upgrade() {
        let dir = TempDir::new().unwrap();
        let (upstream, old, new) = submodule_upstream(dir.path());
        let project = host_with_moved_pointer(dir.path(), &upstream, old, new);

        let repo = ProjectRepo::open(&project, Some("HEAD")).unwrap();
        let changed = repo.changed_files().unwrap();
        assert!(changed.contains(Path::new("vendored")));

        let upgrades = submodule::detect(&repo, &changed, walker::DEFAULT_MESSAGE_LIMIT);
        assert_eq!(upgrades.len(), 1);

        let upgrade = &upgrades[0];
        assert_eq!(upgrade.name, "vendored");
        assert_eq!(upgrade.old_version, old.to_string());
        assert_eq!(upgrade.new_version, new.to_string());

        // messages come from the local submodule repository, newest-first
        // and inclusive of the old pointer's commit
        assert!(upgrade.messages.is_resolved());
        assert_eq!(
            upgrade.messages.as_slice(),
            ["Tighten bounds ABC-501", "Base release ABC-500"]
        );
    }

    #[test]
    fn test_unmoved_submodule_is_not_reported() {
        let dir = TempDir::new().unwrap();
        let (upstream, old, _new) = submodule_upstream(dir.path());
        let project = host_with_moved_pointer(dir.path(), &upstream, old, old);

        let repo = ProjectRepo::open(&project, Some("HEAD")).unwrap();
        let changed = repo.changed_files().unwrap();
        assert!(!changed.contains(Path::new("vendored")));
        assert!(submodule::detect(&repo, &changed, walker::DEFAULT_MESSAGE_LIMIT).is_empty());
    }
}
