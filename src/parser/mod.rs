//! Manifest version parsers
//!
//! Each parser maps one manifest format to a [`VersionSnapshot`]: raw file
//! text plus the set of observed dependency names in, a name -> normalized
//! version mapping out. Dispatch happens purely on the filename, never on
//! content, and the patterns are mutually exclusive; a name matching no
//! pattern is an unsupported format and is skipped upstream.
//!
//! Supported formats:
//! - `pyproject.toml` (PEP 621 `project.dependencies` and Poetry
//!   `tool.poetry.dependencies`)
//! - `poetry.lock` (`[[package]]` entries with resolved versions)
//! - `pubspec*.yaml` (Dart/Flutter)
//! - `west*.yaml` (Zephyr west manifests)

mod poetry_lock;
mod pubspec;
mod pyproject;
mod west;

pub use poetry_lock::PoetryLockParser;
pub use pubspec::PubspecParser;
pub use pyproject::PyprojectParser;
pub use west::WestParser;

use crate::domain::VersionSnapshot;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

/// First semver-looking substring of a version constraint
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+\.[0-9]+[0-9A-Za-z.+-]*").unwrap());

/// A parser for one manifest format
pub trait ManifestParser: Sync {
    /// Whether this parser handles the given filename.
    /// Pattern match only, no content inspection.
    fn matches(&self, file_name: &str) -> bool;

    /// Extract observed dependency versions from whole-file content.
    ///
    /// Absent or malformed sections yield an empty snapshot plus a warning;
    /// a manifest with zero relevant entries is valid.
    fn parse(&self, path: &Path, content: &str, observed: &BTreeSet<String>) -> VersionSnapshot;
}

static PARSERS: [&(dyn ManifestParser); 4] =
    [&PyprojectParser, &PoetryLockParser, &PubspecParser, &WestParser];

/// Find the parser responsible for a path, if any
pub fn parser_for(path: &Path) -> Option<&'static dyn ManifestParser> {
    let name = path.file_name()?.to_str()?;
    PARSERS.iter().copied().find(|p| p.matches(name))
}

/// Whether any parser handles the given path
pub fn is_parsable(path: &Path) -> bool {
    parser_for(path).is_some()
}

/// Extract the first `N.N...` substring of a constraint, `v`-prefixed
pub(crate) fn normalize_version(constraint: &str) -> Option<String> {
    VERSION_RE
        .find(constraint)
        .map(|m| format!("v{}", m.as_str()))
}
