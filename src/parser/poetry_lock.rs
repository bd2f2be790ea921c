//! poetry.lock version extraction
//!
//! Lock entries are `[[package]]` tables carrying exact resolved versions:
//!
//! ```toml
//! [[package]]
//! name = "django"
//! version = "4.0.0"
//! ```
//!
//! Versions are already pinned, so they are `v`-prefixed verbatim without
//! constraint stripping.

use crate::domain::VersionSnapshot;
use crate::error::ManifestError;
use crate::parser::ManifestParser;
use std::collections::BTreeSet;
use std::path::Path;
use toml::Value;
use tracing::warn;

/// Parser for poetry.lock files
pub struct PoetryLockParser;

impl ManifestParser for PoetryLockParser {
    fn matches(&self, file_name: &str) -> bool {
        file_name == "poetry.lock"
    }

    fn parse(&self, path: &Path, content: &str, observed: &BTreeSet<String>) -> VersionSnapshot {
        let mut snapshot = VersionSnapshot::new();

        let parsed: Value = match content.parse() {
            Ok(value) => value,
            Err(e) => {
                warn!("{}", ManifestError::malformed(path, e.to_string()));
                return snapshot;
            }
        };

        let Some(packages) = parsed.get("package").and_then(|p| p.as_array()) else {
            warn!("{}", ManifestError::malformed(path, "no package entries"));
            return snapshot;
        };

        for package in packages {
            let Some(name) = package.get("name").and_then(|n| n.as_str()) else {
                continue;
            };
            if !observed.contains(name) {
                continue;
            }
            let Some(version) = package.get("version").and_then(|v| v.as_str()) else {
                continue;
            };
            snapshot.insert(name.to_string(), format!("v{version}"));
        }

        snapshot
    }
}
