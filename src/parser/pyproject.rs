//! pyproject.toml version extraction
//!
//! Handles both dependency layouts:
//! - PEP 621 `project.dependencies`, pinned entries like `"django==3.2.1"`
//! - Poetry `tool.poetry.dependencies`, string constraints or
//!   `{version = "..."}` tables

use crate::domain::VersionSnapshot;
use crate::error::ManifestError;
use crate::parser::{normalize_version, ManifestParser};
use std::collections::BTreeSet;
use std::path::Path;
use toml::Value;
use tracing::warn;

/// Parser for pyproject.toml files
pub struct PyprojectParser;

impl ManifestParser for PyprojectParser {
    fn matches(&self, file_name: &str) -> bool {
        file_name == "pyproject.toml"
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

        let pep621 = parsed
            .get("project")
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_array());
        let poetry = parsed
            .get("tool")
            .and_then(|t| t.get("poetry"))
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_table());

        if pep621.is_none() && poetry.is_none() {
            warn!(
                "{}",
                ManifestError::malformed(
                    path,
                    "no project.dependencies or tool.poetry.dependencies section"
                )
            );
            return snapshot;
        }

        if let Some(entries) = pep621 {
            for entry in entries.iter().filter_map(|e| e.as_str()) {
                // only pinned entries carry an exact version
                let Some((name, constraint)) = entry.split_once("==") else {
                    continue;
                };
                let name = name.trim();
                if !observed.contains(name) {
                    continue;
                }
                if let Some(version) = normalize_version(constraint) {
                    snapshot.insert(name.to_string(), version);
                }
            }
        }

        if let Some(table) = poetry {
            for (name, value) in table {
                if !observed.contains(name.as_str()) {
                    continue;
                }
                let constraint = match value {
                    Value::String(s) => s.as_str(),
                    other => other
                        .get("version")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default(),
                };
                if let Some(version) = normalize_version(constraint) {
                    snapshot.insert(name.clone(), version);
                }
            }
        }

        snapshot
    }
}
