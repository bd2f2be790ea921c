//! pubspec.yaml version extraction
//!
//! Entries under `dependencies` come in three shapes:
//!
//! ```yaml
//! dependencies:
//!   cupertino_icons: ^1.0.2
//!   hive:
//!     version: 2.0.4
//!   protocol:
//!     git:
//!       url: git@github.com:acme/protocol.git
//!       ref: v2.10.0
//! ```
//!
//! String and `version:` values are `v`-prefixed; a git `ref` is already a
//! revision and is taken verbatim.

use crate::domain::VersionSnapshot;
use crate::error::ManifestError;
use crate::parser::ManifestParser;
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

/// Parser for pubspec*.yaml files
pub struct PubspecParser;

impl ManifestParser for PubspecParser {
    fn matches(&self, file_name: &str) -> bool {
        file_name.starts_with("pubspec") && file_name.ends_with(".yaml")
    }

    fn parse(&self, path: &Path, content: &str, observed: &BTreeSet<String>) -> VersionSnapshot {
        let mut snapshot = VersionSnapshot::new();

        let parsed: Value = match serde_yaml::from_str(content) {
            Ok(value) => value,
            Err(e) => {
                warn!("{}", ManifestError::malformed(path, e.to_string()));
                return snapshot;
            }
        };

        let Some(dependencies) = parsed.get("dependencies").and_then(|d| d.as_mapping()) else {
            warn!("{}", ManifestError::malformed(path, "no dependencies section"));
            return snapshot;
        };

        for (key, value) in dependencies {
            let Some(name) = key.as_str() else { continue };
            if !observed.contains(name) {
                continue;
            }

            let version = match value {
                Value::String(constraint) => Some(format!("v{constraint}")),
                Value::Mapping(_) => {
                    if let Some(version) = value.get("version").and_then(|v| v.as_str()) {
                        Some(format!("v{version}"))
                    } else {
                        value
                            .get("git")
                            .and_then(|g| g.get("ref"))
                            .and_then(|r| r.as_str())
                            .map(|r| r.to_string())
                    }
                }
                _ => None,
            };

            if let Some(version) = version {
                snapshot.insert(name.to_string(), version);
            }
        }

        snapshot
    }
}
