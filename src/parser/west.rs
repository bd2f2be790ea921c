//! west manifest version extraction
//!
//! Projects live under `manifest.projects`; each entry carries either a
//! `version` (release, `v`-prefixed) or a `revision` (raw commit hash or
//! ref, taken verbatim):
//!
//! ```yaml
//! manifest:
//!   projects:
//!   - name: nrf
//!     repo-path: ncs-nrf
//!     revision: 85a79aa10b9e403fd76e760032ef72057996828c
//!   - name: protocol
//!     version: 2.10.0
//! ```

use crate::domain::VersionSnapshot;
use crate::error::ManifestError;
use crate::parser::ManifestParser;
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

/// Parser for west*.yaml manifest files
pub struct WestParser;

impl ManifestParser for WestParser {
    fn matches(&self, file_name: &str) -> bool {
        file_name.starts_with("west") && file_name.ends_with(".yaml")
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

        let projects = parsed
            .get("manifest")
            .and_then(|m| m.get("projects"))
            .and_then(|p| p.as_sequence());
        let Some(projects) = projects else {
            warn!("{}", ManifestError::malformed(path, "no manifest.projects section"));
            return snapshot;
        };

        for project in projects {
            let Some(name) = project.get("name").and_then(|n| n.as_str()) else {
                continue;
            };
            if !observed.contains(name) {
                continue;
            }

            let version = match project.get("version") {
                Some(value) => yaml_scalar(value).map(|v| format!("v{v}")),
                None => project.get("revision").and_then(yaml_scalar),
            };

            if let Some(version) = version {
                snapshot.insert(name.to_string(), version);
            }
        }

        snapshot
    }
}

/// Versions like `0.7` parse as YAML numbers; render them back as written
fn yaml_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
