//! Configuration loading
//!
//! Observed dependencies and tracker connection details come from one of:
//! - `.deptrack.yaml` (top-level `tracker:` / `observe:` / `submodules:`)
//! - `pyproject.toml` (`[tool.deptrack.tracker]` / `[tool.deptrack.observe]`)
//! - `west.yaml` (`manifest.deptrack.*`)
//! - any other `*.yaml` with a top-level `deptrack:` key
//!
//! Tracker credentials support indirection: `env:NAME` / `env://NAME` reads
//! an environment variable, `file:PATH` / `file://PATH` reads a file (with
//! `~` and `$VAR` expansion); anything else is taken literally.

use crate::domain::ObservedDependency;
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file search order
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = [".deptrack.yaml", "pyproject.toml", "west.yaml"];

/// Issue-tracker connection parameters
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Tracker base URL, e.g. `https://acme.atlassian.net`
    pub url: String,
    /// API token, possibly behind a `file:`/`env:` indirection
    pub token: String,
    /// Account email for basic auth, possibly behind an indirection
    pub email: String,
}

/// Loaded and validated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Tracker connection parameters, secrets already resolved
    pub tracker: TrackerConfig,
    /// Observed dependency name -> repository URL
    pub observe: BTreeMap<String, String>,
    /// Whether submodule pointer changes are detected
    pub submodules: bool,
}

impl Config {
    /// The observed dependencies as domain descriptors, name-sorted
    pub fn observed(&self) -> Vec<ObservedDependency> {
        self.observe
            .iter()
            .map(|(name, url)| ObservedDependency::new(name, url))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawConfig {
    tracker: TrackerConfig,
    observe: BTreeMap<String, String>,
    submodules: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            observe: BTreeMap::new(),
            submodules: true,
        }
    }
}

/// Load configuration from an explicit path, or search the default paths
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return parse_file(path);
    }

    for candidate in DEFAULT_CONFIG_PATHS {
        let path = Path::new(candidate);
        if !path.exists() {
            continue;
        }
        match parse_file(path) {
            Ok(config) => return Ok(config),
            Err(e) => debug!("skipping {candidate}: {e}"),
        }
    }
    Err(ConfigError::NotFound {
        searched: DEFAULT_CONFIG_PATHS.join(", "),
    })
}

/// Parse one configuration file, dispatching on its name
pub fn parse_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let raw = if file_name == ".deptrack.yaml" {
        Some(from_yaml_root(path, &content)?)
    } else if file_name == "pyproject.toml" {
        from_pyproject(path, &content)?
    } else if file_name.starts_with("west") && file_name.ends_with(".yaml") {
        from_yaml_section(path, &content, &["manifest", "deptrack"])?
    } else if file_name.ends_with(".yaml") || file_name.ends_with(".yml") {
        from_yaml_section(path, &content, &["deptrack"])?
    } else {
        return Err(ConfigError::Malformed {
            path: path.to_path_buf(),
            message: "unknown configuration file format".to_string(),
        });
    };

    // a file without any deptrack section is not a configuration; a present
    // section with submodule detection enabled is usable even without
    // observed dependencies
    let Some(raw) = raw else {
        return Err(ConfigError::NoObserved {
            path: path.to_path_buf(),
        });
    };
    if raw.observe.is_empty() && !raw.submodules {
        return Err(ConfigError::NoObserved {
            path: path.to_path_buf(),
        });
    }

    let tracker = TrackerConfig {
        url: raw.tracker.url.trim().to_string(),
        token: resolve_secret("tracker.token", &raw.tracker.token)?,
        email: resolve_secret("tracker.email", &raw.tracker.email)?,
    };
    if !tracker.token.is_empty() && tracker.url.is_empty() {
        return Err(ConfigError::invalid_value(
            "tracker.token",
            "provided without tracker.url",
        ));
    }

    Ok(Config {
        tracker,
        observe: raw.observe,
        submodules: raw.submodules,
    })
}

fn from_yaml_root(path: &Path, content: &str) -> Result<RawConfig, ConfigError> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Extract a nested section; `None` means the file carries no deptrack
/// configuration at all
fn from_yaml_section(
    path: &Path,
    content: &str,
    keys: &[&str],
) -> Result<Option<RawConfig>, ConfigError> {
    let mut value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    for key in keys {
        value = match value.get(*key) {
            Some(inner) => inner.clone(),
            None => return Ok(None),
        };
    }
    serde_yaml::from_value(value)
        .map(Some)
        .map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

fn from_pyproject(path: &Path, content: &str) -> Result<Option<RawConfig>, ConfigError> {
    let parsed: toml::Value = content.parse().map_err(|e: toml::de::Error| {
        ConfigError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    let Some(section) = parsed.get("tool").and_then(|t| t.get("deptrack")) else {
        return Ok(None);
    };
    section
        .clone()
        .try_into()
        .map(Some)
        .map_err(|e: toml::de::Error| ConfigError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Resolve a credential value that may point at a file or an environment
/// variable instead of carrying the secret inline
fn resolve_secret(key: &str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    if let Some(name) = value
        .strip_prefix("env://")
        .or_else(|| value.strip_prefix("env:"))
    {
        return Ok(std::env::var(name).unwrap_or_default());
    }
    if let Some(raw_path) = value
        .strip_prefix("file://")
        .or_else(|| value.strip_prefix("file:"))
    {
        let expanded = shellexpand::full(raw_path)
            .map_err(|e| ConfigError::invalid_value(key, e.to_string()))?;
        let path = PathBuf::from(expanded.as_ref());
        let content = fs::read_to_string(&path).map_err(|_| {
            ConfigError::invalid_value(key, format!("file {} does not exist", path.display()))
        })?;
        return Ok(content.trim().to_string());
    }
    Ok(value.to_string())
}
