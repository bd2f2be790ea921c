//! Application error types using thiserror
//!
//! Error hierarchy:
//! - RepoError: revision resolution and blob access against the project repository
//! - ManifestError: issues with manifest file parsing
//! - CacheError: clone/fetch failures against dependency repositories
//! - ConfigError: issues with configuration loading
//! - TrackerError: issues with the issue-tracker API

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Project repository related errors
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Dependency repository cache related errors
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Issue tracker related errors
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Errors raised while resolving revisions or reading file content from
/// the project's own repository
#[derive(Error, Debug)]
pub enum RepoError {
    /// The resolved revision does not exist in the repository.
    /// Fatal for the whole run: every computation depends on the base revision.
    #[error("revision {rev} does not exist")]
    RevisionNotFound { rev: String },

    /// A changed path is absent from the old tree or the working directory.
    /// Fatal only for that file's contribution.
    #[error("file {path} does not exist")]
    FileNotFound { path: PathBuf },

    /// Underlying git operation failed
    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),
}

/// Errors related to manifest file parsing
#[derive(Error, Debug)]
pub enum ManifestError {
    /// A recognized file failed to parse as valid TOML/YAML
    #[error("failed to parse {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// A changed file matches no manifest parser
    #[error("no dependency parser for {path}")]
    UnsupportedFormat { path: PathBuf },
}

/// Errors related to the dependency repository cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// Clone or fetch of a dependency's repository failed.
    /// Recovered per upgrade: the failed one is skipped, siblings proceed.
    #[error("dependency {name} unavailable from {url}: {message}")]
    Unavailable {
        name: String,
        url: String,
        message: String,
    },

    /// Cache directory could not be created or written
    #[error("cache IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No configuration file found in the default search paths
    #[error("no configuration file found (searched {searched})")]
    NotFound { searched: String },

    /// Configuration file failed to parse
    #[error("failed to parse configuration {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// Configuration contains no observed dependencies
    #[error("no observed dependencies configured in {path}")]
    NoObserved { path: PathBuf },

    /// A configuration value is invalid or unusable
    #[error("invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown output format name
    #[error("unknown output format {name}: expected commit, detail or markdown")]
    UnknownFormat { name: String },
}

/// Errors related to the issue-tracker API
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The tracker rejected the configured credentials
    #[error("invalid tracker credentials for {url}")]
    InvalidCredentials { url: String },

    /// A ticket-detail request failed
    #[error("failed to fetch ticket {ticket}: {message}")]
    Http { ticket: String, message: String },
}

impl RepoError {
    /// Creates a new RevisionNotFound error
    pub fn revision_not_found(rev: impl Into<String>) -> Self {
        RepoError::RevisionNotFound { rev: rev.into() }
    }

    /// Creates a new FileNotFound error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        RepoError::FileNotFound { path: path.into() }
    }
}

impl ManifestError {
    /// Creates a new Malformed error
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new UnsupportedFormat error
    pub fn unsupported_format(path: impl Into<PathBuf>) -> Self {
        ManifestError::UnsupportedFormat { path: path.into() }
    }
}

impl CacheError {
    /// Creates a new Unavailable error
    pub fn unavailable(
        name: impl Into<String>,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CacheError::Unavailable {
            name: name.into(),
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new cache IO error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}

impl ConfigError {
    /// Creates a new InvalidValue error
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
