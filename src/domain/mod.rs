//! Core domain models for deptrack
//!
//! This module contains the fundamental types used throughout the application:
//! - Observed dependency descriptors supplied by configuration
//! - Version snapshots extracted from manifest files
//! - Upgrade records with lazily resolved commit messages
//! - Issue-tracker ticket records

mod dependency;
mod ticket;
mod upgrade;

pub use dependency::ObservedDependency;
pub use ticket::Ticket;
pub use upgrade::{Messages, Upgrade};

use std::collections::BTreeMap;

/// Mapping of dependency name to normalized version string, produced by one
/// manifest parser applied to one file's content at one revision.
///
/// Normalized versions are `v`-prefixed semantic versions where one could be
/// extracted, or the raw revision/ref string for non-semver cases such as git
/// submodule commit hashes.
pub type VersionSnapshot = BTreeMap<String, String>;
