//! deptrack - Dependency upgrade detection and ticket correlation
//!
//! This library detects version changes of observed third-party dependencies
//! between a base revision and the working tree of a git repository, then
//! correlates each upgrade with issue-tracker tickets referenced from the
//! dependency's own commit history:
//! - Manifest parsing (pyproject.toml, pubspec.yaml, west.yaml)
//! - Submodule pointer-change detection
//! - Bare mirror cache of dependency repositories
//! - Bounded commit-history walks and ticket extraction
//! - Commit-trailer, detail and markdown output

pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod matcher;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod repo;
pub mod submodule;
pub mod tickets;
pub mod tracker;
pub mod walker;
