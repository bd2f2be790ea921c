//! Command line interface definition

use crate::walker;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Detect dependency upgrades and the tickets behind them
#[derive(Parser, Debug)]
#[command(name = "deptrack", version, about)]
pub struct CliArgs {
    /// Base revision to diff against (commit hash, tag, branch or revspec);
    /// defaults to HEAD with uncommitted changes, HEAD^ on a clean tree
    #[arg(short = 'r', long = "ref")]
    pub rev: Option<String>,

    /// Configuration file path; default searches .deptrack.yaml,
    /// pyproject.toml and west.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: commit, detail or markdown
    #[arg(short, long, default_value = "commit")]
    pub format: String,

    /// Directory for cached dependency repository mirrors
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Maximum number of commits walked per upgrade
    #[arg(long, default_value_t = walker::DEFAULT_MESSAGE_LIMIT)]
    pub limit: usize,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Extra arguments passed by git hooks; a COMMIT_EDITMSG path switches
    /// output into the commit message file
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}

impl CliArgs {
    /// Commit message file handed over by the prepare-commit-msg hook, if
    /// the invocation came from one
    pub fn commit_message_file(&self) -> Option<&Path> {
        self.args
            .iter()
            .find(|arg| arg.ends_with("COMMIT_EDITMSG"))
            .map(Path::new)
    }
}
