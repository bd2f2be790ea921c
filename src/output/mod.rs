//! Output formatting for resolved upgrades
//!
//! Three formats are supported:
//! - `commit` (alias `short`): `Dep-Change:` trailer lines suitable for
//!   appending to a commit message
//! - `detail` (alias `detailed`): human-readable listing with ticket
//!   summaries
//! - `markdown` (alias `md`): release-notes style listing with ticket links

mod commit;
mod detail;
mod markdown;

pub use commit::CommitFormatter;
pub use detail::DetailFormatter;
pub use markdown::MarkdownFormatter;

use crate::domain::{Ticket, Upgrade};
use crate::error::ConfigError;
use std::io::{self, Write};

/// One upgrade rendered to a writer
pub trait Formatter {
    /// Whether this format uses ticket summaries, and therefore whether
    /// the tracker API is worth calling at all
    fn needs_details(&self) -> bool;

    /// Render one upgrade and its tickets
    fn print(
        &self,
        upgrade: &Upgrade,
        tickets: &[Ticket],
        writer: &mut dyn Write,
    ) -> io::Result<()>;
}

/// Look up a formatter by its configured name
pub fn create_formatter(name: &str) -> Result<Box<dyn Formatter>, ConfigError> {
    match name {
        "commit" | "short" => Ok(Box::new(CommitFormatter)),
        "detail" | "detailed" => Ok(Box::new(DetailFormatter)),
        "markdown" | "md" => Ok(Box::new(MarkdownFormatter)),
        _ => Err(ConfigError::UnknownFormat {
            name: name.to_string(),
        }),
    }
}
