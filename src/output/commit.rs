//! Commit-trailer output format

use super::Formatter;
use crate::domain::{Ticket, Upgrade};
use std::io::{self, Write};

/// Column at which ticket lists wrap onto an indented continuation line
const WRAP_COLUMN: usize = 70;

/// Renders `Dep-Change:` trailer lines for commit messages.
///
/// Long versions (submodule commit hashes) are shortened to seven
/// characters. Ticket names are joined with commas and wrapped so the
/// trailer stays readable in `git log`.
pub struct CommitFormatter;

fn shorten(version: &str) -> String {
    if version.chars().count() > 10 {
        version.chars().take(7).collect()
    } else {
        version.to_string()
    }
}

impl Formatter for CommitFormatter {
    fn needs_details(&self) -> bool {
        false
    }

    fn print(
        &self,
        upgrade: &Upgrade,
        tickets: &[Ticket],
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        let mut chars = 0;
        let mut sep = " ";

        write!(writer, "\n")?;
        let header = format!("Dep-Change: {} ", upgrade.name);
        write!(writer, "{header}")?;
        chars += header.len();
        if chars > WRAP_COLUMN {
            write!(writer, "\n    ")?;
            chars = 5;
        }

        let versions = format!(
            "({} -> {})",
            shorten(&upgrade.old_version),
            shorten(&upgrade.new_version)
        );
        write!(writer, "{versions}")?;
        chars += versions.len();

        for ticket in tickets {
            if chars + ticket.name.len() >= WRAP_COLUMN {
                let trailing = sep.trim_end();
                write!(writer, "{trailing}")?;
                chars += trailing.len();
                write!(writer, "\n    ")?;
                chars = 4;
                sep = "";
            }
            write!(writer, "{sep}")?;
            chars += sep.len();
            sep = ", ";
            write!(writer, "{}", ticket.name)?;
            chars += ticket.name.len();
        }
        Ok(())
    }
}
