//! Markdown output format for release notes

use super::Formatter;
use crate::domain::{Ticket, Upgrade};
use std::io::{self, Write};

/// Renders a markdown section per upgrade with ticket links
pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
    fn needs_details(&self) -> bool {
        true
    }

    fn print(
        &self,
        upgrade: &Upgrade,
        tickets: &[Ticket],
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        write!(writer, "\n### Dependency change {upgrade}:\n")?;
        for ticket in tickets {
            if ticket.summary.is_empty() {
                writeln!(writer, "- {}: {}", ticket.name, ticket.url)?;
            } else {
                writeln!(writer, "- [{}]({}): {}", ticket.name, ticket.url, ticket.summary)?;
            }
        }
        Ok(())
    }
}
