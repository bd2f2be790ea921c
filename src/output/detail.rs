//! Human-readable detail output format

use super::Formatter;
use crate::domain::{Ticket, Upgrade};
use std::io::{self, Write};

/// Renders one block per upgrade with a line per ticket, including the
/// ticket summary when it was fetched.
pub struct DetailFormatter;

impl Formatter for DetailFormatter {
    fn needs_details(&self) -> bool {
        true
    }

    fn print(
        &self,
        upgrade: &Upgrade,
        tickets: &[Ticket],
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        write!(writer, "\nDependency change {upgrade}:\n")?;
        for ticket in tickets {
            if ticket.summary.is_empty() {
                writeln!(writer, "  {}: {}", ticket.name, ticket.url)?;
            } else {
                writeln!(writer, "  {}: {} ({})", ticket.name, ticket.summary, ticket.url)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(upgrade: &Upgrade, tickets: &[Ticket]) -> String {
        let mut buf = Vec::new();
        DetailFormatter.print(upgrade, tickets, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_block_with_summaries() {
        let upgrade = Upgrade::new("protocol", "v1.2.3", "v1.3.0");
        let mut with_summary = Ticket::new("ABC-12");
        with_summary.url = "https://t.example.com/browse/ABC-12".to_string();
        with_summary.summary = "Fix handshake".to_string();
        let mut url_only = Ticket::new("ABC-34");
        url_only.url = "https://t.example.com/browse/ABC-34".to_string();

        let out = render(&upgrade, &[with_summary, url_only]);
        assert_eq!(
            out,
            "\nDependency change protocol v1.2.3 => v1.3.0:\n\
             \x20 ABC-12: Fix handshake (https://t.example.com/browse/ABC-12)\n\
             \x20 ABC-34: https://t.example.com/browse/ABC-34\n"
        );
    }
}
