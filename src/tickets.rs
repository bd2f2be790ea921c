//! Ticket reference extraction from commit messages

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Issue-tracker identifiers: uppercase project key, dash, number
static TICKET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]+-\d+").unwrap());

/// Extract ticket names from a single commit message, deduplicated
pub fn extract_ticket_names(message: &str) -> BTreeSet<String> {
    TICKET_RE
        .find_iter(message)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Union of ticket names across all messages of one upgrade.
///
/// An empty result means "no tickets found" and is not an error.
pub fn collect_ticket_names(messages: &[String]) -> BTreeSet<String> {
    messages
        .iter()
        .flat_map(|m| extract_ticket_names(m))
        .collect()
}
