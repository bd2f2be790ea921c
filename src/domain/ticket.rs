//! Issue-tracker ticket record

/// A ticket referenced from a dependency's commit messages.
///
/// The name (e.g. `ABC-123`) is the identity; url and summary are optional
/// enrichments added by the tracker client. Tickets are deduplicated by name
/// across all messages of one upgrade.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket {
    /// Canonical ticket identifier
    pub name: String,
    /// Browse URL, empty when no tracker is configured
    pub url: String,
    /// Ticket summary, empty when details were not fetched
    pub summary: String,
}

impl Ticket {
    /// Create a ticket with only its name populated
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: String::new(),
            summary: String::new(),
        }
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.summary.is_empty() {
            write!(f, "{}: {} ({})", self.name, self.summary, self.url)
        } else if !self.url.is_empty() {
            write!(f, "{}: {}", self.name, self.url)
        } else {
            write!(f, "{}", self.name)
        }
    }
}
