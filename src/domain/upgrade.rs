//! Upgrade record with lazily resolved commit messages

/// Commit messages behind an upgrade.
///
/// `Unresolved` means no walk has been attempted yet; `Resolved` with an
/// empty vector means the walk ran and found nothing. The two states must
/// stay distinguishable: "no tickets found" is a valid result, "not yet
/// attempted" is not.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Messages {
    /// Commit history has not been walked yet
    #[default]
    Unresolved,
    /// Commit history was walked; messages are newest-first
    Resolved(Vec<String>),
}

impl Messages {
    /// Whether a history walk has been attempted
    pub fn is_resolved(&self) -> bool {
        matches!(self, Messages::Resolved(_))
    }

    /// The resolved messages, empty for the unresolved state
    pub fn as_slice(&self) -> &[String] {
        match self {
            Messages::Unresolved => &[],
            Messages::Resolved(messages) => messages,
        }
    }
}

/// A detected version change of one observed dependency.
///
/// Created when the pre and post snapshots of a manifest disagree on a
/// dependency's version, or when a submodule pointer moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upgrade {
    /// Observed dependency name
    pub name: String,
    /// Normalized version before the change
    pub old_version: String,
    /// Normalized version after the change
    pub new_version: String,
    /// Commit messages between the two versions, resolved lazily
    pub messages: Messages,
}

impl Upgrade {
    /// Create an upgrade whose messages have not been resolved yet
    pub fn new(
        name: impl Into<String>,
        old_version: impl Into<String>,
        new_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            old_version: old_version.into(),
            new_version: new_version.into(),
            messages: Messages::Unresolved,
        }
    }

    /// Create an upgrade with messages already resolved (submodule path)
    pub fn with_messages(mut self, messages: Vec<String>) -> Self {
        self.messages = Messages::Resolved(messages);
        self
    }

    /// Record the outcome of a commit-history walk
    pub fn resolve_messages(&mut self, messages: Vec<String>) {
        self.messages = Messages::Resolved(messages);
    }
}

impl std::fmt::Display for Upgrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} => {}", self.name, self.old_version, self.new_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_starts_unresolved() {
        let upgrade = Upgrade::new("django", "v3.2.1", "v4.0.0");
        assert_eq!(upgrade.messages, Messages::Unresolved);
        assert!(!upgrade.messages.is_resolved());
    }

    #[test]
    fn test_resolved_empty_differs_from_unresolved() {
        let mut upgrade = Upgrade::new("django", "v3.2.1", "v4.0.0");
        upgrade.resolve_messages(Vec::new());
        assert!(upgrade.messages.is_resolved());
        assert_ne!(upgrade.messages, Messages::Unresolved);
        assert!(upgrade.messages.as_slice().is_empty());
    }

    #[test]
    fn test_with_messages() {
        let upgrade =
            Upgrade::new("protocol", "abc", "def").with_messages(vec!["Fix ABC-1".to_string()]);
        assert_eq!(upgrade.messages.as_slice(), ["Fix ABC-1".to_string()]);
    }

    #[test]
    fn test_display() {
        let upgrade = Upgrade::new("django", "v3.2.1", "v4.0.0");
        assert_eq!(upgrade.to_string(), "django v3.2.1 => v4.0.0");
    }
}
