//! Observed dependency descriptor

/// A dependency the user configured this tool to track.
///
/// Only observed dependencies ever produce [`Upgrade`](super::Upgrade)
/// records; everything else in a changed manifest is ignored. The name is
/// the identity and is unique within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedDependency {
    /// Dependency name as it appears in manifest files
    pub name: String,
    /// URL of the dependency's own source repository
    pub url: String,
}

impl ObservedDependency {
    /// Create a new observed dependency
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

impl std::fmt::Display for ObservedDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let dep = ObservedDependency::new("protocol", "github.com/acme/protocol");
        assert_eq!(dep.name, "protocol");
        assert_eq!(dep.url, "github.com/acme/protocol");
    }

    #[test]
    fn test_display_is_name() {
        let dep = ObservedDependency::new("harald", "github.com/acme/harald");
        assert_eq!(dep.to_string(), "harald");
    }
}
