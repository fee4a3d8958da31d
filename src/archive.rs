use crate::constants::ARCHIVE_SUFFIX_BYTES;
use rand::Rng;
use std::fmt;

/// Archive name of the form `<name>-<12 hex chars>`.
///
/// The suffix comes from the thread-local CSPRNG. Collisions are not
/// checked; with 48 random bits they are not expected in practice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveIdentifier {
    name: String,
    suffix: String,
}

impl ArchiveIdentifier {
    /// Generates a fresh identifier for the backup set `name`.
    pub fn generate(name: &str) -> Self {
        let mut bytes = [0u8; ARCHIVE_SUFFIX_BYTES];
        rand::rng().fill(&mut bytes);
        Self::with_suffix(name, &bytes)
    }

    fn with_suffix(name: &str, bytes: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            suffix: hex::encode(bytes),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl fmt::Display for ArchiveIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.suffix)
    }
}

/// Prefix shared by every archive of the backup set `name`.
pub fn archive_prefix(name: &str) -> String {
    format!("{name}-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let id = ArchiveIdentifier::generate("home");
        let rendered = id.to_string();
        assert!(rendered.starts_with(&archive_prefix("home")));
        assert_eq!(id.suffix().len(), 12);
        assert!(id.suffix().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_with_suffix() {
        let id = ArchiveIdentifier::with_suffix("docs", &[0x00, 0x1f, 0xa0, 0xff, 0x10, 0x02]);
        assert_eq!(id.to_string(), "docs-001fa0ff1002");
    }

    #[test]
    fn test_fresh_per_call() {
        let a = ArchiveIdentifier::generate("home");
        let b = ArchiveIdentifier::generate("home");
        assert_ne!(a, b);
    }
}
