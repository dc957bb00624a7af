//! Language registry: static per-language execution configuration.
//!
//! The registry is loaded once at process start and never mutated. Each
//! entry maps a language identifier to the runtime image, the source-file
//! extension, and the launch command template used to run a submission.

use crate::error::{PoolError, Result};
use std::collections::HashMap;

/// Placeholder in command templates, substituted with the absolute path of
/// the injected source file.
pub const FILEPATH_PLACEHOLDER: &str = "{filepath}";

/// Immutable execution configuration for one supported language.
#[derive(Debug, Clone)]
pub struct LanguageSpec {
    /// Language identifier (`python`, `ruby`, ...).
    pub id: String,
    /// Runtime image reference.
    pub image: String,
    /// Source-file extension, including the leading dot.
    pub extension: String,
    /// Launch command template; elements may contain
    /// [`FILEPATH_PLACEHOLDER`].
    pub command: Vec<String>,
}

impl LanguageSpec {
    /// Build a spec from its parts.
    pub fn new(
        id: impl Into<String>,
        image: impl Into<String>,
        extension: impl Into<String>,
        command: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            image: image.into(),
            extension: extension.into(),
            command: command.iter().map(|part| part.to_string()).collect(),
        }
    }
}

/// Read-only lookup from language identifier to [`LanguageSpec`].
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    specs: HashMap<String, LanguageSpec>,
}

impl LanguageRegistry {
    /// Build a registry from an iterator of specs.
    pub fn new(specs: impl IntoIterator<Item = LanguageSpec>) -> Self {
        Self {
            specs: specs
                .into_iter()
                .map(|spec| (spec.id.clone(), spec))
                .collect(),
        }
    }

    /// Registry with the built-in languages.
    pub fn with_defaults() -> Self {
        Self::new([
            LanguageSpec::new(
                "python",
                "python-numpy:3.10-alpine",
                ".py",
                &["python3", FILEPATH_PLACEHOLDER],
            ),
            LanguageSpec::new("ruby", "ruby:3.2-alpine", ".rb", &["ruby", FILEPATH_PLACEHOLDER]),
        ])
    }

    /// Look up the spec for a language.
    ///
    /// # Errors
    /// Returns [`PoolError::UnknownLanguage`] if the language is not
    /// registered. No side effects either way.
    pub fn spec(&self, language: &str) -> Result<&LanguageSpec> {
        self.specs
            .get(language)
            .ok_or_else(|| PoolError::UnknownLanguage {
                language: language.to_string(),
            })
    }

    /// Iterate over the registered language identifiers.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    /// Number of registered languages.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_carry_python_and_ruby() {
        let registry = LanguageRegistry::with_defaults();
        assert_eq!(registry.len(), 2);

        let python = registry.spec("python").expect("python registered");
        assert_eq!(python.image, "python-numpy:3.10-alpine");
        assert_eq!(python.extension, ".py");
        assert_eq!(python.command, vec!["python3", "{filepath}"]);

        let ruby = registry.spec("ruby").expect("ruby registered");
        assert_eq!(ruby.image, "ruby:3.2-alpine");
        assert_eq!(ruby.extension, ".rb");
    }

    #[test]
    fn test_unknown_language() {
        let registry = LanguageRegistry::with_defaults();
        let err = registry.spec("cobol").unwrap_err();
        assert!(matches!(
            err,
            PoolError::UnknownLanguage { language } if language == "cobol"
        ));
    }

    #[test]
    fn test_custom_registry() {
        let registry = LanguageRegistry::new([LanguageSpec::new(
            "node",
            "node:20-alpine",
            ".js",
            &["node", FILEPATH_PLACEHOLDER],
        )]);
        assert!(registry.spec("node").is_ok());
        assert!(registry.spec("python").is_err());
    }
}
