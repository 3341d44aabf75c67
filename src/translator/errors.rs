//! Translator error types
//!
//! All of these indicate a mis-declared model pair and are fatal at load
//! time; none are constructed on the request path.

use thiserror::Error;

/// Result type for translation operations
pub type TranslationResult<T> = Result<T, TranslationError>;

/// Errors raised while merging two model versions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// A translation definition names tables absent from the source model
    #[error("Tried to define non-existent resources: '{0}'")]
    NonexistentTables(String),

    /// A definition's explicit target resource does not exist
    #[error("Unknown target resource: '{0}'")]
    UnknownTargetResource(String),

    /// A definition's implicit `name$version` target does not exist
    #[error("Missing target resource: '{0}'")]
    MissingTargetResource(String),

    /// A source table has neither a definition nor a same-named twin in the
    /// target version
    #[error("Missing translation for: '{0}'")]
    MissingTranslation(String),

    /// An alias map names fields the resource does not declare
    #[error("Tried to alias non-existent fields: '{0}'")]
    AliasNonexistentFields(String),

    /// An alias map targets a resource that does not exist
    #[error("Tried to alias to a non-existent resource: '{0}'")]
    AliasUnknownResource(String),
}
