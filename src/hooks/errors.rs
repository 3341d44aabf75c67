//! Hook engine error types

use thiserror::Error;

use super::stage::Stage;

/// Result type for hook operations
pub type HookResult<T> = Result<T, HookError>;

/// Errors raised by hook registration, resolution, and execution
#[derive(Debug, Clone, Error)]
pub enum HookError {
    /// The HTTP verb is not one the registry knows
    #[error("Unsupported method: {0}")]
    UnknownMethod(String),

    /// No compiled model exists for the vocabulary
    #[error("Unknown api root: {0}")]
    UnknownApiRoot(String),

    /// The resource does not resolve to a table in the vocabulary's model
    #[error("Unknown resource for api root: {0}, {1}")]
    UnknownResource(String, String),

    /// A hook on all vocabularies must also cover all resources
    #[error("When registering a hook on all apis the resource must also be 'all', got: '{0}'")]
    WildcardResourceRequired(String),

    /// The executor was handed a stage context missing a required payload
    #[error("{stage} hooks require a {field} payload")]
    MissingStagePayload {
        stage: Stage,
        field: &'static str,
    },

    /// A hook callback failed during a lifecycle stage
    #[error("{stage} hook failed: {message}")]
    HookFailed { stage: Stage, message: String },

    /// A failure raised from inside a hook callback
    #[error("{0}")]
    Callback(String),
}

impl HookError {
    /// A callback failure with the given message.
    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = HookError::UnknownResource("canine".into(), "v1".into());
        assert!(err.to_string().contains("canine"));
        assert!(err.to_string().contains("v1"));

        let err = HookError::MissingStagePayload {
            stage: Stage::Prerun,
            field: "transaction",
        };
        assert!(err.to_string().contains("PRERUN"));
        assert!(err.to_string().contains("transaction"));
    }
}
