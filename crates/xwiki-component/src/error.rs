//! Error types for component lookups.

/// Error type for component registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    /// No component is registered for the role and hint.
    #[error("component not found: role '{role}', hint '{hint}'")]
    NotFound { role: &'static str, hint: String },
}

/// Result type for component registry operations.
pub type Result<T> = std::result::Result<T, ComponentError>;
