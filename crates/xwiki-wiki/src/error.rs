//! Error types for wiki descriptor handling.

use thiserror::Error;

/// Result type alias for wiki operations.
pub type Result<T> = std::result::Result<T, WikiError>;

/// Errors that can occur while managing wiki descriptors.
#[derive(Debug, Error)]
pub enum WikiError {
    /// The descriptor caches failed.
    #[error(transparent)]
    Cache(#[from] xwiki_cache::CacheError),

    /// A descriptor document could not be turned into a descriptor.
    #[error("invalid wiki descriptor document '{document}': {reason}")]
    InvalidDescriptor { document: String, reason: String },
}
