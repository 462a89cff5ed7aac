//! Error types for cache operations.

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache was disposed and can no longer be used.
    #[error("Cache disposed: {0}")]
    Disposed(String),

    /// A stored value does not have the type the cache handle expects.
    #[error("Cached value for key '{key}' is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    /// The configuration cannot be used to build a cache.
    #[error("Invalid cache configuration: {0}")]
    InvalidConfiguration(String),

    /// The cache factory could not be resolved.
    #[error(transparent)]
    Component(#[from] xwiki_component::ComponentError),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
