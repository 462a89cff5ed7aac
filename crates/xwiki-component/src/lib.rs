//! Role/hint component registry.
//!
//! Components are registered as singletons under a *role* (a Rust type,
//! usually a trait object such as `dyn CacheFactory`) and a *role hint* (a
//! string selecting among several implementations of that role). Every
//! lookup of the same role and hint hands back the same `Arc`.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use xwiki_component::ComponentManager;
//!
//! let components = ComponentManager::new();
//! components.register::<dyn Greeter>("default", Arc::new(EnglishGreeter));
//!
//! let greeter = components.lookup_default::<dyn Greeter>()?;
//! ```

mod error;
mod manager;

pub use error::{ComponentError, Result};
pub use manager::{ComponentManager, DEFAULT_HINT};
