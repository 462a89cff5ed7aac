//! Wiki descriptors for a multi-wiki farm.
//!
//! A sub-wiki is described by a document `XWiki.XWikiServer<Name>` holding
//! `XWiki.XWikiServerClass` objects. This crate turns those documents into
//! [`WikiDescriptor`]s, keeps them in a pair of caches (by id and by alias)
//! and refreshes the caches when descriptor documents are created, updated
//! or deleted.

pub mod builder;
pub mod cache;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod listener;
pub mod manager;
pub mod observation;

pub use builder::{SERVER_CLASS, SERVER_DOCUMENT_PREFIX, WikiDescriptorBuilder};
pub use cache::{ALIAS_CACHE_ID, ID_CACHE_ID, WikiDescriptorCache};
pub use descriptor::WikiDescriptor;
pub use document::{BaseObject, Document, DocumentReference};
pub use error::{Result, WikiError};
pub use listener::WikiDescriptorListener;
pub use manager::WikiDescriptorManager;
pub use observation::{DocumentEvent, EventListener, ObservationManager};
