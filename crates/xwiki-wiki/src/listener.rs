//! Keeps the descriptor caches in sync with descriptor documents.

use tracing::{debug, warn};

use crate::builder::WikiDescriptorBuilder;
use crate::document::Document;
use crate::error::Result;
use crate::manager::WikiDescriptorManager;
use crate::observation::{DocumentEvent, EventListener};

const EVENTS: [DocumentEvent; 3] = [
    DocumentEvent::Created,
    DocumentEvent::Updated,
    DocumentEvent::Deleted,
];

/// Refreshes wiki descriptors on document changes.
///
/// On update or deletion, the descriptor built from the original document is
/// unregistered. Then, if the current document carries server objects, the
/// rebuilt descriptor is registered.
#[derive(Debug, Clone)]
pub struct WikiDescriptorListener {
    builder: WikiDescriptorBuilder,
    manager: WikiDescriptorManager,
}

impl WikiDescriptorListener {
    /// Listener name.
    pub const NAME: &'static str = "wikidescriptor";

    /// Create a listener updating `manager`.
    pub fn new(manager: WikiDescriptorManager) -> Self {
        Self {
            builder: WikiDescriptorBuilder::new(),
            manager,
        }
    }

    /// An original that does not build a descriptor has nothing registered,
    /// so there is nothing to remove.
    fn remove_existing_descriptor(&self, original: &Document) -> Result<()> {
        let existing = match self.builder.build_from_document(original) {
            Ok(Some(existing)) => existing,
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!(document = %original.reference, error = %e, "Previous descriptor is unusable, skipping removal");
                return Ok(());
            }
        };
        debug!(wiki = %existing.id, document = %original.reference, "Unregistering previous descriptor");
        self.manager.remove(&existing)?;
        Ok(())
    }
}

impl EventListener for WikiDescriptorListener {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn events(&self) -> &[DocumentEvent] {
        &EVENTS
    }

    fn on_event(&self, event: DocumentEvent, document: &Document) -> Result<()> {
        if matches!(event, DocumentEvent::Updated | DocumentEvent::Deleted)
            && let Some(original) = document.original_document()
        {
            self.remove_existing_descriptor(original)?;
        }

        if let Some(descriptor) = self.builder.build_from_document(document)? {
            self.manager.set(descriptor)?;
        }
        Ok(())
    }
}
