//! Synchronous in-process document event dispatch.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::document::Document;
use crate::error::Result;

/// A change to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentEvent {
    /// The document was created.
    Created,
    /// The document was saved over a previous version.
    Updated,
    /// The document was deleted.
    Deleted,
}

impl fmt::Display for DocumentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentEvent::Created => write!(f, "created"),
            DocumentEvent::Updated => write!(f, "updated"),
            DocumentEvent::Deleted => write!(f, "deleted"),
        }
    }
}

/// Receives document events it subscribed to.
pub trait EventListener: Send + Sync {
    /// Unique listener name.
    fn name(&self) -> &str;

    /// Events this listener wants.
    fn events(&self) -> &[DocumentEvent];

    /// Handle an event. `document` is the document after the change; its
    /// original carries the state before it.
    fn on_event(&self, event: DocumentEvent, document: &Document) -> Result<()>;
}

/// Dispatches document events to listeners.
#[derive(Default)]
pub struct ObservationManager {
    /// Listeners grouped by event.
    listeners: RwLock<HashMap<DocumentEvent, Vec<Arc<dyn EventListener>>>>,
}

impl ObservationManager {
    /// Create a manager with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to the events it declares. A listener with the
    /// same name is replaced.
    pub fn add_listener(&self, listener: Arc<dyn EventListener>) {
        self.remove_listener(listener.name());

        let mut listeners = self.listeners.write();
        for event in listener.events() {
            listeners
                .entry(*event)
                .or_default()
                .push(Arc::clone(&listener));
        }
    }

    /// Unsubscribe the listener called `name`. Returns `true` if it was
    /// registered.
    pub fn remove_listener(&self, name: &str) -> bool {
        let mut removed = false;
        for group in self.listeners.write().values_mut() {
            let before = group.len();
            group.retain(|l| l.name() != name);
            removed |= group.len() != before;
        }
        removed
    }

    /// Names of the registered listeners, sorted.
    pub fn listener_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .listeners
            .read()
            .values()
            .flatten()
            .map(|l| l.name().to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Deliver `event` to its subscribers on the calling thread.
    ///
    /// A failing listener is logged and does not stop delivery to the
    /// others. Returns the number of listeners that handled the event.
    pub fn notify(&self, event: DocumentEvent, document: &Document) -> usize {
        let subscribers = self
            .listeners
            .read()
            .get(&event)
            .cloned()
            .unwrap_or_default();

        let mut handled = 0;
        for listener in subscribers {
            trace!(listener = %listener.name(), event = %event, document = %document.reference, "Dispatching");
            match listener.on_event(event, document) {
                Ok(()) => handled += 1,
                Err(e) => warn!(
                    listener = %listener.name(),
                    event = %event,
                    document = %document.reference,
                    error = %e,
                    "Event listener failed"
                ),
            }
        }
        handled
    }
}

impl fmt::Debug for ObservationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationManager")
            .field("listeners", &self.listener_names())
            .finish()
    }
}
