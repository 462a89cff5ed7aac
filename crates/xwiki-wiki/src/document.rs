//! Minimal document model carried by document events.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a document: `wiki:space.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentReference {
    /// Wiki holding the document.
    pub wiki: String,
    /// Space (for descriptor documents, `XWiki`).
    pub space: String,
    /// Page name.
    pub name: String,
}

impl DocumentReference {
    /// Create a reference.
    pub fn new(wiki: impl Into<String>, space: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            wiki: wiki.into(),
            space: space.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.wiki, self.space, self.name)
    }
}

/// An object attached to a document: a class name plus string properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseObject {
    /// Full class name, e.g. `XWiki.XWikiServerClass`.
    pub class: String,

    /// Property values by name.
    #[serde(flatten)]
    pub properties: BTreeMap<String, String>,
}

impl BaseObject {
    /// Create an object of `class` with no properties.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Set a property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Value of a property. Blank values count as absent.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// A document and, for updates and deletions, its state before the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Where the document lives.
    pub reference: DocumentReference,

    /// Attached objects, in document order.
    #[serde(default)]
    pub objects: Vec<BaseObject>,

    /// Document before the change that produced this event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<Box<Document>>,
}

impl Document {
    /// Create an empty document.
    pub fn new(reference: DocumentReference) -> Self {
        Self {
            reference,
            objects: Vec::new(),
            original: None,
        }
    }

    /// Attach an object.
    pub fn with_object(mut self, object: BaseObject) -> Self {
        self.objects.push(object);
        self
    }

    /// Record the state before the change.
    pub fn with_original(mut self, original: Document) -> Self {
        self.original = Some(Box::new(original));
        self
    }

    /// Payload of a deletion: an empty document whose original is `document`.
    pub fn deleted(document: Document) -> Self {
        Self::new(document.reference.clone()).with_original(document)
    }

    /// Objects of the given class.
    pub fn x_objects(&self, class: &str) -> Vec<&BaseObject> {
        self.objects.iter().filter(|o| o.class == class).collect()
    }

    /// The document before the change, if known.
    pub fn original_document(&self) -> Option<&Document> {
        self.original.as_deref()
    }
}
