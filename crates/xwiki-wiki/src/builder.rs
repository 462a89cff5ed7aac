//! Build descriptors from descriptor documents.

use tracing::trace;

use crate::descriptor::WikiDescriptor;
use crate::document::{BaseObject, Document};
use crate::error::{Result, WikiError};

/// Class of the objects describing a wiki.
pub const SERVER_CLASS: &str = "XWiki.XWikiServerClass";

/// Space holding descriptor documents.
pub const SERVER_SPACE: &str = "XWiki";

/// Name prefix of descriptor documents (`XWiki.XWikiServer<Name>`).
pub const SERVER_DOCUMENT_PREFIX: &str = "XWikiServer";

const SERVER_PROPERTY: &str = "server";
const PRETTY_NAME_PROPERTY: &str = "prettyname";
const OWNER_PROPERTY: &str = "owner";
const DESCRIPTION_PROPERTY: &str = "description";

/// Turns `XWiki.XWikiServerClass` objects into a [`WikiDescriptor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WikiDescriptorBuilder;

impl WikiDescriptorBuilder {
    /// Create a builder.
    pub fn new() -> Self {
        Self
    }

    /// Wiki id encoded in a descriptor document name, if it is one.
    pub fn wiki_id(document: &Document) -> Option<String> {
        if document.reference.space != SERVER_SPACE {
            return None;
        }
        document
            .reference
            .name
            .strip_prefix(SERVER_DOCUMENT_PREFIX)
            .map(str::to_lowercase)
    }

    /// Build the descriptor held by `document`.
    ///
    /// Returns `Ok(None)` for documents that are not descriptor documents or
    /// carry no server objects.
    pub fn build_from_document(&self, document: &Document) -> Result<Option<WikiDescriptor>> {
        let objects = document.x_objects(SERVER_CLASS);
        if objects.is_empty() {
            return Ok(None);
        }
        self.build(&objects, document)
    }

    /// Build a descriptor from server objects found on `document`.
    ///
    /// Every object contributes its `server` property as an alias; the first
    /// object also supplies the display name, owner and description.
    pub fn build(
        &self,
        objects: &[&BaseObject],
        document: &Document,
    ) -> Result<Option<WikiDescriptor>> {
        let Some(first) = objects.first() else {
            return Ok(None);
        };
        let Some(id) = Self::wiki_id(document) else {
            trace!(document = %document.reference, "Not a wiki descriptor document");
            return Ok(None);
        };

        if id.is_empty() {
            return Err(WikiError::InvalidDescriptor {
                document: document.reference.to_string(),
                reason: "document name has no wiki id after the prefix".to_string(),
            });
        }

        let aliases: Vec<String> = objects
            .iter()
            .filter_map(|o| o.property(SERVER_PROPERTY))
            .map(str::to_string)
            .collect();
        if aliases.is_empty() {
            return Err(WikiError::InvalidDescriptor {
                document: document.reference.to_string(),
                reason: "no server alias".to_string(),
            });
        }

        Ok(Some(WikiDescriptor {
            id,
            aliases,
            pretty_name: first.property(PRETTY_NAME_PROPERTY).map(str::to_string),
            owner_id: first.property(OWNER_PROPERTY).map(str::to_string),
            description: first.property(DESCRIPTION_PROPERTY).map(str::to_string),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentReference;

    fn descriptor_document(name: &str) -> Document {
        Document::new(DocumentReference::new("xwiki", "XWiki", name))
    }

    fn server(alias: &str) -> BaseObject {
        BaseObject::new(SERVER_CLASS).with_property("server", alias)
    }

    #[test]
    fn test_build_full_descriptor() {
        let doc = descriptor_document("XWikiServerDev")
            .with_object(
                server("dev.example.org")
                    .with_property("prettyname", "Development")
                    .with_property("owner", "XWiki.Admin")
                    .with_property("description", "Sandbox"),
            )
            .with_object(server("dev.local").with_property("prettyname", "ignored"));

        let descriptor = WikiDescriptorBuilder::new()
            .build_from_document(&doc)
            .unwrap()
            .unwrap();

        assert_eq!(descriptor.id, "dev");
        assert_eq!(descriptor.aliases, vec!["dev.example.org", "dev.local"]);
        assert_eq!(descriptor.default_alias(), Some("dev.example.org"));
        assert_eq!(descriptor.pretty_name.as_deref(), Some("Development"));
        assert_eq!(descriptor.owner_id.as_deref(), Some("XWiki.Admin"));
        assert_eq!(descriptor.description.as_deref(), Some("Sandbox"));
    }

    #[test]
    fn test_wrong_name_is_not_a_descriptor() {
        let doc = descriptor_document("WebHome").with_object(server("dev.example.org"));
        assert_eq!(WikiDescriptorBuilder::new().build_from_document(&doc).unwrap(), None);

        let other_space = Document::new(DocumentReference::new("xwiki", "Main", "XWikiServerDev"))
            .with_object(server("dev.example.org"));
        assert_eq!(
            WikiDescriptorBuilder::new().build_from_document(&other_space).unwrap(),
            None
        );
    }

    #[test]
    fn test_no_server_objects() {
        let doc = descriptor_document("XWikiServerDev");
        assert_eq!(WikiDescriptorBuilder::new().build_from_document(&doc).unwrap(), None);
    }

    #[test]
    fn test_missing_alias_is_invalid() {
        let doc = descriptor_document("XWikiServerDev")
            .with_object(BaseObject::new(SERVER_CLASS).with_property("prettyname", "Dev"));

        let err = WikiDescriptorBuilder::new().build_from_document(&doc).unwrap_err();
        assert!(matches!(err, WikiError::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_empty_id_is_invalid() {
        let doc = descriptor_document("XWikiServer").with_object(server("example.org"));

        let err = WikiDescriptorBuilder::new().build_from_document(&doc).unwrap_err();
        assert!(matches!(err, WikiError::InvalidDescriptor { .. }));
    }
}
