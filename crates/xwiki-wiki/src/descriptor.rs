//! Wiki descriptor value.

use serde::{Deserialize, Serialize};

/// Metadata of one wiki in the farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiDescriptor {
    /// Wiki identifier (lower case).
    pub id: String,

    /// Host names the wiki answers to. The first one is the default alias.
    pub aliases: Vec<String>,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretty_name: Option<String>,

    /// Reference of the owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WikiDescriptor {
    /// Create a descriptor with a single alias.
    pub fn new(id: impl Into<String>, default_alias: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            aliases: vec![default_alias.into()],
            pretty_name: None,
            owner_id: None,
            description: None,
        }
    }

    /// Add another alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the display name.
    pub fn with_pretty_name(mut self, name: impl Into<String>) -> Self {
        self.pretty_name = Some(name.into());
        self
    }

    /// Set the owner.
    pub fn with_owner_id(mut self, owner: impl Into<String>) -> Self {
        self.owner_id = Some(owner.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The first alias.
    pub fn default_alias(&self) -> Option<&str> {
        self.aliases.first().map(String::as_str)
    }
}
