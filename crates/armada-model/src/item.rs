// crates/armada-model/src/item.rs
// ============================================================================
// Module: Armada Model Items
// Description: Item types, lifecycle states, and query-service item documents.
// Purpose: Mirror the wire form of a model item as served by the query API.
// Dependencies: crate::props, serde, thiserror
// ============================================================================

//! ## Overview
//! The model query service describes every item with a small JSON document:
//! an identifier, an item type, a lifecycle state, a flat property map, and
//! the names of child collections. [`ModelItem`] decodes that document
//! verbatim. [`ItemState`] captures the lifecycle states an item moves
//! through as plans are created and run; acceptance checks compare these
//! against expected values after each mutation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::props::Properties;

// ============================================================================
// SECTION: Item Types
// ============================================================================

/// Error raised when an item type name fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemTypeError {
    /// The input was empty.
    #[error("item type is empty")]
    Empty,
    /// The input contained a character outside the type name set.
    #[error("item type {name:?} contains invalid character {ch:?}")]
    InvalidCharacter {
        /// Offending type name.
        name: String,
        /// First rejected character.
        ch: char,
    },
}

/// Validated item type name such as `clustered-service` or `vm-image`.
///
/// # Invariants
/// - Non-empty, drawn from `[a-z0-9-]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemType(String);

impl ItemType {
    /// Parses an item type name.
    ///
    /// # Errors
    /// Returns [`ItemTypeError`] when the name is empty or contains characters
    /// outside `[a-z0-9-]`.
    pub fn parse(input: &str) -> Result<Self, ItemTypeError> {
        if input.is_empty() {
            return Err(ItemTypeError::Empty);
        }
        if let Some(ch) = input
            .chars()
            .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '-'))
        {
            return Err(ItemTypeError::InvalidCharacter {
                name: input.to_string(),
                ch,
            });
        }
        Ok(Self(input.to_string()))
    }

    /// Returns the type name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `deployment` item type.
    #[must_use]
    pub fn deployment() -> Self {
        Self("deployment".to_string())
    }

    /// Returns the `cluster` item type.
    #[must_use]
    pub fn cluster() -> Self {
        Self("cluster".to_string())
    }

    /// Returns the `node` item type.
    #[must_use]
    pub fn node() -> Self {
        Self("node".to_string())
    }

    /// Returns the `clustered-service` item type.
    #[must_use]
    pub fn clustered_service() -> Self {
        Self("clustered-service".to_string())
    }

    /// Returns the `vm-service` item type.
    #[must_use]
    pub fn vm_service() -> Self {
        Self("vm-service".to_string())
    }

    /// Returns the `vm-image` item type.
    #[must_use]
    pub fn vm_image() -> Self {
        Self("vm-image".to_string())
    }

    /// Returns the `vm-network-interface` item type.
    #[must_use]
    pub fn vm_network_interface() -> Self {
        Self("vm-network-interface".to_string())
    }

    /// Returns the `network-interface` item type.
    #[must_use]
    pub fn network_interface() -> Self {
        Self("network-interface".to_string())
    }

    /// Returns the `network` item type.
    #[must_use]
    pub fn network() -> Self {
        Self("network".to_string())
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ItemType {
    type Err = ItemTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemType {
    type Error = ItemTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for ItemType {
    type Error = ItemTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ItemType> for String {
    fn from(value: ItemType) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Item States
// ============================================================================

/// Error raised when an item state string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized item state: {0}")]
pub struct ItemStateParseError(pub String);

/// Lifecycle state of a model item.
///
/// States advance as plans run: freshly created items are `Initial`, become
/// `Applied` once the deployment task for them succeeds, `Updated` when a
/// property changed after apply, and `ForRemoval` once marked for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemState {
    /// Created in the model but never deployed.
    Initial,
    /// Deployed and in sync with the model.
    Applied,
    /// Deployed but carrying undeployed property changes.
    Updated,
    /// Marked for removal by the next plan.
    ForRemoval,
}

impl ItemState {
    /// Returns the wire spelling used by the CLI and query service.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Applied => "Applied",
            Self::Updated => "Updated",
            Self::ForRemoval => "ForRemoval",
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ItemState {
    type Err = ItemStateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Initial" => Ok(Self::Initial),
            "Applied" => Ok(Self::Applied),
            "Updated" => Ok(Self::Updated),
            "ForRemoval" => Ok(Self::ForRemoval),
            other => Err(ItemStateParseError(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Item Documents
// ============================================================================

/// One model item as served by the query API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelItem {
    /// Item identifier, equal to the final path segment.
    pub id: String,
    /// Declared item type.
    #[serde(rename = "item-type")]
    pub item_type: ItemType,
    /// Current lifecycle state.
    pub state: ItemState,
    /// Flat property map; absent on the wire for property-less items.
    #[serde(default)]
    pub properties: Properties,
    /// Names of child items and collections directly beneath this item.
    #[serde(default)]
    pub children: Vec<String>,
}

impl ModelItem {
    /// Looks up a property value by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name)
    }

    /// Returns true when this item declares the given type.
    #[must_use]
    pub fn is_type(&self, item_type: &ItemType) -> bool {
        self.item_type == *item_type
    }
}
