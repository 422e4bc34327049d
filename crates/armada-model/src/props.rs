// crates/armada-model/src/props.rs
// ============================================================================
// Module: Armada Model Properties
// Description: Flat string property maps attached to model items.
// Purpose: Provide ordered property bags with typed accessors and CLI forms.
// Dependencies: crate::mac, serde, thiserror
// ============================================================================

//! ## Overview
//! Armada stores every item property as a string; numeric, list, and address
//! semantics are a reading applied at the edges. [`Properties`] keeps the
//! map ordered so rendered CLI arguments and serialized fixtures are
//! deterministic, and offers the typed readings acceptance checks need:
//! unsigned integers (instance counts, sizes), comma-separated lists (node
//! lists, address lists), IPv4 addresses, and MAC addresses.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::mac::MacAddr;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error raised when a property is missing or fails a typed reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The named property is not present.
    #[error("property {name:?} is not set")]
    Missing {
        /// Requested property name.
        name: String,
    },
    /// The named property is present but did not parse as the expected type.
    #[error("property {name:?} value {value:?} is not a valid {expected}")]
    Invalid {
        /// Requested property name.
        name: String,
        /// Stored string value.
        value: String,
        /// Human-readable expected type.
        expected: &'static str,
    },
}

// ============================================================================
// SECTION: Properties
// ============================================================================

/// Ordered string-to-string property map for a model item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
    /// Creates an empty property map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds a property and returns the map, for fixture-style chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Inserts or replaces a property in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Looks up a property value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns true when the named property is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Reads a property as an unsigned integer.
    ///
    /// # Errors
    /// Returns [`PropertyError::Missing`] when absent and
    /// [`PropertyError::Invalid`] when the value does not parse.
    pub fn get_u32(&self, name: &str) -> Result<u32, PropertyError> {
        let value = self.get(name).ok_or_else(|| PropertyError::Missing {
            name: name.to_string(),
        })?;
        value.parse().map_err(|_| PropertyError::Invalid {
            name: name.to_string(),
            value: value.to_string(),
            expected: "unsigned integer",
        })
    }

    /// Reads a property as a comma-separated list of non-empty entries.
    ///
    /// Entries are trimmed; empty entries produced by stray commas are
    /// dropped rather than rejected.
    ///
    /// # Errors
    /// Returns [`PropertyError::Missing`] when absent.
    pub fn get_list(&self, name: &str) -> Result<Vec<String>, PropertyError> {
        let value = self.get(name).ok_or_else(|| PropertyError::Missing {
            name: name.to_string(),
        })?;
        Ok(value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Reads a property as an IPv4 address.
    ///
    /// # Errors
    /// Returns [`PropertyError::Missing`] when absent and
    /// [`PropertyError::Invalid`] when the value does not parse.
    pub fn get_ipv4(&self, name: &str) -> Result<Ipv4Addr, PropertyError> {
        let value = self.get(name).ok_or_else(|| PropertyError::Missing {
            name: name.to_string(),
        })?;
        value.parse().map_err(|_| PropertyError::Invalid {
            name: name.to_string(),
            value: value.to_string(),
            expected: "IPv4 address",
        })
    }

    /// Reads a property as a canonical MAC address.
    ///
    /// # Errors
    /// Returns [`PropertyError::Missing`] when absent and
    /// [`PropertyError::Invalid`] when the value does not parse.
    pub fn get_mac(&self, name: &str) -> Result<MacAddr, PropertyError> {
        let value = self.get(name).ok_or_else(|| PropertyError::Missing {
            name: name.to_string(),
        })?;
        MacAddr::parse(value).map_err(|_| PropertyError::Invalid {
            name: name.to_string(),
            value: value.to_string(),
            expected: "MAC address",
        })
    }

    /// Iterates over properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no properties are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders `name=value` pairs in name order for `-o` CLI options.
    ///
    /// Values containing whitespace or `=` are wrapped in double quotes,
    /// matching what the CLI parser expects for such values. Returns an
    /// empty vector when no properties are set, so callers can splice the
    /// result into an argument list unconditionally.
    #[must_use]
    pub fn cli_pairs(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|(name, value)| {
                if value.contains(char::is_whitespace) || value.contains('=') {
                    format!("{name}=\"{value}\"")
                } else {
                    format!("{name}={value}")
                }
            })
            .collect()
    }
}

impl FromIterator<(String, String)> for Properties {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
