// crates/armada-model/src/mac.rs
// ============================================================================
// Module: Armada MAC Addresses
// Description: Hardware address values and assignment prefixes.
// Purpose: Validate and compare MAC addresses reported by managed nodes.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Armada assigns virtual machine interfaces MAC addresses beneath a
//! deployment-wide prefix, and node interfaces carry full static addresses
//! in the model. Acceptance checks compare the model side against addresses
//! scraped from `ip link` output and instance metadata, so both sides must
//! normalize to one canonical form. [`MacAddr`] stores the six raw octets
//! and renders lowercase colon-separated hex; [`MacPrefix`] covers the
//! partial leading form used for assignment policy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error raised when a MAC address or prefix fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacError {
    /// The input had the wrong number of colon-separated groups.
    #[error("expected {expected} colon-separated octet groups, got {got}: {input}")]
    GroupCount {
        /// Human-readable expected group count.
        expected: &'static str,
        /// Number of groups found.
        got: usize,
        /// Original input.
        input: String,
    },
    /// A group was not a two-digit hexadecimal octet.
    #[error("invalid octet group {group:?} in {input:?}")]
    Octet {
        /// Offending group text.
        group: String,
        /// Original input.
        input: String,
    },
}

/// Splits colon-separated hex octets, enforcing a group-count range.
fn parse_octet_groups(
    input: &str,
    min: usize,
    max: usize,
    expected: &'static str,
) -> Result<Vec<u8>, MacError> {
    let groups: Vec<&str> = input.split(':').collect();
    if groups.len() < min || groups.len() > max {
        return Err(MacError::GroupCount {
            expected,
            got: groups.len(),
            input: input.to_string(),
        });
    }
    groups
        .into_iter()
        .map(|group| {
            if group.len() != 2 {
                return Err(MacError::Octet {
                    group: group.to_string(),
                    input: input.to_string(),
                });
            }
            u8::from_str_radix(group, 16).map_err(|_| MacError::Octet {
                group: group.to_string(),
                input: input.to_string(),
            })
        })
        .collect()
}

// ============================================================================
// SECTION: MAC Addresses
// ============================================================================

/// Six-octet hardware address in canonical lowercase colon form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    /// Parses a colon-separated MAC address, accepting mixed case hex.
    ///
    /// # Errors
    /// Returns [`MacError`] when the input does not have exactly six
    /// two-digit hexadecimal groups.
    pub fn parse(input: &str) -> Result<Self, MacError> {
        let octets = parse_octet_groups(input, 6, 6, "exactly 6")?;
        let mut raw = [0_u8; 6];
        raw.copy_from_slice(&octets);
        Ok(Self(raw))
    }

    /// Returns the raw octets.
    #[must_use]
    pub const fn octets(self) -> [u8; 6] {
        self.0
    }

    /// Returns true when the locally-administered bit is set.
    #[must_use]
    pub const fn is_locally_administered(self) -> bool {
        self.0[0] & 0x02 != 0
    }

    /// Returns true when the multicast bit is set.
    ///
    /// A unicast interface must never carry a multicast address; validation
    /// rejects assignment prefixes with this bit set.
    #[must_use]
    pub const fn is_multicast(self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// Returns true when this address falls under the given prefix.
    #[must_use]
    pub fn has_prefix(self, prefix: &MacPrefix) -> bool {
        self.0.starts_with(prefix.octets())
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacAddr {
    type Error = MacError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MacAddr> for String {
    fn from(value: MacAddr) -> Self {
        value.to_string()
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

// ============================================================================
// SECTION: MAC Prefixes
// ============================================================================

/// Leading octets of a MAC assignment range, one to six groups long.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacPrefix(Vec<u8>);

impl MacPrefix {
    /// Parses a colon-separated MAC prefix such as `52:54:00`.
    ///
    /// # Errors
    /// Returns [`MacError`] when the input has no groups, more than six, or
    /// any group is not a two-digit hexadecimal octet.
    pub fn parse(input: &str) -> Result<Self, MacError> {
        let octets = parse_octet_groups(input, 1, 6, "between 1 and 6")?;
        Ok(Self(octets))
    }

    /// Returns the prefix octets.
    #[must_use]
    pub fn octets(&self) -> &[u8] {
        &self.0
    }

    /// Returns true when the prefix would generate multicast addresses.
    #[must_use]
    pub fn is_multicast(&self) -> bool {
        self.0.first().is_some_and(|octet| octet & 0x01 != 0)
    }

    /// Returns true when the given address falls under this prefix.
    #[must_use]
    pub fn matches(&self, addr: MacAddr) -> bool {
        addr.has_prefix(self)
    }
}

impl fmt::Display for MacPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|octet| format!("{octet:02x}")).collect();
        f.write_str(&rendered.join(":"))
    }
}

impl FromStr for MacPrefix {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacPrefix {
    type Error = MacError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MacPrefix> for String {
    fn from(value: MacPrefix) -> Self {
        value.to_string()
    }
}
