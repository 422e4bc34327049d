// crates/armada-remote/src/target.rs
// ============================================================================
// Module: Host Targets
// Description: Addressing for the hosts of a deployment under test.
// Purpose: Bundle the logical name and SSH coordinates of one host.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Acceptance runs address hosts twice over: by logical name (`ms1`, `n1`)
//! matching the deployment model, and by SSH coordinates. [`HostTarget`]
//! keeps both together so transcripts and failure messages can speak in
//! model terms while runners connect with the real user, host, and port.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;

// ============================================================================
// SECTION: Host Target
// ============================================================================

/// One reachable host of the deployment under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    /// Logical name used in the deployment model and in transcripts.
    pub name: String,
    /// DNS name or address used to connect.
    pub host: String,
    /// Login user.
    pub user: String,
    /// SSH port when it differs from the default.
    pub port: Option<u16>,
    /// Private key file for batch authentication.
    pub identity_file: Option<PathBuf>,
}

impl HostTarget {
    /// Builds a target with default port and agent-resolved authentication.
    #[must_use]
    pub fn new(name: impl Into<String>, host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            user: user.into(),
            port: None,
            identity_file: None,
        }
    }

    /// Sets an explicit SSH port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets an explicit identity file.
    #[must_use]
    pub fn with_identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// Returns the `user@host` SSH destination.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

impl fmt::Display for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}@{})", self.name, self.user, self.host)
    }
}
