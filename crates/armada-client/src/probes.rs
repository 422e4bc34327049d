// crates/armada-client/src/probes.rs
// ============================================================================
// Module: Node Probes
// Description: Command builders and parsers for facts gathered on nodes.
// Purpose: Turn remote command output into typed, comparable observations.
// Dependencies: armada-model, armada-remote, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Scenario assertions about a managed node reduce to running a small set
//! of read-only commands over SSH and interpreting their output. This
//! module owns both halves: builders that produce the exact [`CommandSpec`]
//! for each probe, and parsers that turn the raw stdout into typed facts.
//!
//! Four output formats are parsed:
//! - `ip -o link show` rows, one interface per line, with the hardware
//!   address following a `link/ether` token;
//! - `ip -o -4 addr show` rows, one address per line, with `addr/prefix`
//!   following an `inet` token;
//! - `ip -o neigh show` rows, one neighbor per line, with the hardware
//!   address following an `lladdr` token;
//! - the per-instance `meta.json` the node agent writes under
//!   `/var/lib/armada/instances/<service>/`, a JSON document listing the
//!   service name, backing image, and configured interfaces.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::Ipv4Addr;

use armada_model::MacAddr;
use armada_model::MacError;
use armada_remote::CommandSpec;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Root of per-instance runtime state on managed nodes.
const INSTANCE_ROOT: &str = "/var/lib/armada/instances";

/// Root of the local image store on managed nodes.
const IMAGE_ROOT: &str = "/var/lib/armada/images";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error raised when probe output cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Instance metadata was not the expected JSON document.
    #[error("instance metadata did not decode: {message}")]
    Meta {
        /// Decoder error text.
        message: String,
    },
    /// A link table row did not follow the `ip -o link show` format.
    #[error("unparseable link table row: {line}")]
    LinkRow {
        /// Offending row.
        line: String,
    },
    /// A link table row carried a malformed hardware address.
    #[error("bad hardware address in link table row: {line}")]
    LinkMac {
        /// Offending row.
        line: String,
        /// Underlying address parse error.
        #[source]
        source: MacError,
    },
    /// An address table row did not follow the `ip -o -4 addr show` format.
    #[error("unparseable address table row: {line}")]
    AddrRow {
        /// Offending row.
        line: String,
    },
    /// A neighbor table row did not follow the `ip -o neigh show` format.
    #[error("unparseable neighbor table row: {line}")]
    NeighborRow {
        /// Offending row.
        line: String,
    },
    /// A neighbor table row carried a malformed hardware address.
    #[error("bad hardware address in neighbor table row: {line}")]
    NeighborMac {
        /// Offending row.
        line: String,
        /// Underlying address parse error.
        #[source]
        source: MacError,
    },
}

// ============================================================================
// SECTION: Command Builders
// ============================================================================

/// Probe for a running process with the exact name.
#[must_use]
pub fn process_running(name: &str) -> CommandSpec {
    CommandSpec::new(["pgrep", "-x", name])
}

/// Probe for an active systemd unit; exits zero only when active.
#[must_use]
pub fn unit_active(unit: &str) -> CommandSpec {
    CommandSpec::new(["systemctl", "is-active", "--quiet", unit])
}

/// Probe for the existence of a filesystem path.
#[must_use]
pub fn path_exists(path: &str) -> CommandSpec {
    CommandSpec::new(["test", "-e", path])
}

/// Probe that reads a file's contents to stdout.
#[must_use]
pub fn read_file(path: &str) -> CommandSpec {
    CommandSpec::new(["cat", path])
}

/// Probe for ICMP reachability of a host from the node.
#[must_use]
pub fn ping(host: &str, count: u32) -> CommandSpec {
    CommandSpec::new(["ping", "-c", &count.to_string(), "-W", "2", host])
}

/// Probe for an open TCP port, using a two second connect timeout.
#[must_use]
pub fn port_open(host: &str, port: u16) -> CommandSpec {
    CommandSpec::new(["nc", "-z", "-w", "2", host, &port.to_string()])
}

/// Probe that lists every interface as one `ip -o link show` row.
#[must_use]
pub fn link_table() -> CommandSpec {
    CommandSpec::new(["ip", "-o", "link", "show"])
}

/// Probe that lists every IPv4 address as one `ip -o -4 addr show` row.
#[must_use]
pub fn addr_table() -> CommandSpec {
    CommandSpec::new(["ip", "-o", "-4", "addr", "show"])
}

/// Probe that lists the neighbor cache rows for one address.
#[must_use]
pub fn neighbor_table(host: &str) -> CommandSpec {
    CommandSpec::new(["ip", "-o", "neigh", "show", "to", host])
}

// ============================================================================
// SECTION: Store Paths
// ============================================================================

/// Returns the metadata path for a service instance on a node.
#[must_use]
pub fn instance_meta_path(service: &str) -> String {
    format!("{INSTANCE_ROOT}/{service}/meta.json")
}

/// Returns the systemd unit name managing a service instance on a node.
#[must_use]
pub fn instance_unit_name(service: &str) -> String {
    format!("armada-vm-{service}.service")
}

/// Returns the image store path for an image name on a node.
#[must_use]
pub fn image_store_path(image: &str) -> String {
    format!("{IMAGE_ROOT}/{image}.qcow2")
}

// ============================================================================
// SECTION: Instance Metadata
// ============================================================================

/// One configured interface from instance metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetaInterface {
    /// Interface device name inside the instance.
    pub device: String,
    /// Assigned hardware address.
    pub mac: MacAddr,
    /// Assigned IPv4 address.
    pub ipaddress: Ipv4Addr,
}

/// Instance metadata the node agent writes when it deploys a service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstanceMeta {
    /// Service name the instance belongs to.
    pub service: String,
    /// Image name the instance was started from.
    pub image: String,
    /// Configured network interfaces.
    #[serde(default)]
    pub interfaces: Vec<MetaInterface>,
}

impl InstanceMeta {
    /// Returns the interface entry with the given device name.
    #[must_use]
    pub fn interface(&self, device: &str) -> Option<&MetaInterface> {
        self.interfaces.iter().find(|entry| entry.device == device)
    }
}

/// Decodes instance metadata from its JSON text.
///
/// # Errors
/// Returns [`ProbeError::Meta`] when the text is not the expected document.
pub fn parse_instance_meta(text: &str) -> Result<InstanceMeta, ProbeError> {
    serde_json::from_str(text).map_err(|err| ProbeError::Meta {
        message: err.to_string(),
    })
}

// ============================================================================
// SECTION: Link Table
// ============================================================================

/// One interface row from `ip -o link show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFact {
    /// Device name with any VLAN parent suffix removed.
    pub device: String,
    /// Hardware address, absent for devices without one such as loopback
    /// rows reporting `link/loopback`.
    pub mac: Option<MacAddr>,
}

/// Parses complete `ip -o link show` output into one fact per row.
///
/// # Errors
/// Returns [`ProbeError::LinkRow`] or [`ProbeError::LinkMac`] for rows that
/// do not follow the one-line format.
pub fn parse_link_table(output: &str) -> Result<Vec<LinkFact>, ProbeError> {
    let mut facts = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        facts.push(parse_link_row(line)?);
    }
    Ok(facts)
}

/// Parses one `ip -o link show` row.
fn parse_link_row(line: &str) -> Result<LinkFact, ProbeError> {
    let row_error = || ProbeError::LinkRow {
        line: line.to_string(),
    };
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let ordinal = tokens.first().ok_or_else(row_error)?;
    if !ordinal.ends_with(':') {
        return Err(row_error());
    }
    let device_raw = tokens.get(1).ok_or_else(row_error)?.trim_end_matches(':');
    let device = device_raw
        .split_once('@')
        .map_or(device_raw, |(base, _)| base)
        .to_string();
    let mac = match tokens.iter().position(|token| *token == "link/ether") {
        Some(index) => {
            let addr = tokens.get(index + 1).ok_or_else(row_error)?;
            let parsed = MacAddr::parse(addr).map_err(|source| ProbeError::LinkMac {
                line: line.to_string(),
                source,
            })?;
            Some(parsed)
        }
        None => None,
    };
    Ok(LinkFact { device, mac })
}

// ============================================================================
// SECTION: Address Table
// ============================================================================

/// One IPv4 address row from `ip -o -4 addr show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddrFact {
    /// Device name carrying the address.
    pub device: String,
    /// Assigned IPv4 address.
    pub addr: Ipv4Addr,
    /// CIDR prefix length.
    pub prefix_len: u8,
}

/// Parses complete `ip -o -4 addr show` output into one fact per row.
///
/// # Errors
/// Returns [`ProbeError::AddrRow`] for rows that do not follow the
/// one-line format.
pub fn parse_addr_table(output: &str) -> Result<Vec<AddrFact>, ProbeError> {
    let mut facts = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        facts.push(parse_addr_row(line)?);
    }
    Ok(facts)
}

/// Parses one `ip -o -4 addr show` row.
fn parse_addr_row(line: &str) -> Result<AddrFact, ProbeError> {
    let row_error = || ProbeError::AddrRow {
        line: line.to_string(),
    };
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let ordinal = tokens.first().ok_or_else(row_error)?;
    if !ordinal.ends_with(':') {
        return Err(row_error());
    }
    let device = tokens.get(1).ok_or_else(row_error)?.to_string();
    let inet_index = tokens
        .iter()
        .position(|token| *token == "inet")
        .ok_or_else(row_error)?;
    let cidr = tokens.get(inet_index + 1).ok_or_else(row_error)?;
    let (addr_text, prefix_text) = cidr.split_once('/').ok_or_else(row_error)?;
    let addr: Ipv4Addr = addr_text.parse().map_err(|_| row_error())?;
    let prefix_len: u8 = prefix_text.parse().map_err(|_| row_error())?;
    if prefix_len > 32 {
        return Err(row_error());
    }
    Ok(AddrFact {
        device,
        addr,
        prefix_len,
    })
}

// ============================================================================
// SECTION: Neighbor Table
// ============================================================================

/// Extracts the first resolved hardware address from `ip -o neigh show`
/// output.
///
/// Unresolved entries carry no `lladdr` token; when every row is
/// unresolved the result is `None`.
///
/// # Errors
/// Returns [`ProbeError::NeighborRow`] when an `lladdr` token ends its
/// row, or [`ProbeError::NeighborMac`] when the following token is a
/// malformed address.
pub fn parse_neighbor_mac(output: &str) -> Result<Option<MacAddr>, ProbeError> {
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(index) = tokens.iter().position(|token| *token == "lladdr") else {
            continue;
        };
        let addr = tokens.get(index + 1).ok_or_else(|| ProbeError::NeighborRow {
            line: line.to_string(),
        })?;
        let parsed = MacAddr::parse(addr).map_err(|source| ProbeError::NeighborMac {
            line: line.to_string(),
            source,
        })?;
        return Ok(Some(parsed));
    }
    Ok(None)
}
