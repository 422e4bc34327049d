// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment and topology-file configuration for system tests.
// Purpose: Centralize cluster settings with strict, fail-closed parsing.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid
//! silent misconfiguration; invalid or empty values fail closed with a
//! message naming the variable. An optional TOML topology file supplies the
//! same cluster fields, which the environment overrides field by field.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional artifact run root override.
    RunRoot,
    /// Optional TOML topology file describing the cluster under test.
    ClusterFile,
    /// Management server host name or address.
    ManagementHost,
    /// Login user on the management server and nodes.
    ManagementUser,
    /// SSH port when it differs from the default.
    SshPort,
    /// Private key file for batch SSH authentication.
    IdentityFile,
    /// Managed nodes as comma-separated `name=host` pairs.
    Nodes,
    /// Model query service port (positive integer).
    QueryPort,
    /// Model query service scheme (`http` or `https`).
    QueryScheme,
    /// CA certificate file the query client should trust.
    QueryCaFile,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Allow reusing an existing run root (`true`/`false` or `1`/`0`).
    AllowOverwrite,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "ARMADA_SYSTEM_TEST_RUN_ROOT",
            Self::ClusterFile => "ARMADA_SYSTEM_TEST_CLUSTER_FILE",
            Self::ManagementHost => "ARMADA_SYSTEM_TEST_MS_HOST",
            Self::ManagementUser => "ARMADA_SYSTEM_TEST_MS_USER",
            Self::SshPort => "ARMADA_SYSTEM_TEST_SSH_PORT",
            Self::IdentityFile => "ARMADA_SYSTEM_TEST_IDENTITY_FILE",
            Self::Nodes => "ARMADA_SYSTEM_TEST_NODES",
            Self::QueryPort => "ARMADA_SYSTEM_TEST_QUERY_PORT",
            Self::QueryScheme => "ARMADA_SYSTEM_TEST_QUERY_SCHEME",
            Self::QueryCaFile => "ARMADA_SYSTEM_TEST_QUERY_CA_FILE",
            Self::TimeoutSeconds => "ARMADA_SYSTEM_TEST_TIMEOUT_SEC",
            Self::AllowOverwrite => "ARMADA_SYSTEM_TEST_ALLOW_OVERWRITE",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Scheme the model query service is reached over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryScheme {
    /// Plain HTTP, for labs without enrolled certificates.
    Http,
    /// HTTPS, the deployment default.
    #[default]
    Https,
}

impl QueryScheme {
    /// Returns the URL scheme string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// One managed node of the cluster under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEntry {
    /// Logical node name as used in the deployment model.
    pub name: String,
    /// DNS name or address used to connect.
    pub host: String,
}

/// Typed system test configuration from the environment and topology file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional artifact run root override.
    pub run_root: Option<PathBuf>,
    /// Management server host; `None` means no cluster is configured.
    pub management_host: Option<String>,
    /// Login user on the management server and nodes.
    pub management_user: Option<String>,
    /// SSH port when it differs from the default.
    pub ssh_port: Option<u16>,
    /// Private key file for batch SSH authentication.
    pub identity_file: Option<PathBuf>,
    /// Managed nodes in declaration order.
    pub nodes: Vec<NodeEntry>,
    /// Model query service port override.
    pub query_port: Option<u16>,
    /// Model query service scheme.
    pub query_scheme: QueryScheme,
    /// CA certificate file the query client should trust.
    pub query_ca_file: Option<PathBuf>,
    /// Optional timeout override in seconds (positive integer).
    pub timeout: Option<Duration>,
    /// Allow reusing an existing run root (`true`/`false` or `1`/`0`).
    pub allow_overwrite: bool,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables and the topology file.
    ///
    /// Environment values override topology-file values field by field; the
    /// node list is replaced as a whole when the environment provides one.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is
    /// empty, or fails validation, and when the topology file is unreadable
    /// or malformed.
    pub fn load() -> Result<Self, String> {
        let file = read_env_nonempty(SystemTestEnv::ClusterFile.as_str())?
            .map(|path| load_cluster_file(&path))
            .transpose()?
            .unwrap_or_default();

        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let management_host = read_env_nonempty(SystemTestEnv::ManagementHost.as_str())?
            .or_else(|| file.management.as_ref().and_then(|entry| entry.host.clone()));
        let management_user = read_env_nonempty(SystemTestEnv::ManagementUser.as_str())?
            .or_else(|| file.management.as_ref().and_then(|entry| entry.user.clone()));
        let ssh_port = read_env_nonempty(SystemTestEnv::SshPort.as_str())?
            .map(|value| parse_port(SystemTestEnv::SshPort.as_str(), &value))
            .transpose()?
            .or_else(|| file.management.as_ref().and_then(|entry| entry.ssh_port));
        let identity_file = read_env_nonempty(SystemTestEnv::IdentityFile.as_str())?
            .map(PathBuf::from)
            .or_else(|| {
                file.management
                    .as_ref()
                    .and_then(|entry| entry.identity_file.clone())
                    .map(PathBuf::from)
            });
        let nodes = match read_env_nonempty(SystemTestEnv::Nodes.as_str())? {
            Some(value) => parse_nodes(SystemTestEnv::Nodes.as_str(), &value)?,
            None => file_nodes(&file)?,
        };
        let query_port = read_env_nonempty(SystemTestEnv::QueryPort.as_str())?
            .map(|value| parse_port(SystemTestEnv::QueryPort.as_str(), &value))
            .transpose()?
            .or_else(|| file.query.as_ref().and_then(|entry| entry.port));
        let query_scheme = match read_env_nonempty(SystemTestEnv::QueryScheme.as_str())? {
            Some(value) => parse_scheme(SystemTestEnv::QueryScheme.as_str(), &value)?,
            None => match file.query.as_ref().and_then(|entry| entry.scheme.clone()) {
                Some(value) => parse_scheme("cluster file query.scheme", &value)?,
                None => QueryScheme::default(),
            },
        };
        let query_ca_file = read_env_nonempty(SystemTestEnv::QueryCaFile.as_str())?
            .map(PathBuf::from)
            .or_else(|| {
                file.query
                    .as_ref()
                    .and_then(|entry| entry.ca_file.clone())
                    .map(PathBuf::from)
            });
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let allow_overwrite = parse_bool_env(
            SystemTestEnv::AllowOverwrite.as_str(),
            read_env_nonempty(SystemTestEnv::AllowOverwrite.as_str())?,
        )?;

        Ok(Self {
            run_root,
            management_host,
            management_user,
            ssh_port,
            identity_file,
            nodes,
            query_port,
            query_scheme,
            query_ca_file,
            timeout,
            allow_overwrite,
        })
    }

    /// Returns true when a management server is configured.
    #[must_use]
    pub const fn cluster_configured(&self) -> bool {
        self.management_host.is_some()
    }
}

// ============================================================================
// SECTION: Topology File
// ============================================================================

/// Top-level TOML topology document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterFileDoc {
    /// Management server coordinates.
    management: Option<FileManagement>,
    /// Query service coordinates.
    query: Option<FileQuery>,
    /// Managed node entries.
    #[serde(default)]
    nodes: Vec<FileNode>,
}

/// `[management]` table of the topology file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileManagement {
    /// Management server host name or address.
    host: Option<String>,
    /// Login user on the management server and nodes.
    user: Option<String>,
    /// SSH port when it differs from the default.
    ssh_port: Option<u16>,
    /// Private key file for batch SSH authentication.
    identity_file: Option<String>,
}

/// `[query]` table of the topology file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileQuery {
    /// Model query service port.
    port: Option<u16>,
    /// Model query service scheme (`http` or `https`).
    scheme: Option<String>,
    /// CA certificate file the query client should trust.
    ca_file: Option<String>,
}

/// One `[[nodes]]` entry of the topology file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileNode {
    /// Logical node name as used in the deployment model.
    name: String,
    /// DNS name or address used to connect.
    host: String,
}

/// Reads and parses the topology file named by the environment.
fn load_cluster_file(path: &str) -> Result<ClusterFileDoc, String> {
    let name = SystemTestEnv::ClusterFile.as_str();
    let contents = std::fs::read_to_string(path)
        .map_err(|err| format!("{name}: cannot read {path}: {err}"))?;
    toml::from_str(&contents).map_err(|err| format!("{name}: {path} did not parse: {err}"))
}

/// Converts and validates topology-file node entries.
fn file_nodes(file: &ClusterFileDoc) -> Result<Vec<NodeEntry>, String> {
    file.nodes
        .iter()
        .map(|node| validate_node("cluster file nodes", &node.name, &node.host))
        .collect()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
pub fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("{name} must be a positive integer number of seconds"));
    }
    let secs: u64 = trimmed
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a nonzero TCP port from a configuration string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric, zero, or out of range.
fn parse_port(name: &str, raw: &str) -> Result<u16, String> {
    let port: u16 =
        raw.trim().parse().map_err(|_| format!("{name} must be a TCP port number"))?;
    if port == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(port)
}

/// Parses a query scheme from a configuration string.
///
/// # Errors
///
/// Returns an error when the value is neither `http` nor `https`.
fn parse_scheme(name: &str, raw: &str) -> Result<QueryScheme, String> {
    match raw.trim() {
        "http" => Ok(QueryScheme::Http),
        "https" => Ok(QueryScheme::Https),
        _ => Err(format!("{name} must be http or https")),
    }
}

/// Parses comma-separated `name=host` node pairs.
///
/// # Errors
///
/// Returns an error when any pair is malformed or has an empty side.
fn parse_nodes(name: &str, raw: &str) -> Result<Vec<NodeEntry>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (node, host) =
                pair.split_once('=').ok_or_else(|| format!("{name} entries must be name=host"))?;
            validate_node(name, node, host)
        })
        .collect()
}

/// Validates one node name and host pair.
fn validate_node(source: &str, node: &str, host: &str) -> Result<NodeEntry, String> {
    let node = node.trim();
    let host = host.trim();
    if node.is_empty() || host.is_empty() {
        return Err(format!("{source} entries must have a non-empty name and host"));
    }
    Ok(NodeEntry {
        name: node.to_string(),
        host: host.to_string(),
    })
}

/// Parses a boolean environment variable with permissive defaults.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
