// crates/armada-client/src/query.rs
// ============================================================================
// Module: Model Query Client
// Description: Read-only REST client for the model query service.
// Purpose: Observe items, properties, and the plan without mutating state.
// Dependencies: armada-model, reqwest, serde, serde_json, tokio, url
// ============================================================================

//! ## Overview
//! The query service is the suite's observation channel: every "did the
//! model converge" and "what state is the plan in" question is answered by
//! GETs against it. [`QueryClient`] wraps reqwest with the service's error
//! conventions (404 bodies carrying an error token) and retries transient
//! connection failures a bounded number of times, because the service
//! restarts along with the management server during some scenarios. Every
//! request lands in a transcript for failure artifacts.
//!
//! TLS verification uses the platform trust store plus an optional
//! deployment CA supplied as PEM, matching how lab clusters are enrolled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use armada_model::ModelItem;
use armada_model::ModelPath;
use armada_model::PlanDocument;
use reqwest::Certificate;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::ClientError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum send attempts per request, counting the first.
const MAX_SEND_ATTEMPTS: u32 = 3;

/// Base backoff between retried sends; grows linearly per attempt.
const RETRY_BACKOFF: Duration = Duration::from_millis(150);

/// Longest response body excerpt carried in status errors.
const BODY_SNIPPET_CHARS: usize = 300;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Connection settings for the query client.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Service base URL including the API prefix.
    pub base_url: Url,
    /// Per-request total time limit.
    pub request_timeout: Duration,
    /// TCP connect time limit.
    pub connect_timeout: Duration,
    /// Additional trusted CA certificate in PEM form.
    pub ca_pem: Option<Vec<u8>>,
}

impl QueryConfig {
    /// Builds a configuration with default timeouts and no extra CA.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            ca_pem: None,
        }
    }

    /// Replaces the per-request time limit.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Replaces the TCP connect time limit.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Adds a deployment CA certificate in PEM form.
    #[must_use]
    pub fn with_ca_pem(mut self, pem: Vec<u8>) -> Self {
        self.ca_pem = Some(pem);
        self
    }
}

// ============================================================================
// SECTION: Transcript
// ============================================================================

/// One transcript entry for a query request attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRecord {
    /// Position of this entry in the transcript, starting at zero.
    pub sequence: usize,
    /// Requested URL.
    pub url: String,
    /// HTTP status when a response arrived.
    pub status: Option<u16>,
    /// Transport error text when no response arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// SECTION: Query Client
// ============================================================================

/// Read-only client for the model query service.
///
/// Cloning shares the transcript.
#[derive(Debug, Clone)]
pub struct QueryClient {
    /// Base URL without a trailing slash.
    base: String,
    /// Underlying HTTP client.
    client: Client,
    /// Shared transcript of request attempts.
    transcript: Arc<Mutex<Vec<QueryRecord>>>,
}

impl QueryClient {
    /// Builds a client from connection settings.
    ///
    /// # Errors
    /// Returns [`ClientError::Setup`] when the CA certificate is invalid or
    /// the HTTP client cannot be constructed.
    pub fn new(config: QueryConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout);
        if let Some(pem) = &config.ca_pem {
            let cert = Certificate::from_pem(pem).map_err(|err| ClientError::Setup {
                message: format!("invalid ca certificate: {err}"),
            })?;
            builder = builder.add_root_certificate(cert);
        }
        let client = builder.build().map_err(|err| ClientError::Setup {
            message: format!("http client construction failed: {err}"),
        })?;
        Ok(Self {
            base: config.base_url.as_str().trim_end_matches('/').to_string(),
            client,
            transcript: Arc::default(),
        })
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Fetches the raw item document for a path.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidLocation`] when the path does not
    /// exist, and transport or status errors otherwise.
    pub async fn item_document(&self, path: &ModelPath) -> Result<Value, ClientError> {
        let url = self.item_url(path);
        let (status, body) = self.fetch(&url).await?;
        if status == 200 {
            Ok(body)
        } else {
            Err(classify_error_response(&url, status, &body, Some(path), None))
        }
    }

    /// Fetches and decodes the item at a path.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidLocation`] when the path does not
    /// exist and [`ClientError::Decode`] when the document is malformed.
    pub async fn get_item(&self, path: &ModelPath) -> Result<ModelItem, ClientError> {
        let document = self.item_document(path).await?;
        serde_json::from_value(document).map_err(|err| ClientError::Decode {
            url: self.item_url(path),
            message: err.to_string(),
        })
    }

    /// Fetches one property value for a path.
    ///
    /// Property names are plain identifiers and are interpolated without
    /// percent-encoding.
    ///
    /// # Errors
    /// Returns [`ClientError::PropertyNotFound`] when the item lacks the
    /// property and [`ClientError::InvalidLocation`] when the path does
    /// not exist.
    pub async fn get_property(&self, path: &ModelPath, name: &str) -> Result<String, ClientError> {
        let url = format!("{}?property={name}", self.item_url(path));
        let (status, body) = self.fetch(&url).await?;
        if status == 200 {
            body.get("value")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ClientError::Decode {
                    url,
                    message: "property document missing string \"value\"".to_string(),
                })
        } else {
            Err(classify_error_response(
                &url,
                status,
                &body,
                Some(path),
                Some(name),
            ))
        }
    }

    /// Fetches the raw plan document.
    ///
    /// # Errors
    /// Returns [`ClientError::PlanNotFound`] when no plan exists.
    pub async fn plan_document(&self) -> Result<Value, ClientError> {
        let url = format!("{}/plans/plan", self.base);
        let (status, body) = self.fetch(&url).await?;
        if status == 200 {
            Ok(body)
        } else {
            Err(classify_error_response(&url, status, &body, None, None))
        }
    }

    /// Fetches and decodes the plan document.
    ///
    /// # Errors
    /// Returns [`ClientError::PlanNotFound`] when no plan exists and
    /// [`ClientError::Decode`] when the document is malformed.
    pub async fn plan(&self) -> Result<PlanDocument, ClientError> {
        let document = self.plan_document().await?;
        serde_json::from_value(document).map_err(|err| ClientError::Decode {
            url: format!("{}/plans/plan", self.base),
            message: err.to_string(),
        })
    }

    /// Returns whether an item exists at the path.
    ///
    /// # Errors
    /// Returns transport and status errors; a missing path is `Ok(false)`.
    pub async fn exists(&self, path: &ModelPath) -> Result<bool, ClientError> {
        match self.item_document(path).await {
            Ok(_) => Ok(true),
            Err(ClientError::InvalidLocation { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Returns a snapshot of the request transcript.
    #[must_use]
    pub fn transcript(&self) -> Vec<QueryRecord> {
        self.transcript
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Renders the item URL for a path.
    fn item_url(&self, path: &ModelPath) -> String {
        if path.is_root() {
            format!("{}/model/", self.base)
        } else {
            format!("{}/model{path}", self.base)
        }
    }

    /// Sends one GET with bounded transient-failure retries.
    async fn fetch(&self, url: &str) -> Result<(u16, Value), ClientError> {
        let mut attempt = 0_u32;
        loop {
            attempt = attempt.saturating_add(1);
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    self.record(url, Some(status), None);
                    let bytes =
                        response
                            .bytes()
                            .await
                            .map_err(|source| ClientError::Http {
                                url: url.to_string(),
                                source,
                            })?;
                    let value = if bytes.is_empty() {
                        Value::Null
                    } else {
                        serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode {
                            url: url.to_string(),
                            message: err.to_string(),
                        })?
                    };
                    return Ok((status, value));
                }
                Err(err) if attempt < MAX_SEND_ATTEMPTS && is_transient_send_error(&err) => {
                    self.record(url, None, Some(err.to_string()));
                    tokio::time::sleep(RETRY_BACKOFF.saturating_mul(attempt)).await;
                }
                Err(source) => {
                    self.record(url, None, Some(source.to_string()));
                    return Err(ClientError::Http {
                        url: url.to_string(),
                        source,
                    });
                }
            }
        }
    }

    /// Appends one transcript entry.
    fn record(&self, url: &str, status: Option<u16>, error: Option<String>) {
        if let Ok(mut entries) = self.transcript.lock() {
            let sequence = entries.len();
            entries.push(QueryRecord {
                sequence,
                url: url.to_string(),
                status,
                error,
            });
        }
    }
}

// ============================================================================
// SECTION: Response Classification
// ============================================================================

/// Returns true for send failures worth one more attempt.
fn is_transient_send_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Maps a non-200 response to the typed error it represents.
fn classify_error_response(
    url: &str,
    status: u16,
    body: &Value,
    path: Option<&ModelPath>,
    property: Option<&str>,
) -> ClientError {
    if status == 404 {
        match body.get("error").and_then(Value::as_str) {
            Some("InvalidLocationError") => {
                if let Some(path) = path {
                    return ClientError::InvalidLocation { path: path.clone() };
                }
            }
            Some("PropertyNotFoundError") => {
                if let (Some(path), Some(name)) = (path, property) {
                    return ClientError::PropertyNotFound {
                        path: path.clone(),
                        name: name.to_string(),
                    };
                }
            }
            Some("PlanNotFoundError") => return ClientError::PlanNotFound,
            _ => {}
        }
    }
    ClientError::Status {
        url: url.to_string(),
        status,
        body: body.to_string().chars().take(BODY_SNIPPET_CHARS).collect(),
    }
}
