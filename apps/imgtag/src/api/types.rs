//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use imgtag_core::CatalogError;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Catalog status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub record_count: usize,
    pub tag_entry_count: usize,
    pub persistent: bool,
    pub tag_match: String,
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

// =============================================================================
// SAMPLE REQUEST
// =============================================================================

/// Tag sampling request body.
///
/// ```json
/// {"tags": ["sunset", "beach"], "seed": 1700000000, "shuffle": true}
/// ```
///
/// Only `tags` is required. `shuffle` defaults to `true`, also when sent as
/// `null`; without a `seed` the server seeds from the current time in whole
/// seconds. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRequest {
    pub tags: Vec<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_shuffle", deserialize_with = "deserialize_shuffle")]
    pub shuffle: bool,
}

fn default_shuffle() -> bool {
    true
}

fn deserialize_shuffle<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(default_shuffle))
}

impl SampleRequest {
    /// Parse a raw request body.
    ///
    /// Every malformed shape is reported as `InvalidInput`, including a
    /// well-formed body whose `tags` list is empty.
    pub fn from_body(body: &[u8]) -> Result<Self, CatalogError> {
        if body.is_empty() {
            return Err(CatalogError::InvalidInput(
                "request body is required".to_string(),
            ));
        }
        let request: Self = serde_json::from_slice(body)
            .map_err(|e| CatalogError::InvalidInput(format!("malformed request body: {}", e)))?;

        if request.tags.is_empty() {
            return Err(CatalogError::InvalidInput(
                "tags must be a non-empty list".to_string(),
            ));
        }
        Ok(request)
    }
}
