//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Each handler acquires its own catalog read handle and drops it before
//! the response is written.

use super::{
    AppState,
    types::{ErrorResponse, HealthResponse, SampleRequest, StatusResponse},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use imgtag_core::{
    CatalogError, CatalogReader, ImageRecord, TagMatch, TagQuery, parse_page, unix_seconds_seed,
};

/// Response header carrying the number of distinct matches before paging.
pub const MATCHED_HEADER: HeaderName = HeaderName::from_static("x-imgtag-matched");

/// Response header carrying the shuffle seed, when one was used.
pub const SEED_HEADER: HeaderName = HeaderName::from_static("x-imgtag-seed");

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Client-facing message for store failures on the listing routes.
pub const LISTING_FAILURE: &str = "Failed to fetch data";

/// Client-facing message for store failures on the tag routes.
pub const TAG_DATA_FAILURE: &str = "Failed to fetch tag data";

/// Engine error translated to an HTTP response.
///
/// Store failure details are logged, never sent to the client.
#[derive(Debug)]
pub struct ApiError {
    pub source: CatalogError,
    failure_message: &'static str,
}

impl ApiError {
    /// Wrap an error raised on a tag route.
    #[must_use]
    pub fn tag_data(source: CatalogError) -> Self {
        Self {
            source,
            failure_message: TAG_DATA_FAILURE,
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(source: CatalogError) -> Self {
        Self {
            source,
            failure_message: LISTING_FAILURE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.source {
            CatalogError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CatalogError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CatalogError::StoreUnavailable(_) | CatalogError::Serialization(_) => {
                tracing::error!(kind = self.source.kind(), error = %self.source, "Catalog store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    self.failure_message.to_string(),
                )
            }
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// =============================================================================
// FALLBACK HANDLERS
// =============================================================================

/// Body of the 405 response.
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

/// Body of the 404 response for unrouted paths.
pub const NOT_FOUND_MESSAGE: &str = "Not found";

/// Known path, unsupported method.
pub async fn method_not_allowed_handler() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new(METHOD_NOT_ALLOWED_MESSAGE)),
    )
}

/// Unknown path.
pub async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(NOT_FOUND_MESSAGE)))
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get catalog status.
pub async fn status_handler(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let reader = state.catalog.reader()?;
    let response = StatusResponse {
        record_count: reader.record_count()?,
        tag_entry_count: reader.tag_entry_count()?,
        persistent: state.catalog.is_persistent(),
        tag_match: match state.engine.tag_match {
            TagMatch::CaseInsensitive => "case-insensitive".to_string(),
            TagMatch::Exact => "exact".to_string(),
        },
    };
    Ok(Json(response))
}

// =============================================================================
// LISTING HANDLERS
// =============================================================================

/// First page of the image listing.
pub async fn list_images_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImageRecord>>, ApiError> {
    list_page(&state, None)
}

/// Image listing page from the trailing path segment.
///
/// A segment that is not a positive integer serves the first page.
pub async fn list_images_page_handler(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Json<Vec<ImageRecord>>, ApiError> {
    list_page(&state, parse_page(&segment))
}

fn list_page(state: &AppState, page: Option<u64>) -> Result<Json<Vec<ImageRecord>>, ApiError> {
    let reader = state.catalog.reader()?;
    let records = state.engine.list_page(&reader, page)?;
    tracing::debug!(?page, count = records.len(), "Listing served");
    Ok(Json(records))
}

// =============================================================================
// TAG SAMPLING HANDLERS
// =============================================================================

/// First page of a tag-based sample.
pub async fn tags_data_handler(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    sample(&state, None, &body)
}

/// Tag-based sample page from the trailing path segment.
pub async fn tags_data_page_handler(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    sample(&state, parse_page(&segment), &body)
}

fn sample(state: &AppState, page: Option<u64>, body: &[u8]) -> Result<Response, ApiError> {
    let request = SampleRequest::from_body(body).map_err(ApiError::tag_data)?;

    let mut query = TagQuery::new(request.tags).page(page);
    if request.shuffle {
        query = query.seeded(request.seed.unwrap_or_else(unix_seconds_seed));
    }

    let reader = state.catalog.reader().map_err(ApiError::tag_data)?;
    let sample = state
        .engine
        .sample_by_tags(&reader, &query)
        .map_err(ApiError::tag_data)?;
    drop(reader);

    tracing::debug!(
        tags = query.tags.len(),
        ?page,
        matched = sample.matched,
        returned = sample.records.len(),
        seed = ?sample.seed,
        "Tag sample served"
    );

    let mut headers = HeaderMap::new();
    headers.insert(MATCHED_HEADER, HeaderValue::from(sample.matched));
    if let Some(seed) = sample.seed {
        headers.insert(SEED_HEADER, HeaderValue::from(seed));
    }
    Ok((StatusCode::OK, headers, Json(sample.records)).into_response())
}
