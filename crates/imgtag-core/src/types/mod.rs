//! # Core Type Definitions
//!
//! This module contains all core types for the imgtag catalog engine:
//! - Identifiers (`SerialNo`, `ObjectId`)
//! - Catalog documents (`TagEntry`, `ImageRecord`, `StoredImage`)
//! - Error types (`CatalogError`)
//!
//! ## Identity Rules
//!
//! - `SerialNo` is the public identifier of an image. Tag entries refer to
//!   images by serial number only.
//! - `ObjectId` is the storage-internal identity of a stored document. It
//!   exists only inside `StoredImage` and is dropped by the record resolver.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Public identifier of an image record.
///
/// Unique within the record store. Tag entries correlate with records
/// through this value and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialNo(pub u64);

impl std::fmt::Display for SerialNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage-internal identity of a stored document.
///
/// Assigned by the store on insert. Must never be observable by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

// =============================================================================
// TAG ENTRY
// =============================================================================

/// A stored association between a tag name and the serial numbers of the
/// images carrying that tag.
///
/// Several entries may exist for the same tag name, and their lists may
/// overlap. The list itself is not required to be duplicate-free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    /// Tag name as stored (original casing).
    pub tag_name: String,
    /// Serial numbers of the images carrying this tag.
    pub serial_number_list: Vec<SerialNo>,
}

impl TagEntry {
    /// Create a new tag entry.
    #[must_use]
    pub fn new(tag_name: impl Into<String>, serial_number_list: Vec<SerialNo>) -> Self {
        Self {
            tag_name: tag_name.into(),
            serial_number_list,
        }
    }

    /// The lowercased tag name used as the case-insensitive index key.
    #[must_use]
    pub fn folded_name(&self) -> String {
        fold_tag(&self.tag_name)
    }

    /// Append the serial numbers from `serials` that the list lacks.
    pub fn merge_serials(&mut self, serials: &[SerialNo]) {
        for serial in serials {
            if !self.serial_number_list.contains(serial) {
                self.serial_number_list.push(*serial);
            }
        }
    }

    /// Drop every serial number in `serials`. Returns whether the list changed.
    pub fn remove_serials(&mut self, serials: &BTreeSet<SerialNo>) -> bool {
        let before = self.serial_number_list.len();
        self.serial_number_list.retain(|s| !serials.contains(s));
        self.serial_number_list.len() != before
    }
}

/// Outcome of a catalog import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records written, new or replaced.
    pub images: usize,
    /// Tag entries written, new or merged into an entry of the same name.
    pub tag_entries: usize,
    /// Stored tag entries dropped because every serial they listed was re-imported.
    pub pruned_entries: usize,
}

/// Normalize a tag name for case-insensitive matching.
#[must_use]
pub fn fold_tag(name: &str) -> String {
    name.trim().to_lowercase()
}

// =============================================================================
// IMAGE RECORD
// =============================================================================

/// An image record as returned to callers.
///
/// This is the sanitized shape: it carries no storage identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Public identifier, `serial_number` on the wire.
    #[serde(rename = "serial_number", alias = "serial_no")]
    pub serial_no: SerialNo,
    /// Display title.
    pub title: String,
    /// Tags carried by the image.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Remaining domain fields (url, author, dimensions, ...).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ImageRecord {
    /// Create a record with no tags and no attributes.
    #[must_use]
    pub fn new(serial_no: SerialNo, title: impl Into<String>) -> Self {
        Self {
            serial_no,
            title: title.into(),
            tags: BTreeSet::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style helper to attach a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Builder-style helper to attach a domain attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A record as held by the store, including its internal identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    /// Storage-internal identity.
    pub object_id: ObjectId,
    /// The public part of the document.
    pub record: ImageRecord,
}

impl StoredImage {
    /// Create a stored document.
    #[must_use]
    pub const fn new(object_id: ObjectId, record: ImageRecord) -> Self {
        Self { object_id, record }
    }

    /// Public identifier of the stored document.
    #[must_use]
    pub const fn serial_no(&self) -> SerialNo {
        self.record.serial_no
    }

    /// Drop the internal identity, keeping only the public record.
    #[must_use]
    pub fn into_record(self) -> ImageRecord {
        self.record
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors produced by the catalog engine and its stores.
///
/// `NotFound` means every lookup succeeded and nothing matched.
/// `StoreUnavailable` means a lookup could not complete. The two are never
/// folded into each other.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request is malformed (missing, non-list, or empty tags; bad body).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Lookup or pagination produced zero records.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The underlying store could not be opened or queried.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Stored bytes could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CatalogError {
    /// Short machine-readable kind, used in logs and CLI output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Whether this error is a failure of the store rather than of the request.
    #[must_use]
    pub const fn is_store_failure(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Serialization(_))
    }
}

// =============================================================================
// TESTS
// =============================================================================
