//! # Catalog Module
//!
//! The store accessor seen by the engine, and the backends behind it.
//!
//! ## Scoped Handles
//!
//! The engine never touches a backend directly. Each request calls
//! [`Catalog::reader`] to acquire a [`CatalogHandle`], runs its pipeline
//! against that handle, and drops it. For the persistent backend the handle
//! owns a redb read transaction, so the release happens on every exit path
//! (success, empty result, or error) without any explicit close call.
//!
//! ## Storage Backends
//!
//! - `InMemory`: `MemoryCatalog`, volatile, used by tests and `--backend memory`
//! - `Persistent`: `RedbCatalog`, disk-backed ACID storage

use crate::page::PageWindow;
use crate::storage::{RedbCatalog, RedbReader};
use crate::{
    CatalogError, ImageRecord, ImportSummary, ObjectId, SerialNo, StoredImage, TagEntry, fold_tag,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

// =============================================================================
// TAG MATCHING
// =============================================================================

/// How request tags are compared with stored tag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagMatch {
    /// Compare lowercased names.
    #[default]
    CaseInsensitive,
    /// Compare stored names byte-for-byte.
    Exact,
}

impl TagMatch {
    /// Whether a stored tag name satisfies a requested one.
    #[must_use]
    pub fn matches(self, stored: &str, requested: &str) -> bool {
        match self {
            Self::CaseInsensitive => fold_tag(stored) == fold_tag(requested),
            Self::Exact => stored == requested,
        }
    }
}

impl std::str::FromStr for TagMatch {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "case-insensitive" | "insensitive" | "ci" => Ok(Self::CaseInsensitive),
            "exact" | "case-sensitive" => Ok(Self::Exact),
            other => Err(CatalogError::InvalidInput(format!(
                "unknown tag match mode '{}'",
                other
            ))),
        }
    }
}

// =============================================================================
// CATALOG READER TRAIT
// =============================================================================

/// Read-only query interface over the tag and image collections.
///
/// All methods are side-effect free. Implementations report any failure to
/// reach or decode the underlying data as an error and never as an empty
/// result.
pub trait CatalogReader {
    /// Tag entries whose name matches any of `tags` under `mode`.
    ///
    /// Every matching entry is returned once, in store order. Several
    /// entries may share one tag name. Unmatched tags contribute nothing.
    fn find_tag_entries(&self, tags: &[String], mode: TagMatch)
    -> Result<Vec<TagEntry>, CatalogError>;

    /// Stored documents for the given serial numbers, in any order.
    ///
    /// Serial numbers with no stored document are skipped.
    fn find_records_by_ids(&self, ids: &[SerialNo]) -> Result<Vec<StoredImage>, CatalogError>;

    /// Stored documents in insertion order, windowed.
    fn list_records(&self, window: PageWindow) -> Result<Vec<StoredImage>, CatalogError>;

    /// Number of stored image documents.
    fn record_count(&self) -> Result<usize, CatalogError>;

    /// Number of stored tag entries.
    fn tag_entry_count(&self) -> Result<usize, CatalogError>;
}

// =============================================================================
// IN-MEMORY CATALOG
// =============================================================================

/// Volatile catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    images: BTreeMap<ObjectId, StoredImage>,
    serial_index: BTreeMap<SerialNo, ObjectId>,
    tag_entries: Vec<TagEntry>,
    next_object_id: u64,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any document with the same serial number.
    pub fn insert_image(&mut self, record: ImageRecord) -> ObjectId {
        if let Some(&existing) = self.serial_index.get(&record.serial_no) {
            self.images
                .insert(existing, StoredImage::new(existing, record));
            return existing;
        }
        let object_id = ObjectId(self.next_object_id);
        self.next_object_id = self.next_object_id.saturating_add(1);
        self.serial_index.insert(record.serial_no, object_id);
        self.images
            .insert(object_id, StoredImage::new(object_id, record));
        object_id
    }

    /// Append a tag entry as is, even if an entry with the same name exists.
    pub fn insert_tag_entry(&mut self, entry: TagEntry) {
        self.tag_entries.push(entry);
    }

    /// Write a batch of records and the tag entries that describe them.
    ///
    /// Every imported serial number first leaves all stored tag entries, so
    /// a re-imported record matches only the tags of this batch. Entries
    /// left empty are dropped. Each new entry then merges into the stored
    /// entry with the same exact name, or is appended.
    pub fn import(&mut self, records: &[ImageRecord], entries: &[TagEntry]) -> ImportSummary {
        let replaced: BTreeSet<SerialNo> = records.iter().map(|r| r.serial_no).collect();
        for record in records {
            self.insert_image(record.clone());
        }

        let before = self.tag_entries.len();
        self.tag_entries.retain_mut(|entry| {
            !(entry.remove_serials(&replaced) && entry.serial_number_list.is_empty())
        });
        let pruned_entries = before - self.tag_entries.len();

        for entry in entries {
            match self
                .tag_entries
                .iter_mut()
                .find(|stored| stored.tag_name == entry.tag_name)
            {
                Some(stored) => stored.merge_serials(&entry.serial_number_list),
                None => self.tag_entries.push(entry.clone()),
            }
        }

        ImportSummary {
            images: records.len(),
            tag_entries: entries.len(),
            pruned_entries,
        }
    }
}

impl CatalogReader for MemoryCatalog {
    fn find_tag_entries(
        &self,
        tags: &[String],
        mode: TagMatch,
    ) -> Result<Vec<TagEntry>, CatalogError> {
        Ok(self
            .tag_entries
            .iter()
            .filter(|entry| tags.iter().any(|t| mode.matches(&entry.tag_name, t)))
            .cloned()
            .collect())
    }

    fn find_records_by_ids(&self, ids: &[SerialNo]) -> Result<Vec<StoredImage>, CatalogError> {
        let wanted: BTreeSet<ObjectId> = ids
            .iter()
            .filter_map(|serial| self.serial_index.get(serial).copied())
            .collect();
        // Store order, like a `$in` query.
        Ok(wanted
            .iter()
            .filter_map(|id| self.images.get(id).cloned())
            .collect())
    }

    fn list_records(&self, window: PageWindow) -> Result<Vec<StoredImage>, CatalogError> {
        let take = window
            .end(self.images.len())
            .saturating_sub(window.offset);
        Ok(self
            .images
            .values()
            .skip(window.offset)
            .take(take)
            .cloned()
            .collect())
    }

    fn record_count(&self) -> Result<usize, CatalogError> {
        Ok(self.images.len())
    }

    fn tag_entry_count(&self) -> Result<usize, CatalogError> {
        Ok(self.tag_entries.len())
    }
}

// =============================================================================
// CATALOG (BACKEND OWNER)
// =============================================================================

/// Storage backend for a Catalog.
#[derive(Debug)]
pub enum CatalogBackend {
    /// In-memory catalog (fast, volatile).
    InMemory(MemoryCatalog),
    /// Disk-backed catalog using redb (ACID, persistent).
    Persistent(RedbCatalog),
}

impl Default for CatalogBackend {
    fn default() -> Self {
        Self::InMemory(MemoryCatalog::new())
    }
}

/// Owner of a catalog backend. Hands out scoped read handles.
#[derive(Debug, Default)]
pub struct Catalog {
    backend: CatalogBackend,
}

impl Catalog {
    /// Create an empty in-memory catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing in-memory catalog.
    #[must_use]
    pub fn with_memory(memory: MemoryCatalog) -> Self {
        Self {
            backend: CatalogBackend::InMemory(memory),
        }
    }

    /// Open or create a redb-backed catalog at `path`.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Ok(Self {
            backend: CatalogBackend::Persistent(RedbCatalog::open(path)?),
        })
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, CatalogBackend::Persistent(_))
    }

    /// Acquire a read handle. The handle is released when dropped.
    pub fn reader(&self) -> Result<CatalogHandle<'_>, CatalogError> {
        match &self.backend {
            CatalogBackend::InMemory(memory) => Ok(CatalogHandle::Memory(memory)),
            CatalogBackend::Persistent(redb) => Ok(CatalogHandle::Redb(redb.reader()?)),
        }
    }

    /// Insert records in one batch. Returns the assigned object ids.
    pub fn insert_images(&mut self, records: &[ImageRecord]) -> Result<Vec<ObjectId>, CatalogError> {
        match &mut self.backend {
            CatalogBackend::InMemory(memory) => Ok(records
                .iter()
                .cloned()
                .map(|r| memory.insert_image(r))
                .collect()),
            CatalogBackend::Persistent(redb) => redb.insert_images(records),
        }
    }

    /// Import records and tag entries in one batch.
    ///
    /// See [`MemoryCatalog::import`] for the replacement rules. The redb
    /// backend applies them in a single write transaction.
    pub fn import(
        &mut self,
        records: &[ImageRecord],
        entries: &[TagEntry],
    ) -> Result<ImportSummary, CatalogError> {
        match &mut self.backend {
            CatalogBackend::InMemory(memory) => Ok(memory.import(records, entries)),
            CatalogBackend::Persistent(redb) => redb.import(records, entries),
        }
    }

    /// Append tag entries in one batch, without merging by name.
    pub fn insert_tag_entries(&mut self, entries: &[TagEntry]) -> Result<(), CatalogError> {
        match &mut self.backend {
            CatalogBackend::InMemory(memory) => {
                for entry in entries {
                    memory.insert_tag_entry(entry.clone());
                }
                Ok(())
            }
            CatalogBackend::Persistent(redb) => redb.insert_tag_entries(entries),
        }
    }
}

/// A scoped read handle over one catalog backend.
#[derive(Debug)]
pub enum CatalogHandle<'a> {
    /// Borrowed in-memory catalog.
    Memory(&'a MemoryCatalog),
    /// Open redb read transaction.
    Redb(RedbReader),
}

impl CatalogReader for CatalogHandle<'_> {
    fn find_tag_entries(
        &self,
        tags: &[String],
        mode: TagMatch,
    ) -> Result<Vec<TagEntry>, CatalogError> {
        match self {
            Self::Memory(m) => m.find_tag_entries(tags, mode),
            Self::Redb(r) => r.find_tag_entries(tags, mode),
        }
    }

    fn find_records_by_ids(&self, ids: &[SerialNo]) -> Result<Vec<StoredImage>, CatalogError> {
        match self {
            Self::Memory(m) => m.find_records_by_ids(ids),
            Self::Redb(r) => r.find_records_by_ids(ids),
        }
    }

    fn list_records(&self, window: PageWindow) -> Result<Vec<StoredImage>, CatalogError> {
        match self {
            Self::Memory(m) => m.list_records(window),
            Self::Redb(r) => r.list_records(window),
        }
    }

    fn record_count(&self) -> Result<usize, CatalogError> {
        match self {
            Self::Memory(m) => m.record_count(),
            Self::Redb(r) => r.record_count(),
        }
    }

    fn tag_entry_count(&self) -> Result<usize, CatalogError> {
        match self {
            Self::Memory(m) => m.tag_entry_count(),
            Self::Redb(r) => r.tag_entry_count(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
