//! # Sampling Engine
//!
//! The request pipelines built from the engine stages:
//!
//! ```text
//! tags -> lookup -> dedupe -> [seeded shuffle] -> page slice -> resolve
//! page -> list window -> sanitize
//! ```
//!
//! The engine holds configuration only. Every call takes the read handle
//! for the current request and keeps no state between calls.
//!
//! ## Pagination when no page is given
//!
//! Both routes use `PagePolicy::FirstPage`: the listing returns its first
//! 40 records, the tag sample its first 60. [`Engine::list_all`] applies
//! `PagePolicy::All` for full exports.

use crate::catalog::{CatalogReader, TagMatch};
use crate::dedupe::dedupe_entries;
use crate::lookup::lookup;
use crate::page::{PagePolicy, PageWindow, slice_owned};
use crate::primitives::{LISTING_PAGE_SIZE, TAG_SAMPLE_CAP};
use crate::resolver::{resolve, sanitize};
use crate::shuffle::ShuffleMode;
use crate::{CatalogError, ImageRecord, SerialNo};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seed from the current wall-clock time in whole seconds.
///
/// Requests served within the same second share a seed.
#[must_use]
pub fn unix_seconds_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A tag-based sampling request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagQuery {
    /// Requested tag names.
    pub tags: Vec<String>,
    /// 1-based page number; `None` means the first page.
    pub page: Option<u64>,
    /// Whether and how matches are shuffled before paging.
    pub shuffle: ShuffleMode,
}

impl TagQuery {
    /// Unshuffled query for the first page.
    #[must_use]
    pub fn new(tags: Vec<String>) -> Self {
        Self {
            tags,
            page: None,
            shuffle: ShuffleMode::Off,
        }
    }

    /// Set the page.
    #[must_use]
    pub fn page(mut self, page: Option<u64>) -> Self {
        self.page = page;
        self
    }

    /// Shuffle with the given seed.
    #[must_use]
    pub fn seeded(mut self, seed: u64) -> Self {
        self.shuffle = ShuffleMode::Seeded(seed);
        self
    }
}

/// The result of a tag-based sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSample {
    /// Sanitized records for the requested page.
    pub records: Vec<ImageRecord>,
    /// Number of distinct serial numbers matched before paging.
    pub matched: usize,
    /// Seed used for shuffling, if any.
    pub seed: Option<u64>,
    /// Serial numbers each normalized request tag contributed, before
    /// deduplication across tags.
    pub by_tag: BTreeMap<String, Vec<SerialNo>>,
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    /// How request tags are compared with stored tag names.
    pub tag_match: TagMatch,
    /// Records per listing page.
    pub listing_page_size: usize,
    /// Records per tag sample page.
    pub sample_cap: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            tag_match: TagMatch::CaseInsensitive,
            listing_page_size: LISTING_PAGE_SIZE,
            sample_cap: TAG_SAMPLE_CAP,
        }
    }
}

impl Engine {
    /// Engine with default limits and the given tag matching mode.
    #[must_use]
    pub fn with_tag_match(tag_match: TagMatch) -> Self {
        Self {
            tag_match,
            ..Self::default()
        }
    }

    /// Resolve tags to a deduplicated, optionally shuffled page of records.
    ///
    /// Invalid tags fail before the store is touched. A store failure is
    /// returned as is. An empty page after all lookups succeeded is
    /// `NotFound`.
    pub fn sample_by_tags<R>(&self, reader: &R, query: &TagQuery) -> Result<TagSample, CatalogError>
    where
        R: CatalogReader + ?Sized,
    {
        let found = lookup(reader, &query.tags, self.tag_match)?;
        let ids = dedupe_entries(&found.entries);
        let matched = ids.len();

        let ordered = query.shuffle.apply(ids);
        let window = PageWindow::for_page(query.page, self.sample_cap, PagePolicy::FirstPage);
        let page_ids = slice_owned(ordered, window);

        let records = resolve(reader, &page_ids)?;
        if records.is_empty() {
            return Err(CatalogError::NotFound(
                "No images found for the provided tags".to_string(),
            ));
        }

        let seed = match query.shuffle {
            ShuffleMode::Off => None,
            ShuffleMode::Seeded(seed) => Some(seed),
        };
        Ok(TagSample {
            records,
            matched,
            seed,
            by_tag: found.by_tag(self.tag_match),
        })
    }

    /// One page of the plain image listing, in store order.
    ///
    /// An empty page is `NotFound`.
    pub fn list_page<R>(
        &self,
        reader: &R,
        page: Option<u64>,
    ) -> Result<Vec<ImageRecord>, CatalogError>
    where
        R: CatalogReader + ?Sized,
    {
        self.list_window(reader, page, PagePolicy::FirstPage)
    }

    /// Every record in store order, unpaginated.
    ///
    /// An empty catalog is `NotFound`.
    pub fn list_all<R>(&self, reader: &R) -> Result<Vec<ImageRecord>, CatalogError>
    where
        R: CatalogReader + ?Sized,
    {
        self.list_window(reader, None, PagePolicy::All)
    }

    fn list_window<R>(
        &self,
        reader: &R,
        page: Option<u64>,
        policy: PagePolicy,
    ) -> Result<Vec<ImageRecord>, CatalogError>
    where
        R: CatalogReader + ?Sized,
    {
        let window = PageWindow::for_page(page, self.listing_page_size, policy);
        let records = sanitize(reader.list_records(window)?);
        if records.is_empty() {
            return Err(CatalogError::NotFound("No documents found".to_string()));
        }
        Ok(records)
    }
}

// =============================================================================
// TESTS
// =============================================================================
