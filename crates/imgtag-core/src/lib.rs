//! # imgtag-core
//!
//! The tag aggregation and sampling engine for the imgtag image catalog.
//!
//! Given a list of tag names, the engine resolves each tag to the serial
//! numbers of the images carrying it, merges them without duplicates,
//! optionally shuffles them with an explicit seed, cuts one page, and
//! fetches the matching records with their storage identity removed.
//!
//! ## Pipeline
//!
//! ```text
//! tags -> lookup -> dedupe -> [shuffle] -> page -> resolve -> records
//! ```
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Stateless per request: only the catalog store holds data
//! - Deterministic: identical store contents, query and seed give identical output

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod dedupe;
pub mod engine;
pub mod formats;
pub mod lookup;
pub mod page;
pub mod primitives;
pub mod resolver;
pub mod shuffle;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CatalogError, ImageRecord, ImportSummary, ObjectId, SerialNo, StoredImage, TagEntry, fold_tag,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use catalog::{Catalog, CatalogBackend, CatalogHandle, CatalogReader, MemoryCatalog, TagMatch};
pub use dedupe::{dedupe, dedupe_entries};
pub use engine::{Engine, TagQuery, TagSample, unix_seconds_seed};
pub use lookup::{TagLookup, lookup, normalize_tags};
pub use page::{PagePolicy, PageWindow, parse_page, slice};
pub use resolver::{resolve, sanitize};
pub use shuffle::{Lcg, ShuffleMode, shuffle};
pub use storage::{RedbCatalog, RedbReader};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{Dataset, derive_tag_entries};
