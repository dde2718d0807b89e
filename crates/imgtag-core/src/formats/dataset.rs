//! # Dataset Format
//!
//! The import bundle used to populate a catalog: a list of image records
//! and, optionally, the tag summary that indexes them.
//!
//! The bundle is serde-derived and format-agnostic; the binary reads it as
//! JSON. When a bundle ships without a tag summary, tag entries can be
//! derived from the records' own `tags` sets.

use crate::{CatalogError, ImageRecord, SerialNo, TagEntry, fold_tag};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An import bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Image records.
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    /// Tag summary entries.
    #[serde(default)]
    pub tags: Vec<TagEntry>,
}

impl Dataset {
    /// Reject bundles that would produce an inconsistent catalog.
    ///
    /// - Serial numbers must be unique within `images`.
    /// - Tag names must not be blank.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = BTreeSet::new();
        for record in &self.images {
            if !seen.insert(record.serial_no) {
                return Err(CatalogError::InvalidInput(format!(
                    "duplicate serial number {} in dataset",
                    record.serial_no
                )));
            }
        }
        if let Some(entry) = self.tags.iter().find(|e| e.tag_name.trim().is_empty()) {
            return Err(CatalogError::InvalidInput(format!(
                "blank tag name in tag entry with {} serial numbers",
                entry.serial_number_list.len()
            )));
        }
        Ok(())
    }

    /// Replace the tag summary with one derived from the records.
    pub fn derive_tags(&mut self) {
        self.tags = derive_tag_entries(&self.images);
    }
}

/// Build one tag entry per distinct lowercased tag across `records`.
///
/// Entries are ordered by tag name; each list follows record order.
#[must_use]
pub fn derive_tag_entries(records: &[ImageRecord]) -> Vec<TagEntry> {
    let mut by_tag: BTreeMap<String, Vec<SerialNo>> = BTreeMap::new();
    for record in records {
        let folded: BTreeSet<String> = record
            .tags
            .iter()
            .map(|t| fold_tag(t))
            .filter(|t| !t.is_empty())
            .collect();
        for tag in folded {
            by_tag.entry(tag).or_default().push(record.serial_no);
        }
    }
    by_tag
        .into_iter()
        .map(|(name, serials)| TagEntry::new(name, serials))
        .collect()
}
