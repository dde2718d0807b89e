//! # Tag Index Lookup
//!
//! Validates the requested tag list and resolves it against the tag entry
//! store.
//!
//! Validation happens before any store access: an empty list, a blank tag,
//! or a list beyond the request limits is rejected with `InvalidInput`.

use crate::catalog::{CatalogReader, TagMatch};
use crate::primitives::{MAX_TAG_LENGTH, MAX_TAGS_PER_REQUEST};
use crate::{CatalogError, SerialNo, TagEntry, fold_tag};
use std::collections::{BTreeMap, BTreeSet};

/// Validate and normalize a requested tag list.
///
/// Tags are trimmed. Duplicates (under `mode`) are collapsed, keeping the
/// first occurrence.
pub fn normalize_tags(tags: &[String], mode: TagMatch) -> Result<Vec<String>, CatalogError> {
    if tags.is_empty() {
        return Err(CatalogError::InvalidInput(
            "tags must be a non-empty list".to_string(),
        ));
    }
    if tags.len() > MAX_TAGS_PER_REQUEST {
        return Err(CatalogError::InvalidInput(format!(
            "too many tags: {} (maximum {})",
            tags.len(),
            MAX_TAGS_PER_REQUEST
        )));
    }

    let mut seen = BTreeSet::new();
    let mut normalized = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(CatalogError::InvalidInput(
                "tags must not be blank".to_string(),
            ));
        }
        if trimmed.len() > MAX_TAG_LENGTH {
            return Err(CatalogError::InvalidInput(format!(
                "tag length {} exceeds maximum {} bytes",
                trimmed.len(),
                MAX_TAG_LENGTH
            )));
        }
        let key = match mode {
            TagMatch::CaseInsensitive => fold_tag(trimmed),
            TagMatch::Exact => trimmed.to_string(),
        };
        if seen.insert(key.clone()) {
            normalized.push(key);
        }
    }
    Ok(normalized)
}

/// Matched tag entries, grouped per requested tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagLookup {
    /// Requested tags in request order.
    pub tags: Vec<String>,
    /// Every matched entry, in store order.
    pub entries: Vec<TagEntry>,
}

impl TagLookup {
    /// Mapping from requested tag to the serial numbers its entries contribute.
    ///
    /// Unmatched tags map to an empty list.
    #[must_use]
    pub fn by_tag(&self, mode: TagMatch) -> BTreeMap<String, Vec<SerialNo>> {
        self.tags
            .iter()
            .map(|tag| {
                let serials = self
                    .entries
                    .iter()
                    .filter(|e| mode.matches(&e.tag_name, tag))
                    .flat_map(|e| e.serial_number_list.iter().copied())
                    .collect();
                (tag.clone(), serials)
            })
            .collect()
    }

    /// Whether no entry matched any tag.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve requested tags to their tag entries with one batched query.
pub fn lookup<R>(reader: &R, tags: &[String], mode: TagMatch) -> Result<TagLookup, CatalogError>
where
    R: CatalogReader + ?Sized,
{
    let tags = normalize_tags(tags, mode)?;
    let entries = reader.find_tag_entries(&tags, mode)?;
    Ok(TagLookup { tags, entries })
}
