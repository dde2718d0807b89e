//! # Identifier Deduplicator
//!
//! Merges serial number lists from several tag entries into one
//! duplicate-free sequence, keeping first-seen order across the
//! concatenation of the input lists.

use crate::{SerialNo, TagEntry};
use std::collections::BTreeSet;

/// Union of the given identifier lists, in first-seen order.
#[must_use]
pub fn dedupe<'a, I>(lists: I) -> Vec<SerialNo>
where
    I: IntoIterator<Item = &'a [SerialNo]>,
{
    let mut seen = BTreeSet::new();
    let mut merged = Vec::new();
    for list in lists {
        for &serial in list {
            if seen.insert(serial) {
                merged.push(serial);
            }
        }
    }
    merged
}

/// Union of the serial number lists of the given tag entries.
#[must_use]
pub fn dedupe_entries(entries: &[TagEntry]) -> Vec<SerialNo> {
    dedupe(entries.iter().map(|e| e.serial_number_list.as_slice()))
}
