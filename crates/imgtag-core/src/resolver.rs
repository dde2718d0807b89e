//! # Record Resolver
//!
//! Turns an ordered list of serial numbers into sanitized image records.
//!
//! - Output order follows the input order, whatever order the store
//!   returns documents in.
//! - Serial numbers with no stored document are skipped silently.
//! - The storage-internal `ObjectId` is dropped from every record.

use crate::catalog::CatalogReader;
use crate::{CatalogError, ImageRecord, SerialNo, StoredImage};
use std::collections::BTreeMap;

/// Strip storage-only fields from stored documents.
#[must_use]
pub fn sanitize(stored: Vec<StoredImage>) -> Vec<ImageRecord> {
    stored.into_iter().map(StoredImage::into_record).collect()
}

/// Fetch and sanitize the records for `ids`, preserving the order of `ids`.
pub fn resolve<R>(reader: &R, ids: &[SerialNo]) -> Result<Vec<ImageRecord>, CatalogError>
where
    R: CatalogReader + ?Sized,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_serial: BTreeMap<SerialNo, StoredImage> = reader
        .find_records_by_ids(ids)?
        .into_iter()
        .map(|stored| (stored.serial_no(), stored))
        .collect();

    Ok(ids
        .iter()
        .filter_map(|serial| by_serial.remove(serial))
        .map(StoredImage::into_record)
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ObjectId;
    use crate::catalog::MemoryCatalog;

    fn catalog_with(serials: &[u64]) -> MemoryCatalog {
        let mut memory = MemoryCatalog::new();
        for &s in serials {
            memory.insert_image(ImageRecord::new(SerialNo(s), format!("img-{s}")));
        }
        memory
    }

    #[test]
    fn preserves_requested_order() {
        let memory = catalog_with(&[1, 2, 3, 4]);
        let ids = [SerialNo(4), SerialNo(1), SerialNo(3)];
        let records = resolve(&memory, &ids).unwrap();
        let got: Vec<_> = records.iter().map(|r| r.serial_no).collect();
        assert_eq!(got, ids.to_vec());
    }

    #[test]
    fn missing_records_are_skipped() {
        let memory = catalog_with(&[1, 3]);
        let records = resolve(&memory, &[SerialNo(1), SerialNo(2), SerialNo(3)]).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn repeated_ids_emit_once() {
        let memory = catalog_with(&[1]);
        let records = resolve(&memory, &[SerialNo(1), SerialNo(1)]).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn sanitized_output_has_no_internal_identity() {
        let memory = catalog_with(&[8]);
        let records = resolve(&memory, &[SerialNo(8)]).unwrap();
        let json = serde_json::to_value(&records).unwrap();
        assert!(json[0].get("object_id").is_none());
        assert!(json[0].get("_id").is_none());
    }

    #[test]
    fn sanitize_drops_object_id() {
        let stored = vec![StoredImage::new(
            ObjectId(5),
            ImageRecord::new(SerialNo(1), "a"),
        )];
        assert_eq!(sanitize(stored), vec![ImageRecord::new(SerialNo(1), "a")]);
    }

    #[test]
    fn empty_ids_skip_the_store() {
        let memory = MemoryCatalog::new();
        assert!(resolve(&memory, &[]).unwrap().is_empty());
    }
}
