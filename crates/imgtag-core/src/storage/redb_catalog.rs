//! # redb-backed Catalog Storage
//!
//! A disk-backed tag and image store using the redb embedded database.
//!
//! ## Tables
//!
//! - `images`: ObjectId(u64) -> postcard `StoredImage`
//! - `serial_index`: SerialNo(u64) -> ObjectId(u64)
//! - `tag_entries`: entry id(u64) -> postcard `TagEntry`
//! - `tag_index`: lowercased tag name -> postcard `Vec<u64>` of entry ids
//! - `metadata`: counter name -> u64
//!
//! Several tag entries may share a tag name; the index keeps all of their
//! ids. Reads go through [`RedbReader`], which owns one read transaction.
//!
//! [`RedbCatalog::import`] is the consistent write path: records, tag
//! membership and both tag tables change in one write transaction.

use crate::catalog::{CatalogReader, TagMatch};
use crate::page::PageWindow;
use crate::{
    CatalogError, ImageRecord, ImportSummary, ObjectId, SerialNo, StoredImage, TagEntry, fold_tag,
};
use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition,
};
use std::collections::BTreeSet;
use std::path::Path;

/// Table for images: ObjectId(u64) -> serialized StoredImage bytes
const IMAGES: TableDefinition<u64, &[u8]> = TableDefinition::new("images");

/// Table for the serial index: SerialNo(u64) -> ObjectId(u64)
const SERIAL_INDEX: TableDefinition<u64, u64> = TableDefinition::new("serial_index");

/// Table for tag entries: entry id -> serialized TagEntry bytes
const TAG_ENTRIES: TableDefinition<u64, &[u8]> = TableDefinition::new("tag_entries");

/// Table for the tag name index: folded tag name -> serialized Vec<u64> of entry ids
const TAG_INDEX: TableDefinition<&str, &[u8]> = TableDefinition::new("tag_index");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_OBJECT_ID: &str = "next_object_id";
const NEXT_TAG_ENTRY_ID: &str = "next_tag_entry_id";

fn store_err(e: impl std::fmt::Display) -> CatalogError {
    CatalogError::StoreUnavailable(e.to_string())
}

fn codec_err(e: impl std::fmt::Display) -> CatalogError {
    CatalogError::Serialization(e.to_string())
}

/// A disk-backed catalog using redb.
pub struct RedbCatalog {
    /// The redb database handle.
    db: Database,
    /// Next available object id.
    next_object_id: u64,
    /// Next available tag entry id.
    next_tag_entry_id: u64,
}

impl std::fmt::Debug for RedbCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbCatalog")
            .field("next_object_id", &self.next_object_id)
            .field("next_tag_entry_id", &self.next_tag_entry_id)
            .finish_non_exhaustive()
    }
}

impl RedbCatalog {
    /// Open or create a catalog database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let db = Database::create(path.as_ref()).map_err(store_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(store_err)?;
            let _ = write_txn.open_table(IMAGES).map_err(store_err)?;
            let _ = write_txn.open_table(SERIAL_INDEX).map_err(store_err)?;
            let _ = write_txn.open_table(TAG_ENTRIES).map_err(store_err)?;
            let _ = write_txn.open_table(TAG_INDEX).map_err(store_err)?;
            let _ = write_txn.open_table(METADATA).map_err(store_err)?;
            write_txn.commit().map_err(store_err)?;
        }

        let read_txn = db.begin_read().map_err(store_err)?;
        let (next_object_id, next_tag_entry_id) = {
            let table = read_txn.open_table(METADATA).map_err(store_err)?;
            let objects = table
                .get(NEXT_OBJECT_ID)
                .map_err(store_err)?
                .map(|v| v.value())
                .unwrap_or(0);
            let entries = table
                .get(NEXT_TAG_ENTRY_ID)
                .map_err(store_err)?
                .map(|v| v.value())
                .unwrap_or(0);
            (objects, entries)
        };

        Ok(Self {
            db,
            next_object_id,
            next_tag_entry_id,
        })
    }

    /// Begin a read transaction wrapped as a catalog reader.
    pub fn reader(&self) -> Result<RedbReader, CatalogError> {
        let txn = self.db.begin_read().map_err(store_err)?;
        Ok(RedbReader { txn })
    }

    /// Insert records in a single ACID transaction.
    ///
    /// A record whose serial number is already stored replaces the previous
    /// document and keeps its object id.
    pub fn insert_images(
        &mut self,
        records: &[ImageRecord],
    ) -> Result<Vec<ObjectId>, CatalogError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut current_next_id = self.next_object_id;
        let mut object_ids = Vec::with_capacity(records.len());

        let write_txn = self.db.begin_write().map_err(store_err)?;
        {
            let mut images = write_txn.open_table(IMAGES).map_err(store_err)?;
            let mut serials = write_txn.open_table(SERIAL_INDEX).map_err(store_err)?;
            let mut meta = write_txn.open_table(METADATA).map_err(store_err)?;

            for record in records {
                let existing = serials
                    .get(record.serial_no.0)
                    .map_err(store_err)?
                    .map(|v| v.value());
                let object_id = match existing {
                    Some(id) => ObjectId(id),
                    None => {
                        let id = ObjectId(current_next_id);
                        current_next_id = current_next_id.saturating_add(1);
                        serials
                            .insert(record.serial_no.0, id.0)
                            .map_err(store_err)?;
                        id
                    }
                };

                let stored = StoredImage::new(object_id, record.clone());
                let bytes = postcard::to_allocvec(&stored).map_err(codec_err)?;
                images
                    .insert(object_id.0, bytes.as_slice())
                    .map_err(store_err)?;
                object_ids.push(object_id);
            }

            meta.insert(NEXT_OBJECT_ID, current_next_id)
                .map_err(store_err)?;
        }
        write_txn.commit().map_err(store_err)?;

        // Update in-memory state only after successful commit.
        self.next_object_id = current_next_id;
        Ok(object_ids)
    }

    /// Import records and tag entries in a single ACID transaction.
    ///
    /// Imported serial numbers first leave every stored tag entry; entries
    /// left empty are deleted along with their index ids. Each new entry then
    /// merges into the stored entry with the same exact name, or gets a new id.
    pub fn import(
        &mut self,
        records: &[ImageRecord],
        entries: &[TagEntry],
    ) -> Result<ImportSummary, CatalogError> {
        let mut next_object_id = self.next_object_id;
        let mut next_entry_id = self.next_tag_entry_id;
        let replaced: BTreeSet<SerialNo> = records.iter().map(|r| r.serial_no).collect();
        let mut pruned_entries = 0;

        let write_txn = self.db.begin_write().map_err(store_err)?;
        {
            let mut images = write_txn.open_table(IMAGES).map_err(store_err)?;
            let mut serials = write_txn.open_table(SERIAL_INDEX).map_err(store_err)?;
            let mut entry_table = write_txn.open_table(TAG_ENTRIES).map_err(store_err)?;
            let mut index = write_txn.open_table(TAG_INDEX).map_err(store_err)?;
            let mut meta = write_txn.open_table(METADATA).map_err(store_err)?;

            for record in records {
                let existing = serials
                    .get(record.serial_no.0)
                    .map_err(store_err)?
                    .map(|v| v.value());
                let object_id = match existing {
                    Some(id) => ObjectId(id),
                    None => {
                        let id = ObjectId(next_object_id);
                        next_object_id = next_object_id.saturating_add(1);
                        serials
                            .insert(record.serial_no.0, id.0)
                            .map_err(store_err)?;
                        id
                    }
                };
                let bytes = postcard::to_allocvec(&StoredImage::new(object_id, record.clone()))
                    .map_err(codec_err)?;
                images
                    .insert(object_id.0, bytes.as_slice())
                    .map_err(store_err)?;
            }

            // Collect stale memberships before mutating the table.
            let mut stale: Vec<(u64, TagEntry)> = Vec::new();
            if !replaced.is_empty() {
                for item in entry_table.iter().map_err(store_err)? {
                    let (key, value) = item.map_err(store_err)?;
                    let mut entry: TagEntry =
                        postcard::from_bytes(value.value()).map_err(codec_err)?;
                    if entry.remove_serials(&replaced) {
                        stale.push((key.value(), entry));
                    }
                }
            }

            for (entry_id, entry) in stale {
                if entry.serial_number_list.is_empty() {
                    entry_table.remove(entry_id).map_err(store_err)?;
                    let folded = entry.folded_name();
                    let mut ids: Vec<u64> = match index.get(folded.as_str()).map_err(store_err)? {
                        Some(data) => postcard::from_bytes(data.value()).map_err(codec_err)?,
                        None => Vec::new(),
                    };
                    ids.retain(|id| *id != entry_id);
                    if ids.is_empty() {
                        index.remove(folded.as_str()).map_err(store_err)?;
                    } else {
                        let id_bytes = postcard::to_allocvec(&ids).map_err(codec_err)?;
                        index
                            .insert(folded.as_str(), id_bytes.as_slice())
                            .map_err(store_err)?;
                    }
                    pruned_entries += 1;
                } else {
                    let bytes = postcard::to_allocvec(&entry).map_err(codec_err)?;
                    entry_table
                        .insert(entry_id, bytes.as_slice())
                        .map_err(store_err)?;
                }
            }

            for entry in entries {
                let folded = entry.folded_name();
                let mut ids: Vec<u64> = match index.get(folded.as_str()).map_err(store_err)? {
                    Some(data) => postcard::from_bytes(data.value()).map_err(codec_err)?,
                    None => Vec::new(),
                };

                let mut same_name = None;
                for id in &ids {
                    let stored: Option<TagEntry> = match entry_table.get(*id).map_err(store_err)? {
                        Some(data) => Some(postcard::from_bytes(data.value()).map_err(codec_err)?),
                        None => None,
                    };
                    if let Some(stored) = stored.filter(|e| e.tag_name == entry.tag_name) {
                        same_name = Some((*id, stored));
                        break;
                    }
                }

                match same_name {
                    Some((entry_id, mut stored)) => {
                        stored.merge_serials(&entry.serial_number_list);
                        let bytes = postcard::to_allocvec(&stored).map_err(codec_err)?;
                        entry_table
                            .insert(entry_id, bytes.as_slice())
                            .map_err(store_err)?;
                    }
                    None => {
                        let entry_id = next_entry_id;
                        next_entry_id = next_entry_id.saturating_add(1);
                        let bytes = postcard::to_allocvec(entry).map_err(codec_err)?;
                        entry_table
                            .insert(entry_id, bytes.as_slice())
                            .map_err(store_err)?;
                        ids.push(entry_id);
                        let id_bytes = postcard::to_allocvec(&ids).map_err(codec_err)?;
                        index
                            .insert(folded.as_str(), id_bytes.as_slice())
                            .map_err(store_err)?;
                    }
                }
            }

            meta.insert(NEXT_OBJECT_ID, next_object_id)
                .map_err(store_err)?;
            meta.insert(NEXT_TAG_ENTRY_ID, next_entry_id)
                .map_err(store_err)?;
        }
        write_txn.commit().map_err(store_err)?;

        self.next_object_id = next_object_id;
        self.next_tag_entry_id = next_entry_id;
        Ok(ImportSummary {
            images: records.len(),
            tag_entries: entries.len(),
            pruned_entries,
        })
    }

    /// Append tag entries in a single ACID transaction, without merging by name.
    pub fn insert_tag_entries(&mut self, entries: &[TagEntry]) -> Result<(), CatalogError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut current_next_id = self.next_tag_entry_id;

        let write_txn = self.db.begin_write().map_err(store_err)?;
        {
            let mut entry_table = write_txn.open_table(TAG_ENTRIES).map_err(store_err)?;
            let mut index = write_txn.open_table(TAG_INDEX).map_err(store_err)?;
            let mut meta = write_txn.open_table(METADATA).map_err(store_err)?;

            for entry in entries {
                let entry_id = current_next_id;
                current_next_id = current_next_id.saturating_add(1);

                let bytes = postcard::to_allocvec(entry).map_err(codec_err)?;
                entry_table
                    .insert(entry_id, bytes.as_slice())
                    .map_err(store_err)?;

                // Read-modify-write of the index row within the same transaction.
                let folded = entry.folded_name();
                let mut ids: Vec<u64> = match index.get(folded.as_str()).map_err(store_err)? {
                    Some(data) => postcard::from_bytes(data.value()).map_err(codec_err)?,
                    None => Vec::new(),
                };
                ids.push(entry_id);
                let id_bytes = postcard::to_allocvec(&ids).map_err(codec_err)?;
                index
                    .insert(folded.as_str(), id_bytes.as_slice())
                    .map_err(store_err)?;
            }

            meta.insert(NEXT_TAG_ENTRY_ID, current_next_id)
                .map_err(store_err)?;
        }
        write_txn.commit().map_err(store_err)?;

        self.next_tag_entry_id = current_next_id;
        Ok(())
    }
}

// =============================================================================
// READER
// =============================================================================

/// A catalog reader over one redb read transaction.
///
/// Dropping the reader releases the transaction.
pub struct RedbReader {
    txn: ReadTransaction,
}

impl std::fmt::Debug for RedbReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbReader").finish_non_exhaustive()
    }
}

impl CatalogReader for RedbReader {
    fn find_tag_entries(
        &self,
        tags: &[String],
        mode: TagMatch,
    ) -> Result<Vec<TagEntry>, CatalogError> {
        let index = self.txn.open_table(TAG_INDEX).map_err(store_err)?;
        let entry_table = self.txn.open_table(TAG_ENTRIES).map_err(store_err)?;

        // The index is keyed by folded name; exact mode narrows afterwards.
        let mut entry_ids = BTreeSet::new();
        for tag in tags {
            let folded = fold_tag(tag);
            if let Some(data) = index.get(folded.as_str()).map_err(store_err)? {
                let ids: Vec<u64> = postcard::from_bytes(data.value()).map_err(codec_err)?;
                entry_ids.extend(ids);
            }
        }

        let mut entries = Vec::with_capacity(entry_ids.len());
        for id in entry_ids {
            let Some(data) = entry_table.get(id).map_err(store_err)? else {
                continue;
            };
            let entry: TagEntry = postcard::from_bytes(data.value()).map_err(codec_err)?;
            if tags.iter().any(|t| mode.matches(&entry.tag_name, t)) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn find_records_by_ids(&self, ids: &[SerialNo]) -> Result<Vec<StoredImage>, CatalogError> {
        let serials = self.txn.open_table(SERIAL_INDEX).map_err(store_err)?;
        let images = self.txn.open_table(IMAGES).map_err(store_err)?;

        let mut object_ids = BTreeSet::new();
        for serial in ids {
            if let Some(object_id) = serials.get(serial.0).map_err(store_err)? {
                object_ids.insert(object_id.value());
            }
        }

        let mut found = Vec::with_capacity(object_ids.len());
        for object_id in object_ids {
            if let Some(data) = images.get(object_id).map_err(store_err)? {
                let stored: StoredImage =
                    postcard::from_bytes(data.value()).map_err(codec_err)?;
                found.push(stored);
            }
        }
        Ok(found)
    }

    fn list_records(&self, window: PageWindow) -> Result<Vec<StoredImage>, CatalogError> {
        let images = self.txn.open_table(IMAGES).map_err(store_err)?;
        let total = images.len().map_err(store_err)? as usize;
        let take = window.end(total).saturating_sub(window.offset);

        let mut page = Vec::with_capacity(take);
        for entry in images.iter().map_err(store_err)?.skip(window.offset).take(take) {
            let (_, value) = entry.map_err(store_err)?;
            let stored: StoredImage = postcard::from_bytes(value.value()).map_err(codec_err)?;
            page.push(stored);
        }
        Ok(page)
    }

    fn record_count(&self) -> Result<usize, CatalogError> {
        let images = self.txn.open_table(IMAGES).map_err(store_err)?;
        Ok(images.len().map_err(store_err)? as usize)
    }

    fn tag_entry_count(&self) -> Result<usize, CatalogError> {
        let entries = self.txn.open_table(TAG_ENTRIES).map_err(store_err)?;
        Ok(entries.len().map_err(store_err)? as usize)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::page::PagePolicy;
    use tempfile::tempdir;

    fn record(serial: u64, title: &str) -> ImageRecord {
        ImageRecord::new(SerialNo(serial), title)
    }

    #[test]
    fn insert_and_find_images() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");

        let ids = catalog
            .insert_images(&[record(10, "a"), record(20, "b")])
            .expect("insert");
        assert_eq!(ids, vec![ObjectId(0), ObjectId(1)]);

        let reader = catalog.reader().expect("reader");
        let found = reader
            .find_records_by_ids(&[SerialNo(20), SerialNo(99)])
            .expect("find");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record.title, "b");
        assert_eq!(found[0].object_id, ObjectId(1));
    }

    #[test]
    fn same_serial_replaces_document() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");

        catalog.insert_images(&[record(1, "old")]).expect("insert");
        let ids = catalog.insert_images(&[record(1, "new")]).expect("insert");
        assert_eq!(ids, vec![ObjectId(0)]);

        let reader = catalog.reader().expect("reader");
        assert_eq!(reader.record_count().expect("count"), 1);
        let found = reader.find_records_by_ids(&[SerialNo(1)]).expect("find");
        assert_eq!(found[0].record.title, "new");
    }

    #[test]
    fn multiple_entries_per_tag_name() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");

        catalog
            .insert_tag_entries(&[
                TagEntry::new("Sunset", vec![SerialNo(1), SerialNo(2)]),
                TagEntry::new("sunset", vec![SerialNo(3)]),
                TagEntry::new("beach", vec![SerialNo(3), SerialNo(4)]),
            ])
            .expect("insert");

        let reader = catalog.reader().expect("reader");
        let insensitive = reader
            .find_tag_entries(&["SUNSET".to_string()], TagMatch::CaseInsensitive)
            .expect("find");
        assert_eq!(insensitive.len(), 2);

        let exact = reader
            .find_tag_entries(&["Sunset".to_string()], TagMatch::Exact)
            .expect("find");
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].serial_number_list, vec![SerialNo(1), SerialNo(2)]);

        let none = reader
            .find_tag_entries(&["mountain".to_string()], TagMatch::CaseInsensitive)
            .expect("find");
        assert!(none.is_empty());
    }

    #[test]
    fn overlapping_request_tags_return_each_entry_once() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");
        catalog
            .insert_tag_entries(&[TagEntry::new("sunset", vec![SerialNo(1)])])
            .expect("insert");

        let reader = catalog.reader().expect("reader");
        let found = reader
            .find_tag_entries(
                &["sunset".to_string(), "Sunset".to_string()],
                TagMatch::CaseInsensitive,
            )
            .expect("find");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn list_records_in_insertion_order() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");
        let records: Vec<_> = (1..=45).map(|i| record(i * 10, "x")).collect();
        catalog.insert_images(&records).expect("insert");

        let reader = catalog.reader().expect("reader");
        let window = PageWindow::for_page(Some(2), 40, PagePolicy::FirstPage);
        let page = reader.list_records(window).expect("list");
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].serial_no(), SerialNo(410));

        let past_end = PageWindow::for_page(Some(3), 40, PagePolicy::FirstPage);
        assert!(reader.list_records(past_end).expect("list").is_empty());
    }

    #[test]
    fn reimport_with_changed_tags_drops_stale_membership() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");

        catalog
            .import(
                &[record(1, "pier").with_tag("beach")],
                &[TagEntry::new("beach", vec![SerialNo(1)])],
            )
            .expect("first import");
        let summary = catalog
            .import(
                &[record(1, "pier").with_tag("snow")],
                &[TagEntry::new("snow", vec![SerialNo(1)])],
            )
            .expect("second import");
        assert_eq!(summary.pruned_entries, 1);

        let reader = catalog.reader().expect("reader");
        assert_eq!(reader.tag_entry_count().expect("count"), 1);
        assert!(
            reader
                .find_tag_entries(&["beach".to_string()], TagMatch::CaseInsensitive)
                .expect("find")
                .is_empty()
        );
        let snow = reader
            .find_tag_entries(&["snow".to_string()], TagMatch::CaseInsensitive)
            .expect("find");
        assert_eq!(snow[0].serial_number_list, vec![SerialNo(1)]);
    }

    #[test]
    fn importing_same_dataset_twice_is_stable() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");
        let records = [record(1, "a"), record(2, "b")];
        let entries = [
            TagEntry::new("Sunset", vec![SerialNo(1), SerialNo(2)]),
            TagEntry::new("beach", vec![SerialNo(2)]),
        ];

        catalog.import(&records, &entries).expect("first import");
        catalog.import(&records, &entries).expect("second import");

        let reader = catalog.reader().expect("reader");
        assert_eq!(reader.record_count().expect("count"), 2);
        assert_eq!(reader.tag_entry_count().expect("count"), 2);
        let sunset = reader
            .find_tag_entries(&["sunset".to_string()], TagMatch::CaseInsensitive)
            .expect("find");
        assert_eq!(sunset.len(), 1);
        assert_eq!(sunset[0].serial_number_list, vec![SerialNo(1), SerialNo(2)]);
    }

    #[test]
    fn partial_import_keeps_untouched_records_tags() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");

        catalog
            .import(
                &[record(1, "a"), record(2, "b")],
                &[TagEntry::new("beach", vec![SerialNo(1), SerialNo(2)])],
            )
            .expect("first import");
        catalog
            .import(
                &[record(2, "b2")],
                &[TagEntry::new("desert", vec![SerialNo(2)])],
            )
            .expect("second import");

        let reader = catalog.reader().expect("reader");
        let beach = reader
            .find_tag_entries(&["beach".to_string()], TagMatch::Exact)
            .expect("find");
        assert_eq!(beach[0].serial_number_list, vec![SerialNo(1)]);
        assert_eq!(reader.tag_entry_count().expect("count"), 2);
    }

    #[test]
    fn counters_survive_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        {
            let mut catalog = RedbCatalog::open(&db_path).expect("open db");
            catalog
                .insert_images(&[record(1, "a"), record(2, "b")])
                .expect("insert");
            catalog
                .insert_tag_entries(&[TagEntry::new("a", vec![SerialNo(1)])])
                .expect("insert");
        }

        {
            let mut catalog = RedbCatalog::open(&db_path).expect("reopen db");
            let ids = catalog.insert_images(&[record(3, "c")]).expect("insert");
            assert_eq!(ids, vec![ObjectId(2)]);
            catalog
                .insert_tag_entries(&[TagEntry::new("A", vec![SerialNo(3)])])
                .expect("insert");

            let reader = catalog.reader().expect("reader");
            assert_eq!(reader.record_count().expect("count"), 3);
            assert_eq!(reader.tag_entry_count().expect("count"), 2);
            let found = reader
                .find_tag_entries(&["a".to_string()], TagMatch::CaseInsensitive)
                .expect("find");
            assert_eq!(found.len(), 2);
        }
    }

    #[test]
    fn empty_batches_are_noops() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");
        assert!(catalog.insert_images(&[]).expect("insert").is_empty());
        catalog.insert_tag_entries(&[]).expect("insert");
        let reader = catalog.reader().expect("reader");
        assert_eq!(reader.record_count().expect("count"), 0);
    }
}
