//! # Pipeline Scenario Tests
//!
//! End-to-end runs of the engine against both catalog backends.

use imgtag_core::{
    Catalog, CatalogError, CatalogReader, Dataset, Engine, ImageRecord, SerialNo, TagEntry,
    TagMatch, TagQuery,
};
use tempfile::tempdir;

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

fn sunset_beach_dataset() -> Dataset {
    Dataset {
        images: (1..=4)
            .map(|i| ImageRecord::new(SerialNo(i), format!("img-{i}")).with_attribute("url", format!("/img/{i}.jpg")))
            .collect(),
        tags: vec![
            TagEntry::new("Sunset", vec![SerialNo(1), SerialNo(2), SerialNo(3)]),
            TagEntry::new("beach", vec![SerialNo(3), SerialNo(4)]),
        ],
    }
}

fn load(catalog: &mut Catalog, dataset: &Dataset) {
    catalog.import(&dataset.images, &dataset.tags).expect("import");
}

// =============================================================================
// IN-MEMORY BACKEND
// =============================================================================

mod in_memory {
    use super::*;

    #[test]
    fn overlapping_tags_yield_union() {
        let mut catalog = Catalog::new();
        load(&mut catalog, &sunset_beach_dataset());

        let reader = catalog.reader().expect("reader");
        let sample = Engine::default()
            .sample_by_tags(&reader, &TagQuery::new(tags(&["sunset", "beach"])))
            .expect("sample");
        assert_eq!(sample.matched, 4);
        assert_eq!(sample.records.len(), 4);
    }

    #[test]
    fn empty_tag_list_is_invalid_input() {
        let catalog = Catalog::new();
        let reader = catalog.reader().expect("reader");
        let result = Engine::default().sample_by_tags(&reader, &TagQuery::new(Vec::new()));
        assert!(matches!(result, Err(CatalogError::InvalidInput(_))));
    }

    #[test]
    fn valid_tags_without_matches_is_not_found() {
        let mut catalog = Catalog::new();
        load(&mut catalog, &sunset_beach_dataset());
        let reader = catalog.reader().expect("reader");
        let result = Engine::default().sample_by_tags(&reader, &TagQuery::new(tags(&["snow"])));
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }
}

// =============================================================================
// REDB BACKEND
// =============================================================================

mod persistent {
    use super::*;

    #[test]
    fn redb_pipeline_matches_memory_pipeline() {
        let temp = tempdir().expect("temp dir");
        let mut redb = Catalog::with_redb(temp.path().join("catalog.redb")).expect("open");
        let mut memory = Catalog::new();
        let dataset = sunset_beach_dataset();
        load(&mut redb, &dataset);
        load(&mut memory, &dataset);

        let engine = Engine::default();
        let query = TagQuery::new(tags(&["SUNSET", "Beach"])).seeded(1_700_000_123);

        let from_redb = engine
            .sample_by_tags(&redb.reader().expect("reader"), &query)
            .expect("sample");
        let from_memory = engine
            .sample_by_tags(&memory.reader().expect("reader"), &query)
            .expect("sample");
        assert_eq!(from_redb, from_memory);
    }

    #[test]
    fn exact_mode_on_redb() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = Catalog::with_redb(temp.path().join("catalog.redb")).expect("open");
        load(&mut catalog, &sunset_beach_dataset());
        let reader = catalog.reader().expect("reader");

        let engine = Engine::with_tag_match(TagMatch::Exact);
        let hit = engine
            .sample_by_tags(&reader, &TagQuery::new(tags(&["Sunset"])))
            .expect("sample");
        assert_eq!(hit.matched, 3);

        let miss = engine.sample_by_tags(&reader, &TagQuery::new(tags(&["sunset"])));
        assert!(matches!(miss, Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn listing_over_forty_five_records() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = Catalog::with_redb(temp.path().join("catalog.redb")).expect("open");
        let records: Vec<_> = (0..45).map(|i| ImageRecord::new(SerialNo(i), "x")).collect();
        catalog.insert_images(&records).expect("insert");

        let reader = catalog.reader().expect("reader");
        assert_eq!(reader.record_count().expect("count"), 45);

        let page = Engine::default().list_page(&reader, Some(2)).expect("page");
        let serials: Vec<_> = page.iter().map(|r| r.serial_no).collect();
        assert_eq!(serials, (40..45).map(SerialNo).collect::<Vec<_>>());
    }

    #[test]
    fn handles_are_released_between_requests() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = Catalog::with_redb(temp.path().join("catalog.redb")).expect("open");
        load(&mut catalog, &sunset_beach_dataset());

        for _ in 0..50 {
            let reader = catalog.reader().expect("reader");
            let result = Engine::default().sample_by_tags(&reader, &TagQuery::new(tags(&["nope"])));
            assert!(result.is_err());
        }

        // Writes still go through once every read handle is dropped.
        catalog
            .insert_images(&[ImageRecord::new(SerialNo(99), "late")])
            .expect("insert");
        assert_eq!(catalog.reader().expect("reader").record_count().expect("count"), 5);
    }
}
