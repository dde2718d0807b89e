//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState, ServerSettings};
use crate::config::{AppConfig, BackendKind};
use crate::error::AppError;
use imgtag_core::{
    Catalog, CatalogError, CatalogReader, Dataset, Engine, ImageRecord, ImportSummary, TagQuery,
    unix_seconds_seed,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum dataset file size for import (100 MB).
const MAX_DATASET_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), AppError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| AppError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(AppError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve `path` to a canonical regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, AppError> {
    let canonical = path.canonicalize().map_err(|e| {
        AppError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(AppError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &AppConfig, dataset: Option<&Path>) -> Result<(), AppError> {
    let mut catalog = open_catalog(config)?;
    if let Some(path) = dataset {
        let dataset = load_dataset(path, false)?;
        let summary = apply_dataset(&mut catalog, &dataset)?;
        tracing::info!(
            images = summary.images,
            tags = summary.tag_entries,
            pruned = summary.pruned_entries,
            path = %path.display(),
            "Dataset loaded"
        );
    }

    println!("imgtag Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Listen:    {}", config.listen_addr());
    println!("  Backend:   {}", config.backend);
    println!("  Database:  {:?}", config.database);
    println!("  Tag match: {:?}", config.tag_match);
    println!();
    println!("Endpoints:");
    println!("  GET  /images                 - Listing, first page");
    println!("  GET  /images/{{page}}          - Listing page");
    println!("  POST /images/tags-data        - Tag sample, first page");
    println!("  POST /images/tags-data/{{page}} - Tag sample page");
    println!("  GET  /status                 - Catalog counts");
    println!("  GET  /health                 - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::with_settings(
        catalog,
        Engine::with_tag_match(config.tag_match),
        ServerSettings::from(config),
    );
    api::run_server(&config.listen_addr(), state).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show catalog status.
pub fn cmd_status(config: &AppConfig, json_mode: bool) -> Result<(), AppError> {
    let catalog = open_catalog(config)?;
    let reader = catalog.reader()?;
    let records = reader.record_count()?;
    let tag_entries = reader.tag_entry_count()?;

    if json_mode {
        return print_json(&serde_json::json!({
            "database": config.database.to_string_lossy(),
            "backend": config.backend.to_string(),
            "record_count": records,
            "tag_entry_count": tag_entries,
        }));
    }

    println!("imgtag Catalog Status");
    println!("=====================");
    println!("Database:    {:?}", config.database);
    println!("Backend:     {}", config.backend);
    println!();
    println!("Records:     {}", records);
    println!("Tag entries: {}", tag_entries);

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty redb catalog.
pub fn cmd_init(config: &AppConfig, force: bool) -> Result<(), AppError> {
    require_redb(config, "init")?;
    let path = &config.database;

    if path.exists() {
        if !force {
            return Err(AppError::Config(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(path)
            .map_err(|e| AppError::Io(format!("Cannot remove '{}': {}", path.display(), e)))?;
    }

    let _catalog = Catalog::with_redb(path)?;
    println!("Initialized new redb database at {:?}", path);
    Ok(())
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Import a JSON dataset into the redb catalog.
pub fn cmd_import(
    config: &AppConfig,
    json_mode: bool,
    file: &Path,
    derive_tags: bool,
) -> Result<(), AppError> {
    require_redb(config, "import")?;
    let dataset = load_dataset(file, derive_tags)?;
    let mut catalog = open_catalog(config)?;
    let summary = apply_dataset(&mut catalog, &dataset)?;

    tracing::info!(
        images = summary.images,
        tags = summary.tag_entries,
        pruned = summary.pruned_entries,
        "Import complete"
    );

    if json_mode {
        return print_json(&serde_json::json!({
            "success": true,
            "images_imported": summary.images,
            "tag_entries_imported": summary.tag_entries,
            "tag_entries_pruned": summary.pruned_entries,
        }));
    }

    println!(
        "Imported {} images and {} tag entries ({} stale entries pruned)",
        summary.images, summary.tag_entries, summary.pruned_entries
    );
    Ok(())
}

// =============================================================================
// LIST COMMAND
// =============================================================================

/// Print one listing page, or the whole listing with `all`.
pub fn cmd_list(
    config: &AppConfig,
    json_mode: bool,
    page: Option<u64>,
    all: bool,
) -> Result<(), AppError> {
    let catalog = open_catalog(config)?;
    let reader = catalog.reader()?;
    let engine = Engine::with_tag_match(config.tag_match);
    let records = if all {
        engine.list_all(&reader)?
    } else {
        engine.list_page(&reader, page)?
    };

    if json_mode {
        return print_json(&records);
    }

    if all {
        println!("All records ({})", records.len());
    } else {
        println!("Page {} ({} records)", page.unwrap_or(1), records.len());
    }
    print_records(&records);
    Ok(())
}

// =============================================================================
// SAMPLE COMMAND
// =============================================================================

/// Run a tag sample and print the page.
pub fn cmd_sample(
    config: &AppConfig,
    json_mode: bool,
    tags: Vec<String>,
    page: Option<u64>,
    seed: Option<u64>,
    no_shuffle: bool,
) -> Result<(), AppError> {
    let mut query = TagQuery::new(tags).page(page);
    if !no_shuffle {
        query = query.seeded(seed.unwrap_or_else(unix_seconds_seed));
    }

    let catalog = open_catalog(config)?;
    let reader = catalog.reader()?;
    let sample = Engine::with_tag_match(config.tag_match).sample_by_tags(&reader, &query)?;

    let by_tag: BTreeMap<&str, usize> = sample
        .by_tag
        .iter()
        .map(|(tag, serials)| (tag.as_str(), serials.len()))
        .collect();

    if json_mode {
        return print_json(&serde_json::json!({
            "matched": sample.matched,
            "seed": sample.seed,
            "by_tag": by_tag,
            "records": sample.records,
        }));
    }

    match sample.seed {
        Some(seed) => println!(
            "{} matching images, showing {} (seed {})",
            sample.matched,
            sample.records.len(),
            seed
        ),
        None => println!(
            "{} matching images, showing {} (unshuffled)",
            sample.matched,
            sample.records.len()
        ),
    }
    for (tag, count) in &by_tag {
        println!("  {:<20} {} entries", tag, count);
    }
    print_records(&sample.records);
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Open the catalog selected by `config`.
pub fn open_catalog(config: &AppConfig) -> Result<Catalog, AppError> {
    match config.backend {
        BackendKind::Redb => Ok(Catalog::with_redb(&config.database)?),
        BackendKind::Memory => Ok(Catalog::new()),
    }
}

/// Read, parse and validate a dataset file.
pub fn load_dataset(path: &Path, derive_tags: bool) -> Result<Dataset, AppError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_DATASET_FILE_SIZE)?;

    let data = std::fs::read(&path)
        .map_err(|e| AppError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;
    let mut dataset: Dataset = serde_json::from_slice(&data).map_err(|e| {
        CatalogError::InvalidInput(format!("Invalid dataset '{}': {}", path.display(), e))
    })?;

    if derive_tags || dataset.tags.is_empty() {
        dataset.derive_tags();
    }
    dataset.validate()?;
    Ok(dataset)
}

/// Import a dataset into `catalog`. Tag membership of its records is replaced.
pub fn apply_dataset(catalog: &mut Catalog, dataset: &Dataset) -> Result<ImportSummary, AppError> {
    Ok(catalog.import(&dataset.images, &dataset.tags)?)
}

fn require_redb(config: &AppConfig, command: &str) -> Result<(), AppError> {
    if config.backend == BackendKind::Redb {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "'{}' requires the redb backend",
            command
        )))
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CatalogError::Serialization(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn print_records(records: &[ImageRecord]) {
    for record in records {
        let tags: Vec<&str> = record.tags.iter().map(String::as_str).collect();
        println!(
            "  #{:<8} {:<32} [{}]",
            record.serial_no,
            record.title,
            tags.join(", ")
        );
    }
}
