// Ingestion module
// Reads recipe feeds (JSON array or JSON Lines) into the recipe store


pub mod derive;
pub mod record;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::database::RecipeStore;
use crate::recipe::{DEFAULT_SOURCE, RecipeDocument};
use crate::{RecipeError, Result};

pub use derive::DIETARY_OPTIONS;
pub use record::RecipeRecord;

/// Outcome of one ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub total: usize,
    pub ingested: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Empty the collection before loading
    pub reset: bool,
    /// Documents embedded and written per store call
    pub batch_size: usize,
}

impl Default for IngestOptions {
    #[inline]
    fn default() -> Self {
        Self {
            reset: false,
            batch_size: 16,
        }
    }
}

/// Split feed content into raw records. A top-level JSON array is read
/// whole; anything else is treated as JSON Lines, with unreadable lines
/// reported as errors in place.
#[inline]
pub fn parse_feed(content: &str) -> Result<Vec<Result<RecipeRecord>>> {
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(trimmed)
            .map_err(|e| RecipeError::InvalidDocument(format!("Unreadable recipe array: {e}")))?;
        return Ok(values.into_iter().map(RecipeRecord::from_value).collect());
    }

    Ok(content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_number, line)| {
            serde_json::from_str::<Value>(line)
                .map_err(|e| {
                    RecipeError::InvalidDocument(format!("Line {}: {e}", line_number + 1))
                })
                .and_then(RecipeRecord::from_value)
        })
        .collect())
}

/// Turn parsed records into documents, skipping and logging invalid ones
#[inline]
pub fn build_documents(records: Vec<Result<RecipeRecord>>, source: &str) -> (Vec<RecipeDocument>, usize) {
    let mut skipped = 0;
    let documents = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            match record.and_then(|record| record.into_document(index, source)) {
                Ok(document) => Some(document),
                Err(e) => {
                    warn!("Skipping recipe {}: {}", index, e);
                    skipped += 1;
                    None
                }
            }
        })
        .collect();
    (documents, skipped)
}

fn progress_bar(len: usize) -> ProgressBar {
    if !console::user_attended_stderr() {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template("{spinner} [{pos}/{len}] Ingesting {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len as u64).with_style(style)
}

/// Write documents in batches. Store and embedding failures abort the run.
#[inline]
pub async fn ingest_documents(
    store: &RecipeStore,
    documents: &[RecipeDocument],
    batch_size: usize,
) -> Result<usize> {
    let bar = progress_bar(documents.len());
    let mut written = 0;

    for batch in documents.chunks(batch_size.max(1)) {
        if let Some(first) = batch.first() {
            bar.set_message(first.metadata.name.clone());
        }
        store.upsert_documents(batch).await?;
        written += batch.len();
        bar.set_position(written as u64);
        debug!("Ingested {}/{} recipes", written, documents.len());
    }

    bar.finish_and_clear();
    Ok(written)
}

/// Load a recipe feed file into `store`
#[inline]
pub async fn ingest_file(store: &RecipeStore, path: &Path, options: IngestOptions) -> Result<IngestReport> {
    info!("Reading recipes from {}", path.display());
    let content = tokio::fs::read_to_string(path).await?;

    let records = parse_feed(&content)?;
    let total = records.len();
    let source = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(DEFAULT_SOURCE);
    let (documents, skipped) = build_documents(records, source);

    if options.reset {
        info!("Resetting collection '{}'", store.collection());
        store.delete_all().await?;
    }

    let ingested = ingest_documents(store, &documents, options.batch_size).await?;
    info!(
        "Ingested {} of {} recipes ({} skipped)",
        ingested, total, skipped
    );

    Ok(IngestReport {
        total,
        ingested,
        skipped,
    })
}
