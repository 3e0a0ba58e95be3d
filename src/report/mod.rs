//! Report generation pipeline
//!
//! One bounded in-memory row set flows end-to-end, synchronously:
//! normalize → summarize → assemble → write. Each calling report function
//! supplies already-fetched Graph/Exchange records plus a declarative
//! [`ReportDefinition`]; the pipeline owns everything from field extraction
//! to the two files on disk.

pub mod assemble;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod summary;
pub mod table;
pub mod writer;

use crate::error::{Aud365Error, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use filter::FilterPolicy;
use model::{ColumnSpec, ReportDocument, ReportOutcome};
use normalize::SortKey;
use summary::MetricRule;
use writer::WriterConfig;

/// The explicit mapping contract one report supplies at the pipeline
/// boundary: what to call it, where it files, which fields to extract, and
/// which aggregates to compute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDefinition {
    pub title: String,

    /// Output subdirectory, one per report category.
    pub category: String,

    pub columns: Vec<ColumnSpec>,

    #[serde(default)]
    pub metrics: Vec<MetricRule>,

    #[serde(default)]
    pub sort: Option<SortKey>,
}

/// Per-invocation tuning, sourced from persisted settings or defaults.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// When set, the rendered document keeps only the first N rows; the
    /// true count is retained and the truncation surfaced in the banner.
    pub display_row_cap: Option<usize>,

    pub filter_policy: FilterPolicy,
}

/// Run the full pipeline: validate, build the document, persist both
/// artifacts, and report the outcome.
pub fn generate(
    records: &[Value],
    definition: &ReportDefinition,
    options: &PipelineOptions,
    writer_config: &WriterConfig,
) -> Result<ReportOutcome> {
    let doc = build_document(records, definition, options)?;
    let written = writer::write_report(
        &doc,
        &definition.category,
        writer_config,
        &options.filter_policy,
    )?;
    tracing::debug!(
        html = %written.html_path.display(),
        csv = %written.csv_path.display(),
        "report artifacts written"
    );

    Ok(ReportOutcome {
        html_path: written.html_path,
        csv_path: written.csv_path,
        row_count: doc.row_count,
        skipped_rows: doc.skipped_rows,
    })
}

/// Build the in-memory document without touching the filesystem.
///
/// Metrics are computed over the complete normalized row sequence before
/// any display cap is applied, so recomputation on the same input always
/// yields the same values.
pub fn build_document(
    records: &[Value],
    definition: &ReportDefinition,
    options: &PipelineOptions,
) -> Result<ReportDocument> {
    validate_definition(definition)?;

    let normalized = normalize::normalize(records, &definition.columns, definition.sort.as_ref());
    tracing::debug!(
        rows = normalized.rows.len(),
        skipped = normalized.skipped,
        "normalized source records"
    );

    let metrics = summary::compute(&normalized.rows, &definition.columns, &definition.metrics)?;

    let row_count = normalized.rows.len();
    let mut rows = normalized.rows;
    let mut display_capped = false;
    if let Some(cap) = options.display_row_cap {
        if rows.len() > cap {
            rows.truncate(cap);
            display_capped = true;
        }
    }

    Ok(ReportDocument {
        title: definition.title.clone(),
        generated_at: Local::now(),
        columns: definition.columns.clone(),
        rows,
        metrics,
        row_count,
        skipped_rows: normalized.skipped,
        display_capped,
    })
}

/// Caller-contract checks. These indicate a bug in the calling report
/// function, not a runtime data condition, so they fail fast before any
/// normalization or I/O.
fn validate_definition(definition: &ReportDefinition) -> Result<()> {
    if definition.title.trim().is_empty() {
        return Err(Aud365Error::InvalidDefinition(
            "report title must not be empty".into(),
        ));
    }
    if definition.category.trim().is_empty() {
        return Err(Aud365Error::InvalidDefinition(
            "report category must not be empty".into(),
        ));
    }
    if definition.columns.is_empty() {
        return Err(Aud365Error::InvalidDefinition(
            "at least one column must be declared".into(),
        ));
    }

    let mut seen = HashSet::new();
    for col in &definition.columns {
        if col.name.trim().is_empty() {
            return Err(Aud365Error::InvalidDefinition(
                "column names must not be empty".into(),
            ));
        }
        if !seen.insert(col.name.as_str()) {
            return Err(Aud365Error::InvalidDefinition(format!(
                "duplicate column name '{}'",
                col.name
            )));
        }
    }

    if let Some(sort) = &definition.sort {
        if !definition.columns.iter().any(|c| c.name == sort.column) {
            return Err(Aud365Error::InvalidDefinition(format!(
                "sort references unknown column '{}'",
                sort.column
            )));
        }
    }

    Ok(())
}
