//! Core data model for the report pipeline
//!
//! Everything downstream of normalization works on these types: a report is
//! a column list, a row sequence of display-ready strings, and a set of
//! computed summary metrics, bundled into a [`ReportDocument`] that is built
//! once per generation and never mutated afterwards.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Marker used for fields absent from a source record. Cells are never
/// omitted, so HTML and CSV stay column-aligned.
pub const EMPTY_CELL: &str = "-";

/// Declared value kind of a column, driving display formatting at
/// normalization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Date,
    Bool,
}

/// One declared report column. Declaration order is display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,

    #[serde(default)]
    pub kind: ColumnKind,

    /// Candidate for a dropdown filter, subject to the distinct-value band.
    #[serde(default)]
    pub filterable: bool,

    /// Status/category-like column that gets a filter regardless of
    /// cardinality.
    #[serde(default)]
    pub important: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Text,
            filterable: false,
            important: false,
        }
    }

    pub fn kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }
}

/// One normalized record: display-ready values stored in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    values: Vec<String>,
}

impl Row {
    pub(crate) fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Severity tier driving color-coded presentation of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "Normal",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Severity::Normal => "#16a34a",
            Severity::Warning => "#ca8a04",
            Severity::Critical => "#dc2626",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// Computed value of a summary metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MetricValue {
    Count(u64),
    /// Percentage in [0, 100], already rounded to one decimal place.
    Percent(f64),
    Number(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Count(n) => *n as f64,
            MetricValue::Percent(p) => *p,
            MetricValue::Number(n) => *n,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{}", n),
            MetricValue::Percent(p) => write!(f, "{:.1}%", p),
            MetricValue::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{:.1}", n)
                }
            }
        }
    }
}

/// One aggregate statistic shown as a summary card.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryMetric {
    pub label: String,
    pub value: MetricValue,
    pub severity: Severity,
}

/// The complete in-memory representation of one generated report.
///
/// `rows` may have been truncated by a display cap; `row_count` always holds
/// the true pre-cap count and `display_capped` records that a cap applied.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    pub generated_at: DateTime<Local>,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Row>,
    pub metrics: Vec<SummaryMetric>,
    pub row_count: usize,
    pub skipped_rows: usize,
    pub display_capped: bool,
}

/// Target encoding for a persisted artifact. CSV gets a byte-order mark so
/// spreadsheet applications detect UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactEncoding {
    Utf8,
    Utf8Bom,
}

/// One persisted file derived from a ReportDocument.
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    pub path: PathBuf,
    pub content: String,
    pub encoding: ArtifactEncoding,
}

impl OutputArtifact {
    /// Content as the exact bytes to land on disk.
    pub fn bytes(&self) -> Vec<u8> {
        match self.encoding {
            ArtifactEncoding::Utf8 => self.content.as_bytes().to_vec(),
            ArtifactEncoding::Utf8Bom => {
                let mut out = Vec::with_capacity(3 + self.content.len());
                out.extend_from_slice(b"\xEF\xBB\xBF");
                out.extend_from_slice(self.content.as_bytes());
                out
            }
        }
    }
}

/// Result handed back to the calling report function.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub html_path: PathBuf,
    pub csv_path: PathBuf,
    pub row_count: usize,
    pub skipped_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_value_display() {
        assert_eq!(MetricValue::Count(42).to_string(), "42");
        assert_eq!(MetricValue::Percent(87.5).to_string(), "87.5%");
        assert_eq!(MetricValue::Percent(0.0).to_string(), "0.0%");
        assert_eq!(MetricValue::Number(3.0).to_string(), "3");
        assert_eq!(MetricValue::Number(3.25).to_string(), "3.2");
    }

    #[test]
    fn test_severity_colors() {
        assert_eq!(Severity::Critical.color(), "#dc2626");
        assert_eq!(Severity::Warning.color(), "#ca8a04");
        assert_eq!(Severity::Normal.color(), "#16a34a");
    }

    #[test]
    fn test_bom_prefix() {
        let artifact = OutputArtifact {
            path: PathBuf::from("out.csv"),
            content: "A,B\n".to_string(),
            encoding: ArtifactEncoding::Utf8Bom,
        };
        let bytes = artifact.bytes();
        assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
        assert_eq!(&bytes[3..], b"A,B\n");
    }
}
