//! SummaryCalculator: declarative aggregate metrics over normalized rows
//!
//! Each report supplies an ordered rule list; metrics are computed
//! independently, in rule order, as a pure function of the row sequence.
//! Degenerate inputs (empty row set, zero denominator) yield defined zero
//! values rather than errors.

use crate::error::{Aud365Error, Result};
use crate::report::model::{ColumnSpec, MetricValue, Row, Severity, SummaryMetric};
use serde::{Deserialize, Serialize};

/// How a predicate compares a cell's display value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    #[default]
    Equals,
    NotEquals,
    /// Case-insensitive substring match.
    Contains,
}

/// A predicate over one column's display value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,

    #[serde(default)]
    pub compare: Comparison,

    pub value: String,
}

impl Predicate {
    fn matches(&self, cell: &str) -> bool {
        match self.compare {
            Comparison::Equals => cell == self.value,
            Comparison::NotEquals => cell != self.value,
            Comparison::Contains => cell.to_lowercase().contains(&self.value.to_lowercase()),
        }
    }
}

/// Extraction rule for one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MetricKind {
    /// Total row count.
    RowCount,

    /// Count of rows matching a predicate.
    CountWhere {
        #[serde(flatten)]
        predicate: Predicate,
    },

    /// Ratio of two counts as a percentage, one decimal place, half-up.
    /// `over` scopes the ratio to the rows it matches (the numerator counts
    /// rows matching both predicates, so the value stays within [0, 100]);
    /// it defaults to the whole row set.
    Percentage {
        of: Predicate,

        #[serde(default)]
        over: Option<Predicate>,
    },

    Min { column: String },
    Avg { column: String },
    Max { column: String },
}

/// Direction of badness for severity banding. Some metrics are "higher is
/// worse" (stale accounts %), others the opposite (MFA coverage %).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    HigherIsWorse,
    LowerIsWorse,
}

/// Threshold pair assigning a severity tier to a computed value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    pub warning: f64,
    pub critical: f64,

    #[serde(default)]
    pub direction: Direction,
}

impl Thresholds {
    pub fn classify(&self, value: f64) -> Severity {
        match self.direction {
            Direction::HigherIsWorse => {
                if value >= self.critical {
                    Severity::Critical
                } else if value >= self.warning {
                    Severity::Warning
                } else {
                    Severity::Normal
                }
            }
            Direction::LowerIsWorse => {
                if value <= self.critical {
                    Severity::Critical
                } else if value <= self.warning {
                    Severity::Warning
                } else {
                    Severity::Normal
                }
            }
        }
    }
}

/// One declared summary metric: label, extraction rule, optional severity
/// thresholds (absent means always Normal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRule {
    pub label: String,

    #[serde(flatten)]
    pub kind: MetricKind,

    #[serde(default)]
    pub thresholds: Option<Thresholds>,
}

/// Compute all metrics in rule order.
pub fn compute(
    rows: &[Row],
    columns: &[ColumnSpec],
    rules: &[MetricRule],
) -> Result<Vec<SummaryMetric>> {
    rules
        .iter()
        .map(|rule| {
            let value = compute_value(rows, columns, &rule.kind)?;
            let severity = rule
                .thresholds
                .map(|t| t.classify(value.as_f64()))
                .unwrap_or(Severity::Normal);
            Ok(SummaryMetric {
                label: rule.label.clone(),
                value,
                severity,
            })
        })
        .collect()
}

fn compute_value(rows: &[Row], columns: &[ColumnSpec], kind: &MetricKind) -> Result<MetricValue> {
    match kind {
        MetricKind::RowCount => Ok(MetricValue::Count(rows.len() as u64)),
        MetricKind::CountWhere { predicate } => {
            let idx = column_index(columns, &predicate.column)?;
            Ok(MetricValue::Count(count_matching(rows, idx, predicate)))
        }
        MetricKind::Percentage { of, over } => {
            let of_idx = column_index(columns, &of.column)?;
            match over {
                Some(p) => {
                    let over_idx = column_index(columns, &p.column)?;
                    let denominator = count_matching(rows, over_idx, p);
                    let numerator = rows
                        .iter()
                        .filter(|r| of.matches(r.get(of_idx)) && p.matches(r.get(over_idx)))
                        .count() as u64;
                    Ok(MetricValue::Percent(percentage(numerator, denominator)))
                }
                None => {
                    let numerator = count_matching(rows, of_idx, of);
                    Ok(MetricValue::Percent(percentage(numerator, rows.len() as u64)))
                }
            }
        }
        MetricKind::Min { column } => numeric_fold(rows, columns, column, |values| {
            values.iter().copied().fold(f64::INFINITY, f64::min)
        }),
        MetricKind::Max { column } => numeric_fold(rows, columns, column, |values| {
            values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }),
        MetricKind::Avg { column } => numeric_fold(rows, columns, column, |values| {
            values.iter().sum::<f64>() / values.len() as f64
        }),
    }
}

fn column_index(columns: &[ColumnSpec], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c.name == name)
        .ok_or_else(|| {
            Aud365Error::InvalidDefinition(format!(
                "metric references unknown column '{}'",
                name
            ))
        })
}

fn count_matching(rows: &[Row], idx: usize, predicate: &Predicate) -> u64 {
    rows.iter().filter(|r| predicate.matches(r.get(idx))).count() as u64
}

/// Percentage of numerator over denominator, one decimal, half-up.
/// A zero denominator is a defined 0, never an error or NaN.
fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let raw = (numerator as f64 / denominator as f64) * 100.0;
    (raw * 10.0).round() / 10.0
}

fn numeric_fold(
    rows: &[Row],
    columns: &[ColumnSpec],
    column: &str,
    fold: impl Fn(&[f64]) -> f64,
) -> Result<MetricValue> {
    let idx = column_index(columns, column)?;
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.get(idx).parse::<f64>().ok())
        .collect();
    if values.is_empty() {
        return Ok(MetricValue::Number(0.0));
    }
    Ok(MetricValue::Number(fold(&values)))
}
