//! RowNormalizer: heterogeneous Graph/Exchange records in, uniform rows out
//!
//! Source records are opaque JSON objects with no fixed schema across call
//! sites, so the mapping is explicit: every report declares its columns and
//! this stage extracts exactly those fields. Values are converted to their
//! display form here, not at render time, so the CSV and the HTML table see
//! identical text.

use crate::report::model::{ColumnKind, ColumnSpec, Row, EMPTY_CELL};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Optional caller-supplied sort. Rows otherwise keep source order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,

    #[serde(default)]
    pub descending: bool,
}

/// Normalized rows plus the count of records dropped for having none of the
/// expected shape.
#[derive(Debug)]
pub struct NormalizedRows {
    pub rows: Vec<Row>,
    pub skipped: usize,
}

/// Map source records onto the declared column set.
///
/// A record that is not an object, or that shares no keys at all with the
/// column set, is dropped and counted; a record merely missing some fields
/// gets the explicit empty marker for those cells.
pub fn normalize(
    records: &[Value],
    columns: &[ColumnSpec],
    sort: Option<&SortKey>,
) -> NormalizedRows {
    let mut rows = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for record in records {
        let Some(obj) = record.as_object() else {
            skipped += 1;
            continue;
        };

        if !columns.iter().any(|c| obj.contains_key(&c.name)) {
            skipped += 1;
            continue;
        }

        let values = columns
            .iter()
            .map(|col| display_value(obj.get(&col.name), col.kind))
            .collect();
        rows.push(Row::new(values));
    }

    if let Some(key) = sort {
        if let Some(idx) = columns.iter().position(|c| c.name == key.column) {
            // Stable, and the only sort in the pipeline.
            rows.sort_by(|a, b| {
                let ord = a.get(idx).cmp(b.get(idx));
                if key.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }
    }

    NormalizedRows { rows, skipped }
}

/// Convert one source field to its display form.
fn display_value(value: Option<&Value>, kind: ColumnKind) -> String {
    let Some(value) = value else {
        return EMPTY_CELL.to_string();
    };

    match value {
        Value::Null => EMPTY_CELL.to_string(),
        Value::Bool(b) => {
            if *b {
                "Yes".to_string()
            } else {
                "No".to_string()
            }
        }
        Value::Number(n) => format_number(n),
        // String fields follow the declared kind: sources like Exchange
        // cmdlet output stringify everything, so "True" in a bool column
        // and "3.50" in a number column still get the canonical form.
        Value::String(s) => match kind {
            ColumnKind::Date => format_date(s),
            ColumnKind::Bool => match s.to_lowercase().as_str() {
                "true" => "Yes".to_string(),
                "false" => "No".to_string(),
                _ => s.clone(),
            },
            ColumnKind::Number => match s.trim().parse::<f64>() {
                Ok(f) if f.fract() == 0.0 => format!("{:.0}", f),
                Ok(f) => format!("{:.2}", f),
                Err(_) => s.clone(),
            },
            ColumnKind::Text => s.clone(),
        },
        // Graph often returns arrays of scalars (licenses, proxy addresses).
        Value::Array(items) => {
            if items.is_empty() {
                EMPTY_CELL.to_string()
            } else {
                items
                    .iter()
                    .map(|v| display_value(Some(v), ColumnKind::Text))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }
        Value::Object(_) => value.to_string(),
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 => format!("{:.0}", f),
        Some(f) => format!("{:.2}", f),
        None => n.to_string(),
    }
}

/// Graph timestamps arrive as RFC 3339; render them in the fixed report
/// locale. Anything unparseable passes through verbatim.
fn format_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}
