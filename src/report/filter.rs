//! Pure client-side filter contract
//!
//! The browser-side search/filter behaviour is specified here as plain
//! functions over row data and filter state, so it can be unit-tested
//! without a DOM; the JavaScript emitted by the table renderer mirrors
//! these semantics exactly.

use crate::report::model::{ColumnSpec, Row};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Cardinality band and option cap for dropdown filters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FilterPolicy {
    /// Minimum distinct values for a filterable column to get a dropdown.
    pub min_distinct: usize,

    /// Maximum distinct values for a filterable column to get a dropdown.
    /// `important` columns bypass this bound.
    pub max_distinct: usize,

    /// Maximum options rendered in one dropdown; beyond this the list is
    /// truncated and the truncation is indicated in the UI.
    pub option_cap: usize,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            min_distinct: 2,
            max_distinct: 500,
            option_cap: 50,
        }
    }
}

/// One column that gets a dropdown filter, with its option list.
#[derive(Debug, Clone)]
pub struct FilterColumn {
    pub index: usize,
    pub name: String,
    /// Sorted distinct values, truncated to the option cap.
    pub options: Vec<String>,
    pub total_distinct: usize,
    pub truncated: bool,
}

/// Current filter state: free-text search plus exact-value selections per
/// column name. All constraints combine with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub search: String,
    pub selections: BTreeMap<String, String>,
}

/// Decide which columns get dropdown filters.
///
/// A column with fewer than two distinct values never gets one (no
/// discriminating power), `important` columns always do otherwise, and
/// plain filterable columns must fall inside the distinct-value band.
pub fn filterable_columns(
    rows: &[Row],
    columns: &[ColumnSpec],
    policy: &FilterPolicy,
) -> Vec<FilterColumn> {
    let mut out = Vec::new();

    for (index, col) in columns.iter().enumerate() {
        if !col.filterable && !col.important {
            continue;
        }

        let distinct: BTreeSet<&str> = rows.iter().map(|r| r.get(index)).collect();
        let total = distinct.len();
        if total < 2 {
            continue;
        }
        if !col.important && (total < policy.min_distinct || total > policy.max_distinct) {
            continue;
        }

        let options: Vec<String> = distinct
            .iter()
            .take(policy.option_cap)
            .map(|v| v.to_string())
            .collect();

        out.push(FilterColumn {
            index,
            name: col.name.clone(),
            truncated: total > options.len(),
            total_distinct: total,
            options,
        });
    }

    out
}

/// Indices of rows visible under the given filter state.
///
/// A row is visible iff the search term is a case-insensitive substring of
/// its space-joined cell values AND every active selection matches the
/// row's cell in that column exactly. Constraint order cannot matter: the
/// decision is over the whole state at once.
pub fn visible_rows(rows: &[Row], columns: &[ColumnSpec], state: &FilterState) -> Vec<usize> {
    let needle = state.search.trim().to_lowercase();

    let selections: Vec<(usize, &str)> = state
        .selections
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .filter_map(|(name, value)| {
            columns
                .iter()
                .position(|c| &c.name == name)
                .map(|idx| (idx, value.as_str()))
        })
        .collect();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            let text_match =
                needle.is_empty() || row.values().join(" ").to_lowercase().contains(&needle);
            text_match && selections.iter().all(|(idx, value)| row.get(*idx) == *value)
        })
        .map(|(i, _)| i)
        .collect()
}

/// Up to `limit` distinct cell values matching the search term, for the
/// autocomplete suggestion list.
pub fn suggestions(rows: &[Row], search: &str, limit: usize) -> Vec<String> {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut seen = BTreeSet::new();
    for row in rows {
        for value in row.values() {
            if value.to_lowercase().contains(&needle) {
                seen.insert(value.clone());
            }
        }
    }
    seen.into_iter().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::normalize::normalize;
    use serde_json::json;

    fn status_fixture() -> (Vec<Row>, Vec<ColumnSpec>) {
        let columns = vec![ColumnSpec::new("Status").filterable()];
        let records = vec![
            json!({"Status": "OK"}),
            json!({"Status": "OK"}),
            json!({"Status": "Warn"}),
        ];
        (normalize(&records, &columns, None).rows, columns)
    }

    #[test]
    fn test_dropdown_offers_exact_distinct_values() {
        let (rows, columns) = status_fixture();
        let filters = filterable_columns(&rows, &columns, &FilterPolicy::default());
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].options, vec!["OK", "Warn"]);
        assert!(!filters[0].truncated);
    }

    #[test]
    fn test_selection_narrows_and_clear_restores() {
        let (rows, columns) = status_fixture();

        let mut state = FilterState::default();
        state
            .selections
            .insert("Status".to_string(), "Warn".to_string());
        assert_eq!(visible_rows(&rows, &columns, &state), vec![2]);

        // Clearing all filters restores every row.
        assert_eq!(
            visible_rows(&rows, &columns, &FilterState::default()),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_single_distinct_value_column_excluded() {
        let columns = vec![
            ColumnSpec::new("Tenant").filterable(),
            ColumnSpec::new("Kind").important(),
        ];
        let records = vec![
            json!({"Tenant": "contoso", "Kind": "User"}),
            json!({"Tenant": "contoso", "Kind": "User"}),
        ];
        let rows = normalize(&records, &columns, None).rows;
        // Both columns collapse to one distinct value; neither gets a filter,
        // important or not.
        assert!(filterable_columns(&rows, &columns, &FilterPolicy::default()).is_empty());
    }

    #[test]
    fn test_important_bypasses_cardinality_band() {
        let columns = vec![
            ColumnSpec::new("Id").filterable(),
            ColumnSpec::new("Level").important(),
        ];
        let records: Vec<_> = (0..600)
            .map(|i| json!({"Id": format!("id-{i:04}"), "Level": format!("L{i}")}))
            .collect();
        let rows = normalize(&records, &columns, None).rows;

        let filters = filterable_columns(&rows, &columns, &FilterPolicy::default());
        // "Id" is over the 500-distinct band and merely filterable: dropped.
        // "Level" is important: kept, capped at 50 options, marked truncated.
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].name, "Level");
        assert_eq!(filters[0].options.len(), 50);
        assert_eq!(filters[0].total_distinct, 600);
        assert!(filters[0].truncated);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let (rows, columns) = status_fixture();
        let state = FilterState {
            search: "wAr".to_string(),
            ..Default::default()
        };
        assert_eq!(visible_rows(&rows, &columns, &state), vec![2]);
    }

    #[test]
    fn test_combined_constraints_are_order_insensitive() {
        let columns = vec![
            ColumnSpec::new("Status").filterable(),
            ColumnSpec::new("Dept").filterable(),
        ];
        let records = vec![
            json!({"Status": "OK", "Dept": "IT"}),
            json!({"Status": "Warn", "Dept": "IT"}),
            json!({"Status": "Warn", "Dept": "HR"}),
            json!({"Status": "OK", "Dept": "HR"}),
        ];
        let rows = normalize(&records, &columns, None).rows;

        // Build the same logical state in two different orders.
        let mut a = FilterState {
            search: "warn".to_string(),
            ..Default::default()
        };
        a.selections.insert("Dept".to_string(), "IT".to_string());
        a.selections.insert("Status".to_string(), "Warn".to_string());

        let mut b = FilterState::default();
        b.selections.insert("Status".to_string(), "Warn".to_string());
        b.selections.insert("Dept".to_string(), "IT".to_string());
        b.search = "warn".to_string();

        assert_eq!(
            visible_rows(&rows, &columns, &a),
            visible_rows(&rows, &columns, &b)
        );
        assert_eq!(visible_rows(&rows, &columns, &a), vec![1]);
    }

    #[test]
    fn test_empty_selection_value_is_inactive() {
        let (rows, columns) = status_fixture();
        let mut state = FilterState::default();
        state.selections.insert("Status".to_string(), String::new());
        assert_eq!(visible_rows(&rows, &columns, &state).len(), 3);
    }

    #[test]
    fn test_suggestions_capped_and_distinct() {
        let columns = vec![ColumnSpec::new("Name")];
        let records: Vec<_> = (0..20).map(|i| json!({"Name": format!("user-{i:02}")})).collect();
        let rows = normalize(&records, &columns, None).rows;

        let hits = suggestions(&rows, "user", 8);
        assert_eq!(hits.len(), 8);
        assert_eq!(hits[0], "user-00");

        assert!(suggestions(&rows, "", 8).is_empty());
    }
}
