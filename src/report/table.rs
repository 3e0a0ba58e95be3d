//! TableRenderer: self-contained searchable/filterable HTML table
//!
//! Emits the table fragment plus the client-side script. The script's
//! visibility rules mirror `filter::visible_rows` exactly: case-insensitive
//! substring search over the space-joined row text, AND-combined with exact
//! matches from every active dropdown. Rows are hidden, never removed, so
//! filter changes are reversible without reloading.

use crate::report::filter::{filterable_columns, FilterColumn, FilterPolicy};
use crate::report::model::{ColumnSpec, Row};

/// Escape text for placement in HTML element or attribute content.
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render the table fragment for the given rows and columns.
pub fn render_table(rows: &[Row], columns: &[ColumnSpec], policy: &FilterPolicy) -> String {
    let filters = filterable_columns(rows, columns, policy);

    let toolbar = render_toolbar(&filters);
    let thead = render_thead(columns);
    let tbody = render_tbody(rows, columns.len());

    format!(
        r#"        <section class="table-section">
{toolbar}
            <table class="report-table" id="report-table">
                <thead>
{thead}
                </thead>
                <tbody>
{tbody}
                </tbody>
            </table>
        </section>
        <script>
{script}
        </script>"#,
        toolbar = toolbar,
        thead = thead,
        tbody = tbody,
        script = TABLE_SCRIPT,
    )
}

fn render_toolbar(filters: &[FilterColumn]) -> String {
    let dropdowns: String = filters
        .iter()
        .map(|f| {
            let mut options = String::new();
            options.push_str(&format!(
                r#"<option value="">All: {}</option>"#,
                escape_html(&f.name)
            ));
            for value in &f.options {
                let escaped = escape_html(value);
                options.push_str(&format!(r#"<option value="{escaped}">{escaped}</option>"#));
            }
            if f.truncated {
                options.push_str(&format!(
                    r#"<option value="" disabled>Showing first {} of {} values</option>"#,
                    f.options.len(),
                    f.total_distinct
                ));
            }
            format!(
                r#"                <select class="column-filter" data-column="{idx}" aria-label="Filter by {name}">{options}</select>"#,
                idx = f.index,
                name = escape_html(&f.name),
                options = options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"            <div class="table-toolbar">
                <div class="search-wrap">
                    <input type="text" id="report-search" placeholder="Search all columns..." autocomplete="off" aria-label="Search rows">
                    <ul id="search-suggestions" class="suggestions hidden"></ul>
                </div>
{dropdowns}
                <button type="button" id="clear-filters" class="clear-filters">Clear filters</button>
            </div>"#,
        dropdowns = dropdowns
    )
}

fn render_thead(columns: &[ColumnSpec]) -> String {
    let cells: String = columns
        .iter()
        .map(|c| format!("<th>{}</th>", escape_html(&c.name)))
        .collect();
    format!("                    <tr>{}</tr>", cells)
}

fn render_tbody(rows: &[Row], column_count: usize) -> String {
    let mut body = String::new();

    if rows.is_empty() {
        body.push_str(&format!(
            r#"                    <tr class="no-data"><td colspan="{column_count}">No data returned for this report</td></tr>"#
        ));
        return body;
    }

    for row in rows {
        let cells: String = row
            .values()
            .iter()
            .map(|v| format!("<td>{}</td>", escape_html(v)))
            .collect();
        body.push_str("                    <tr class=\"data-row\">");
        body.push_str(&cells);
        body.push_str("</tr>\n");
    }

    body.push_str(&format!(
        r#"                    <tr id="no-results" class="no-results hidden"><td colspan="{column_count}">No rows match the current filters</td></tr>"#
    ));
    body
}

/// Client-side filter/search/autocomplete logic. No external dependencies:
/// the table stays usable with no network access at view time.
const TABLE_SCRIPT: &str = r#"(function () {
    'use strict';

    var table = document.getElementById('report-table');
    if (!table) { return; }

    var rows = Array.prototype.slice.call(table.querySelectorAll('tbody tr.data-row'));
    var rowText = rows.map(function (row) {
        return Array.prototype.map.call(row.cells, function (cell) {
            return cell.textContent;
        }).join(' ').toLowerCase();
    });

    var searchBox = document.getElementById('report-search');
    var suggestionList = document.getElementById('search-suggestions');
    var clearButton = document.getElementById('clear-filters');
    var noResults = document.getElementById('no-results');
    var filters = Array.prototype.slice.call(document.querySelectorAll('.column-filter'));

    // Distinct cell values, sorted, for autocomplete.
    var seen = {};
    var allValues = [];
    rows.forEach(function (row) {
        Array.prototype.forEach.call(row.cells, function (cell) {
            var value = cell.textContent.trim();
            if (value !== '' && !seen[value]) {
                seen[value] = true;
                allValues.push(value);
            }
        });
    });
    allValues.sort();

    var MAX_SUGGESTIONS = 8;
    var selectedSuggestion = -1;

    // A row is visible iff the search term matches its joined text AND
    // every active dropdown matches the cell in that column exactly.
    function applyFilters() {
        var needle = searchBox ? searchBox.value.trim().toLowerCase() : '';
        var active = filters.filter(function (f) { return f.value !== ''; })
            .map(function (f) { return [parseInt(f.dataset.column, 10), f.value]; });

        var shown = 0;
        rows.forEach(function (row, i) {
            var textMatch = needle === '' || rowText[i].indexOf(needle) !== -1;
            var visible = textMatch && active.every(function (pair) {
                return row.cells[pair[0]].textContent === pair[1];
            });
            row.classList.toggle('hidden', !visible);
            if (visible) { shown++; }
        });

        if (noResults) {
            noResults.classList.toggle('hidden', shown !== 0 || rows.length === 0);
        }
    }

    function hideSuggestions() {
        selectedSuggestion = -1;
        suggestionList.innerHTML = '';
        suggestionList.classList.add('hidden');
    }

    function updateSuggestions() {
        var needle = searchBox.value.trim().toLowerCase();
        if (needle === '') { hideSuggestions(); return; }

        var matches = [];
        for (var i = 0; i < allValues.length && matches.length < MAX_SUGGESTIONS; i++) {
            if (allValues[i].toLowerCase().indexOf(needle) !== -1) {
                matches.push(allValues[i]);
            }
        }
        if (matches.length === 0) { hideSuggestions(); return; }

        selectedSuggestion = -1;
        suggestionList.innerHTML = '';
        matches.forEach(function (value) {
            var item = document.createElement('li');
            item.textContent = value;
            item.addEventListener('mousedown', function (event) {
                event.preventDefault();
                pickSuggestion(value);
            });
            suggestionList.appendChild(item);
        });
        suggestionList.classList.remove('hidden');
    }

    function pickSuggestion(value) {
        searchBox.value = value;
        hideSuggestions();
        applyFilters();
    }

    function moveSelection(delta) {
        var items = suggestionList.querySelectorAll('li');
        if (items.length === 0) { return; }
        selectedSuggestion = (selectedSuggestion + delta + items.length) % items.length;
        Array.prototype.forEach.call(items, function (item, i) {
            item.classList.toggle('selected', i === selectedSuggestion);
        });
    }

    if (searchBox) {
        searchBox.addEventListener('input', function () {
            updateSuggestions();
            applyFilters();
        });
        searchBox.addEventListener('keydown', function (event) {
            if (event.key === 'ArrowDown') {
                event.preventDefault();
                moveSelection(1);
            } else if (event.key === 'ArrowUp') {
                event.preventDefault();
                moveSelection(-1);
            } else if (event.key === 'Enter') {
                var items = suggestionList.querySelectorAll('li');
                if (selectedSuggestion >= 0 && selectedSuggestion < items.length) {
                    event.preventDefault();
                    pickSuggestion(items[selectedSuggestion].textContent);
                }
            } else if (event.key === 'Escape') {
                hideSuggestions();
            }
        });
        searchBox.addEventListener('blur', function () {
            // Let mousedown on a suggestion land first.
            window.setTimeout(hideSuggestions, 150);
        });
    }

    filters.forEach(function (filter) {
        filter.addEventListener('change', applyFilters);
    });

    if (clearButton) {
        clearButton.addEventListener('click', function () {
            if (searchBox) { searchBox.value = ''; }
            filters.forEach(function (filter) { filter.value = ''; });
            hideSuggestions();
            applyFilters();
        });
    }
})();"#;
