//! ReportAssembler: one HTML document + one CSV per report
//!
//! The document is composed from independently testable fragments (banner,
//! summary cards, table, footer) with embedded CSS so it renders with no
//! network access. The CSV serializes the same row sequence in the same
//! column order, so the two artifacts always describe identical data.

use crate::report::filter::FilterPolicy;
use crate::report::model::{ReportDocument, SummaryMetric};
use crate::report::table::{escape_html, render_table};

/// Build the complete HTML document for a report.
pub fn assemble_html(doc: &ReportDocument, policy: &FilterPolicy) -> String {
    let banner = render_banner(doc);
    let summary = render_summary_cards(&doc.metrics);
    let table = render_table(&doc.rows, &doc.columns, policy);
    let footer = render_footer(doc);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <div class="container">
{banner}
{summary}
{table}
{footer}
    </div>
</body>
</html>"#,
        title = escape_html(&doc.title),
        css = CSS_STYLES,
        banner = banner,
        summary = summary,
        table = table,
        footer = footer,
    )
}

fn render_banner(doc: &ReportDocument) -> String {
    let mut notices = String::new();
    if doc.display_capped {
        notices.push_str(&format!(
            r#"
                <span class="notice warning">Showing first {} of {} rows</span>"#,
            doc.rows.len(),
            doc.row_count
        ));
    }
    if doc.skipped_rows > 0 {
        notices.push_str(&format!(
            r#"
                <span class="notice warning">{} source records skipped (unrecognized shape)</span>"#,
            doc.skipped_rows
        ));
    }

    format!(
        r#"        <header class="header">
            <h1>{title}</h1>
            <div class="metadata">
                <span><strong>Generated:</strong> {date}</span>
                <span><strong>Rows:</strong> {rows}</span>{notices}
            </div>
        </header>"#,
        title = escape_html(&doc.title),
        date = doc.generated_at.format("%Y-%m-%d %H:%M:%S"),
        rows = doc.row_count,
        notices = notices,
    )
}

fn render_summary_cards(metrics: &[SummaryMetric]) -> String {
    if metrics.is_empty() {
        return String::new();
    }

    let cards: String = metrics
        .iter()
        .map(|m| {
            format!(
                r#"            <div class="summary-card {class}">
                <h4>{label}</h4>
                <p class="metric-value" style="color: {color}">{value}</p>
            </div>"#,
                class = m.severity.css_class(),
                label = escape_html(&m.label),
                color = m.severity.color(),
                value = m.value,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"        <section class="section">
            <h2 class="section-title">Summary</h2>
            <div class="summary-grid">
{cards}
            </div>
        </section>"#,
        cards = cards,
    )
}

fn render_footer(doc: &ReportDocument) -> String {
    format!(
        r#"        <footer class="footer">
            <p>Generated by <span class="footer-brand">aud365</span> v{version}</p>
            <p>{date}</p>
        </footer>"#,
        version = env!("CARGO_PKG_VERSION"),
        date = doc.generated_at.format("%Y-%m-%d %H:%M:%S %Z"),
    )
}

/// Serialize the document's rows to RFC 4180 CSV. Header line from the
/// column names, one line per row, field order matching the HTML table.
pub fn assemble_csv(doc: &ReportDocument) -> String {
    let mut out = String::new();

    let header: Vec<String> = doc.columns.iter().map(|c| csv_field(&c.name)).collect();
    out.push_str(&header.join(","));
    out.push_str("\r\n");

    for row in &doc.rows {
        let fields: Vec<String> = row.values().iter().map(|v| csv_field(v)).collect();
        out.push_str(&fields.join(","));
        out.push_str("\r\n");
    }

    out
}

/// Quote-wrap a field when it contains a comma, quote, or newline; double
/// any internal quotes.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Embedded stylesheet covering everything the pipeline renders: banner,
/// summary cards, toolbar, table, and the placeholder states.
const CSS_STYLES: &str = r#"        :root {
            --primary: #1e40af;
            --secondary: #64748b;
            --success: #16a34a;
            --warning: #ca8a04;
            --danger: #dc2626;
            --light: #f8fafc;
            --dark: #1e293b;
            --border: #e2e8f0;
        }

        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: 'Segoe UI', system-ui, -apple-system, sans-serif;
            line-height: 1.6;
            color: var(--dark);
            background: var(--light);
        }

        .container {
            max-width: 1200px;
            margin: 0 auto;
            padding: 2rem;
            background: white;
            min-height: 100vh;
        }

        .header {
            text-align: center;
            padding: 2rem 0;
            border-bottom: 3px solid var(--primary);
            margin-bottom: 2rem;
        }

        .header h1 {
            color: var(--primary);
            font-size: 2rem;
            font-weight: 600;
            margin-bottom: 0.5rem;
        }

        .header .metadata {
            display: flex;
            justify-content: center;
            flex-wrap: wrap;
            gap: 2rem;
            margin-top: 1rem;
            font-size: 0.9rem;
            color: var(--secondary);
        }

        .notice.warning {
            color: var(--warning);
            font-weight: 600;
        }

        .section { margin-bottom: 2rem; }

        .section-title {
            font-size: 1.25rem;
            font-weight: 600;
            color: var(--primary);
            margin-bottom: 1rem;
            padding-bottom: 0.5rem;
            border-bottom: 2px solid var(--border);
        }

        .summary-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
            gap: 1rem;
        }

        .summary-card {
            background: var(--light);
            padding: 1.25rem;
            border-radius: 8px;
            border: 1px solid var(--border);
            border-left: 4px solid var(--success);
        }

        .summary-card.warning { border-left-color: var(--warning); }
        .summary-card.critical { border-left-color: var(--danger); }

        .summary-card h4 {
            font-size: 0.9rem;
            color: var(--secondary);
            text-transform: uppercase;
            margin-bottom: 0.5rem;
        }

        .summary-card .metric-value {
            font-size: 1.75rem;
            font-weight: 700;
        }

        .table-toolbar {
            display: flex;
            flex-wrap: wrap;
            gap: 0.75rem;
            align-items: flex-start;
            margin-bottom: 1rem;
        }

        .search-wrap { position: relative; flex: 1 1 260px; }

        #report-search {
            width: 100%;
            padding: 0.5rem 0.75rem;
            border: 1px solid var(--border);
            border-radius: 6px;
            font-size: 0.95rem;
        }

        #report-search:focus {
            outline: none;
            border-color: var(--primary);
        }

        .suggestions {
            position: absolute;
            top: 100%;
            left: 0;
            right: 0;
            z-index: 10;
            list-style: none;
            background: white;
            border: 1px solid var(--border);
            border-radius: 0 0 6px 6px;
            max-height: 16rem;
            overflow-y: auto;
            box-shadow: 0 4px 10px rgba(0,0,0,0.08);
        }

        .suggestions li {
            padding: 0.4rem 0.75rem;
            cursor: pointer;
            font-size: 0.9rem;
        }

        .suggestions li:hover,
        .suggestions li.selected {
            background: var(--light);
            color: var(--primary);
        }

        .column-filter {
            padding: 0.5rem;
            border: 1px solid var(--border);
            border-radius: 6px;
            font-size: 0.9rem;
            background: white;
            max-width: 220px;
        }

        .clear-filters {
            padding: 0.5rem 1rem;
            border: 1px solid var(--border);
            border-radius: 6px;
            background: var(--light);
            color: var(--secondary);
            font-size: 0.9rem;
            cursor: pointer;
        }

        .clear-filters:hover {
            border-color: var(--primary);
            color: var(--primary);
        }

        .report-table {
            width: 100%;
            border-collapse: collapse;
        }

        .report-table th,
        .report-table td {
            padding: 0.6rem 0.75rem;
            text-align: left;
            border-bottom: 1px solid var(--border);
            font-size: 0.9rem;
        }

        .report-table th {
            background: var(--light);
            font-weight: 600;
            color: var(--secondary);
            text-transform: uppercase;
            font-size: 0.8rem;
            position: sticky;
            top: 0;
        }

        .report-table tr:hover { background: var(--light); }

        .no-data td,
        .no-results td {
            text-align: center;
            color: var(--secondary);
            font-style: italic;
            padding: 2rem;
        }

        .hidden { display: none; }

        .footer {
            text-align: center;
            padding: 2rem 0;
            margin-top: 2rem;
            border-top: 1px solid var(--border);
            color: var(--secondary);
            font-size: 0.85rem;
        }

        .footer-brand {
            font-weight: 600;
            color: var(--primary);
        }

        @media print {
            body { background: white; }
            .container { padding: 0; max-width: none; }
            .table-toolbar { display: none; }
            .summary-card { break-inside: avoid; }
        }"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::{ColumnSpec, MetricValue, Severity};
    use crate::report::normalize::normalize;
    use chrono::Local;
    use serde_json::json;

    fn document(records: &[serde_json::Value], columns: Vec<ColumnSpec>) -> ReportDocument {
        let normalized = normalize(records, &columns, None);
        let row_count = normalized.rows.len();
        ReportDocument {
            title: "Test Report".to_string(),
            generated_at: Local::now(),
            columns,
            rows: normalized.rows,
            metrics: Vec::new(),
            row_count,
            skipped_rows: normalized.skipped,
            display_capped: false,
        }
    }

    /// Minimal RFC 4180 reader for round-trip assertions.
    fn parse_csv(text: &str) -> Vec<Vec<String>> {
        let mut records = Vec::new();
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut quoted = false;
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if quoted {
                match c {
                    '"' => {
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            field.push('"');
                        } else {
                            quoted = false;
                        }
                    }
                    _ => field.push(c),
                }
            } else {
                match c {
                    '"' => quoted = true,
                    ',' => fields.push(std::mem::take(&mut field)),
                    '\r' => {
                        if chars.peek() == Some(&'\n') {
                            chars.next();
                        }
                        fields.push(std::mem::take(&mut field));
                        records.push(std::mem::take(&mut fields));
                    }
                    '\n' => {
                        fields.push(std::mem::take(&mut field));
                        records.push(std::mem::take(&mut fields));
                    }
                    _ => field.push(c),
                }
            }
        }
        if !field.is_empty() || !fields.is_empty() {
            fields.push(field);
            records.push(fields);
        }
        records
    }

    #[test]
    fn test_html_document_structure() {
        let columns = vec![ColumnSpec::new("Name")];
        let doc = document(&[json!({"Name": "Adele Vance"})], columns);
        let html = assemble_html(&doc, &FilterPolicy::default());

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Test Report"));
        assert!(html.contains("Adele Vance"));
        assert!(html.contains("aud365"));
        assert!(html.contains("<strong>Rows:</strong> 1"));
    }

    #[test]
    fn test_summary_cards_carry_severity_color() {
        let columns = vec![ColumnSpec::new("Name")];
        let mut doc = document(&[json!({"Name": "a"})], columns);
        doc.metrics = vec![SummaryMetric {
            label: "Stale accounts %".to_string(),
            value: MetricValue::Percent(92.5),
            severity: Severity::Critical,
        }];
        let html = assemble_html(&doc, &FilterPolicy::default());
        assert!(html.contains("Stale accounts %"));
        assert!(html.contains("92.5%"));
        assert!(html.contains(r#"summary-card critical"#));
        assert!(html.contains("#dc2626"));
    }

    #[test]
    fn test_banner_surfaces_cap_and_skips() {
        let columns = vec![ColumnSpec::new("Name")];
        let mut doc = document(&[json!({"Name": "a"})], columns);
        doc.row_count = 5000;
        doc.display_capped = true;
        doc.skipped_rows = 3;
        let html = assemble_html(&doc, &FilterPolicy::default());
        assert!(html.contains("Showing first 1 of 5000 rows"));
        assert!(html.contains("3 source records skipped"));
    }

    #[test]
    fn test_csv_round_trip_preserves_values() {
        let columns = vec![ColumnSpec::new("Name"), ColumnSpec::new("Note")];
        let doc = document(
            &[
                json!({"Name": "Smith, John", "Note": "said \"hello\""}),
                json!({"Name": "Plain", "Note": "line1\nline2"}),
            ],
            columns,
        );
        let csv = assemble_csv(&doc);
        let parsed = parse_csv(&csv);

        assert_eq!(parsed[0], vec!["Name", "Note"]);
        assert_eq!(parsed[1], vec!["Smith, John", "said \"hello\""]);
        assert_eq!(parsed[2], vec!["Plain", "line1\nline2"]);
    }

    #[test]
    fn test_csv_and_html_describe_same_rows() {
        let columns = vec![ColumnSpec::new("Name")];
        let records: Vec<_> = (0..4).map(|i| json!({"Name": format!("u{i}")})).collect();
        let doc = document(&records, columns);

        let csv = assemble_csv(&doc);
        let html = assemble_html(&doc, &FilterPolicy::default());

        let csv_rows = parse_csv(&csv).len() - 1;
        let html_rows = html.matches("tr class=\"data-row\"").count();
        assert_eq!(csv_rows, html_rows);
        assert_eq!(csv_rows, 4);
    }

    #[test]
    fn test_empty_report_csv_has_header_only() {
        let columns = vec![ColumnSpec::new("Name"), ColumnSpec::new("Status")];
        let doc = document(&[], columns);
        assert_eq!(assemble_csv(&doc), "Name,Status\r\n");
    }

    #[test]
    fn test_csv_field_quoting_rules() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }
}

