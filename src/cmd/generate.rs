/// Report generation command
///
/// Loads a TOML report definition and a JSON records file (either a bare
/// array or a Graph-style `{"value": [...]}` envelope), runs the pipeline,
/// and prints the outcome.
use crate::config::ConfigManager;
use crate::error::{Aud365Error, Result};
use crate::report::writer::WriterConfig;
use crate::report::{self, ReportDefinition};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Report definition file (TOML)
    #[arg(short, long)]
    pub definition: PathBuf,

    /// Source records file (JSON array, or an object with a "value" array)
    #[arg(short, long)]
    pub records: PathBuf,

    /// Output root directory (overrides configured value)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Display row cap (overrides configured value, 0 removes the cap)
    #[arg(long)]
    pub row_cap: Option<usize>,
}

/// The cap for this run: the flag wins over the configured value, and an
/// explicit 0 removes the cap entirely, matching `config set --row-cap 0`.
fn effective_row_cap(flag: Option<usize>, configured: Option<usize>) -> Option<usize> {
    match flag {
        Some(0) => None,
        Some(cap) => Some(cap),
        None => configured,
    }
}

/// Create a spinner for the processing phase
fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

pub fn generate(args: GenerateArgs) -> Result<()> {
    println!("{} report...", "Generating".cyan().bold());

    let definition = load_definition(&args.definition)?;
    let records = load_records(&args.records)?;

    println!("→ Report: {}", definition.title.cyan().bold());
    println!("→ Records: {}", records.len().to_string().cyan());

    let config = ConfigManager::new()?;
    let settings = config.load_settings()?;

    let mut options = settings.pipeline_options();
    options.display_row_cap = effective_row_cap(args.row_cap, options.display_row_cap);
    let writer_config = WriterConfig {
        output_root: args.output.unwrap_or(settings.output_root),
    };

    let spinner = create_spinner("Building report...");
    let outcome = report::generate(&records, &definition, &options, &writer_config);
    spinner.finish_and_clear();

    let outcome = outcome?;

    println!("\n{} Report generated", "✓".green().bold());
    println!("  Rows: {}", outcome.row_count.to_string().cyan());
    if outcome.skipped_rows > 0 {
        println!(
            "  {} {} source records skipped (unrecognized shape)",
            "!".yellow().bold(),
            outcome.skipped_rows
        );
    }
    println!("  HTML: {}", outcome.html_path.display().to_string().cyan());
    println!("  CSV:  {}", outcome.csv_path.display().to_string().cyan());

    Ok(())
}

fn load_definition(path: &PathBuf) -> Result<ReportDefinition> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Aud365Error::ConfigError(format!("Cannot read definition {}: {}", path.display(), e))
    })?;
    let definition: ReportDefinition = toml::from_str(&contents)?;
    Ok(definition)
}

fn load_records(path: &PathBuf) -> Result<Vec<Value>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Aud365Error::ConfigError(format!("Cannot read records {}: {}", path.display(), e))
    })?;
    let parsed: Value = serde_json::from_str(&contents)?;

    // Graph responses wrap the record list in a "value" property.
    match parsed {
        Value::Array(records) => Ok(records),
        Value::Object(mut obj) => match obj.remove("value") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(Aud365Error::ConfigError(format!(
                "{} is not a JSON array or a Graph response envelope",
                path.display()
            ))),
        },
        _ => Err(Aud365Error::ConfigError(format!(
            "{} is not a JSON array or a Graph response envelope",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_row_cap() {
        assert_eq!(effective_row_cap(None, Some(500)), Some(500));
        assert_eq!(effective_row_cap(None, None), None);
        assert_eq!(effective_row_cap(Some(100), Some(500)), Some(100));
        assert_eq!(effective_row_cap(Some(0), Some(500)), None);
        assert_eq!(effective_row_cap(Some(0), None), None);
    }

    #[test]
    fn test_load_records_bare_array() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("records.json");
        fs::write(&path, r#"[{"a": 1}, {"a": 2}]"#).unwrap();
        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_load_records_graph_envelope() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("records.json");
        fs::write(
            &path,
            r#"{"@odata.context": "...", "value": [{"displayName": "x"}]}"#,
        )
        .unwrap();
        let records = load_records(&path).unwrap();
        assert_eq!(records[0], json!({"displayName": "x"}));
    }

    #[test]
    fn test_load_records_rejects_scalar() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("records.json");
        fs::write(&path, "42").unwrap();
        assert!(load_records(&path).is_err());
    }

    #[test]
    fn test_load_definition_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.toml");
        fs::write(
            &path,
            r#"
title = "MFA Status"
category = "security"

[[columns]]
name = "DisplayName"

[[columns]]
name = "MfaEnabled"
kind = "bool"
filterable = true

[[metrics]]
label = "Total users"
kind = "row-count"
"#,
        )
        .unwrap();

        let definition = load_definition(&path).unwrap();
        assert_eq!(definition.title, "MFA Status");
        assert_eq!(definition.columns.len(), 2);
        assert!(definition.columns[1].filterable);
        assert_eq!(definition.metrics.len(), 1);
    }
}
