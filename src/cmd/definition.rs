/// Report definition scaffolding
use crate::error::{Aud365Error, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the sample definition
    #[arg(short, long, default_value = "./report.toml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

const SAMPLE_DEFINITION: &str = r#"# aud365 report definition
#
# Columns are extracted from each source record by name, in declared order.
# kind controls display formatting: text (default), number, date, bool.
# filterable columns get a dropdown when they have 2-500 distinct values;
# important columns get one regardless of cardinality.

title = "User MFA Status"
category = "security"

[[columns]]
name = "DisplayName"

[[columns]]
name = "UserPrincipalName"

[[columns]]
name = "MfaEnabled"
kind = "bool"
important = true

[[columns]]
name = "LastSignIn"
kind = "date"

[[columns]]
name = "Department"
filterable = true

# Sort once, at normalization. Omit to keep source order.
[sort]
column = "DisplayName"

[[metrics]]
label = "Total users"
kind = "row-count"

[[metrics]]
label = "Without MFA"
kind = "count-where"
column = "MfaEnabled"
value = "No"

[[metrics]]
label = "MFA coverage %"
kind = "percentage"
of = { column = "MfaEnabled", value = "Yes" }

[metrics.thresholds]
warning = 90.0
critical = 70.0
direction = "lower-is-worse"
"#;

pub fn init(args: InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(Aud365Error::ConfigError(format!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        )));
    }

    fs::write(&args.output, SAMPLE_DEFINITION)?;
    println!(
        "{} Sample definition written to {}",
        "✓".green().bold(),
        args.output.display().to_string().cyan()
    );
    println!("Edit the columns and metrics, then run 'aud365 generate'.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportDefinition;

    #[test]
    fn test_sample_definition_parses() {
        let definition: ReportDefinition = toml::from_str(SAMPLE_DEFINITION).unwrap();
        assert_eq!(definition.title, "User MFA Status");
        assert_eq!(definition.columns.len(), 5);
        assert_eq!(definition.metrics.len(), 3);
        assert!(definition.sort.is_some());
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.toml");
        fs::write(&path, "existing").unwrap();

        let err = init(InitArgs {
            output: path.clone(),
            force: false,
        })
        .unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");
    }
}
