/// Settings management for the report pipeline
use crate::config::{ConfigManager, Settings};
use crate::error::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Root directory for generated reports
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Cap on rows rendered per report (0 removes the cap)
    #[arg(long)]
    pub row_cap: Option<usize>,

    /// Maximum options shown in one filter dropdown
    #[arg(long)]
    pub filter_option_cap: Option<usize>,

    /// Minimum distinct values for a column to get a filter dropdown
    #[arg(long)]
    pub filter_min_distinct: Option<usize>,

    /// Maximum distinct values for a column to stay filterable
    #[arg(long)]
    pub filter_max_distinct: Option<usize>,
}

pub fn show() -> Result<()> {
    let config = ConfigManager::new()?;
    let settings = config.load_settings()?;

    println!("{}", "aud365 settings".cyan().bold());
    println!("  Output root:         {}", settings.output_root.display());
    println!(
        "  Display row cap:     {}",
        settings
            .display_row_cap
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("  Filter distinct min: {}", settings.filter_min_distinct);
    println!("  Filter distinct max: {}", settings.filter_max_distinct);
    println!("  Filter option cap:   {}", settings.filter_option_cap);
    println!("\nConfig file: {}", config.config_file().display());
    Ok(())
}

pub fn set(args: SetArgs) -> Result<()> {
    let config = ConfigManager::new()?;
    let mut settings = config.load_settings()?;
    apply(&mut settings, args);
    config.save_settings(&settings)?;
    println!("{} Settings saved", "✓".green().bold());
    Ok(())
}

fn apply(settings: &mut Settings, args: SetArgs) {
    if let Some(root) = args.output_root {
        settings.output_root = root;
    }
    if let Some(cap) = args.row_cap {
        settings.display_row_cap = if cap == 0 { None } else { Some(cap) };
    }
    if let Some(cap) = args.filter_option_cap {
        settings.filter_option_cap = cap;
    }
    if let Some(min) = args.filter_min_distinct {
        settings.filter_min_distinct = min;
    }
    if let Some(max) = args.filter_max_distinct {
        settings.filter_max_distinct = max;
    }
}
