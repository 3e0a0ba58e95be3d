use crate::error::{Aud365Error, Result};
use crate::report::filter::FilterPolicy;
use crate::report::PipelineOptions;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted pipeline settings. The PowerShell originals kept these as
/// script-scoped globals; here they are an explicit struct injected into
/// the pipeline so it stays testable with nothing but a temp directory.
#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Root directory for generated reports; category subfolders go under
    /// it. Defaults to `./reports`.
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Optional cap on rows rendered per report. Exceeding it is surfaced
    /// in the output, never silent.
    #[serde(default)]
    pub display_row_cap: Option<usize>,

    #[serde(default = "default_filter_min_distinct")]
    pub filter_min_distinct: usize,

    #[serde(default = "default_filter_max_distinct")]
    pub filter_max_distinct: usize,

    #[serde(default = "default_filter_option_cap")]
    pub filter_option_cap: usize,
}

fn default_output_root() -> PathBuf {
    PathBuf::from("./reports")
}

fn default_filter_min_distinct() -> usize {
    FilterPolicy::default().min_distinct
}

fn default_filter_max_distinct() -> usize {
    FilterPolicy::default().max_distinct
}

fn default_filter_option_cap() -> usize {
    FilterPolicy::default().option_cap
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            display_row_cap: None,
            filter_min_distinct: default_filter_min_distinct(),
            filter_max_distinct: default_filter_max_distinct(),
            filter_option_cap: default_filter_option_cap(),
        }
    }
}

impl Settings {
    pub fn filter_policy(&self) -> FilterPolicy {
        FilterPolicy {
            min_distinct: self.filter_min_distinct,
            max_distinct: self.filter_max_distinct,
            option_cap: self.filter_option_cap,
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            display_row_cap: self.display_row_cap,
            filter_policy: self.filter_policy(),
        }
    }
}

/// Configuration manager
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from("com", "aud365", "aud365").ok_or_else(|| {
            Aud365Error::ConfigError("Failed to determine config directory".into())
        })?;

        let config_dir = project_dirs.config_dir().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        Ok(Self { config_dir })
    }

    /// Manager rooted at an explicit directory, for tests.
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Load persisted settings, falling back to defaults when no file
    /// exists yet.
    pub fn load_settings(&self) -> Result<Settings> {
        let config_path = self.config_file();

        if !config_path.exists() {
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(config_path)?;
        let settings: Settings = toml::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let config_path = self.config_file();
        let contents = toml::to_string_pretty(settings).map_err(|e| {
            Aud365Error::ConfigError(format!("Failed to serialize settings: {}", e))
        })?;
        fs::write(config_path, contents)?;
        Ok(())
    }
}
