//! CLI configuration management.
//!
//! Values come from defaults, then environment variables (a `.env` file is
//! honored), then the config file for anything the environment left unset.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// How `describe` prints its results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `<unique name>: <description>` line per feature.
    #[default]
    Text,
    /// A JSON array of `{ "feature", "description" }` objects.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Unknown format: {}. Use 'text' or 'json'", s),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Application-wide configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Metadata file applied when `--metadata` is not given.
    #[serde(default)]
    pub metadata_file: Option<PathBuf>,

    /// Output format applied when `--format` is not given.
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl Config {
    /// Load configuration from environment variables and config file.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        let env_metadata = std::env::var("FDESC_METADATA_FILE").ok();
        let env_format = std::env::var("FDESC_OUTPUT_FORMAT").ok();

        if let Some(path) = &env_metadata {
            config.metadata_file = Some(PathBuf::from(path));
        }
        if let Some(format) = &env_format {
            config.output_format = format
                .parse()
                .with_context(|| "Invalid FDESC_OUTPUT_FORMAT")?;
        }

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path).with_context(|| {
                    format!("Failed to read config from {}", config_path.display())
                })?;
                let file_config: Config = serde_json::from_str(&contents)
                    .with_context(|| "Failed to parse config file")?;

                // File config takes lower precedence than env vars
                if env_metadata.is_none() {
                    config.metadata_file = file_config.metadata_file;
                }
                if env_format.is_none() {
                    config.output_format = file_config.output_format;
                }
            }
        }

        Ok(config)
    }

    /// Save current configuration to the config file.
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_file_path() {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
            let contents = serde_json::to_string_pretty(self)?;
            std::fs::write(&config_path, contents)
                .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
        }
        Ok(())
    }

    /// Get the path to the config file.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "featuredesc", "fdesc")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}
