//! Config command implementation.
//!
//! Manages CLI configuration.

use std::path::PathBuf;

use anyhow::Result;

use crate::config::Config;

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("featuredesc CLI Configuration");
    println!("{:-<40}", "");

    println!(
        "Metadata File:  {}",
        config
            .metadata_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("Output Format:  {}", config.output_format);

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Set a configuration value.
pub fn set(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "metadata-file" | "metadata" => {
            config.metadata_file = match value {
                "" | "none" => None,
                path => Some(PathBuf::from(path)),
            };
            println!("Set metadata-file to: {}", value);
        }
        "output-format" | "format" => {
            config.output_format = value.parse()?;
            println!("Set output-format to: {}", config.output_format);
        }
        _ => {
            anyhow::bail!(
                "Unknown config key: {}. Valid keys: metadata-file, output-format",
                key
            );
        }
    }

    config.save()?;
    Ok(())
}

/// Get a configuration value.
pub fn get(config: &Config, key: &str) -> Result<()> {
    let value = match key {
        "metadata-file" | "metadata" => config
            .metadata_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string()),
        "output-format" | "format" => config.output_format.to_string(),
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    };

    println!("{}", value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn reset() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults");
    Ok(())
}
