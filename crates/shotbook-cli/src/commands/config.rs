//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use shotbook_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => output.json(&config),
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:             {}", config.data_dir.display());
            println!("  max_images:           {}", config.max_images);
            println!("  backfill_on_fallback: {}", config.backfill_on_fallback);
            println!("  skip_corrupt_rows:    {}", config.skip_corrupt_rows);
            println!("  busy_timeout_ms:      {}", config.busy_timeout_ms);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "max_images" => {
            let max: usize = value
                .parse()
                .context("Invalid value for max_images. Use a positive number.")?;
            if max == 0 {
                bail!("max_images must be at least 1");
            }
            config.max_images = max;
        }
        "backfill_on_fallback" => {
            config.backfill_on_fallback = value
                .parse()
                .context("Invalid value for backfill_on_fallback. Use 'true' or 'false'.")?;
        }
        "skip_corrupt_rows" => {
            config.skip_corrupt_rows = value
                .parse()
                .context("Invalid value for skip_corrupt_rows. Use 'true' or 'false'.")?;
        }
        "busy_timeout_ms" => {
            config.busy_timeout_ms = value
                .parse()
                .context("Invalid value for busy_timeout_ms. Use milliseconds.")?;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, max_images, backfill_on_fallback, skip_corrupt_rows, busy_timeout_ms",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::with_data_dir("/data");

        apply(&mut config, "max_images", "3").unwrap();
        apply(&mut config, "skip_corrupt_rows", "true").unwrap();
        apply(&mut config, "data_dir", "/elsewhere").unwrap();

        assert_eq!(config.max_images, 3);
        assert!(config.skip_corrupt_rows);
        assert_eq!(config.data_dir, PathBuf::from("/elsewhere"));
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::with_data_dir("/data");

        assert!(apply(&mut config, "max_images", "0").is_err());
        assert!(apply(&mut config, "max_images", "nine").is_err());
        assert!(apply(&mut config, "backfill_on_fallback", "maybe").is_err());
        assert!(apply(&mut config, "sync_url", "ws://x").is_err());
        assert_eq!(config.max_images, 9);
    }

    #[test]
    fn test_set_writes_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        set("max_images".to_string(), "3".to_string(), Some(&path), &output).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("max_images = 3"));
    }
}
