//! Camera option catalogue command handler

use anyhow::{bail, Result};

use shotbook_core::options::{self, CameraOption};

use crate::output::{Output, OutputFormat};

/// Names accepted by `shotbook options <name>`
pub const CATALOGUES: &[&str] = &[
    "iso",
    "shutter",
    "aperture",
    "white-balance",
    "focus",
    "exposure",
    "filter",
];

fn catalogue(name: &str) -> Option<Vec<CameraOption>> {
    let options = match name {
        "iso" => options::iso_options(),
        "shutter" => options::shutter_speed_options(),
        "aperture" => options::aperture_options(),
        "white-balance" => options::white_balance_options(),
        "focus" => options::focus_options(),
        "exposure" => options::exposure_options().to_vec(),
        "filter" => options::filter_options(),
        _ => return None,
    };
    Some(options)
}

/// List the choices for one setting, or the catalogue names
pub fn show(name: Option<String>, output: &Output) -> Result<()> {
    let Some(name) = name else {
        match output.format {
            OutputFormat::Json => output.json(CATALOGUES),
            _ => {
                for name in CATALOGUES {
                    println!("{}", name);
                }
            }
        }
        return Ok(());
    };

    let Some(choices) = catalogue(&name) else {
        bail!(
            "Unknown option list: '{}'\nAvailable: {}",
            name,
            CATALOGUES.join(", ")
        );
    };

    match output.format {
        OutputFormat::Json => {
            let entries: Vec<_> = choices
                .iter()
                .map(|opt| serde_json::json!({"label": opt.label, "value": opt.value}))
                .collect();
            output.json(&entries);
        }
        OutputFormat::Quiet => {
            for opt in &choices {
                println!("{}", opt.value);
            }
        }
        OutputFormat::Human => {
            for opt in &choices {
                if opt.label == opt.value {
                    println!("{}", opt.value);
                } else {
                    println!("{:<8} {}", opt.value, opt.label);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_catalogue_resolves() {
        for name in CATALOGUES {
            let choices = catalogue(name).unwrap();
            assert!(!choices.is_empty(), "{} is empty", name);
        }
        assert!(catalogue("lens").is_none());
    }
}
