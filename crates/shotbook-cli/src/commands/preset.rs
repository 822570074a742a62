//! Preset command handlers

use anyhow::{bail, Context, Result};

use shotbook_core::{
    CameraSettings, ExposureSettings, Library, PresetDraft, PresetPatch, Resolution, Session,
    StyledSettings,
};

use crate::output::Output;
use crate::prompt::confirm;

/// Settings given on the command line for a new preset
#[derive(Debug, Default)]
pub struct SettingsArgs {
    /// Full settings object as JSON, either shape
    pub json: Option<String>,
    pub iso: Option<String>,
    pub shutter: Option<String>,
    pub aperture: Option<String>,
    pub white_balance: Option<String>,
    pub focus: Option<String>,
    pub ev: Option<String>,
}

impl SettingsArgs {
    fn has_exposure_fields(&self) -> bool {
        [
            &self.iso,
            &self.shutter,
            &self.aperture,
            &self.white_balance,
            &self.focus,
            &self.ev,
        ]
        .iter()
        .any(|field| field.is_some())
    }

    /// Build settings: JSON wins, exposure flags next, styled defaults otherwise
    pub fn into_settings(self) -> Result<CameraSettings> {
        if let Some(json) = &self.json {
            let settings: CameraSettings =
                serde_json::from_str(json).context("Invalid --settings JSON")?;
            return Ok(settings);
        }

        if self.has_exposure_fields() {
            return Ok(ExposureSettings {
                iso: self.iso.unwrap_or_default(),
                shutter_speed: self.shutter.unwrap_or_default(),
                aperture: self.aperture.unwrap_or_default(),
                white_balance: self.white_balance.unwrap_or_default(),
                focus: self.focus.unwrap_or_default(),
                exposure: self.ev.unwrap_or_default(),
            }
            .into());
        }

        Ok(StyledSettings::default().into())
    }
}

/// List presets, newest first
pub async fn list(library: &Library, refresh: bool, output: &Output) -> Result<()> {
    if refresh {
        library.refresh().await.context("Failed to reload presets")?;
    }

    output.print_presets(&library.list());
    Ok(())
}

/// Show a single preset
pub async fn show(library: &Library, id: String, output: &Output) -> Result<()> {
    let preset = match library.resolve(&id).await? {
        Resolution::Cached(preset) | Resolution::Fetched(preset) => preset,
        Resolution::Missing => bail!("Preset not found: {}", id),
    };

    output.print_preset(&preset);
    Ok(())
}

/// Submit a new preset
pub async fn submit(
    library: &Library,
    session: &Session,
    draft: PresetDraft,
    output: &Output,
) -> Result<()> {
    let preset = library.submit(draft, session).await?;

    if output.is_quiet() {
        println!("{}", preset.id);
        return Ok(());
    }

    output.success(&format!("Submitted preset: {}", preset.id));
    output.print_preset(&preset);
    Ok(())
}

/// Change the title or description of a preset
pub async fn edit(
    library: &Library,
    id: String,
    title: Option<String>,
    description: Option<String>,
    output: &Output,
) -> Result<()> {
    let patch = PresetPatch {
        title,
        description,
        ..PresetPatch::default()
    };
    if patch.is_empty() {
        bail!("Nothing to change. Pass --title and/or --description.");
    }

    let preset = library
        .update(&id, patch)
        .await
        .context("Failed to update preset")?
        .ok_or_else(|| anyhow::anyhow!("Preset not found: {}", id))?;

    output.success("Preset updated");
    output.print_preset(&preset);
    Ok(())
}

/// Delete a preset
pub async fn delete(library: &Library, id: String, yes: bool, output: &Output) -> Result<()> {
    let preset = library
        .resolve(&id)
        .await?
        .into_record()
        .ok_or_else(|| anyhow::anyhow!("Preset not found: {}", id))?;

    // Confirm deletion
    if output.should_prompt() && !yes {
        println!("Delete preset: {} - {}", preset.id, preset.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    library
        .delete(&preset.id)
        .await
        .context("Failed to delete preset")?;

    output.success(&format!("Deleted preset: {}", preset.id));
    Ok(())
}

/// Wipe all presets and restore the samples
pub async fn reinit(library: &Library, yes: bool, output: &Output) -> Result<()> {
    if output.should_prompt() && !yes {
        println!("This deletes every preset and restores the sample presets.");
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let count = library.reinitialize().await?;

    output.success(&format!("Restored {} sample preset(s)", count));
    Ok(())
}
