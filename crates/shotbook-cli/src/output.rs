//! Output formatting for CLI
//!
//! Every command prints through `Output` so the three modes behave the same:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag), ids only

use serde::Serialize;

use shotbook_core::{CameraSettings, PresetRecord};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print any serializable value as pretty JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to serialize output: {}", e),
        }
    }

    /// Print a single preset with its settings
    pub fn print_preset(&self, preset: &PresetRecord) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", preset.id);
                println!("Title:       {}", preset.title);
                if !preset.description.is_empty() {
                    println!("Description: {}", preset.description);
                }
                println!("Author:      {}", preset.author.display_name());
                println!(
                    "Created:     {}",
                    preset.created_at.format("%Y-%m-%d %H:%M:%S")
                );
                println!("Thumbnail:   {}", preset.thumbnail);

                println!();
                println!("── Settings ──");
                print_settings(&preset.camera_settings);

                println!();
                println!("── Images ({}) ──", preset.images.len());
                for (i, image) in preset.images.iter().enumerate() {
                    println!("{:>2}. {}", i + 1, image);
                }
            }
            OutputFormat::Json => self.json(preset),
            OutputFormat::Quiet => println!("{}", preset.id),
        }
    }

    /// Print a list of presets, newest first
    pub fn print_presets(&self, presets: &[PresetRecord]) {
        match self.format {
            OutputFormat::Human => {
                if presets.is_empty() {
                    println!("No presets found.");
                    println!("Run `shotbook reinit` to restore the sample presets.");
                    return;
                }
                for preset in presets {
                    println!(
                        "{} | {} | {} | {}",
                        pad(&preset.id, 24),
                        pad(&truncate(&preset.title, 20), 20),
                        pad(&truncate(preset.author.display_name(), 12), 12),
                        preset.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
                println!("\n{} preset(s)", presets.len());
            }
            OutputFormat::Json => self.json(presets),
            OutputFormat::Quiet => {
                for preset in presets {
                    println!("{}", preset.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_settings(settings: &CameraSettings) {
    match settings {
        CameraSettings::Styled(styled) => {
            println!("Mode:        {}", styled.shoot_mode);
            println!("Filter:      {}", styled.filter);
            println!("Soft light:  {}", styled.soft_light);
            for (name, value) in styled.sliders() {
                println!("{:<12} {:>3} {}", format!("{}:", capitalize(name)), value, bar(value));
            }
            println!("Vignette:    {}", styled.vignette);
        }
        CameraSettings::Exposure(exposure) => {
            let rows = [
                ("ISO", &exposure.iso),
                ("Shutter", &exposure.shutter_speed),
                ("Aperture", &exposure.aperture),
                ("White bal.", &exposure.white_balance),
                ("Focus", &exposure.focus),
                ("Exposure", &exposure.exposure),
            ];
            for (label, value) in rows {
                let value = if value.is_empty() { "-" } else { value.as_str() };
                println!("{:<12} {}", format!("{}:", label), value);
            }
        }
    }
}

/// Ten-cell gauge for a 0..=100 slider
fn bar(value: u8) -> String {
    let filled = (usize::from(value.min(100)) + 5) / 10;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Pad to a column width counted in characters
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}
