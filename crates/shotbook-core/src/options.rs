//! Camera option catalogues
//!
//! Choices offered by submission forms for both settings variants.
//! Stored presets are not restricted to these values.

use std::sync::OnceLock;

/// A selectable option: what the form shows and what gets stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraOption {
    pub label: String,
    pub value: String,
}

impl CameraOption {
    fn same(value: &str) -> Self {
        Self {
            label: value.to_string(),
            value: value.to_string(),
        }
    }

    fn labeled(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

pub const ISO_VALUES: &[&str] = &[
    "50", "100", "200", "400", "800", "1600", "3200", "6400", "12800", "25600",
];

pub const SHUTTER_SPEED_VALUES: &[&str] = &[
    "1/8000", "1/4000", "1/2000", "1/1000", "1/500", "1/250", "1/125", "1/60", "1/30", "1/15",
    "1/8", "1/4", "1/2", "1\"", "2\"", "4\"", "8\"", "15\"", "30\"",
];

pub const APERTURE_VALUES: &[&str] = &[
    "f/1.4", "f/1.8", "f/2", "f/2.8", "f/4", "f/5.6", "f/8", "f/11", "f/16", "f/22",
];

pub const WHITE_BALANCE_VALUES: &[&str] = &[
    "Auto",
    "Daylight",
    "Cloudy",
    "Shade",
    "Tungsten",
    "Fluorescent",
    "Flash",
    "Kelvin",
];

pub const FILTER_VALUES: &[&str] = &["standard", "vivid", "clear"];

pub fn iso_options() -> Vec<CameraOption> {
    ISO_VALUES.iter().map(|v| CameraOption::same(v)).collect()
}

pub fn shutter_speed_options() -> Vec<CameraOption> {
    SHUTTER_SPEED_VALUES.iter().map(|v| CameraOption::same(v)).collect()
}

pub fn aperture_options() -> Vec<CameraOption> {
    APERTURE_VALUES.iter().map(|v| CameraOption::same(v)).collect()
}

pub fn white_balance_options() -> Vec<CameraOption> {
    WHITE_BALANCE_VALUES
        .iter()
        .map(|v| CameraOption::same(v))
        .collect()
}

pub fn focus_options() -> Vec<CameraOption> {
    vec![
        CameraOption::labeled("AF-S (single)", "AF-S"),
        CameraOption::labeled("AF-C (continuous)", "AF-C"),
        CameraOption::labeled("AF-A (automatic)", "AF-A"),
        CameraOption::labeled("MF (manual)", "MF"),
    ]
}

pub fn filter_options() -> Vec<CameraOption> {
    FILTER_VALUES.iter().map(|v| CameraOption::same(v)).collect()
}

/// Exposure compensation from -3.0EV to +3.0EV in 0.1 steps
pub fn exposure_options() -> &'static [CameraOption] {
    static OPTIONS: OnceLock<Vec<CameraOption>> = OnceLock::new();
    OPTIONS.get_or_init(|| {
        (-30..=30)
            .map(|step: i32| {
                let ev = step as f64 * 0.1;
                let label = if step >= 0 {
                    format!("+{:.1}EV", ev)
                } else {
                    format!("{:.1}EV", ev)
                };
                CameraOption::same(&label)
            })
            .collect()
    })
}

/// Position of `value` in `options`, falling back to the first entry
pub fn option_index(value: &str, options: &[CameraOption]) -> usize {
    options
        .iter()
        .position(|opt| opt.value == value)
        .unwrap_or(0)
}

/// Value at `index`, falling back to the first entry; empty when there are no options
pub fn option_value(index: usize, options: &[CameraOption]) -> &str {
    options
        .get(index)
        .or_else(|| options.first())
        .map(|opt| opt.value.as_str())
        .unwrap_or("")
}
