//! Data models for shotbook
//!
//! Defines the core data structures: `PresetRecord`, its nested
//! `CameraSettings`, the submitting `Author`, and `PresetPatch` for
//! partial updates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest value accepted by the styled-variant sliders
pub const SLIDER_MAX: u8 = 100;

/// A camera parameter preset with its sample images
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresetRecord {
    /// Unique identifier, immutable once created
    pub id: String,
    /// Short title
    pub title: String,
    /// Explanation of the sample images
    pub description: String,
    /// Sample image URIs, in display order
    pub images: Vec<String>,
    /// Copy of the first image at creation time
    pub thumbnail: String,
    /// The camera parameters themselves
    pub camera_settings: CameraSettings,
    /// Who submitted the preset
    pub author: Author,
    /// When this preset was created; the listing sort key
    pub created_at: DateTime<Utc>,
}

impl PresetRecord {
    /// First image, if any
    pub fn cover(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Apply a partial update; `id` and `created_at` are never touched
    pub fn apply(&mut self, patch: PresetPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(thumbnail) = patch.thumbnail {
            self.thumbnail = thumbnail;
        }
        if let Some(settings) = patch.camera_settings {
            self.camera_settings = settings;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
    }
}

/// The submitter of a preset
///
/// Not a reference to any user table; just what the submitter provided.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl Author {
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            nickname: None,
        }
    }

    pub fn with_nickname(phone: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            nickname: Some(nickname.into()),
        }
    }

    /// Nickname when set, phone otherwise
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.phone)
    }
}

/// Camera settings carried by a preset
///
/// Two product variants exist and stored data may hold either shape.
/// Serialized untagged so the stored JSON is the bare settings object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CameraSettings {
    /// Shoot mode, filter, soft light and tone sliders
    Styled(StyledSettings),
    /// Classic exposure triangle as free-form strings
    Exposure(ExposureSettings),
}

impl CameraSettings {
    /// Check value ranges the type system cannot express
    pub fn validate(&self) -> Result<(), String> {
        match self {
            CameraSettings::Styled(styled) => styled.validate(),
            CameraSettings::Exposure(_) => Ok(()),
        }
    }
}

impl From<StyledSettings> for CameraSettings {
    fn from(settings: StyledSettings) -> Self {
        CameraSettings::Styled(settings)
    }
}

impl From<ExposureSettings> for CameraSettings {
    fn from(settings: ExposureSettings) -> Self {
        CameraSettings::Exposure(settings)
    }
}

/// Styled variant: enumerated modes plus 0..=100 sliders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StyledSettings {
    pub shoot_mode: ShootMode,
    /// Filter id, see `options::FILTER_VALUES`
    pub filter: String,
    pub soft_light: SoftLight,
    pub tone: u8,
    pub saturation: u8,
    pub temperature: u8,
    pub tint: u8,
    pub sharpness: u8,
    pub vignette: Vignette,
}

impl Default for StyledSettings {
    fn default() -> Self {
        Self {
            shoot_mode: ShootMode::Pro,
            filter: "standard".to_string(),
            soft_light: SoftLight::None,
            tone: 50,
            saturation: 50,
            temperature: 50,
            tint: 50,
            sharpness: 50,
            vignette: Vignette::Off,
        }
    }
}

impl StyledSettings {
    /// Sliders as (name, value) pairs, in form order
    pub fn sliders(&self) -> [(&'static str, u8); 5] {
        [
            ("tone", self.tone),
            ("saturation", self.saturation),
            ("temperature", self.temperature),
            ("tint", self.tint),
            ("sharpness", self.sharpness),
        ]
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in self.sliders() {
            if value > SLIDER_MAX {
                return Err(format!("{} must be between 0 and {}, got {}", name, SLIDER_MAX, value));
            }
        }
        Ok(())
    }
}

/// Exposure variant: every field is a display string such as "1/125" or "f/2.8"
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExposureSettings {
    pub iso: String,
    pub shutter_speed: String,
    pub aperture: String,
    pub white_balance: String,
    pub focus: String,
    pub exposure: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShootMode {
    Auto,
    Pro,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SoftLight {
    None,
    Soft,
    Dreamy,
    Hazy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Vignette {
    On,
    Off,
}

impl fmt::Display for ShootMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShootMode::Auto => write!(f, "AUTO"),
            ShootMode::Pro => write!(f, "PRO"),
        }
    }
}

impl fmt::Display for SoftLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SoftLight::None => "none",
            SoftLight::Soft => "soft",
            SoftLight::Dreamy => "dreamy",
            SoftLight::Hazy => "hazy",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Vignette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vignette::On => write!(f, "on"),
            Vignette::Off => write!(f, "off"),
        }
    }
}

/// Partial update for a stored preset
///
/// `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub thumbnail: Option<String>,
    pub camera_settings: Option<CameraSettings>,
    pub author: Option<Author>,
}

impl PresetPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
