//! Preset submission
//!
//! A `PresetDraft` is what a submission form collects: everything but the
//! id and creation time. Validation mirrors the form limits; a valid draft
//! becomes a `PresetRecord` with a freshly minted id.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Author, CameraSettings, PresetRecord};
use crate::storage::StoreError;

/// Longest accepted title, in characters
pub const MAX_TITLE_CHARS: usize = 20;

/// Longest accepted description, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 300;

/// A preset as entered, before it has an id
#[derive(Debug, Clone, PartialEq)]
pub struct PresetDraft {
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub camera_settings: CameraSettings,
    /// Filled from the session when left empty
    pub author: Option<Author>,
}

/// Why a draft was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Title is {0} characters, at most {MAX_TITLE_CHARS} are allowed")]
    TitleTooLong(usize),

    #[error("Description must not be empty")]
    EmptyDescription,

    #[error("Description is {0} characters, at most {MAX_DESCRIPTION_CHARS} are allowed")]
    DescriptionTooLong(usize),

    #[error("At least one image is required")]
    NoImages,

    #[error("{count} images given, at most {max} are allowed")]
    TooManyImages { count: usize, max: usize },

    #[error("Invalid camera settings: {0}")]
    InvalidSettings(String),
}

/// Errors from submitting a draft
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to save preset: {0}")]
    Store(#[from] StoreError),
}

impl PresetDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        images: Vec<String>,
        camera_settings: impl Into<CameraSettings>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            images,
            camera_settings: camera_settings.into(),
            author: None,
        }
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    /// Images that count toward the limit; blank entries are ignored
    pub fn usable_images(&self) -> Vec<String> {
        self.images
            .iter()
            .map(|image| image.trim())
            .filter(|image| !image.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Check the draft against the form limits
    pub fn validate(&self, max_images: usize) -> Result<(), ValidationError> {
        let title_chars = self.title.trim().chars().count();
        if title_chars == 0 {
            return Err(ValidationError::EmptyTitle);
        }
        if title_chars > MAX_TITLE_CHARS {
            return Err(ValidationError::TitleTooLong(title_chars));
        }

        let description_chars = self.description.trim().chars().count();
        if description_chars == 0 {
            return Err(ValidationError::EmptyDescription);
        }
        if description_chars > MAX_DESCRIPTION_CHARS {
            return Err(ValidationError::DescriptionTooLong(description_chars));
        }

        let count = self.usable_images().len();
        if count == 0 {
            return Err(ValidationError::NoImages);
        }
        if count > max_images {
            return Err(ValidationError::TooManyImages {
                count,
                max: max_images,
            });
        }

        self.camera_settings
            .validate()
            .map_err(ValidationError::InvalidSettings)
    }

    /// Turn a validated draft into a record
    ///
    /// The thumbnail is the first usable image. `fallback_author` is used
    /// when the draft carries none.
    pub fn into_record(
        self,
        id: String,
        created_at: DateTime<Utc>,
        fallback_author: Author,
    ) -> PresetRecord {
        let images = self.usable_images();
        let thumbnail = images.first().cloned().unwrap_or_default();

        PresetRecord {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            images,
            thumbnail,
            camera_settings: self.camera_settings,
            author: self.author.unwrap_or(fallback_author),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExposureSettings, StyledSettings};

    fn draft() -> PresetDraft {
        PresetDraft::new(
            "夜景模式随手拍",
            "城市夜景",
            vec!["file:///a.jpg".to_string(), "file:///b.jpg".to_string()],
            StyledSettings::default(),
        )
    }

    #[test]
    fn test_valid_draft() {
        assert_eq!(draft().validate(9), Ok(()));
    }

    #[test]
    fn test_title_limits() {
        let mut d = draft();
        d.title = "   ".to_string();
        assert_eq!(d.validate(9), Err(ValidationError::EmptyTitle));

        // Counted in characters, not bytes
        d.title = "夜".repeat(20);
        assert_eq!(d.validate(9), Ok(()));

        d.title = "夜".repeat(21);
        assert_eq!(d.validate(9), Err(ValidationError::TitleTooLong(21)));
    }

    #[test]
    fn test_description_limits() {
        let mut d = draft();
        d.description = String::new();
        assert_eq!(d.validate(9), Err(ValidationError::EmptyDescription));

        d.description = "x".repeat(301);
        assert_eq!(d.validate(9), Err(ValidationError::DescriptionTooLong(301)));
    }

    #[test]
    fn test_image_limits() {
        let mut d = draft();
        d.images = vec!["  ".to_string(), String::new()];
        assert_eq!(d.validate(9), Err(ValidationError::NoImages));

        d.images = (0..4).map(|i| format!("file:///{}.jpg", i)).collect();
        assert_eq!(d.validate(9), Ok(()));
        assert_eq!(
            d.validate(3),
            Err(ValidationError::TooManyImages { count: 4, max: 3 })
        );
    }

    #[test]
    fn test_blank_images_do_not_count() {
        let mut d = draft();
        d.images = vec![
            "file:///a.jpg".to_string(),
            " ".to_string(),
            "file:///b.jpg".to_string(),
            " ".to_string(),
        ];
        assert_eq!(d.validate(2), Ok(()));
        assert_eq!(d.usable_images().len(), 2);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut d = draft();
        d.camera_settings = StyledSettings {
            tone: 101,
            ..StyledSettings::default()
        }
        .into();

        assert!(matches!(
            d.validate(9),
            Err(ValidationError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_into_record() {
        let at = Utc::now();
        let mut d = draft();
        d.images.insert(0, " ".to_string());

        let record = d.into_record("sub_1".to_string(), at, Author::new("anonymous"));

        assert_eq!(record.id, "sub_1");
        assert_eq!(record.created_at, at);
        assert_eq!(record.images, vec!["file:///a.jpg", "file:///b.jpg"]);
        assert_eq!(record.thumbnail, "file:///a.jpg");
        assert_eq!(record.author.phone, "anonymous");
    }

    #[test]
    fn test_into_record_keeps_draft_author() {
        let d = PresetDraft::new(
            "Street",
            "Daylight",
            vec!["a.jpg".to_string()],
            ExposureSettings::default(),
        )
        .with_author(Author::with_nickname("13800000000", "Lee"));

        let record = d.into_record("sub_2".to_string(), Utc::now(), Author::new("anonymous"));
        assert_eq!(record.author.display_name(), "Lee");
    }
}
