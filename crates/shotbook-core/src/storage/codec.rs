//! Row codec
//!
//! Converts between `PresetRecord` and the flat `camera_params` row:
//! `images` and `camera_settings` become JSON text, `author` is split into
//! two nullable columns, and `created_at` is stored as RFC 3339 UTC with
//! fixed nanosecond precision so text order equals time order.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;

use crate::models::{Author, CameraSettings, PresetRecord};
use crate::storage::error::CodecError;

/// Column list shared by every query, in `PresetRow::from_row` order
pub const COLUMNS: &str =
    "id, title, description, images, thumbnail, camera_settings, author_phone, author_nickname, created_at";

/// A `camera_params` row as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub images: String,
    pub thumbnail: Option<String>,
    pub camera_settings: String,
    pub author_phone: Option<String>,
    pub author_nickname: Option<String>,
    pub created_at: String,
}

impl PresetRow {
    /// Read a row selected with `COLUMNS`
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            images: row.get(3)?,
            thumbnail: row.get(4)?,
            camera_settings: row.get(5)?,
            author_phone: row.get(6)?,
            author_nickname: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

/// Format a timestamp the way `created_at` is stored
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse any RFC 3339 timestamp into UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|at| at.with_timezone(&Utc))
}

/// Flatten a record into its stored row
pub fn encode(record: &PresetRecord) -> Result<PresetRow, CodecError> {
    let images = serde_json::to_string(&record.images).map_err(|source| CodecError::Encode {
        id: record.id.clone(),
        column: "images",
        source,
    })?;
    let camera_settings =
        serde_json::to_string(&record.camera_settings).map_err(|source| CodecError::Encode {
            id: record.id.clone(),
            column: "camera_settings",
            source,
        })?;

    Ok(PresetRow {
        id: record.id.clone(),
        title: record.title.clone(),
        description: Some(record.description.clone()),
        images,
        thumbnail: Some(record.thumbnail.clone()),
        camera_settings,
        author_phone: Some(record.author.phone.clone()),
        author_nickname: record.author.nickname.clone(),
        created_at: format_timestamp(&record.created_at),
    })
}

/// Rebuild a record from its stored row
///
/// Null description, thumbnail and author phone decode to empty strings.
/// Camera settings must match one of the known shapes and pass range checks.
pub fn decode(row: PresetRow) -> Result<PresetRecord, CodecError> {
    let images: Vec<String> =
        serde_json::from_str(&row.images).map_err(|source| CodecError::InvalidJson {
            id: row.id.clone(),
            column: "images",
            source,
        })?;

    // Malformed text and a well-formed but unknown shape are reported apart
    let settings_value: serde_json::Value = serde_json::from_str(&row.camera_settings)
        .map_err(|source| CodecError::InvalidJson {
            id: row.id.clone(),
            column: "camera_settings",
            source,
        })?;
    let camera_settings: CameraSettings =
        serde_json::from_value(settings_value).map_err(|e| CodecError::InvalidSettings {
            id: row.id.clone(),
            details: e.to_string(),
        })?;
    camera_settings
        .validate()
        .map_err(|details| CodecError::InvalidSettings {
            id: row.id.clone(),
            details,
        })?;

    let created_at = parse_timestamp(&row.created_at).map_err(|source| {
        CodecError::InvalidTimestamp {
            id: row.id.clone(),
            value: row.created_at.clone(),
            source,
        }
    })?;

    Ok(PresetRecord {
        id: row.id,
        title: row.title,
        description: row.description.unwrap_or_default(),
        images,
        thumbnail: row.thumbnail.unwrap_or_default(),
        camera_settings,
        author: Author {
            phone: row.author_phone.unwrap_or_default(),
            nickname: row.author_nickname,
        },
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExposureSettings, ShootMode, SoftLight, StyledSettings, Vignette};
    use chrono::TimeZone;

    fn styled_record() -> PresetRecord {
        PresetRecord {
            id: "sub_18c2a1b3f00a1b2c3d4".to_string(),
            title: "夜景模式随手拍".to_string(),
            description: "低光环境下的城市灯光".to_string(),
            images: (1..=9).map(|i| format!("file:///images/img_{}.jpg", i)).collect(),
            thumbnail: "file:///images/img_1.jpg".to_string(),
            camera_settings: StyledSettings {
                shoot_mode: ShootMode::Pro,
                filter: "vivid".to_string(),
                soft_light: SoftLight::Dreamy,
                tone: 0,
                saturation: 100,
                temperature: 40,
                tint: 50,
                sharpness: 65,
                vignette: Vignette::On,
            }
            .into(),
            author: Author::with_nickname("13800000001", "小明"),
            created_at: Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap(),
        }
    }

    fn exposure_record() -> PresetRecord {
        PresetRecord {
            id: "flat".to_string(),
            title: "Street".to_string(),
            description: String::new(),
            images: vec!["a.jpg".to_string()],
            thumbnail: String::new(),
            camera_settings: ExposureSettings {
                iso: "400".to_string(),
                shutter_speed: "1/250".to_string(),
                aperture: "f/5.6".to_string(),
                white_balance: "Daylight".to_string(),
                focus: "AF-C".to_string(),
                exposure: "-0.3EV".to_string(),
            }
            .into(),
            author: Author::new("anonymous"),
            created_at: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_round_trip_styled() {
        let record = styled_record();
        let decoded = decode(encode(&record).unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_round_trip_exposure_with_empty_fields() {
        let record = exposure_record();
        let decoded = decode(encode(&record).unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_round_trip_empty_nickname() {
        let mut record = exposure_record();
        record.author.nickname = Some(String::new());
        let decoded = decode(encode(&record).unwrap()).unwrap();
        assert_eq!(decoded.author.nickname, Some(String::new()));
    }

    #[test]
    fn test_encode_flattens_author() {
        let row = encode(&styled_record()).unwrap();
        assert_eq!(row.author_phone.as_deref(), Some("13800000001"));
        assert_eq!(row.author_nickname.as_deref(), Some("小明"));

        let row = encode(&exposure_record()).unwrap();
        assert_eq!(row.author_nickname, None);
    }

    #[test]
    fn test_encode_images_as_json_array() {
        let row = encode(&exposure_record()).unwrap();
        assert_eq!(row.images, r#"["a.jpg"]"#);
        assert!(row.camera_settings.contains("\"shutterSpeed\":\"1/250\""));
    }

    #[test]
    fn test_timestamp_is_fixed_width() {
        let early = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let later = Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap();
        assert_eq!(format_timestamp(&early), "2023-11-14T22:13:20.000000000Z");
        assert!(format_timestamp(&early) < format_timestamp(&later));
    }

    #[test]
    fn test_decode_nulls_become_empty_strings() {
        let mut row = encode(&styled_record()).unwrap();
        row.description = None;
        row.thumbnail = None;
        row.author_phone = None;

        let record = decode(row).unwrap();
        assert_eq!(record.description, "");
        assert_eq!(record.thumbnail, "");
        assert_eq!(record.author.phone, "");
    }

    #[test]
    fn test_decode_accepts_millisecond_timestamps() {
        let mut row = encode(&styled_record()).unwrap();
        row.created_at = "2024-05-01T08:30:00.250Z".to_string();
        let record = decode(row).unwrap();
        assert_eq!(record.created_at.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_decode_malformed_images() {
        let mut row = encode(&styled_record()).unwrap();
        row.images = "[\"a.jpg\"".to_string();
        let err = decode(row).unwrap_err();
        assert!(matches!(err, CodecError::InvalidJson { column: "images", .. }));
    }

    #[test]
    fn test_decode_malformed_settings() {
        let mut row = encode(&styled_record()).unwrap();
        row.camera_settings = "{not json".to_string();
        let err = decode(row).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidJson {
                column: "camera_settings",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_unknown_settings_shape() {
        let mut row = encode(&styled_record()).unwrap();
        row.camera_settings = r#"{"mode":"night"}"#.to_string();
        assert!(matches!(
            decode(row).unwrap_err(),
            CodecError::InvalidSettings { .. }
        ));
    }

    #[test]
    fn test_decode_slider_out_of_range() {
        let mut row = encode(&styled_record()).unwrap();
        row.camera_settings = row.camera_settings.replace("\"saturation\":100", "\"saturation\":150");
        let err = decode(row).unwrap_err();
        match err {
            CodecError::InvalidSettings { details, .. } => assert!(details.contains("saturation")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_bad_timestamp() {
        let mut row = encode(&styled_record()).unwrap();
        row.created_at = "yesterday".to_string();
        assert!(matches!(
            decode(row).unwrap_err(),
            CodecError::InvalidTimestamp { .. }
        ));
    }
}
