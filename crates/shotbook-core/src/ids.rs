//! Preset identifiers and listing order
//!
//! Submitted presets get `sub_<millis as 12 hex digits><8 random hex digits>`.
//! The fixed-width time part makes ids created later sort after earlier ones;
//! the random part separates ids minted in the same millisecond.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::PresetRecord;

/// Prefix of ids minted by the submission flow
pub const SUBMISSION_PREFIX: &str = "sub_";

const TIME_DIGITS: usize = 12;
const RANDOM_DIGITS: usize = 8;

/// Mint an id for a preset created at `created_at`
pub fn generate_id(created_at: DateTime<Utc>) -> String {
    let millis = created_at.timestamp_millis().max(0) as u64;
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}{:0width$x}{}",
        SUBMISSION_PREFIX,
        millis,
        &random[..RANDOM_DIGITS],
        width = TIME_DIGITS
    )
}

/// Creation time encoded in a minted id, to millisecond precision
pub fn id_timestamp(id: &str) -> Option<DateTime<Utc>> {
    let hex = id.strip_prefix(SUBMISSION_PREFIX)?.get(..TIME_DIGITS)?;
    let millis = i64::from_str_radix(hex, 16).ok()?;
    DateTime::from_timestamp_millis(millis)
}

/// Listing order: newest `created_at` first, then id descending
///
/// Matches `ORDER BY created_at DESC, id DESC` in the store.
pub fn newest_first(a: &PresetRecord, b: &PresetRecord) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, StyledSettings};
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    fn record(id: &str, at: DateTime<Utc>) -> PresetRecord {
        PresetRecord {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            images: vec!["a.jpg".to_string()],
            thumbnail: "a.jpg".to_string(),
            camera_settings: StyledSettings::default().into(),
            author: Author::default(),
            created_at: at,
        }
    }

    #[test]
    fn test_id_format() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let id = generate_id(at);

        assert!(id.starts_with(SUBMISSION_PREFIX));
        assert_eq!(id.len(), SUBMISSION_PREFIX.len() + TIME_DIGITS + RANDOM_DIGITS);
        assert!(id[SUBMISSION_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id_timestamp(&id), Some(at));
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let at = Utc::now();
        let ids: HashSet<String> = (0..1000).map(|_| generate_id(at)).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_ids_sort_by_time() {
        let earlier = Utc.timestamp_millis_opt(1_000).unwrap();
        let later = earlier + Duration::days(365 * 30);
        assert!(generate_id(earlier) < generate_id(later));
    }

    #[test]
    fn test_id_timestamp_rejects_foreign_ids() {
        assert_eq!(id_timestamp("cam1"), None);
        assert_eq!(id_timestamp("sub_xyz"), None);
    }

    #[test]
    fn test_newest_first() {
        let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut records = vec![
            record("b", base),
            record("old", base - Duration::seconds(5)),
            record("new", base + Duration::seconds(5)),
            record("c", base),
        ];
        records.sort_by(newest_first);

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "c", "b", "old"]);
    }
}
