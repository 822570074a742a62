//! Demonstration presets
//!
//! Inserted on first start when the database is empty, and again by
//! reinitialize. Timestamps step back one second per preset so the listing
//! order is fixed: cam1, cam2, cam3.

use chrono::{DateTime, Duration, Utc};

use crate::models::{Author, PresetRecord, ShootMode, SoftLight, StyledSettings, Vignette};

/// Number of demonstration presets
pub const SEED_COUNT: usize = 3;

fn sample_images(seed: &str) -> Vec<String> {
    (1..=9)
        .map(|i| format!("https://picsum.photos/seed/{}{}/800/600", seed, i))
        .collect()
}

fn thumbnail(seed: &str) -> String {
    format!("https://picsum.photos/seed/{}1/400/300", seed)
}

/// The demonstration presets, newest stamped at `now`
pub fn demo_presets(now: DateTime<Utc>) -> Vec<PresetRecord> {
    vec![
        PresetRecord {
            id: "cam1".to_string(),
            title: "夜景模式随手拍".to_string(),
            description: "在低光环境下拍摄的夜景样张，强调城市灯光与轮廓。".to_string(),
            images: sample_images("ny"),
            thumbnail: thumbnail("ny"),
            camera_settings: StyledSettings {
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
            .into(),
            author: Author::with_nickname("13800000001", "小明"),
            created_at: now,
        },
        PresetRecord {
            id: "cam2".to_string(),
            title: "人像虚化效果".to_string(),
            description: "前景清晰、背景虚化，突出演示主体。".to_string(),
            images: sample_images("portrait"),
            thumbnail: thumbnail("portrait"),
            camera_settings: StyledSettings {
                shoot_mode: ShootMode::Pro,
                filter: "vivid".to_string(),
                soft_light: SoftLight::Soft,
                tone: 60,
                saturation: 70,
                temperature: 40,
                tint: 50,
                sharpness: 65,
                vignette: Vignette::On,
            }
            .into(),
            author: Author::with_nickname("13800000002", "阿强"),
            created_at: now - Duration::seconds(1),
        },
        PresetRecord {
            id: "cam3".to_string(),
            title: "运动场景抓拍".to_string(),
            description: "高速运动的瞬间定格，画面干净锐利。".to_string(),
            images: sample_images("sport"),
            thumbnail: thumbnail("sport"),
            camera_settings: StyledSettings {
                shoot_mode: ShootMode::Pro,
                filter: "clear".to_string(),
                soft_light: SoftLight::Dreamy,
                tone: 45,
                saturation: 55,
                temperature: 30,
                tint: 60,
                sharpness: 80,
                vignette: Vignette::Off,
            }
            .into(),
            author: Author::with_nickname("13800000003", "阿勋"),
            created_at: now - Duration::seconds(2),
        },
    ]
}
