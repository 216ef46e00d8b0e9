//! Assembled fingerprint record and sentinel values.

use crate::serde_helpers::or_default;
use serde::{Deserialize, Serialize};

/// 2D canvas context could not be created.
pub const NO_CANVAS: &str = "no-canvas";
/// Canvas rendering or serialization threw.
pub const CANVAS_ERROR: &str = "canvas-error";
/// No WebGL context available.
pub const NO_WEBGL: &str = "no-webgl";
/// WebGL queries threw.
pub const WEBGL_ERROR: &str = "webgl-error";
/// Audio graph construction or capture threw.
pub const AUDIO_ERROR: &str = "audio-error";

/// Every value a collector may return instead of a hash.
pub const SENTINELS: &[&str] = &[NO_CANVAS, CANVAS_ERROR, NO_WEBGL, WEBGL_ERROR, AUDIO_ERROR];

/// Minimum share of matching key fields for `similarity` to count as the
/// same device.
pub const VERIFY_THRESHOLD: f64 = 0.8;

/// Whether a collector output signals failure rather than entropy.
pub fn is_sentinel(value: &str) -> bool {
    SENTINELS.contains(&value)
}

/// One collection event's worth of device characteristics.
///
/// Missing, `null` or mistyped fields deserialize to defaults so records
/// written by older releases still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FingerprintRecord {
    #[serde(deserialize_with = "or_default")]
    pub user_agent: String,
    #[serde(deserialize_with = "or_default")]
    pub language: String,
    #[serde(deserialize_with = "or_default")]
    pub languages: Vec<String>,
    /// IANA zone name, e.g. `Asia/Tokyo`.
    #[serde(deserialize_with = "or_default")]
    pub timezone: String,
    /// `"{width}x{height}"`
    #[serde(deserialize_with = "or_default")]
    pub screen_resolution: String,
    #[serde(deserialize_with = "or_default")]
    pub screen_color_depth: u32,
    #[serde(deserialize_with = "or_default")]
    pub screen_pixel_depth: u32,
    #[serde(deserialize_with = "or_default")]
    pub available_screen_size: String,
    #[serde(deserialize_with = "or_default")]
    pub platform: String,
    #[serde(deserialize_with = "or_default")]
    pub hardware_concurrency: u32,
    #[serde(deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    pub device_memory: Option<f64>,
    #[serde(deserialize_with = "or_default")]
    pub canvas_fingerprint: String,
    #[serde(deserialize_with = "or_default")]
    pub webgl_fingerprint: String,
    #[serde(deserialize_with = "or_default")]
    pub audio_fingerprint: String,
    #[serde(deserialize_with = "or_default")]
    pub persistent_id: String,
    /// ISO-8601 capture instant.
    #[serde(deserialize_with = "or_default")]
    pub timestamp: String,
}

impl FingerprintRecord {
    /// Fields compared by re-verification, in a fixed order. These are the
    /// same fields the user id is derived from.
    pub fn key_fields(&self) -> [&str; 6] {
        [
            &self.user_agent,
            &self.timezone,
            &self.screen_resolution,
            &self.canvas_fingerprint,
            &self.webgl_fingerprint,
            &self.persistent_id,
        ]
    }

    /// Number of key fields equal between two records.
    pub fn matching_key_fields(&self, other: &FingerprintRecord) -> usize {
        self.key_fields()
            .iter()
            .zip(other.key_fields().iter())
            .filter(|(a, b)| a == b)
            .count()
    }

    /// Share of matching key fields, in `[0.0, 1.0]`.
    pub fn similarity(&self, other: &FingerprintRecord) -> f64 {
        let total = self.key_fields().len();
        self.matching_key_fields(other) as f64 / total as f64
    }

    /// Whether `other` is close enough to be treated as the same device.
    pub fn is_same_device(&self, other: &FingerprintRecord) -> bool {
        self.similarity(other) >= VERIFY_THRESHOLD
    }
}

#[cfg(test)]
pub(crate) fn sample_record() -> FingerprintRecord {
    FingerprintRecord {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) Firefox/126.0".into(),
        language: "ja-JP".into(),
        languages: vec!["ja-JP".into(), "en-US".into()],
        timezone: "Asia/Tokyo".into(),
        screen_resolution: "1920x1080".into(),
        screen_color_depth: 24,
        screen_pixel_depth: 24,
        available_screen_size: "1920x1040".into(),
        platform: "Linux x86_64".into(),
        hardware_concurrency: 8,
        device_memory: Some(8.0),
        canvas_fingerprint: "3f2a9c0d1e4b5a67".into(),
        webgl_fingerprint: "a1b2c3d4e5f60718".into(),
        audio_fingerprint: "0f1e2d3c4b5a6978".into(),
        persistent_id: "1b4e28ba-2fa1-4d2b-883f-0016d3cca427".into(),
        timestamp: "2024-05-01T12:30:00.000Z".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Copy of `base` with the first `n` key fields changed.
    fn with_changed_key_fields(base: &FingerprintRecord, n: usize) -> FingerprintRecord {
        let mut r = base.clone();
        let edits: [fn(&mut FingerprintRecord); 6] = [
            |r| r.user_agent.push_str(" Edg/1"),
            |r| r.timezone = "Europe/Berlin".into(),
            |r| r.screen_resolution = "2560x1440".into(),
            |r| r.canvas_fingerprint = CANVAS_ERROR.into(),
            |r| r.webgl_fingerprint = NO_WEBGL.into(),
            |r| r.persistent_id = "00000000-0000-4000-8000-000000000000".into(),
        ];
        for edit in edits.iter().take(n) {
            edit(&mut r);
        }
        r
    }

    #[test]
    fn test_sentinels() {
        for s in SENTINELS {
            assert!(is_sentinel(s));
        }
        assert!(!is_sentinel("3f2a9c0d1e4b5a67"));
        assert!(!is_sentinel(""));
    }

    #[test]
    fn test_identical_records_match() {
        let a = sample_record();
        assert_eq!(a.matching_key_fields(&a), 6);
        assert_eq!(a.similarity(&a), 1.0);
        assert!(a.is_same_device(&a));
    }

    #[test]
    fn test_verification_threshold_boundaries() {
        let base = sample_record();

        // 5/6 = 0.833
        let one_off = with_changed_key_fields(&base, 1);
        assert_eq!(base.matching_key_fields(&one_off), 5);
        assert!(base.is_same_device(&one_off));

        // 4/6 = 0.667 is below 0.8
        let two_off = with_changed_key_fields(&base, 2);
        assert_eq!(base.matching_key_fields(&two_off), 4);
        assert!(!base.is_same_device(&two_off));

        // 3/6 = 0.5
        let three_off = with_changed_key_fields(&base, 3);
        assert_eq!(base.matching_key_fields(&three_off), 3);
        assert!(!base.is_same_device(&three_off));
    }

    #[test]
    fn test_non_key_fields_ignored() {
        let base = sample_record();
        let mut other = base.clone();
        other.audio_fingerprint = AUDIO_ERROR.into();
        other.languages.clear();
        other.timestamp = "2030-01-01T00:00:00.000Z".into();
        assert_eq!(base.similarity(&other), 1.0);
    }

    #[test]
    fn test_camel_case_json() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert!(json.get("screenResolution").is_some());
        assert!(json.get("canvasFingerprint").is_some());
        assert!(json.get("persistentId").is_some());
        assert!(json.get("screen_resolution").is_none());
    }

    #[test]
    fn test_partial_json_loads() {
        let record: FingerprintRecord =
            serde_json::from_str(r#"{"userAgent":"UA","timezone":"UTC"}"#).unwrap();
        assert_eq!(record.user_agent, "UA");
        assert_eq!(record.hardware_concurrency, 0);
        assert_eq!(record.device_memory, None);
    }

    #[test]
    fn test_null_and_mistyped_fields_load() {
        let record: FingerprintRecord = serde_json::from_str(
            r#"{"userAgent":"UA","languages":null,"hardwareConcurrency":null,"deviceMemory":"8","persistentId":7}"#,
        )
        .unwrap();
        assert_eq!(record.user_agent, "UA");
        assert!(record.languages.is_empty());
        assert_eq!(record.hardware_concurrency, 0);
        assert_eq!(record.device_memory, None);
        assert_eq!(record.persistent_id, "");
    }
}
