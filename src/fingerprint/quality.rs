//! Fingerprint quality heuristic.
//!
//! Additive weights per entropy source, capped at 100. Sentinel collector
//! outputs contribute nothing.

use super::record::{is_sentinel, FingerprintRecord};

pub const CANVAS_WEIGHT: u8 = 30;
pub const WEBGL_WEIGHT: u8 = 25;
pub const AUDIO_WEIGHT: u8 = 20;
pub const SCREEN_WEIGHT: u8 = 10;
pub const TIMEZONE_WEIGHT: u8 = 5;
pub const LANGUAGES_WEIGHT: u8 = 5;
pub const HARDWARE_CONCURRENCY_WEIGHT: u8 = 3;
pub const DEVICE_MEMORY_WEIGHT: u8 = 2;

pub const MAX_QUALITY: u8 = 100;

fn hashed(value: &str) -> bool {
    !value.is_empty() && !is_sentinel(value)
}

/// Score a record in `0..=100`.
pub fn score_quality(record: &FingerprintRecord) -> u8 {
    let checks = [
        (hashed(&record.canvas_fingerprint), CANVAS_WEIGHT),
        (hashed(&record.webgl_fingerprint), WEBGL_WEIGHT),
        (hashed(&record.audio_fingerprint), AUDIO_WEIGHT),
        (
            !record.screen_resolution.is_empty() && record.screen_resolution != "0x0",
            SCREEN_WEIGHT,
        ),
        (!record.timezone.is_empty(), TIMEZONE_WEIGHT),
        (!record.languages.is_empty(), LANGUAGES_WEIGHT),
        (record.hardware_concurrency > 0, HARDWARE_CONCURRENCY_WEIGHT),
        (
            record.device_memory.is_some_and(|m| m > 0.0),
            DEVICE_MEMORY_WEIGHT,
        ),
    ];

    let score: u32 = checks
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, weight)| *weight as u32)
        .sum();
    score.min(MAX_QUALITY as u32) as u8
}
