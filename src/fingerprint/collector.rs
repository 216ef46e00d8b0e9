//! Fingerprint assembly.

use super::record::FingerprintRecord;
use super::{audio, canvas, navigator, persistent_id, webgl};
use crate::storage::KeyValueStore;
use crate::time::now_iso8601;
use async_trait::async_trait;

/// Produces a complete `FingerprintRecord`.
///
/// Never fails: individual collectors degrade to their sentinel values.
#[async_trait(?Send)]
pub trait FingerprintSource {
    /// Collect one record. `persistent_id_key` names the storage slot of
    /// the persistent-id collector.
    async fn collect(&self, store: &dyn KeyValueStore, persistent_id_key: &str) -> FingerprintRecord;
}

/// Collects from the live browser environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserFingerprinter;

impl BrowserFingerprinter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl FingerprintSource for BrowserFingerprinter {
    async fn collect(&self, store: &dyn KeyValueStore, persistent_id_key: &str) -> FingerprintRecord {
        let nav = navigator::collect();

        let canvas_fingerprint = canvas::collect();
        let webgl_fingerprint = webgl::collect();
        let audio_fingerprint = audio::collect().await;

        let persistent_id = persistent_id::load_or_create(store, persistent_id_key);

        log::debug!(
            "Collected fingerprint: canvas={} webgl={} audio={}",
            canvas_fingerprint,
            webgl_fingerprint,
            audio_fingerprint
        );

        FingerprintRecord {
            user_agent: nav.user_agent,
            language: nav.language,
            languages: nav.languages,
            timezone: nav.timezone,
            screen_resolution: nav.screen_resolution,
            screen_color_depth: nav.screen_color_depth,
            screen_pixel_depth: nav.screen_pixel_depth,
            available_screen_size: nav.available_screen_size,
            platform: nav.platform,
            hardware_concurrency: nav.hardware_concurrency,
            device_memory: nav.device_memory,
            canvas_fingerprint,
            webgl_fingerprint,
            audio_fingerprint,
            persistent_id,
            timestamp: now_iso8601(),
        }
    }
}
