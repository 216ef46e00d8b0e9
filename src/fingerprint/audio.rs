//! Audio processing graph collector.
//!
//! Builds oscillator → analyser → gain(0) → destination, so nothing is
//! audible, and hashes the first frequency bins. Capture is synchronous and
//! may run before the oscillator produces signal; treat the result as a
//! heuristic entropy source, not a measurement.

use super::digest::short_hash;
use super::record::AUDIO_ERROR;
use crate::error::{IdentityError, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AudioContext, OscillatorType};

/// Number of frequency bins fed into the hash.
pub const SAMPLE_COUNT: usize = 50;
pub const OSCILLATOR_FREQUENCY_HZ: f32 = 10_000.0;

const NAME: &str = "audio";

/// Hash of the leading `SAMPLE_COUNT` bins, comma-joined.
pub fn samples_digest(samples: &[u8]) -> String {
    let joined = samples
        .iter()
        .take(SAMPLE_COUNT)
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(",");
    short_hash(&joined)
}

/// Short hash of analyser output, or `audio-error`.
pub async fn collect() -> String {
    let context = match AudioContext::new() {
        Ok(ctx) => ctx,
        Err(e) => {
            log::warn!("⚠️ Audio fingerprint generation failed: {}", IdentityError::collector(NAME, &e));
            return AUDIO_ERROR.to_string();
        }
    };

    let digest = capture(&context);

    // Release the audio device regardless of capture outcome.
    match context.close() {
        Ok(promise) => {
            if let Err(e) = JsFuture::from(promise).await {
                log::debug!("AudioContext close rejected: {:?}", e);
            }
        }
        Err(e) => log::debug!("AudioContext close threw: {:?}", e),
    }

    match digest {
        Ok(d) => d,
        Err(e) => {
            log::warn!("⚠️ Audio fingerprint generation failed: {}", e);
            AUDIO_ERROR.to_string()
        }
    }
}

fn capture(context: &AudioContext) -> Result<String> {
    let err = |e: JsValue| IdentityError::collector(NAME, &e);

    let oscillator = context.create_oscillator().map_err(err)?;
    let analyser = context.create_analyser().map_err(err)?;
    let gain = context.create_gain().map_err(err)?;
    let now = context.current_time();

    oscillator.set_type(OscillatorType::Triangle);
    oscillator
        .frequency()
        .set_value_at_time(OSCILLATOR_FREQUENCY_HZ, now)
        .map_err(err)?;
    gain.gain().set_value_at_time(0.0, now).map_err(err)?;

    oscillator.connect_with_audio_node(&analyser).map_err(err)?;
    analyser.connect_with_audio_node(&gain).map_err(err)?;
    gain.connect_with_audio_node(&context.destination()).map_err(err)?;

    oscillator.start().map_err(err)?;
    let mut bins = vec![0u8; analyser.frequency_bin_count() as usize];
    analyser.get_byte_frequency_data(&mut bins);
    oscillator.stop().map_err(err)?;

    Ok(samples_digest(&bins))
}
