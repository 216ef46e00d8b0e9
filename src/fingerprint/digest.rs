//! SHA-256 based digests for collector outputs and the user id.

use super::record::FingerprintRecord;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Length of a collector's short hash, in hex characters.
pub const SHORT_HASH_LEN: usize = 16;

/// Fields the user id is derived from, in serialization order.
///
/// Audio is left out: analyser output races the oscillator and is too
/// unstable to key an identity on.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserIdFields<'a> {
    user_agent: &'a str,
    timezone: &'a str,
    screen_resolution: &'a str,
    canvas_fingerprint: &'a str,
    webgl_fingerprint: &'a str,
    persistent_id: &'a str,
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// First 16 hex characters of SHA-256 over `input`.
pub fn short_hash(input: &str) -> String {
    let mut digest = sha256_hex(input.as_bytes());
    digest.truncate(SHORT_HASH_LEN);
    digest
}

/// Derive the stable user id (64 lowercase hex chars) from a record.
///
/// The six key fields are serialized as compact JSON in a fixed order and
/// digested. Pure: equal key fields always give the same id.
pub fn compute_user_id(record: &FingerprintRecord) -> String {
    let fields = UserIdFields {
        user_agent: &record.user_agent,
        timezone: &record.timezone,
        screen_resolution: &record.screen_resolution,
        canvas_fingerprint: &record.canvas_fingerprint,
        webgl_fingerprint: &record.webgl_fingerprint,
        persistent_id: &record.persistent_id,
    };
    match serde_json::to_vec(&fields) {
        Ok(bytes) => sha256_hex(&bytes),
        Err(e) => {
            // Serializing borrowed strings cannot fail in practice.
            log::warn!("⚠️ Key field serialization failed, digesting raw fields: {}", e);
            sha256_hex(record.key_fields().join("\u{1f}").as_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::record::sample_record;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_short_hash() {
        let h = short_hash("abc");
        assert_eq!(h, "ba7816bf8f01cfea");
        assert_eq!(h.len(), SHORT_HASH_LEN);
    }

    #[test]
    fn test_user_id_serialization_order() {
        let record = sample_record();
        let expected_json = format!(
            r#"{{"userAgent":"{}","timezone":"{}","screenResolution":"{}","canvasFingerprint":"{}","webglFingerprint":"{}","persistentId":"{}"}}"#,
            record.user_agent,
            record.timezone,
            record.screen_resolution,
            record.canvas_fingerprint,
            record.webgl_fingerprint,
            record.persistent_id,
        );
        assert_eq!(compute_user_id(&record), sha256_hex(expected_json.as_bytes()));
    }

    #[test]
    fn test_user_id_deterministic() {
        let a = sample_record();
        let b = sample_record();
        let id = compute_user_id(&a);
        assert_eq!(id, compute_user_id(&b));
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_user_id_ignores_audio_and_metadata() {
        let base = sample_record();
        let mut other = base.clone();
        other.audio_fingerprint = "ffffffffffffffff".into();
        other.timestamp = "2031-01-01T00:00:00.000Z".into();
        other.hardware_concurrency = 2;
        other.languages = vec!["de".into()];
        assert_eq!(compute_user_id(&base), compute_user_id(&other));
    }

    #[test]
    fn test_user_id_tracks_key_fields() {
        let base = sample_record();
        let mut other = base.clone();
        other.persistent_id = "00000000-0000-4000-8000-000000000000".into();
        assert_ne!(compute_user_id(&base), compute_user_id(&other));

        let mut other = base.clone();
        other.canvas_fingerprint = "0000000000000000".into();
        assert_ne!(compute_user_id(&base), compute_user_id(&other));
    }
}
