//! Browser fingerprinting
//!
//! Combines several entropy sources into a `FingerprintRecord`, reduces it
//! to a stable user id, and grades how much entropy it captured.
//!
//! ```text
//! navigator/screen ─┐
//! canvas ───────────┤
//! webgl ────────────┼─▶ FingerprintRecord ─▶ compute_user_id (SHA-256)
//! audio ────────────┤                     └─▶ score_quality (0..=100)
//! persistent id ────┘
//! ```
//!
//! Fingerprinting is heuristic and spoofable. The id is an anonymous
//! correlation key, never a credential.

pub mod audio;
pub mod canvas;
pub mod collector;
pub mod digest;
pub mod navigator;
pub mod persistent_id;
pub mod quality;
pub mod record;
pub mod webgl;

pub use collector::{BrowserFingerprinter, FingerprintSource};
pub use digest::{compute_user_id, short_hash};
pub use quality::score_quality;
pub use record::{is_sentinel, FingerprintRecord, VERIFY_THRESHOLD};
