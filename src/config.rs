//! Identity module configuration.
//!
//! Parsed from an optional JS options object; every field has a default so
//! `new HunterIdentity()` works with no arguments.

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

/// Default prefix for every local-storage key owned by this module.
pub const DEFAULT_KEY_PREFIX: &str = "hunterhub_";

/// Configuration for the identity manager and its JS wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityConfig {
    /// Prefix prepended to every persisted key.
    pub key_prefix: String,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    /// Whether linkage state is pushed to the remote profile store.
    pub remote_sync: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            log_level: "info".to_string(),
            remote_sync: true,
        }
    }
}

impl IdentityConfig {
    /// Read options from JS, falling back to defaults on `undefined`,
    /// `null` or a malformed object.
    pub fn from_js(options: &JsValue) -> Self {
        if options.is_undefined() || options.is_null() {
            return Self::default();
        }
        serde_wasm_bindgen::from_value(options.clone()).unwrap_or_else(|e| {
            log::warn!("⚠️ Ignoring malformed identity options: {}", e);
            Self::default()
        })
    }

    /// Parsed log level; unknown names fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
