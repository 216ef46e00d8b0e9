//! # HunterHub Identity
//!
//! Anonymous, login-free player identity for HunterHub, compiled to
//! WebAssembly.
//!
//! A first visit fingerprints the browser, hashes the stable attributes
//! into a user id, and persists the resulting profile in `localStorage`.
//! Later visits load that profile instead of re-deriving the id, so the id
//! survives fingerprint drift. Players can optionally link an external
//! account; the linkage is mirrored to a remote profile store on a
//! best-effort basis.
//!
//! ## Architecture
//!
//! ```text
//! HunterIdentity (WASM)
//!   ↓
//! IdentityManager ──▶ ProfileStore (remote, optional)
//!   ↓            ↘
//! KeyValueStore    FingerprintSource
//! (localStorage)   (canvas, webgl, audio, navigator, persistent id)
//! ```
//!
//! Fingerprinting is heuristic and spoofable. The user id is an anonymous
//! correlation key, never a credential.

use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

pub mod alias;
pub mod config;
mod error;
pub mod fingerprint;
pub mod identity;
pub mod remote;
mod serde_helpers;
pub mod storage;
pub mod time;

pub use config::IdentityConfig;
pub use error::{ErrorCode, IdentityError, Result};
pub use fingerprint::{BrowserFingerprinter, FingerprintRecord, FingerprintSource};
pub use identity::{
    DebugInfo, IdentityManager, LinkedAccount, ReconcileOutcome, SessionPhase, UserIdentity,
    UserStats,
};
pub use remote::{JsProfileStore, NoopProfileStore, ProfileFields, ProfileStore, RemoteProfile};
pub use storage::{KeyValueStore, LocalStorage, MemoryStore, StorageKeys};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
    }

    log::info!("HunterHub identity module initialized");
}

type BrowserIdentityManager =
    IdentityManager<Box<dyn KeyValueStore>, Box<dyn ProfileStore>, BrowserFingerprinter>;

/// Browser-facing identity handle.
///
/// Create one per page and share it; every instance reads and writes the
/// same `localStorage` keys.
#[wasm_bindgen]
pub struct HunterIdentity {
    manager: Rc<BrowserIdentityManager>,
    reconcile_scheduled: Cell<bool>,
}

#[wasm_bindgen]
impl HunterIdentity {
    /// Create a new identity handle
    ///
    /// # Arguments
    ///
    /// * `options` - Optional `{ keyPrefix, logLevel, remoteSync }`
    /// * `profile_client` - Optional object with `getProfile`,
    ///   `createProfile` and `updateProfile` methods
    #[wasm_bindgen(constructor)]
    pub fn new(
        options: JsValue,
        profile_client: JsValue,
    ) -> std::result::Result<HunterIdentity, JsValue> {
        let config = IdentityConfig::from_js(&options);
        log::set_max_level(config.level_filter());

        let store: Box<dyn KeyValueStore> = match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("⚠️ {}; identity will not survive this page", e);
                Box::new(MemoryStore::new())
            }
        };

        let remote: Box<dyn ProfileStore> =
            if !config.remote_sync || profile_client.is_undefined() || profile_client.is_null() {
                Box::new(NoopProfileStore)
            } else {
                Box::new(JsProfileStore::new(profile_client)?)
            };

        let manager = IdentityManager::new(
            store,
            remote,
            BrowserFingerprinter::new(),
            StorageKeys::with_prefix(&config.key_prefix),
        );

        log::info!(
            "🆔 Identity handle ready (prefix: {}, remote sync: {})",
            config.key_prefix,
            config.remote_sync
        );

        Ok(HunterIdentity {
            manager: Rc::new(manager),
            reconcile_scheduled: Cell::new(false),
        })
    }

    /// Stable anonymous user id (64 lowercase hex characters).
    ///
    /// The first call of a page also schedules a background sync of link
    /// state to the remote profile store.
    #[wasm_bindgen(js_name = getCurrentUserId)]
    pub async fn get_current_user_id(&self) -> String {
        let id = self.manager.get_current_user_id().await;
        self.schedule_reconcile();
        id
    }

    #[wasm_bindgen(js_name = getCurrentProfile)]
    pub async fn get_current_profile(&self) -> std::result::Result<JsValue, JsValue> {
        let profile = self.manager.get_current_profile().await;
        self.schedule_reconcile();
        to_js(&profile)
    }

    #[wasm_bindgen(js_name = getDisplayName)]
    pub async fn get_display_name(&self) -> String {
        self.manager.get_display_name().await
    }

    #[wasm_bindgen(js_name = isLinked)]
    pub async fn is_linked(&self) -> bool {
        self.manager.is_linked().await
    }

    #[wasm_bindgen(js_name = getLinkedProfileImageUrl)]
    pub async fn get_linked_profile_image_url(&self) -> Option<String> {
        self.manager.get_linked_profile_image_url().await
    }

    #[wasm_bindgen(js_name = getLinkedDisplayName)]
    pub async fn get_linked_display_name(&self) -> Option<String> {
        self.manager.get_linked_display_name().await
    }

    /// Link an external account. Rejects with `{ code, message,
    /// userMessage }` when an argument is invalid; nothing is written in
    /// that case.
    #[wasm_bindgen(js_name = linkAccount)]
    pub async fn link_account(
        &self,
        display_name: String,
        profile_image_url: String,
        username: Option<String>,
        account_id: Option<String>,
    ) -> std::result::Result<(), JsValue> {
        self.manager
            .link_account(
                &display_name,
                &profile_image_url,
                username.as_deref(),
                account_id.as_deref(),
            )
            .await
            .map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = unlinkAccount)]
    pub async fn unlink_account(&self) {
        self.manager.unlink_account().await
    }

    /// Whether the current browser still looks like the device the
    /// identity was created on.
    #[wasm_bindgen(js_name = verifyFingerprint)]
    pub async fn verify_fingerprint(&self) -> bool {
        self.manager.verify_fingerprint().await
    }

    #[wasm_bindgen(js_name = incrementGameCount)]
    pub async fn increment_game_count(&self) {
        self.manager.increment_game_count().await
    }

    #[wasm_bindgen(js_name = clearUserData)]
    pub fn clear_user_data(&self) {
        self.manager.clear_user_data();
        self.reconcile_scheduled.set(false);
    }

    /// Session counters, or `null` before the identity is resolved.
    #[wasm_bindgen(js_name = getUserStats)]
    pub fn get_user_stats(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.manager.get_user_stats())
    }

    #[wasm_bindgen(js_name = getDebugInfo)]
    pub async fn get_debug_info(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.manager.get_debug_info().await)
    }

    /// Push local link state to the remote store now.
    #[wasm_bindgen(js_name = reconcileRemote)]
    pub async fn reconcile_remote(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.manager.reconcile_remote().await)
    }
}

impl HunterIdentity {
    fn schedule_reconcile(&self) {
        if self.reconcile_scheduled.replace(true) {
            return;
        }
        let manager = Rc::clone(&self.manager);
        spawn_local(async move {
            let outcome = manager.reconcile_remote().await;
            log::debug!("Background profile sync finished: {:?}", outcome);
        });
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> std::result::Result<JsValue, JsValue> {
    remote::to_js(value).map_err(JsValue::from)
}
