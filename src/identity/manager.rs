//! Identity manager: the single owner and writer of `UserIdentity`.
//!
//! ```text
//! Uninitialized ──load ok──▶ Loaded
//!       │
//!       └──no valid record──▶ Created
//!
//! link sub-state (orthogonal):  Unlinked ⇄ Linked
//! ```
//!
//! Every mutation goes through [`IdentityManager::mutate`], which persists
//! the result. No `RefCell` borrow is held across an `.await`, so the
//! manager can be shared through an `Rc` with spawned tasks.

use super::profile::{UserIdentity, UserStats};
use super::validation;
use crate::error::Result;
use crate::fingerprint::{score_quality, FingerprintRecord, FingerprintSource, VERIFY_THRESHOLD};
use crate::remote::ProfileStore;
use crate::storage::{KeyValueStore, StorageKeys};
use crate::time::now_iso8601;
use serde::Serialize;
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Default)]
enum SessionState {
    #[default]
    Uninitialized,
    Loaded(UserIdentity),
    Created(UserIdentity),
}

impl SessionState {
    fn identity(&self) -> Option<&UserIdentity> {
        match self {
            SessionState::Uninitialized => None,
            SessionState::Loaded(u) | SessionState::Created(u) => Some(u),
        }
    }

    fn identity_mut(&mut self) -> Option<&mut UserIdentity> {
        match self {
            SessionState::Uninitialized => None,
            SessionState::Loaded(u) | SessionState::Created(u) => Some(u),
        }
    }

    fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Uninitialized => SessionPhase::Uninitialized,
            SessionState::Loaded(_) => SessionPhase::Loaded,
            SessionState::Created(_) => SessionPhase::Created,
        }
    }
}

/// Where the in-memory identity came from in this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Uninitialized,
    /// Read from storage.
    Loaded,
    /// Freshly fingerprinted.
    Created,
}

/// Result of pushing local link state to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum ReconcileOutcome {
    /// Remote sync disabled or no identity yet.
    Skipped,
    Created,
    Updated,
    InSync,
    /// Logged and absorbed; local state is unaffected.
    Failed(String),
}

/// Diagnostic snapshot for support/debug screens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub phase: SessionPhase,
    pub current_user: Option<UserIdentity>,
    pub current_fingerprint: FingerprintRecord,
    pub fingerprint_quality: u8,
    pub similarity: Option<f64>,
    pub storage_keys: Vec<String>,
    pub stored_profile: Option<String>,
    pub stored_user_id: Option<String>,
}

/// Anonymous identity service.
///
/// Constructed explicitly with its collaborators; hold one per tab.
pub struct IdentityManager<S, R, F> {
    keys: StorageKeys,
    store: S,
    remote: R,
    source: F,
    state: RefCell<SessionState>,
    /// Bumped by every clear.
    generation: Cell<u64>,
}

impl<S, R, F> IdentityManager<S, R, F>
where
    S: KeyValueStore,
    R: ProfileStore,
    F: FingerprintSource,
{
    pub fn new(store: S, remote: R, source: F, keys: StorageKeys) -> Self {
        Self {
            keys,
            store,
            remote,
            source,
            state: RefCell::new(SessionState::Uninitialized),
            generation: Cell::new(0),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase()
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    fn snapshot(&self) -> Option<UserIdentity> {
        self.state.borrow().identity().cloned()
    }

    /// Apply `f` to the in-memory identity and persist the result.
    /// `None` when no identity is initialized.
    fn mutate(&self, f: impl FnOnce(&mut UserIdentity)) -> Option<UserIdentity> {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            let identity = state.identity_mut()?;
            f(identity);
            identity.clone()
        };
        self.persist(&snapshot);
        Some(snapshot)
    }

    fn persist(&self, identity: &UserIdentity) {
        let json = match identity.to_json() {
            Ok(json) => json,
            Err(e) => {
                log::error!("❌ Error serializing user profile: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(&self.keys.user_profile, &json) {
            log::error!("❌ Error saving user profile: {}", e);
            return;
        }
        if let Err(e) = self.store.set(&self.keys.user_id, identity.user_id()) {
            log::warn!("⚠️ Failed to save user id: {}", e);
        }
        log::debug!("💾 User profile saved");
    }

    fn load_persisted(&self) -> Option<UserIdentity> {
        match self.store.get(&self.keys.user_profile) {
            Ok(Some(json)) => UserIdentity::from_json(&json),
            Ok(None) => None,
            Err(e) => {
                log::error!("❌ Error loading user profile: {}", e);
                None
            }
        }
    }

    /// Resolve the session identity, loading or creating it on first use.
    async fn ensure_identity(&self) -> UserIdentity {
        loop {
            if let Some(identity) = self.snapshot() {
                return identity;
            }

            if let Some(mut identity) = self.load_persisted() {
                identity.migrate();
                identity.touch(&now_iso8601());
                self.persist(&identity);
                log::info!(
                    "🔄 Loaded existing user: {}... (Quality: {}%, session #{})",
                    short_id(identity.user_id()),
                    identity.fingerprint_quality,
                    identity.session_count
                );
                *self.state.borrow_mut() = SessionState::Loaded(identity.clone());
                return identity;
            }

            log::info!("🆕 Creating new user profile...");
            let generation = self.generation.get();
            let fingerprint = self
                .source
                .collect(&self.store, &self.keys.persistent_id)
                .await;

            // Another caller may have finished while we were collecting.
            if let Some(identity) = self.snapshot() {
                log::debug!("Identity initialized concurrently, discarding duplicate");
                return identity;
            }

            // A clear landed mid-collection; the record may carry erased data.
            if self.generation.get() != generation {
                log::debug!("User data cleared during collection, collecting again");
                continue;
            }

            let identity = UserIdentity::create(fingerprint, &now_iso8601());
            self.persist(&identity);
            log::info!(
                "✅ New user created: {}... (Quality: {}%)",
                short_id(identity.user_id()),
                identity.fingerprint_quality
            );
            *self.state.borrow_mut() = SessionState::Created(identity.clone());
            return identity;
        }
    }

    /// Stable anonymous user id. Idempotent; never recomputed for an
    /// existing identity.
    pub async fn get_current_user_id(&self) -> String {
        self.ensure_identity().await.user_id().to_string()
    }

    /// Snapshot of the full identity record.
    pub async fn get_current_profile(&self) -> UserIdentity {
        self.ensure_identity().await
    }

    /// Linked display name when linked, otherwise the hunter name.
    pub async fn get_display_name(&self) -> String {
        self.ensure_identity().await.display_name().to_string()
    }

    pub async fn is_linked(&self) -> bool {
        self.ensure_identity().await.is_linked()
    }

    pub async fn get_linked_profile_image_url(&self) -> Option<String> {
        self.ensure_identity()
            .await
            .linked_profile_image_url()
            .map(str::to_string)
    }

    pub async fn get_linked_display_name(&self) -> Option<String> {
        self.ensure_identity()
            .await
            .linked_display_name()
            .map(str::to_string)
    }

    /// Attach an external account. Input is validated before anything is
    /// written; the remote push afterwards is best-effort and never rolls
    /// back the local link.
    pub async fn link_account(
        &self,
        display_name: &str,
        profile_image_url: &str,
        username: Option<&str>,
        account_id: Option<&str>,
    ) -> Result<()> {
        let account =
            validation::linked_account(display_name, profile_image_url, username, account_id)?;

        self.ensure_identity().await;
        let now = now_iso8601();
        if let Some(identity) = self.mutate(|u| u.link(account, &now)) {
            log::info!(
                "🔗 Linked account {:?} to {}...",
                identity.display_name(),
                short_id(identity.user_id())
            );
            self.push_remote(&identity).await;
        }
        Ok(())
    }

    /// Detach the external account locally, then best-effort remotely.
    pub async fn unlink_account(&self) {
        self.ensure_identity().await;
        if let Some(identity) = self.mutate(|u| u.unlink()) {
            log::info!("🔓 Unlinked account from {}...", short_id(identity.user_id()));
            self.push_remote(&identity).await;
        }
    }

    /// Re-collect the fingerprint and compare its key fields with the
    /// stored one. Advisory only: never changes the identity.
    ///
    /// `false` when no identity has been initialized this session.
    pub async fn verify_fingerprint(&self) -> bool {
        let stored = match self.snapshot() {
            Some(identity) => identity.fingerprint,
            None => return false,
        };

        let current = self
            .source
            .collect(&self.store, &self.keys.persistent_id)
            .await;
        let similarity = stored.similarity(&current);
        log::info!(
            "🔍 Fingerprint verification: {:.1}% match",
            similarity * 100.0
        );
        similarity >= VERIFY_THRESHOLD
    }

    pub async fn increment_game_count(&self) {
        self.ensure_identity().await;
        if let Some(identity) = self.mutate(|u| u.record_game()) {
            log::info!("🎮 Game count updated: {}", identity.total_games_played);
        }
    }

    /// Erase every persisted key and forget the in-memory identity.
    pub fn clear_user_data(&self) {
        for key in self.keys.all() {
            if let Err(e) = self.store.remove(key) {
                log::warn!("⚠️ Failed to remove {}: {}", key, e);
            }
        }
        *self.state.borrow_mut() = SessionState::Uninitialized;
        self.generation.set(self.generation.get().wrapping_add(1));
        log::info!("🗑️ User data cleared");
    }

    /// Session counters; `None` before the identity is initialized.
    pub fn get_user_stats(&self) -> Option<UserStats> {
        self.state.borrow().identity().map(UserStats::from)
    }

    /// Current identity plus a freshly collected fingerprint and raw
    /// storage contents.
    pub async fn get_debug_info(&self) -> DebugInfo {
        let current_fingerprint = self
            .source
            .collect(&self.store, &self.keys.persistent_id)
            .await;
        let current_user = self.snapshot();
        let similarity = current_user
            .as_ref()
            .map(|u| u.fingerprint.similarity(&current_fingerprint));

        DebugInfo {
            phase: self.phase(),
            fingerprint_quality: score_quality(&current_fingerprint),
            current_fingerprint,
            current_user,
            similarity,
            storage_keys: self.keys.all().iter().map(|k| k.to_string()).collect(),
            stored_profile: self.store.get(&self.keys.user_profile).ok().flatten(),
            stored_user_id: self.store.get(&self.keys.user_id).ok().flatten(),
        }
    }

    /// Push local link state to the remote store. Local state is
    /// authoritative; failures are logged and reported, never raised.
    pub async fn reconcile_remote(&self) -> ReconcileOutcome {
        match self.snapshot() {
            Some(identity) => self.push_remote(&identity).await,
            None => ReconcileOutcome::Skipped,
        }
    }

    async fn push_remote(&self, identity: &UserIdentity) -> ReconcileOutcome {
        if !self.remote.is_enabled() {
            return ReconcileOutcome::Skipped;
        }

        let fields = identity.profile_fields();
        let outcome = match self.remote.get_profile(identity.user_id()).await {
            Ok(None) => match self.remote.create_profile(&identity.remote_profile()).await {
                Ok(()) => ReconcileOutcome::Created,
                Err(e) => ReconcileOutcome::Failed(e.to_string()),
            },
            Ok(Some(remote)) if remote.fields == fields => ReconcileOutcome::InSync,
            Ok(Some(_)) => match self.remote.update_profile(identity.user_id(), &fields).await {
                Ok(()) => ReconcileOutcome::Updated,
                Err(e) => ReconcileOutcome::Failed(e.to_string()),
            },
            Err(e) => ReconcileOutcome::Failed(e.to_string()),
        };

        match &outcome {
            ReconcileOutcome::Failed(reason) => {
                log::warn!("⚠️ Remote profile sync failed (kept local state): {}", reason)
            }
            other => log::debug!("Remote profile sync: {:?}", other),
        }
        outcome
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
