//! Persisted anonymous identity record.

use crate::alias;
use crate::fingerprint::{compute_user_id, score_quality, FingerprintRecord};
use crate::remote::{ProfileFields, RemoteProfile};
use crate::serde_helpers::{self, or_default};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A validated external account to attach to an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedAccount {
    pub display_name: String,
    pub profile_image_url: String,
    pub username: Option<String>,
    pub account_id: Option<String>,
}

/// The durable anonymous identity, stored as one JSON blob.
///
/// `user_id` and `hunter_name` are private: the id never changes after
/// creation and the name is derived from it. Link fields are private too;
/// they only move through [`UserIdentity::link`] and
/// [`UserIdentity::unlink`], which keep `isLinked == false` ⇒ no linked
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    user_id: String,
    #[serde(deserialize_with = "or_default")]
    pub fingerprint: FingerprintRecord,
    pub created_at: String,
    #[serde(default, deserialize_with = "or_default")]
    pub last_active_at: String,
    #[serde(default, deserialize_with = "serde_helpers::quality")]
    pub fingerprint_quality: u8,
    #[serde(
        default = "default_session_count",
        deserialize_with = "serde_helpers::session_count"
    )]
    pub session_count: u32,
    #[serde(default, deserialize_with = "or_default")]
    pub total_games_played: u32,
    #[serde(default, deserialize_with = "or_default")]
    hunter_name: String,

    #[serde(default, deserialize_with = "or_default")]
    is_linked: bool,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    linked_display_name: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    linked_profile_image_url: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    linked_account_username: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    linked_account_id: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    linked_at: Option<String>,

    // Free-text name from older releases; dropped by `migrate`.
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    username_updated_at: Option<String>,
}

fn default_session_count() -> u32 {
    1
}

fn missing_required_field(value: &Value) -> Option<&'static str> {
    let non_empty = |key: &str| value.get(key).and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    if !non_empty("userId") {
        return Some("userId");
    }
    if matches!(value.get("fingerprint"), None | Some(Value::Null)) {
        return Some("fingerprint");
    }
    if !non_empty("createdAt") {
        return Some("createdAt");
    }
    None
}

impl UserIdentity {
    /// Build a brand-new identity from a freshly collected fingerprint.
    pub fn create(fingerprint: FingerprintRecord, now: &str) -> Self {
        let user_id = compute_user_id(&fingerprint);
        let fingerprint_quality = score_quality(&fingerprint);
        let hunter_name = alias::hunter_name(&user_id);

        Self {
            user_id,
            fingerprint,
            created_at: now.to_string(),
            last_active_at: now.to_string(),
            fingerprint_quality,
            session_count: 1,
            total_games_played: 0,
            hunter_name,
            is_linked: false,
            linked_display_name: None,
            linked_profile_image_url: None,
            linked_account_username: None,
            linked_account_id: None,
            linked_at: None,
            username: None,
            username_updated_at: None,
        }
    }

    /// Parse a stored blob. `None` when the JSON is unreadable or a
    /// required field (`userId`, `fingerprint`, `createdAt`) is missing or
    /// empty. Every other field falls back to its default when `null` or
    /// mistyped, so a loaded record keeps its `userId`.
    pub fn from_json(json: &str) -> Option<Self> {
        let value: Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("⚠️ Invalid user profile found, will create new one: {}", e);
                return None;
            }
        };
        if let Some(field) = missing_required_field(&value) {
            log::warn!("⚠️ Stored user profile has no {}, will create new one", field);
            return None;
        }
        match serde_json::from_value(value) {
            Ok(identity) => Some(identity),
            Err(e) => {
                log::warn!("⚠️ Unreadable user profile, will create new one: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn hunter_name(&self) -> &str {
        &self.hunter_name
    }

    pub fn is_linked(&self) -> bool {
        self.is_linked
    }

    pub fn linked_display_name(&self) -> Option<&str> {
        self.linked_display_name.as_deref()
    }

    pub fn linked_profile_image_url(&self) -> Option<&str> {
        self.linked_profile_image_url.as_deref()
    }

    pub fn linked_account_username(&self) -> Option<&str> {
        self.linked_account_username.as_deref()
    }

    pub fn linked_account_id(&self) -> Option<&str> {
        self.linked_account_id.as_deref()
    }

    pub fn linked_at(&self) -> Option<&str> {
        self.linked_at.as_deref()
    }

    /// Linked display name when linked, otherwise the hunter name.
    pub fn display_name(&self) -> &str {
        match (self.is_linked, self.linked_display_name.as_deref()) {
            (true, Some(name)) => name,
            _ => &self.hunter_name,
        }
    }

    /// Record the start of another session.
    pub fn touch(&mut self, now: &str) {
        self.last_active_at = now.to_string();
        self.session_count = self.session_count.saturating_add(1);
    }

    pub fn record_game(&mut self) {
        self.total_games_played = self.total_games_played.saturating_add(1);
    }

    pub fn link(&mut self, account: LinkedAccount, now: &str) {
        self.is_linked = true;
        self.linked_display_name = Some(account.display_name);
        self.linked_profile_image_url = Some(account.profile_image_url);
        self.linked_account_username = account.username;
        self.linked_account_id = account.account_id;
        self.linked_at = Some(now.to_string());
    }

    pub fn unlink(&mut self) {
        self.is_linked = false;
        self.linked_display_name = None;
        self.linked_profile_image_url = None;
        self.linked_account_username = None;
        self.linked_account_id = None;
        self.linked_at = None;
    }

    /// Normalize a loaded record. Returns whether anything changed.
    ///
    /// - `hunterName` not equal to the alias of `userId` is regenerated
    /// - legacy `username`/`usernameUpdatedAt` are dropped
    /// - a link missing its display name, or linked fields left behind on
    ///   an unlinked record, are cleared
    ///
    /// `userId` is never touched. Running it twice is the same as once.
    pub fn migrate(&mut self) -> bool {
        let mut changed = false;

        if !alias::is_alias_for(&self.user_id, &self.hunter_name) {
            let name = alias::hunter_name(&self.user_id);
            log::info!("🔄 Migrating hunter name {:?} -> {}", self.hunter_name, name);
            self.hunter_name = name;
            changed = true;
        }

        if self.username.is_some() || self.username_updated_at.is_some() {
            self.username = None;
            self.username_updated_at = None;
            changed = true;
        }

        let has_link_fields = self.linked_display_name.is_some()
            || self.linked_profile_image_url.is_some()
            || self.linked_account_username.is_some()
            || self.linked_account_id.is_some()
            || self.linked_at.is_some();
        let broken_link = self.is_linked && self.linked_display_name.is_none();
        if broken_link || (!self.is_linked && has_link_fields) {
            self.unlink();
            changed = true;
        }

        changed
    }

    /// Linked-account fields in remote-store form.
    pub fn profile_fields(&self) -> ProfileFields {
        ProfileFields {
            is_linked: self.is_linked,
            linked_display_name: self.linked_display_name.clone(),
            linked_profile_image_url: self.linked_profile_image_url.clone(),
            linked_account_username: self.linked_account_username.clone(),
            linked_account_id: self.linked_account_id.clone(),
            linked_at: self.linked_at.clone(),
        }
    }

    pub fn remote_profile(&self) -> RemoteProfile {
        RemoteProfile {
            id: self.user_id.clone(),
            fields: self.profile_fields(),
        }
    }
}

/// Counters exposed to the app for stats screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_id: String,
    pub created_at: String,
    pub last_active_at: String,
    pub session_count: u32,
    pub total_games_played: u32,
    pub fingerprint_quality: u8,
}

impl From<&UserIdentity> for UserStats {
    fn from(identity: &UserIdentity) -> Self {
        UserStats {
            user_id: identity.user_id.clone(),
            created_at: identity.created_at.clone(),
            last_active_at: identity.last_active_at.clone(),
            session_count: identity.session_count,
            total_games_played: identity.total_games_played,
            fingerprint_quality: identity.fingerprint_quality,
        }
    }
}
