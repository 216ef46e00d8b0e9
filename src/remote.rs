//! Remote profile store seam
//!
//! The identity module only needs three calls from the hosted profile API
//! (`getProfile`, `createProfile`, `updateProfile`) and only the linked-account
//! fields of a profile. `JsProfileStore` adapts any JS object exposing those
//! promise-returning methods, typically a thin wrapper around the generated
//! GraphQL client.

use crate::error::{IdentityError, Result};
use crate::serde_helpers::or_default;
use async_trait::async_trait;
use js_sys::{Array, Function, Promise, Reflect};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// Linked-account attributes mirrored to the remote store.
///
/// Absent values are sent as `null` so an unlink clears them remotely.
/// Every field is nullable in the remote schema; `null` reads as unlinked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileFields {
    #[serde(deserialize_with = "or_default")]
    pub is_linked: bool,
    #[serde(deserialize_with = "or_default")]
    pub linked_display_name: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub linked_profile_image_url: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub linked_account_username: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub linked_account_id: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub linked_at: Option<String>,
}

/// A remote profile record keyed by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProfile {
    pub id: String,
    #[serde(flatten)]
    pub fields: ProfileFields,
}

/// Remote profile persistence.
#[async_trait(?Send)]
pub trait ProfileStore {
    /// `Ok(None)` when no profile exists for `id`.
    async fn get_profile(&self, id: &str) -> Result<Option<RemoteProfile>>;
    async fn create_profile(&self, profile: &RemoteProfile) -> Result<()>;
    async fn update_profile(&self, id: &str, fields: &ProfileFields) -> Result<()>;

    /// Disabled stores are skipped entirely by reconciliation.
    fn is_enabled(&self) -> bool {
        true
    }
}

#[async_trait(?Send)]
impl<T: ProfileStore + ?Sized> ProfileStore for Box<T> {
    async fn get_profile(&self, id: &str) -> Result<Option<RemoteProfile>> {
        (**self).get_profile(id).await
    }

    async fn create_profile(&self, profile: &RemoteProfile) -> Result<()> {
        (**self).create_profile(profile).await
    }

    async fn update_profile(&self, id: &str, fields: &ProfileFields) -> Result<()> {
        (**self).update_profile(id, fields).await
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

/// Store used when remote sync is off or no client was supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProfileStore;

#[async_trait(?Send)]
impl ProfileStore for NoopProfileStore {
    async fn get_profile(&self, _id: &str) -> Result<Option<RemoteProfile>> {
        Ok(None)
    }

    async fn create_profile(&self, _profile: &RemoteProfile) -> Result<()> {
        Ok(())
    }

    async fn update_profile(&self, _id: &str, _fields: &ProfileFields) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Adapter over a JS object with `getProfile(id)`, `createProfile(profile)`
/// and `updateProfile(id, fields)` methods returning promises (plain values
/// are accepted too).
pub struct JsProfileStore {
    client: JsValue,
}

impl JsProfileStore {
    /// Wrap `client`, checking that it exposes the three methods.
    pub fn new(client: JsValue) -> Result<Self> {
        for method in ["getProfile", "createProfile", "updateProfile"] {
            let f = Reflect::get(&client, &JsValue::from_str(method))
                .map_err(|e| IdentityError::remote(method, &e))?;
            if !f.is_function() {
                return Err(IdentityError::Remote(format!(
                    "profile client has no {} method",
                    method
                )));
            }
        }
        Ok(Self { client })
    }

    async fn call(&self, method: &str, args: &Array) -> Result<JsValue> {
        let f: Function = Reflect::get(&self.client, &JsValue::from_str(method))
            .map_err(|e| IdentityError::remote(method, &e))?
            .dyn_into()
            .map_err(|_| IdentityError::Remote(format!("{} is not a function", method)))?;

        let result = Reflect::apply(&f, &self.client, args)
            .map_err(|e| IdentityError::remote(method, &e))?;

        match result.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .map_err(|e| IdentityError::remote(method, &e)),
            Err(value) => Ok(value),
        }
    }
}

/// Serialize with `None` as `null` rather than `undefined`.
pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| IdentityError::Serialization(e.to_string()))
}

#[async_trait(?Send)]
impl ProfileStore for JsProfileStore {
    async fn get_profile(&self, id: &str) -> Result<Option<RemoteProfile>> {
        let value = self
            .call("getProfile", &Array::of1(&JsValue::from_str(id)))
            .await?;
        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(value)
            .map(Some)
            .map_err(|e| IdentityError::Serialization(e.to_string()))
    }

    async fn create_profile(&self, profile: &RemoteProfile) -> Result<()> {
        self.call("createProfile", &Array::of1(&to_js(profile)?))
            .await
            .map(|_| ())
    }

    async fn update_profile(&self, id: &str, fields: &ProfileFields) -> Result<()> {
        self.call(
            "updateProfile",
            &Array::of2(&JsValue::from_str(id), &to_js(fields)?),
        )
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlinked_fields_serialize_as_null() {
        let json = serde_json::to_value(ProfileFields::default()).unwrap();
        assert_eq!(json["isLinked"], false);
        assert!(json["linkedDisplayName"].is_null());
        assert!(json.as_object().unwrap().contains_key("linkedAt"));
    }

    #[test]
    fn test_remote_profile_is_flat() {
        let profile = RemoteProfile {
            id: "abc".into(),
            fields: ProfileFields {
                is_linked: true,
                linked_display_name: Some("Yacchin".into()),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["linkedDisplayName"], "Yacchin");

        let back: RemoteProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_remote_profile_tolerates_extra_fields() {
        let json = r#"{"id":"abc","bestScore":120,"isLinked":false,"__typename":"UserProfile"}"#;
        let profile: RemoteProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id, "abc");
        assert!(!profile.fields.is_linked);
    }

    #[test]
    fn test_null_link_state_reads_as_unlinked() {
        let json = r#"{"id":"abc","isLinked":null,"linkedDisplayName":null,"linkedAt":null}"#;
        let profile: RemoteProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id, "abc");
        assert_eq!(profile.fields, ProfileFields::default());
    }

    #[test]
    fn test_noop_store_is_disabled() {
        let store = NoopProfileStore;
        assert!(!store.is_enabled());
        let profile = futures::executor::block_on(store.get_profile("abc")).unwrap();
        assert!(profile.is_none());
    }
}
