//! Identity WASM Integration Tests
//!
//! Run with: wasm-pack test --headless --chrome
//! (or --firefox, --safari)

#![cfg(target_arch = "wasm32")]

use hunter_identity::fingerprint::{self, is_sentinel};
use hunter_identity::{
    BrowserFingerprinter, FingerprintSource, HunterIdentity, KeyValueStore, LocalStorage,
    StorageKeys,
};
use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn options(prefix: &str) -> JsValue {
    let obj = Object::new();
    Reflect::set(&obj, &"keyPrefix".into(), &prefix.into()).unwrap();
    Reflect::set(&obj, &"remoteSync".into(), &false.into()).unwrap();
    obj.into()
}

fn is_lower_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

// ===== Collector Tests =====

#[wasm_bindgen_test]
fn navigator_attributes_populated() {
    let nav = fingerprint::navigator::collect();
    assert!(!nav.user_agent.is_empty());
    assert!(!nav.timezone.is_empty());
    assert!(nav.screen_resolution.contains('x'));
}

#[wasm_bindgen_test]
fn canvas_digest_is_stable() {
    let a = fingerprint::canvas::collect();
    let b = fingerprint::canvas::collect();
    assert_eq!(a, b, "Same browser should render the same canvas");
    assert!(is_sentinel(&a) || is_lower_hex(&a, 16));
}

#[wasm_bindgen_test]
fn webgl_digest_or_sentinel() {
    let digest = fingerprint::webgl::collect();
    assert!(is_sentinel(&digest) || is_lower_hex(&digest, 16));
}

#[wasm_bindgen_test]
async fn audio_digest_or_sentinel() {
    let digest = fingerprint::audio::collect().await;
    assert!(is_sentinel(&digest) || is_lower_hex(&digest, 16));
}

// ===== Storage Tests =====

#[wasm_bindgen_test]
fn local_storage_round_trip() {
    let store = LocalStorage::open().expect("localStorage available in test browser");
    store.set("hunter_test_key", "value").unwrap();
    assert_eq!(store.get("hunter_test_key").unwrap().as_deref(), Some("value"));
    store.remove("hunter_test_key").unwrap();
    assert_eq!(store.get("hunter_test_key").unwrap(), None);
}

#[wasm_bindgen_test]
async fn persistent_id_reused_across_collections() {
    let store = LocalStorage::open().unwrap();
    let keys = StorageKeys::with_prefix("hunter_test_pid_");
    store.remove(&keys.persistent_id).unwrap();

    let source = BrowserFingerprinter::new();
    let first = source.collect(&store, &keys.persistent_id).await;
    let second = source.collect(&store, &keys.persistent_id).await;
    assert_eq!(first.persistent_id, second.persistent_id);
    assert!(first.is_same_device(&second));

    store.remove(&keys.persistent_id).unwrap();
}

// ===== HunterIdentity Tests =====

#[wasm_bindgen_test]
async fn identity_flow() {
    let identity = HunterIdentity::new(options("hunter_test_flow_"), JsValue::UNDEFINED).unwrap();
    identity.clear_user_data();

    let id = identity.get_current_user_id().await;
    assert!(is_lower_hex(&id, 64));
    assert_eq!(identity.get_current_user_id().await, id);
    assert!(identity.get_display_name().await.starts_with("ハンター"));
    assert!(identity.verify_fingerprint().await);

    identity.increment_game_count().await;
    let stats = identity.get_user_stats().unwrap();
    let games = Reflect::get(&stats, &"totalGamesPlayed".into()).unwrap();
    assert_eq!(games.as_f64(), Some(1.0));

    // A second handle on the same keys loads instead of creating
    let reloaded = HunterIdentity::new(options("hunter_test_flow_"), JsValue::UNDEFINED).unwrap();
    assert_eq!(reloaded.get_current_user_id().await, id);

    identity.clear_user_data();
    assert!(identity.get_user_stats().unwrap().is_null());
}

#[wasm_bindgen_test]
async fn link_account_validation() {
    let identity = HunterIdentity::new(options("hunter_test_link_"), JsValue::UNDEFINED).unwrap();
    identity.clear_user_data();

    let err = identity
        .link_account("<b>".into(), "/a.png".into(), None, None)
        .await
        .unwrap_err();
    let code = Reflect::get(&err, &"code".into()).unwrap();
    assert_eq!(code.as_f64(), Some(400.0));
    assert!(!identity.is_linked().await);

    identity
        .link_account("Yacchin".into(), "/a.png".into(), Some("@yacchin".into()), None)
        .await
        .unwrap();
    assert!(identity.is_linked().await);
    assert_eq!(identity.get_display_name().await, "Yacchin");
    assert_eq!(
        identity.get_linked_profile_image_url().await.as_deref(),
        Some("/a.png")
    );

    identity.unlink_account().await;
    assert!(!identity.is_linked().await);

    identity.clear_user_data();
}

#[wasm_bindgen_test]
fn malformed_profile_client_rejected() {
    let obj = Object::new();
    let opts = Object::new();
    Reflect::set(&opts, &"keyPrefix".into(), &"hunter_test_client_".into()).unwrap();
    assert!(HunterIdentity::new(opts.into(), obj.into()).is_err());
}
