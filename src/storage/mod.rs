// Storage module for identity persistence
//
// Provides a small synchronous key-value seam over:
// - Browser localStorage (production)
// - An in-memory map (tests, or when localStorage is unavailable)

mod local;
mod memory;

pub use local::LocalStorage;
pub use memory::MemoryStore;

use crate::config::DEFAULT_KEY_PREFIX;
use crate::error::Result;

/// String key-value persistence.
///
/// Calls are synchronous, matching `window.localStorage`. Implementations
/// report failures as `IdentityError::Persistence`; callers decide whether
/// to absorb them.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Fully qualified storage keys owned by the identity module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// JSON-serialized `UserIdentity`.
    pub user_profile: String,
    /// Plain copy of the user id, for code that only needs the id.
    pub user_id: String,
    /// UUID used by the persistent-id collector.
    pub persistent_id: String,
    /// Written by older releases; only removed, never read.
    pub legacy_session_count: String,
    /// Written by older releases; only removed, never read.
    pub legacy_last_fingerprint: String,
}

impl StorageKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            user_profile: format!("{}user_profile", prefix),
            user_id: format!("{}user_id", prefix),
            persistent_id: format!("{}persistent_id", prefix),
            legacy_session_count: format!("{}session_count", prefix),
            legacy_last_fingerprint: format!("{}last_fingerprint", prefix),
        }
    }

    /// Every key erased by an explicit data clear.
    pub fn all(&self) -> [&str; 5] {
        [
            &self.user_profile,
            &self.user_id,
            &self.persistent_id,
            &self.legacy_session_count,
            &self.legacy_last_fingerprint,
        ]
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let keys = StorageKeys::default();
        assert_eq!(keys.user_profile, "hunterhub_user_profile");
        assert_eq!(keys.user_id, "hunterhub_user_id");
        assert_eq!(keys.persistent_id, "hunterhub_persistent_id");
    }

    #[test]
    fn test_all_keys_are_distinct() {
        let keys = StorageKeys::with_prefix("test_");
        let all = keys.all();
        for (i, a) in all.iter().enumerate() {
            assert!(a.starts_with("test_"));
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_boxed_store_delegates() {
        let store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
