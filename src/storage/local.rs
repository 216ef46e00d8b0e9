// window.localStorage backed key-value store
use super::KeyValueStore;
use crate::error::{IdentityError, Result};
use web_sys::Storage;

/// Browser `localStorage` wrapper.
///
/// Writes are last-write-wins across tabs; no cross-tab coordination.
#[derive(Clone)]
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Open the origin's localStorage.
    ///
    /// Fails when there is no window (workers) or storage is disabled
    /// (privacy modes, sandboxed iframes).
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| IdentityError::Persistence("No window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|_| IdentityError::Persistence("localStorage not available".into()))?
            .ok_or_else(|| IdentityError::Persistence("localStorage is null".into()))?;

        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| IdentityError::Persistence(format!("Failed to read {}: {:?}", key, e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        log::debug!("Storing {} bytes under {}", value.len(), key);
        self.storage
            .set_item(key, value)
            .map_err(|e| IdentityError::Persistence(format!("Failed to write {}: {:?}", key, e)))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| IdentityError::Persistence(format!("Failed to remove {}: {:?}", key, e)))
    }
}
