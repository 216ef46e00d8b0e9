//! Persisted random UUID collector.
//!
//! The only collector with a storage side effect, and the only one stable
//! indefinitely (until storage is cleared).

use crate::storage::KeyValueStore;
use rand::Rng;
use uuid::Builder;

/// Random version-4 UUID, hyphenated lowercase. Not cryptographically
/// meaningful; it only needs to be unlikely to collide between browsers.
pub fn generate_uuid_v4<R: Rng + ?Sized>(rng: &mut R) -> String {
    Builder::from_random_bytes(rng.gen()).into_uuid().to_string()
}

/// Read the stored id, creating and persisting one if absent.
///
/// Storage failures are logged; a freshly generated id is still returned
/// so assembly never fails.
pub fn load_or_create(store: &dyn KeyValueStore, key: &str) -> String {
    match store.get(key) {
        Ok(Some(id)) if !id.is_empty() => return id,
        Ok(_) => {}
        Err(e) => log::warn!("⚠️ Failed to read persistent id: {}", e),
    }

    let id = generate_uuid_v4(&mut rand::thread_rng());
    if let Err(e) = store.set(key, &id) {
        log::warn!("⚠️ Failed to persist new persistent id: {}", e);
    }
    log::debug!("Generated persistent id {}...", &id[..8]);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::{Uuid, Variant, Version};

    #[test]
    fn test_uuid_is_v4() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let id = generate_uuid_v4(&mut rng);
            assert_eq!(id.len(), 36);
            assert_eq!(id, id.to_lowercase());
            let parsed = Uuid::parse_str(&id).unwrap();
            assert_eq!(parsed.get_version(), Some(Version::Random));
            assert_eq!(parsed.get_variant(), Variant::RFC4122);
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a = generate_uuid_v4(&mut StdRng::seed_from_u64(42));
        let b = generate_uuid_v4(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_ne!(a, generate_uuid_v4(&mut StdRng::seed_from_u64(43)));
    }

    #[test]
    fn test_load_or_create_is_stable() {
        let store = MemoryStore::new();
        let first = load_or_create(&store, "pid");
        let second = load_or_create(&store, "pid");
        assert_eq!(first, second);
        assert_eq!(store.get("pid").unwrap(), Some(first));
    }

    #[test]
    fn test_existing_id_is_kept() {
        let store = MemoryStore::new();
        store.set("pid", "legacy-id").unwrap();
        assert_eq!(load_or_create(&store, "pid"), "legacy-id");
    }
}
