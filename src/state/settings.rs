//! Settings Store
//!
//! Persists one snapshot per layer under `namespace + layer id`. Every
//! operation fails soft: problems are logged and the caller carries on with
//! defaults (on load) or with its in-memory state (on save).

use chrono::Utc;
use log::{debug, error, info, warn};

use super::snapshot::{self, SettingsSnapshot};
use super::storage::KeyValueStorage;
use crate::error::FlameError;
use crate::layers::LayerId;
use crate::params::ParameterSet;

/// Key prefix used when no namespace is configured
pub const DEFAULT_NAMESPACE: &str = "flameSettings_";

/// Per-layer settings persistence over a key-value storage
pub struct SettingsStore {
    storage: Box<dyn KeyValueStorage>,
    namespace: String,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// Create a store using the default namespace
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self::with_namespace(storage, DEFAULT_NAMESPACE)
    }

    /// Create a store using a custom key prefix
    pub fn with_namespace(storage: Box<dyn KeyValueStorage>, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    /// Key prefix of this store
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Storage key of a layer
    pub fn key_for(&self, id: &LayerId) -> String {
        format!("{}{}", self.namespace, id)
    }

    /// Load the snapshot of a layer.
    ///
    /// Returns `None` when nothing is stored, when the stored record is
    /// corrupt, or when the storage itself fails.
    pub fn load(&self, id: &LayerId) -> Option<SettingsSnapshot> {
        let key = self.key_for(id);

        let raw = match self.storage.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored settings for {}", id);
                return None;
            }
            Err(e) => {
                warn!("Could not read settings for {}: {}", id, e);
                return None;
            }
        };

        match snapshot::decode(&key, &raw) {
            Ok(snapshot) => {
                debug!("Loaded settings for {}", id);
                Some(snapshot)
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                None
            }
        }
    }

    /// Load the parameter set of a layer, or the defaults
    pub fn load_params_or_default(&self, id: &LayerId) -> ParameterSet {
        self.load(id).map(|s| s.params).unwrap_or_default()
    }

    /// Save the snapshot of a layer, replacing any stored one.
    ///
    /// Returns `false` if the write failed. The failure is logged and not
    /// retried; the caller's in-memory state stays authoritative.
    pub fn save(&mut self, id: &LayerId, snapshot: &SettingsSnapshot) -> bool {
        let key = self.key_for(id);

        let result = snapshot::encode(snapshot, Utc::now())
            .and_then(|raw| self.storage.set(&key, &raw));

        match result {
            Ok(()) => {
                debug!("Saved settings for {}", id);
                true
            }
            Err(e) => {
                let failure = FlameError::SettingsWriteFailed {
                    key,
                    reason: e.to_string(),
                };
                error!("{}", failure);
                false
            }
        }
    }

    /// Identities that have a stored snapshot, sorted
    pub fn identities(&self) -> Vec<LayerId> {
        match self.storage.keys() {
            Ok(keys) => {
                let mut ids: Vec<LayerId> = keys
                    .iter()
                    .filter_map(|k| k.strip_prefix(self.namespace.as_str()))
                    .filter(|id| !id.is_empty())
                    .map(LayerId::new)
                    .collect();
                ids.sort();
                ids
            }
            Err(e) => {
                warn!("Could not list stored settings: {}", e);
                Vec::new()
            }
        }
    }

    /// Remove every snapshot in this store's namespace.
    ///
    /// Keys outside the namespace are left alone. Returns how many were
    /// removed.
    pub fn clear_all(&mut self) -> usize {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Could not list stored settings: {}", e);
                return 0;
            }
        };

        let namespace = self.namespace.clone();
        let mut removed = 0;
        for key in keys.iter().filter(|k| k.starts_with(&namespace)) {
            match self.storage.remove(key) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Could not remove {}: {}", key, e),
            }
        }

        info!("Cleared {} stored layer settings", removed);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::BlendMode;
    use crate::params::{ParamName, Rgb};
    use crate::state::storage::MemoryStorage;

    fn store() -> SettingsStore {
        SettingsStore::new(Box::new(MemoryStorage::new()))
    }

    fn id(name: &str) -> LayerId {
        LayerId::new(name)
    }

    #[test]
    fn test_load_missing_is_none() {
        let store = store();
        assert!(store.load(&id("never.png")).is_none());
        assert_eq!(
            store.load_params_or_default(&id("never.png")),
            ParameterSet::new()
        );
    }

    #[test]
    fn test_save_then_load() {
        let mut store = store();
        let mut snapshot = SettingsSnapshot {
            visible: false,
            blend_mode: BlendMode::Multiply,
            ..Default::default()
        };
        snapshot
            .params
            .set(ParamName::Color2, Rgb::from_packed(0x00ff00).into())
            .unwrap();

        assert!(store.save(&id("a.png"), &snapshot));
        assert_eq!(store.load(&id("a.png")), Some(snapshot));
        assert!(store.load(&id("b.png")).is_none());
    }

    #[test]
    fn test_save_overwrites() {
        let mut store = store();
        let mut first = SettingsSnapshot::default();
        first.params.set(ParamName::SwaySpeed, 1.5_f32.into()).unwrap();
        store.save(&id("a.png"), &first);

        let second = SettingsSnapshot::default();
        store.save(&id("a.png"), &second);

        assert_eq!(store.load(&id("a.png")), Some(second));
    }

    #[test]
    fn test_corrupt_record_loads_defaults() {
        let mut storage = MemoryStorage::new();
        storage
            .set("flameSettings_bad.png", "{\"uFlameHeight\": ")
            .unwrap();
        let store = SettingsStore::new(Box::new(storage));

        assert!(store.load(&id("bad.png")).is_none());
        assert_eq!(
            store.load_params_or_default(&id("bad.png")),
            ParameterSet::new()
        );
    }

    #[test]
    fn test_save_failure_is_reported() {
        let mut store = SettingsStore::new(Box::new(MemoryStorage::with_quota(64)));
        assert!(!store.save(&id("a.png"), &SettingsSnapshot::default()));
        assert!(store.load(&id("a.png")).is_none());
    }

    #[test]
    fn test_clear_all_only_touches_namespace() {
        let mut storage = MemoryStorage::new();
        storage.set("unrelated", "keep").unwrap();
        let mut store = SettingsStore::new(Box::new(storage));

        store.save(&id("a.png"), &SettingsSnapshot::default());
        store.save(&id("b.png"), &SettingsSnapshot::default());
        assert_eq!(store.identities(), vec![id("a.png"), id("b.png")]);

        assert_eq!(store.clear_all(), 2);
        assert!(store.identities().is_empty());
        assert!(store.load(&id("a.png")).is_none());
        assert_eq!(store.storage.keys().unwrap(), vec!["unrelated"]);
    }

    #[test]
    fn test_custom_namespace() {
        let store = SettingsStore::with_namespace(Box::new(MemoryStorage::new()), "fx:");
        assert_eq!(store.key_for(&id("a.png")), "fx:a.png");
        assert_eq!(store.namespace(), "fx:");
    }
}
