// Local preference store: the favorite set and per-player avatar overrides.
//
// Durable state lives behind the `KeyValueStore` capability (get/set per
// key). `Preferences` layers the favorites/avatar contract on top of it:
// reads never fail (absent or corrupt entries read as empty), writes return
// a `StoreError` the caller must surface.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::Database;
use crate::player::PlayerId;

/// Key holding the JSON-encoded favorite id array.
pub const FAVORITES_KEY: &str = "favorites";

/// Prefix of the per-player avatar override keys.
pub const AVATAR_KEY_PREFIX: &str = "player_avatar_";

pub fn avatar_key(id: &PlayerId) -> String {
    format!("{AVATAR_KEY_PREFIX}{id}")
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read preference `{key}`: {message}")]
    Read { key: String, message: String },

    #[error("failed to write preference `{key}`: {message}")]
    Write { key: String, message: String },

    #[error("failed to encode favorites: {0}")]
    Encode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// KeyValueStore capability
// ---------------------------------------------------------------------------

/// Minimal durable key-value capability the preference contract is built on.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// SQLite-backed store used by the application.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn open(path: &str) -> anyhow::Result<Self> {
        Ok(Self::new(Database::open(path)?))
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.db.load_value(key).map_err(|e| StoreError::Read {
            key: key.to_string(),
            message: format!("{e:#}"),
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.db.save_value(key, value).map_err(|e| StoreError::Write {
            key: key.to_string(),
            message: format!("{e:#}"),
        })
    }
}

/// In-memory store for tests and `--ephemeral` sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    /// Raw value currently stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("memory store mutex poisoned")
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .expect("memory store mutex poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FavoriteSet / AvatarMap
// ---------------------------------------------------------------------------

/// Set of favorite player ids. Membership is the only semantic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(BTreeSet<PlayerId>);

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.0.contains(id)
    }

    pub fn insert(&mut self, id: PlayerId) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: &PlayerId) -> bool {
        self.0.remove(id)
    }

    /// Flip membership of `id`. Returns whether `id` is a member afterwards.
    pub fn toggle(&mut self, id: &PlayerId) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.clone());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerId> {
        self.0.iter()
    }
}

impl FromIterator<PlayerId> for FavoriteSet {
    fn from_iter<T: IntoIterator<Item = PlayerId>>(iter: T) -> Self {
        FavoriteSet(iter.into_iter().collect())
    }
}

/// Avatar overrides keyed by player id. Absence means "use the remote image".
pub type AvatarMap = HashMap<PlayerId, String>;

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// The favorites/avatar contract over a `KeyValueStore`.
///
/// Favorite mutations made through one `Preferences` handle are serialized
/// by an async mutex, so `toggle_favorite` and `remove_favorite` are atomic
/// read-modify-write operations within the process. Writers going through a
/// different handle to the same database still race last-write-wins.
pub struct Preferences<S> {
    store: S,
    favorites_lock: tokio::sync::Mutex<()>,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            favorites_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current durable favorite set. Absent, unreadable, or corrupt entries
    /// read as the empty set.
    pub async fn favorite_ids(&self) -> FavoriteSet {
        let raw = match self.store.get(FAVORITES_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return FavoriteSet::new(),
            Err(e) => {
                warn!("Reading favorites failed, treating as empty: {}", e);
                return FavoriteSet::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Stored favorites are corrupt, treating as empty: {}", e);
            FavoriteSet::new()
        })
    }

    /// Replace the whole favorite set.
    pub async fn set_favorite_ids(&self, ids: &FavoriteSet) -> Result<(), StoreError> {
        let _guard = self.favorites_lock.lock().await;
        self.write_favorites(ids).await
    }

    pub async fn clear_all_favorites(&self) -> Result<(), StoreError> {
        self.set_favorite_ids(&FavoriteSet::new()).await
    }

    /// Flip membership of `id` and return the set as written.
    pub async fn toggle_favorite(&self, id: &PlayerId) -> Result<FavoriteSet, StoreError> {
        let _guard = self.favorites_lock.lock().await;
        let mut ids = self.favorite_ids().await;
        let now_member = ids.toggle(id);
        self.write_favorites(&ids).await?;
        debug!(player = %id, now_member, "Toggled favorite");
        Ok(ids)
    }

    /// Remove `id` from the set and return the set as written. Removing a
    /// non-member still rewrites the current set.
    pub async fn remove_favorite(&self, id: &PlayerId) -> Result<FavoriteSet, StoreError> {
        let _guard = self.favorites_lock.lock().await;
        let mut ids = self.favorite_ids().await;
        ids.remove(id);
        self.write_favorites(&ids).await?;
        debug!(player = %id, "Removed favorite");
        Ok(ids)
    }

    async fn write_favorites(&self, ids: &FavoriteSet) -> Result<(), StoreError> {
        let json = serde_json::to_string(ids)?;
        self.store.set(FAVORITES_KEY, &json).await
    }

    /// Avatar override for one player. Read failures read as absent.
    pub async fn avatar_override(&self, id: &PlayerId) -> Option<String> {
        match self.store.get(&avatar_key(id)).await {
            Ok(uri) => uri,
            Err(e) => {
                warn!(player = %id, "Reading avatar override failed: {}", e);
                None
            }
        }
    }

    /// Avatar overrides for a listing. Players without an override are
    /// omitted.
    pub async fn avatar_overrides(&self, ids: &[PlayerId]) -> AvatarMap {
        let mut map = AvatarMap::new();
        for id in ids {
            if let Some(uri) = self.avatar_override(id).await {
                map.insert(id.clone(), uri);
            }
        }
        map
    }

    /// Associate `uri` with `id`, replacing any prior override.
    pub async fn set_avatar_override(&self, id: &PlayerId, uri: &str) -> Result<(), StoreError> {
        self.store.set(&avatar_key(id), uri).await?;
        debug!(player = %id, "Stored avatar override");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    fn memory_prefs() -> Preferences<MemoryStore> {
        Preferences::new(MemoryStore::new())
    }

    /// Store whose reads and writes always fail.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Read {
                key: key.to_string(),
                message: "disk on fire".to_string(),
            })
        }

        async fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Write {
                key: key.to_string(),
                message: "disk on fire".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn favorites_start_empty() {
        let prefs = memory_prefs();
        assert!(prefs.favorite_ids().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_favorites_read_as_empty() {
        let prefs = Preferences::new(MemoryStore::with_entries([(FAVORITES_KEY, "{not json")]));
        assert!(prefs.favorite_ids().await.is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_collapse_on_read() {
        let prefs = Preferences::new(MemoryStore::with_entries([(FAVORITES_KEY, r#"["1","1","2"]"#)]));
        assert_eq!(prefs.favorite_ids().await.len(), 2);
    }

    #[tokio::test]
    async fn numeric_ids_in_stored_array_are_accepted() {
        let prefs = Preferences::new(MemoryStore::with_entries([(FAVORITES_KEY, "[1, \"2\"]")]));
        let ids = prefs.favorite_ids().await;
        assert!(ids.contains(&id("1")));
        assert!(ids.contains(&id("2")));
    }

    #[tokio::test]
    async fn toggle_parity_decides_membership() {
        for toggles in 0..6 {
            let prefs = memory_prefs();
            for _ in 0..toggles {
                prefs.toggle_favorite(&id("7")).await.unwrap();
            }
            assert_eq!(
                prefs.favorite_ids().await.contains(&id("7")),
                toggles % 2 == 1,
                "after {toggles} toggles"
            );
        }
    }

    #[tokio::test]
    async fn clear_all_empties_regardless_of_prior_state() {
        let prefs = memory_prefs();
        prefs
            .set_favorite_ids(&[id("1"), id("2")].into_iter().collect())
            .await
            .unwrap();
        prefs.clear_all_favorites().await.unwrap();
        assert!(prefs.favorite_ids().await.is_empty());
        assert_eq!(prefs.store().raw(FAVORITES_KEY).as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn remove_one_of_three() {
        let prefs = memory_prefs();
        prefs
            .set_favorite_ids(&[id("1"), id("2"), id("3")].into_iter().collect())
            .await
            .unwrap();
        let after = prefs.remove_favorite(&id("2")).await.unwrap();
        let expected: FavoriteSet = [id("1"), id("3")].into_iter().collect();
        assert_eq!(after, expected);
        assert_eq!(prefs.favorite_ids().await, expected);
    }

    #[tokio::test]
    async fn favorites_serialize_as_json_array() {
        let prefs = memory_prefs();
        prefs.toggle_favorite(&id("2")).await.unwrap();
        prefs.toggle_favorite(&id("1")).await.unwrap();
        assert_eq!(prefs.store().raw(FAVORITES_KEY).as_deref(), Some(r#"["1","2"]"#));
    }

    #[tokio::test]
    async fn concurrent_toggles_on_one_handle_are_serialized() {
        let prefs = std::sync::Arc::new(memory_prefs());
        let mut handles = Vec::new();
        for n in 0..20 {
            let prefs = prefs.clone();
            handles.push(tokio::spawn(async move {
                prefs.toggle_favorite(&PlayerId::new(n.to_string())).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(prefs.favorite_ids().await.len(), 20);
    }

    #[tokio::test]
    async fn avatar_override_round_trip_keeps_latest() {
        let prefs = memory_prefs();
        assert!(prefs.avatar_override(&id("5")).await.is_none());
        prefs.set_avatar_override(&id("5"), "file:///a.png").await.unwrap();
        assert_eq!(prefs.avatar_override(&id("5")).await.as_deref(), Some("file:///a.png"));
        prefs.set_avatar_override(&id("5"), "file:///b.png").await.unwrap();
        assert_eq!(prefs.avatar_override(&id("5")).await.as_deref(), Some("file:///b.png"));
        assert_eq!(prefs.store().raw("player_avatar_5").as_deref(), Some("file:///b.png"));
    }

    #[tokio::test]
    async fn avatar_overrides_skip_players_without_one() {
        let prefs = memory_prefs();
        prefs.set_avatar_override(&id("2"), "file:///two.png").await.unwrap();
        let map = prefs.avatar_overrides(&[id("1"), id("2")]).await;
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&id("2")).map(String::as_str), Some("file:///two.png"));
    }

    #[tokio::test]
    async fn read_failures_degrade_silently() {
        let prefs = Preferences::new(BrokenStore);
        assert!(prefs.favorite_ids().await.is_empty());
        assert!(prefs.avatar_override(&id("1")).await.is_none());
    }

    #[tokio::test]
    async fn write_failures_are_returned() {
        let prefs = Preferences::new(BrokenStore);
        assert!(matches!(
            prefs.toggle_favorite(&id("1")).await,
            Err(StoreError::Write { .. })
        ));
        assert!(prefs.clear_all_favorites().await.is_err());
        assert!(prefs.set_avatar_override(&id("1"), "file:///x.png").await.is_err());
    }

    #[tokio::test]
    async fn sqlite_store_backs_preferences() {
        let prefs = Preferences::new(SqliteStore::open(":memory:").unwrap());
        prefs.toggle_favorite(&id("4")).await.unwrap();
        prefs.set_avatar_override(&id("4"), "file:///four.png").await.unwrap();
        assert!(prefs.favorite_ids().await.contains(&id("4")));
        assert_eq!(
            prefs.avatar_override(&id("4")).await.as_deref(),
            Some("file:///four.png")
        );

        prefs.clear_all_favorites().await.unwrap();
        assert!(prefs.favorite_ids().await.is_empty());
        // Clearing favorites leaves avatar overrides in place.
        let overrides = prefs.avatar_overrides(&[id("4"), id("5")]).await;
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.get(&id("4")).map(String::as_str), Some("file:///four.png"));
    }
}
