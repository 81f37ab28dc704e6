//! Session storage: the bearer token and cached user info.

use dashmap::DashMap;

/// Key under which the access token is persisted.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key under which cached user info is persisted.
pub const USER_INFO_KEY: &str = "userInfo";

/// String key-value storage, in the manner of browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    /// Removes `key` if present. Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}

/// Session context consulted by the client.
pub trait SessionStore: Send + Sync {
    /// The current bearer token, if one is stored.
    fn token(&self) -> Option<String>;
    /// Forgets the token and any cached user info.
    fn clear(&self);
}

/// Thread-safe in-memory key-value store backed by `DashMap`.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// [`SessionStore`] over a [`KeyValueStore`], using the two well-known keys.
pub struct StoredSession<S> {
    store: S,
}

impl<S: KeyValueStore> StoredSession<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn set_token(&self, token: &str) {
        self.store.set(ACCESS_TOKEN_KEY, token);
    }

    pub fn set_user_info(&self, user_info: &str) {
        self.store.set(USER_INFO_KEY, user_info);
    }

    pub fn user_info(&self) -> Option<String> {
        self.store.get(USER_INFO_KEY)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> SessionStore for StoredSession<S> {
    fn token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    fn clear(&self) {
        self.store.remove(ACCESS_TOKEN_KEY);
        self.store.remove(USER_INFO_KEY);
    }
}
