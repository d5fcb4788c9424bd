//! Persistent storage for the bearer token and cached user profile.

use super::models::User;
use crate::errors::{ClientError, ClientResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Storage key holding the raw bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the JSON-encoded user profile
pub const USER_KEY: &str = "user";

/// Key/value storage backend for session data
pub trait TokenStorage: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> ClientResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&self, key: &str) -> ClientResult<()>;

    /// Write several values in one step; either all land or none do
    fn set_many(&self, entries: &[(&str, &str)]) -> ClientResult<()>;

    /// Delete several values in one step
    fn remove_many(&self, keys: &[&str]) -> ClientResult<()>;

    /// Drop everything, including contents that can no longer be read
    fn reset(&self) -> ClientResult<()>;
}

/// In-process storage; contents vanish with the process
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ClientResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ClientError::Storage("memory storage lock poisoned".to_string()))
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> ClientResult<()> {
        let mut map = self.lock()?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> ClientResult<()> {
        let mut map = self.lock()?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }

    fn reset(&self) -> ClientResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}

/// Storage persisted as a JSON object in a single file
///
/// Every write rewrites the whole file through a temporary sibling that is
/// renamed into place, so a crash never leaves a half-written file behind.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> ClientResult<HashMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            ClientError::Storage(format!("corrupt session file {}: {e}", self.path.display()))
        })
    }

    fn write_map(&self, map: &HashMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(map)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> ClientResult<()>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| ClientError::Storage("file storage lock poisoned".to_string()))?;
        let mut map = self.read_map()?;
        f(&mut map);
        self.write_map(&map)
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.remove_many(&[key])
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> ClientResult<()> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> ClientResult<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|map| {
            for key in keys {
                map.remove(*key);
            }
        })
    }

    fn reset(&self) -> ClientResult<()> {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| ClientError::Storage("file storage lock poisoned".to_string()))?;
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Token and profile as last saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub user: Option<User>,
}

/// Holds at most one token/profile pair on top of a storage backend
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn TokenStorage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Persist a token together with its user, replacing any previous pair
    pub fn save(&self, token: &str, user: &User) -> ClientResult<()> {
        let user_json =
            serde_json::to_string(user).map_err(|e| ClientError::Storage(e.to_string()))?;
        self.storage
            .set_many(&[(TOKEN_KEY, token), (USER_KEY, &user_json)])
    }

    /// Remove both the token and the user
    pub fn clear(&self) -> ClientResult<()> {
        self.storage.remove_many(&[TOKEN_KEY, USER_KEY])
    }

    /// Discard the backend contents even if they cannot be parsed
    pub fn reset(&self) -> ClientResult<()> {
        self.storage.reset()
    }

    /// The last saved pair, if a token is present
    ///
    /// A stored profile that no longer parses is reported as absent.
    pub fn current(&self) -> ClientResult<Option<StoredSession>> {
        let Some(token) = self.storage.get(TOKEN_KEY)? else {
            return Ok(None);
        };

        let user = match self.storage.get(USER_KEY)? {
            Some(json) => match serde_json::from_str::<User>(&json) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unreadable stored user profile");
                    None
                }
            },
            None => None,
        };

        Ok(Some(StoredSession { token, user }))
    }

    /// Just the token, if any
    pub fn token(&self) -> ClientResult<Option<String>> {
        self.storage.get(TOKEN_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn test_save_then_current() {
        let store = TokenStore::in_memory();
        assert!(store.current().unwrap().is_none());

        store.save("tok-1", &alice()).unwrap();
        let stored = store.current().unwrap().unwrap();
        assert_eq!(stored.token, "tok-1");
        assert_eq!(stored.user, Some(alice()));
    }

    #[test]
    fn test_save_replaces_previous_pair() {
        let store = TokenStore::in_memory();
        store.save("tok-1", &alice()).unwrap();

        let bob = User {
            id: 2,
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
        };
        store.save("tok-2", &bob).unwrap();

        let stored = store.current().unwrap().unwrap();
        assert_eq!(stored.token, "tok-2");
        assert_eq!(stored.user, Some(bob));
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let storage = Arc::new(MemoryStorage::new());
        let store = TokenStore::new(storage.clone());
        store.save("tok-1", &alice()).unwrap();

        store.clear().unwrap();
        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
        assert!(storage.get(USER_KEY).unwrap().is_none());
        assert!(store.current().unwrap().is_none());
    }

    #[test]
    fn test_unreadable_user_is_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "tok").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();

        let stored = TokenStore::new(storage).current().unwrap().unwrap();
        assert_eq!(stored.token, "tok");
        assert!(stored.user.is_none());
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        TokenStore::new(Arc::new(FileStorage::new(&path)))
            .save("tok-1", &alice())
            .unwrap();

        let reopened = TokenStore::new(Arc::new(FileStorage::new(&path)));
        let stored = reopened.current().unwrap().unwrap();
        assert_eq!(stored.token, "tok-1");
        assert_eq!(stored.user, Some(alice()));
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));

        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
        storage.remove(TOKEN_KEY).unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_reset_removes_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{\"token\": ").unwrap();

        let storage = FileStorage::new(&path);
        storage.reset().unwrap();
        assert!(!path.exists());
        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
        storage.reset().unwrap();
    }

    #[test]
    fn test_file_storage_set_many_is_one_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileStorage::new(&path);

        storage.set_many(&[(TOKEN_KEY, "tok"), (USER_KEY, "{}")]).unwrap();
        let map: HashMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(map.len(), 2);

        storage.remove_many(&[TOKEN_KEY, USER_KEY]).unwrap();
        assert!(storage.get(USER_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_storage_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "[1, 2").unwrap();

        let err = FileStorage::new(&path).get(TOKEN_KEY).unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));
    }
}
