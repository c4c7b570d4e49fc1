use crate::error::app_error::AppError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Key the bearer token is stored under.
pub const TOKEN_STORAGE_KEY: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Where the token lives between runs.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, AppError>;
    fn store(&self, token: &str) -> Result<(), AppError>;
    fn remove(&self) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.token.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn store(&self, token: &str) -> Result<(), AppError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), AppError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Small JSON key/value file, shared with anything else that keeps state next to the token.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, AppError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Map::new()),
            Ok(contents) => match serde_json::from_str::<Value>(&contents)? {
                Value::Object(entries) => Ok(entries),
                _ => {
                    warn!(path = %self.path.display(), "session file is not a JSON object, starting fresh");
                    Ok(Map::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(AppError::storage(format!("Failed to read {}", self.path.display()), e)),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AppError::storage(format!("Failed to create {}", parent.display()), e))?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents).map_err(|e| AppError::storage(format!("Failed to write {}", self.path.display()), e))
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, AppError> {
        let entries = self.read_entries()?;
        Ok(entries.get(TOKEN_STORAGE_KEY).and_then(Value::as_str).map(str::to_string))
    }

    fn store(&self, token: &str) -> Result<(), AppError> {
        let mut entries = self.read_entries()?;
        entries.insert(TOKEN_STORAGE_KEY.to_string(), Value::String(token.to_string()));
        self.write_entries(&entries)
    }

    fn remove(&self) -> Result<(), AppError> {
        let mut entries = self.read_entries()?;
        if entries.remove(TOKEN_STORAGE_KEY).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// Holds the bearer token and tells subscribers when the user logs in or out.
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
    token: RwLock<Option<String>>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        let token = match storage.load() {
            Ok(token) => normalize(token),
            Err(e) => {
                warn!(error = ?e, "could not load persisted session token");
                None
            }
        };
        let (state, _) = watch::channel(state_for(&token));

        Self {
            storage,
            token: RwLock::new(token),
            state,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStorage::default()))
    }

    pub fn get_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    /// The current token, or [`AppError::Unauthenticated`] without touching the network.
    pub fn require_token(&self) -> Result<String, AppError> {
        self.get_token().ok_or(AppError::Unauthenticated)
    }

    pub fn set_token(&self, token: impl Into<String>) -> Result<(), AppError> {
        let Some(token) = normalize(Some(token.into())) else {
            return self.clear_token();
        };

        self.storage.store(&token).inspect_err(|e| warn!(error = ?e, "failed to persist session token"))?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        info!("session started");
        self.state.send_replace(SessionState::Authenticated);
        Ok(())
    }

    pub fn clear_token(&self) -> Result<(), AppError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        let removed = self.storage.remove();
        info!("session cleared");
        self.state.send_replace(SessionState::Anonymous);
        removed
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        debug!(subscribers = self.state.receiver_count() + 1, "session subscriber added");
        self.state.subscribe()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("state", &self.state()).finish_non_exhaustive()
    }
}

fn normalize(token: Option<String>) -> Option<String> {
    token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn state_for(token: &Option<String>) -> SessionState {
    if token.is_some() { SessionState::Authenticated } else { SessionState::Anonymous }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_persisted_token() {
        let store = SessionStore::new(Arc::new(MemoryTokenStorage::with_token("abc")));
        assert_eq!(store.get_token().as_deref(), Some("abc"));
        assert_eq!(store.state(), SessionState::Authenticated);
    }

    #[test]
    fn blank_token_counts_as_absent() {
        let store = SessionStore::in_memory();
        store.set_token("   ").unwrap();
        assert!(!store.is_authenticated());
        assert!(matches!(store.require_token(), Err(AppError::Unauthenticated)));
    }

    #[tokio::test]
    async fn subscribers_see_login_and_logout() {
        let store = SessionStore::in_memory();
        let mut rx = store.subscribe();
        assert_eq!(*rx.borrow(), SessionState::Anonymous);

        store.set_token("jwt").unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SessionState::Authenticated);

        store.clear_token().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SessionState::Anonymous);
    }

    #[test]
    fn poisoned_lock_does_not_split_token_and_state() {
        let store = SessionStore::in_memory();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.token.write().unwrap();
            panic!("writer died");
        }));
        assert!(store.token.is_poisoned());

        store.set_token("jwt").unwrap();
        assert_eq!(store.get_token().as_deref(), Some("jwt"));
        assert_eq!(store.state(), SessionState::Authenticated);

        store.clear_token().unwrap();
        assert!(store.get_token().is_none());
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[test]
    fn poisoned_memory_storage_still_stores() {
        let storage = MemoryTokenStorage::default();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = storage.token.lock().unwrap();
            panic!("writer died");
        }));

        storage.store("t").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("t"));
        storage.remove().unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn file_storage_persists_across_stores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::new(Arc::new(FileTokenStorage::new(&path)));
        store.set_token("persisted").unwrap();

        let reopened = SessionStore::new(Arc::new(FileTokenStorage::new(&path)));
        assert_eq!(reopened.get_token().as_deref(), Some("persisted"));

        reopened.clear_token().unwrap();
        assert!(FileTokenStorage::new(&path).load().unwrap().is_none());
    }

    #[test]
    fn file_storage_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let storage = FileTokenStorage::new(&path);
        storage.store("t").unwrap();
        storage.remove().unwrap();

        let contents: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(contents, serde_json::json!({ "theme": "dark" }));
    }

    #[test]
    fn missing_file_means_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("absent.json"));
        assert!(storage.load().unwrap().is_none());
    }
}
