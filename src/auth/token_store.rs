//! Session token storage.
//!
//! Holds zero or one bearer token. Validity is checked lazily on every read
//! and an invalid token is removed as a side effect of that read; there is
//! no background expiry timer.

use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::jwt;
use crate::utils::{Clock, SystemClock};

/// Persistence backend for the session token
///
/// Backends never fail loudly: read problems surface as `None` and write
/// problems are logged.
pub trait TokenStorage: Send + Sync + fmt::Debug {
    fn read(&self) -> Option<String>;
    fn write(&self, token: &str);
    fn delete(&self);
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: RwLock<Option<String>>,
}

impl TokenStorage for MemoryTokenStorage {
    fn read(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn write(&self, token: &str) {
        *self.token.write() = Some(token.to_string());
    }

    fn delete(&self) {
        *self.token.write() = None;
    }
}

/// Single-file storage that survives restarts
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Readers see either the old or the new file, never a partial write
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, token)?;
        std::fs::rename(&tmp, &self.path)
    }
}

impl TokenStorage for FileTokenStorage {
    fn read(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read token file");
                None
            }
        }
    }

    fn write(&self, token: &str) {
        if let Err(e) = self.write_atomic(token) {
            warn!(path = %self.path.display(), error = %e, "Failed to write token file");
        }
    }

    fn delete(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to delete token file")
            }
        }
    }
}

/// Owner of the current session token
///
/// The backend is read once at construction; afterwards the token is served
/// from memory and changes are written through. Request paths therefore never
/// touch the disk except to evict a token that just became invalid.
pub struct TokenStore {
    storage: Arc<dyn TokenStorage>,
    clock: Arc<dyn Clock>,
    // Serializes read-validate-evict against save so an eviction never
    // removes a token written in between.
    token: Mutex<Option<String>>,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("storage", &self.storage)
            .field("present", &self.token.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl TokenStore {
    pub fn new(storage: Arc<dyn TokenStorage>, clock: Arc<dyn Clock>) -> Self {
        let token = storage.read();
        Self {
            storage,
            clock,
            token: Mutex::new(token),
        }
    }

    /// In-memory store on the system clock
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStorage::default()), Arc::new(SystemClock))
    }

    /// Replace the stored token. No validation happens here.
    pub fn save(&self, token: &str) {
        let mut current = self.token.lock();
        *current = Some(token.to_string());
        self.storage.write(token);
        info!(token_len = token.len(), "Session token saved");
    }

    /// Current token if it is still usable
    ///
    /// A malformed or expired token is deleted and `None` is returned.
    pub fn get(&self) -> Option<String> {
        let mut current = self.token.lock();
        let token = current.as_deref()?;

        if jwt::is_valid_at(token, self.clock.now_secs()) {
            return Some(token.to_string());
        }

        debug!("Stored session token is expired or malformed, evicting");
        *current = None;
        self.storage.delete();
        None
    }

    /// Delete any stored token
    pub fn clear(&self) {
        let mut current = self.token.lock();
        *current = None;
        self.storage.delete();
        info!("Session token cleared");
    }

    /// Whether a usable token is present (evicts like `get`)
    pub fn has_valid_token(&self) -> bool {
        self.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ManualClock;
    use serde_json::json;
    use tempfile::TempDir;

    const NOW_SECS: u64 = 1_700_000_000;

    fn store_at(now_secs: u64) -> (TokenStore, Arc<MemoryTokenStorage>, Arc<ManualClock>) {
        let storage = Arc::new(MemoryTokenStorage::default());
        let clock = Arc::new(ManualClock::new(now_secs * 1000));
        let store = TokenStore::new(storage.clone(), clock.clone());
        (store, storage, clock)
    }

    fn token_expiring_at(exp: i64) -> String {
        jwt::encode_unsigned(&json!({ "sub": "student-7", "exp": exp }))
    }

    #[test]
    fn test_get_returns_valid_token() {
        let (store, _, _) = store_at(NOW_SECS);
        let token = token_expiring_at(NOW_SECS as i64 + 1);
        store.save(&token);
        assert_eq!(store.get(), Some(token));
    }

    #[test]
    fn test_expired_token_is_evicted_on_read() {
        let (store, storage, _) = store_at(NOW_SECS);
        store.save(&token_expiring_at(NOW_SECS as i64 - 1));

        assert_eq!(store.get(), None);
        // deleted without an explicit clear()
        assert_eq!(storage.read(), None);
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_token_expires_as_clock_moves() {
        let (store, storage, clock) = store_at(NOW_SECS);
        let token = token_expiring_at(NOW_SECS as i64 + 30);
        store.save(&token);
        assert!(store.has_valid_token());

        clock.advance(31_000);
        assert!(!store.has_valid_token());
        assert_eq!(storage.read(), None);
    }

    #[test]
    fn test_malformed_token_is_treated_as_absent() {
        let (store, storage, _) = store_at(NOW_SECS);
        store.save("only.two");
        assert_eq!(store.get(), None);
        assert_eq!(storage.read(), None);

        store.save(&token_expiring_at(0));
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_save_overwrites_and_clear_removes() {
        let (store, _, _) = store_at(NOW_SECS);
        let first = token_expiring_at(NOW_SECS as i64 + 100);
        let second = token_expiring_at(NOW_SECS as i64 + 200);

        store.save(&first);
        store.save(&second);
        assert_eq!(store.get(), Some(second));

        store.clear();
        assert_eq!(store.get(), None);
        // clearing an empty store is fine
        store.clear();
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("session.token");
        let clock = Arc::new(ManualClock::new(NOW_SECS * 1000));
        let token = token_expiring_at(NOW_SECS as i64 + 3600);

        let first = TokenStore::new(Arc::new(FileTokenStorage::new(path.clone())), clock.clone());
        first.save(&token);

        let second = TokenStore::new(Arc::new(FileTokenStorage::new(path.clone())), clock);
        assert_eq!(second.get(), Some(token));

        second.clear();
        assert!(!path.exists());
    }

    #[test]
    fn test_file_storage_evicts_expired_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.token");
        std::fs::write(&path, token_expiring_at(NOW_SECS as i64 - 10)).unwrap();

        let store = TokenStore::new(
            Arc::new(FileTokenStorage::new(path.clone())),
            Arc::new(ManualClock::new(NOW_SECS * 1000)),
        );
        assert_eq!(store.get(), None);
        assert!(!path.exists());
    }

    /// Counts backend reads so request-path access can be checked
    #[derive(Debug, Default)]
    struct CountingStorage {
        inner: MemoryTokenStorage,
        reads: std::sync::atomic::AtomicUsize,
    }

    impl TokenStorage for CountingStorage {
        fn read(&self) -> Option<String> {
            self.reads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.read()
        }

        fn write(&self, token: &str) {
            self.inner.write(token);
        }

        fn delete(&self) {
            self.inner.delete();
        }
    }

    #[test]
    fn test_reads_are_served_from_memory() {
        let storage = Arc::new(CountingStorage::default());
        storage.inner.write(&token_expiring_at(NOW_SECS as i64 + 60));

        let store = TokenStore::new(
            storage.clone(),
            Arc::new(ManualClock::new(NOW_SECS * 1000)),
        );
        for _ in 0..5 {
            assert!(store.get().is_some());
        }
        store.save(&token_expiring_at(NOW_SECS as i64 + 120));
        assert!(store.has_valid_token());

        // only the load at construction hit the backend
        assert_eq!(storage.reads.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(storage.inner.read(), store.get());
    }
}
