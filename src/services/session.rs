//! Logged-in identity
//!
//! `SessionStore` is created once at startup, reads whatever identity the storage backend
//! persisted, and is the only place the rest of the crate asks "who is logged in". Reads are
//! synchronous and never touch the network.

use std::{
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::{
    error::{AppError, AppResult},
    models::{Credentials, User},
    services::{lock, upstream::AccountApi},
};

/// Where the logged-in identity survives restarts
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> AppResult<Option<User>>;
    fn save(&self, user: &User) -> AppResult<()>;
    fn clear(&self) -> AppResult<()>;
}

/// Storage that forgets everything when the process exits
#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<User>>,
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> AppResult<Option<User>> {
        Ok(lock(&self.slot).clone())
    }

    fn save(&self, user: &User) -> AppResult<()> {
        *lock(&self.slot) = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        *lock(&self.slot) = None;
        Ok(())
    }
}

/// A single JSON file holding `{id, username}`; a missing file means logged out
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> AppResult<Option<User>> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, user: &User) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string(user)?)?;
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

pub struct SessionStore {
    accounts: Arc<dyn AccountApi>,
    storage: Arc<dyn SessionStorage>,
    current: Mutex<Option<User>>,
}

impl SessionStore {
    /// Restores the persisted identity, if any. Unreadable storage counts as logged out.
    pub fn open(accounts: Arc<dyn AccountApi>, storage: Arc<dyn SessionStorage>) -> Self {
        let restored = storage.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable session");
            None
        });

        if let Some(user) = &restored {
            tracing::info!(user_id = user.id, username = %user.username, "Session restored");
        }

        Self {
            accounts,
            storage,
            current: Mutex::new(restored),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<User> {
        let credentials = Credentials::new(username.trim(), password);
        if credentials.is_blank() {
            return Err(AppError::Validation(
                "Username and password are required.".to_string(),
            ));
        }

        let response = self.accounts.login(&credentials).await?;
        let user_id = response
            .user_id
            .ok_or_else(|| AppError::Auth("Invalid username or password.".to_string()))?;

        let user = User {
            id: user_id,
            username: response.username.unwrap_or(credentials.username),
        };

        self.storage.save(&user)?;
        *lock(&self.current) = Some(user.clone());

        tracing::info!(user_id = user.id, username = %user.username, "User logged in");
        Ok(user)
    }

    /// Registers an account. The new user still has to log in.
    pub async fn signup(&self, username: &str, password: &str) -> AppResult<String> {
        let credentials = Credentials::new(username.trim(), password);
        if credentials.is_blank() {
            return Err(AppError::Validation(
                "Username and password cannot be empty.".to_string(),
            ));
        }

        let message = self.accounts.create_user(&credentials).await?;
        tracing::info!(username = %credentials.username, "Account created");
        Ok(message)
    }

    /// Forgets the persisted identity first; if that fails the user stays logged in
    pub fn logout(&self) -> AppResult<()> {
        self.storage.clear()?;
        let previous = lock(&self.current).take();

        if let Some(user) = previous {
            tracing::info!(user_id = user.id, "User logged out");
        }
        Ok(())
    }

    pub fn current(&self) -> Option<User> {
        lock(&self.current).clone()
    }

    /// The gate every user-scoped page checks first
    pub fn require_user(&self) -> AppResult<User> {
        self.current().ok_or(AppError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoginResponse;
    use crate::services::upstream::MockAccountApi;
    use tokio_test::{assert_err, assert_ok};

    fn store_with(api: MockAccountApi) -> (SessionStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::default());
        let store = SessionStore::open(Arc::new(api), storage.clone());
        (store, storage)
    }

    #[tokio::test]
    async fn test_login_persists_identity() {
        let mut api = MockAccountApi::new();
        api.expect_login()
            .withf(|c: &Credentials| c.username == "alice" && c.password == "pw")
            .times(1)
            .returning(|_| {
                Ok(LoginResponse {
                    user_id: Some(42),
                    username: Some("alice".to_string()),
                })
            });

        let (store, storage) = store_with(api);
        let user = store.login("alice", "pw").await.unwrap();

        let expected = User {
            id: 42,
            username: "alice".to_string(),
        };
        assert_eq!(user, expected);
        assert_eq!(store.current(), Some(expected.clone()));
        assert_eq!(storage.load().unwrap(), Some(expected));
    }

    #[tokio::test]
    async fn test_login_falls_back_to_submitted_username() {
        let mut api = MockAccountApi::new();
        api.expect_login().returning(|_| {
            Ok(LoginResponse {
                user_id: Some(7),
                username: None,
            })
        });

        let (store, _) = store_with(api);
        let user = store.login("  bob ", "pw").await.unwrap();
        assert_eq!(user.username, "bob");
    }

    #[tokio::test]
    async fn test_login_without_user_id_is_auth_error() {
        let mut api = MockAccountApi::new();
        api.expect_login()
            .returning(|_| Ok(LoginResponse::default()));

        let (store, storage) = store_with(api);
        let err = store.login("alice", "pw").await.unwrap_err();

        assert!(matches!(err, AppError::Auth(_)));
        assert_eq!(store.current(), None);
        assert_eq!(storage.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejected_credentials_leave_session_empty() {
        let mut api = MockAccountApi::new();
        api.expect_login()
            .returning(|_| Err(AppError::Auth("Invalid username or password.".to_string())));

        let (store, _) = store_with(api);
        assert_err!(store.login("alice", "nope").await);
        assert_err!(store.require_user());
    }

    #[tokio::test]
    async fn test_blank_credentials_skip_network() {
        let mut api = MockAccountApi::new();
        api.expect_login().times(0);
        api.expect_create_user().times(0);

        let (store, _) = store_with(api);
        assert!(matches!(
            store.login("", "pw").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            store.signup("carol", "   ").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_signup_returns_server_message() {
        let mut api = MockAccountApi::new();
        api.expect_create_user()
            .times(1)
            .returning(|_| Ok("User created successfully.".to_string()));

        let (store, _) = store_with(api);
        let message = store.signup("carol", "secret").await.unwrap();

        assert_eq!(message, "User created successfully.");
        assert_eq!(store.current(), None);
    }

    #[test]
    fn test_open_restores_and_logout_clears() {
        let storage = Arc::new(MemoryStorage::default());
        storage
            .save(&User {
                id: 3,
                username: "dora".to_string(),
            })
            .unwrap();

        let store = SessionStore::open(Arc::new(MockAccountApi::new()), storage.clone());
        assert_eq!(store.require_user().unwrap().id, 3);

        assert_ok!(store.logout());
        assert_eq!(store.current(), None);
        assert_eq!(storage.load().unwrap(), None);
        assert!(matches!(store.require_user(), Err(AppError::Unauthenticated)));
    }

    /// Keeps a user but refuses to forget it
    struct StuckStorage;

    impl SessionStorage for StuckStorage {
        fn load(&self) -> AppResult<Option<User>> {
            Ok(Some(User {
                id: 3,
                username: "dora".to_string(),
            }))
        }

        fn save(&self, _user: &User) -> AppResult<()> {
            Ok(())
        }

        fn clear(&self) -> AppResult<()> {
            Err(AppError::Storage("read-only file system".to_string()))
        }
    }

    #[test]
    fn test_failed_clear_keeps_user_logged_in() {
        let store = SessionStore::open(Arc::new(MockAccountApi::new()), Arc::new(StuckStorage));

        let err = store.logout().unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(store.require_user().unwrap().id, 3);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("session.json"));

        assert_eq!(storage.load().unwrap(), None);

        let user = User {
            id: 42,
            username: "alice".to_string(),
        };
        storage.save(&user).unwrap();

        let raw = fs::read_to_string(dir.path().join("nested").join("session.json")).unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&raw).unwrap(),
            serde_json::json!({"id": 42, "username": "alice"})
        );
        assert_eq!(storage.load().unwrap(), Some(user));

        storage.clear().unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_session_file_counts_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::open(
            Arc::new(MockAccountApi::new()),
            Arc::new(FileStorage::new(path)),
        );
        assert_eq!(store.current(), None);
    }
}
