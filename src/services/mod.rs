use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod account;
pub mod content_browser;
pub mod favorites;
pub mod recommendations;
pub mod session;
pub mod upstream;

pub use account::AccountService;
pub use content_browser::{BrowseOutcome, ContentBrowser};
pub use favorites::{FavoritesReconciler, ToggleRejected};
pub use recommendations::{RecommendationAggregator, RecommendationBoard};
pub use session::{FileStorage, MemoryStorage, SessionStorage, SessionStore};

/// Locks a std mutex, recovering the data if a previous holder panicked.
/// Critical sections in this crate never span an await.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
