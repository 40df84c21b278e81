//! Discovery API abstraction
//!
//! The external service is split along the concerns the front-end touches: accounts,
//! favorites, recommendations and the catalog. Components depend only on the trait they
//! need, which keeps the test doubles small.

use crate::{
    error::AppResult,
    models::{
        BrowseQuery, ContentId, ContentItem, Credentials, LoginResponse, ProfileUpdate,
        RecommendationQuery, UserId, UserProfile,
    },
};

pub mod http;

pub use http::HttpDiscoveryApi;

/// Account endpoints: `/account`, `/create_user`, `/update_profile`, `/library`
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AccountApi: Send + Sync {
    /// Authenticate; a 401 surfaces as `AppError::Auth`
    async fn login(&self, credentials: &Credentials) -> AppResult<LoginResponse>;

    /// Register an account and return the server's confirmation message
    async fn create_user(&self, credentials: &Credentials) -> AppResult<String>;

    async fn fetch_account(&self, user_id: UserId) -> AppResult<UserProfile>;

    /// PUT /account
    async fn update_account(&self, user_id: UserId, update: &ProfileUpdate) -> AppResult<()>;

    /// POST /update_profile
    async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> AppResult<()>;

    async fn library(&self, user_id: UserId) -> AppResult<Vec<ContentItem>>;
}

/// `/favorites` list, add and remove
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FavoritesApi: Send + Sync {
    async fn list_favorites(&self, user_id: UserId) -> AppResult<Vec<ContentItem>>;

    async fn add_favorite(&self, user_id: UserId, content_id: ContentId) -> AppResult<()>;

    async fn remove_favorite(&self, user_id: UserId, content_id: ContentId) -> AppResult<()>;
}

/// `/recommendations`
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationApi: Send + Sync {
    async fn recommend(&self, query: &RecommendationQuery) -> AppResult<Vec<ContentItem>>;
}

/// `/content` and `/search_suggestions`
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    async fn content(&self, query: &BrowseQuery) -> AppResult<Vec<ContentItem>>;

    async fn search_suggestions(&self, term: &str) -> AppResult<Vec<String>>;
}
