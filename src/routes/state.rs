use std::{sync::Arc, time::Duration};

use crate::services::{
    upstream::{AccountApi, CatalogApi, FavoritesApi, RecommendationApi},
    AccountService, ContentBrowser, FavoritesReconciler, RecommendationAggregator,
    SessionStorage, SessionStore,
};

/// Shared application state
///
/// One session for the whole process: the front-end serves a single local user.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionStore>,
    pub favorites: Arc<FavoritesReconciler>,
    pub recommendations: Arc<RecommendationAggregator>,
    pub browser: Arc<ContentBrowser>,
    pub account: Arc<AccountService>,
}

impl AppState {
    /// Wires every component to one API client
    pub fn new<A>(
        api: Arc<A>,
        storage: Arc<dyn SessionStorage>,
        sample_size: usize,
        suggestion_debounce: Duration,
    ) -> Self
    where
        A: AccountApi + FavoritesApi + RecommendationApi + CatalogApi + 'static,
    {
        let accounts: Arc<dyn AccountApi> = api.clone();
        let favorites: Arc<dyn FavoritesApi> = api.clone();
        let recommendations: Arc<dyn RecommendationApi> = api.clone();
        let catalog: Arc<dyn CatalogApi> = api;

        Self {
            session: Arc::new(SessionStore::open(accounts.clone(), storage)),
            favorites: Arc::new(FavoritesReconciler::new(favorites)),
            recommendations: Arc::new(RecommendationAggregator::new(recommendations, sample_size)),
            browser: Arc::new(ContentBrowser::new(catalog, suggestion_debounce)),
            account: Arc::new(AccountService::new(accounts)),
        }
    }
}
