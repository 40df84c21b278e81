//! Paginated catalog listing with typeahead
//!
//! Each query and each suggestion lookup takes a generation number. A response is only
//! committed if its generation is still the newest when it arrives, checked under the same
//! lock that stores it, so a slow early response can never overwrite a later one.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, AppResult},
    models::{BrowseQuery, ContentItem},
    services::{lock, upstream::CatalogApi},
};

/// What became of a browse or suggest call
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseOutcome<T> {
    /// Newest request; its result is now displayed
    Fresh(T),
    /// A newer request was issued before this one resolved; the result was dropped
    Superseded,
    /// The browser was closed
    Cancelled,
}

impl<T> BrowseOutcome<T> {
    pub fn into_fresh(self) -> Option<T> {
        match self {
            BrowseOutcome::Fresh(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Displayed {
    query: Option<BrowseQuery>,
    items: Vec<ContentItem>,
}

pub struct ContentBrowser {
    catalog: Arc<dyn CatalogApi>,
    debounce: Duration,
    query_generation: AtomicU64,
    suggest_generation: AtomicU64,
    displayed: Mutex<Displayed>,
    suggestions: Mutex<Vec<String>>,
    closed: CancellationToken,
}

impl ContentBrowser {
    pub fn new(catalog: Arc<dyn CatalogApi>, debounce: Duration) -> Self {
        Self {
            catalog,
            debounce,
            query_generation: AtomicU64::new(0),
            suggest_generation: AtomicU64::new(0),
            displayed: Mutex::new(Displayed::default()),
            suggestions: Mutex::new(Vec::new()),
            closed: CancellationToken::new(),
        }
    }

    /// Fetches one catalog page. Only the newest query's result is kept for display.
    pub async fn query(&self, query: BrowseQuery) -> AppResult<BrowseOutcome<Vec<ContentItem>>> {
        if query.page == 0 {
            return Err(AppError::Validation("Pages start at 1.".to_string()));
        }

        let generation = self.query_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = tokio::select! {
            biased;
            _ = self.closed.cancelled() => return Ok(BrowseOutcome::Cancelled),
            result = self.catalog.content(&query) => result,
        };

        let mut displayed = lock(&self.displayed);
        if self.query_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(page = query.page, generation, "Dropping superseded catalog response");
            return Ok(BrowseOutcome::Superseded);
        }

        let items = result?;
        tracing::info!(
            page = query.page,
            search = %query.search_term,
            results = items.len(),
            "Catalog page displayed"
        );
        displayed.items = items.clone();
        displayed.query = Some(query);
        Ok(BrowseOutcome::Fresh(items))
    }

    /// The page currently on screen and the query that produced it
    pub fn displayed(&self) -> (Option<BrowseQuery>, Vec<ContentItem>) {
        let displayed = lock(&self.displayed);
        (displayed.query.clone(), displayed.items.clone())
    }

    /// Typeahead lookup. An empty term clears the list at once without a request;
    /// otherwise the lookup waits out the debounce window and yields to newer keystrokes.
    pub async fn suggest(&self, partial_term: &str) -> AppResult<BrowseOutcome<Vec<String>>> {
        let generation = self.suggest_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let term = partial_term.trim();
        if term.is_empty() {
            lock(&self.suggestions).clear();
            return Ok(BrowseOutcome::Fresh(Vec::new()));
        }

        if !self.debounce.is_zero() {
            tokio::select! {
                biased;
                _ = self.closed.cancelled() => return Ok(BrowseOutcome::Cancelled),
                _ = tokio::time::sleep(self.debounce) => {}
            }
            if self.suggest_generation.load(Ordering::SeqCst) != generation {
                return Ok(BrowseOutcome::Superseded);
            }
        }

        let result = tokio::select! {
            biased;
            _ = self.closed.cancelled() => return Ok(BrowseOutcome::Cancelled),
            result = self.catalog.search_suggestions(term) => result,
        };

        let mut suggestions = lock(&self.suggestions);
        if self.suggest_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(term = %term, "Dropping superseded suggestions");
            return Ok(BrowseOutcome::Superseded);
        }

        let fresh = result?;
        *suggestions = fresh.clone();
        Ok(BrowseOutcome::Fresh(fresh))
    }

    /// Picking a suggestion or pressing enter closes the list
    pub fn clear_suggestions(&self) {
        self.suggest_generation.fetch_add(1, Ordering::SeqCst);
        lock(&self.suggestions).clear();
    }

    pub fn suggestions(&self) -> Vec<String> {
        lock(&self.suggestions).clone()
    }

    /// Navigating away or shutting down: every pending and future request resolves to
    /// `Cancelled`
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}
