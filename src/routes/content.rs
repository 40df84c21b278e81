use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{split_by_type, BrowseQuery, ContentId, ContentItem},
    services::BrowseOutcome,
};

use super::AppState;

/// Shown once the browser has been closed for shutdown
pub const CLOSED_MESSAGE: &str = "The catalog is unavailable while the server shuts down.";

/// One catalog page, split into shelves
#[derive(Debug, Default, Serialize)]
pub struct BrowseView {
    pub page: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub movies: Vec<ContentItem>,
    pub books: Vec<ContentItem>,
    /// Liked ids among the shown items, empty when logged out
    pub liked: Vec<ContentId>,
    pub superseded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BrowseView {
    fn new(query: &BrowseQuery, items: Vec<ContentItem>, liked: Vec<ContentId>) -> Self {
        let (movies, books) = split_by_type(items);
        Self {
            page: query.page,
            has_previous_page: query.has_previous_page(),
            has_next_page: query.has_next_page(),
            movies,
            books,
            liked,
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsView {
    pub suggestions: Vec<String>,
    pub superseded: bool,
}

/// Handler for the Showcase catalog
pub async fn browse(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<BrowseView>> {
    let outcome = match state.browser.query(query.clone()).await {
        Ok(outcome) => outcome,
        Err(err @ AppError::Validation(_)) => return Err(err),
        Err(err) => {
            tracing::error!(page = query.page, error = %err, "Catalog fetch failed");
            return Ok(Json(BrowseView {
                error: Some(err.to_string()),
                ..BrowseView::new(&query, Vec::new(), Vec::new())
            }));
        }
    };

    let liked_ids = match state.session.current() {
        Some(user) => {
            if let Err(err) = state.favorites.ensure_loaded(user.id).await {
                tracing::warn!(user_id = user.id, error = %err, "Liked state unavailable");
            }
            state.favorites.liked_ids(user.id)
        }
        None => Default::default(),
    };
    let liked_among = |items: &[ContentItem]| -> Vec<ContentId> {
        items
            .iter()
            .map(|item| item.id)
            .filter(|id| liked_ids.contains(id))
            .collect()
    };

    let view = match outcome {
        BrowseOutcome::Fresh(items) => {
            let liked = liked_among(&items);
            BrowseView::new(&query, items, liked)
        }
        BrowseOutcome::Superseded => {
            let (displayed_query, items) = state.browser.displayed();
            let shown = displayed_query.unwrap_or_default();
            let liked = liked_among(&items);
            BrowseView {
                superseded: true,
                ..BrowseView::new(&shown, items, liked)
            }
        }
        BrowseOutcome::Cancelled => BrowseView {
            error: Some(CLOSED_MESSAGE.to_string()),
            ..BrowseView::new(&query, Vec::new(), Vec::new())
        },
    };

    Ok(Json(view))
}

/// Typeahead for the search box
pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> AppResult<Json<SuggestionsView>> {
    let view = match state.browser.suggest(&query.query).await? {
        BrowseOutcome::Fresh(suggestions) => SuggestionsView {
            suggestions,
            superseded: false,
        },
        BrowseOutcome::Superseded => SuggestionsView {
            suggestions: state.browser.suggestions(),
            superseded: true,
        },
        BrowseOutcome::Cancelled => SuggestionsView {
            suggestions: Vec::new(),
            superseded: false,
        },
    };
    Ok(Json(view))
}
