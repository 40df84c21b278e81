use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::Recommendation,
    services::RecommendationBoard,
};

use super::AppState;

/// Shown on For You when there is nothing to seed recommendations from
pub const EMPTY_PROMPT: &str = "Like a few titles on the Showcase page to get recommendations.";

/// The For You page: one carousel per sampled favorite
#[derive(Debug, Default, Serialize)]
pub struct ForYouView {
    pub groups: HashMap<String, Vec<Recommendation>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_titles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_prompt: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<RecommendationBoard> for ForYouView {
    fn from(board: RecommendationBoard) -> Self {
        let empty_prompt = (board.is_empty() && board.error.is_none()).then_some(EMPTY_PROMPT);
        Self {
            groups: board.groups,
            failed_titles: board.failed_titles,
            empty_prompt,
            error: board.error,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    #[serde(default)]
    pub title: String,
}

/// Handler for the For You page
pub async fn for_you(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<ForYouView>> {
    let user = state.session.require_user()?;

    let favorites = match state.favorites.list(user.id).await {
        Ok(favorites) => favorites,
        Err(err) => {
            tracing::error!(%request_id, user_id = user.id, error = %err, "Could not load favorites");
            return Ok(Json(ForYouView {
                error: Some(err.to_string()),
                ..ForYouView::default()
            }));
        }
    };

    let board = state.recommendations.build_for(&favorites).await;
    tracing::info!(
        %request_id,
        user_id = user.id,
        groups = board.groups.len(),
        failed = board.failed_titles.len(),
        "For You built"
    );
    Ok(Json(ForYouView::from(board)))
}

/// Recommendations for one typed-in title
pub async fn by_title(
    State(state): State<AppState>,
    Query(query): Query<TitleQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let recommendations = state.recommendations.recommend_by_title(&query.title).await?;
    Ok(Json(recommendations))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_gets_prompt() {
        let view = ForYouView::from(RecommendationBoard::default());
        assert_eq!(view.empty_prompt, Some(EMPTY_PROMPT));
        assert!(view.error.is_none());
    }

    #[test]
    fn test_failed_board_shows_error_not_prompt() {
        let board = RecommendationBoard {
            failed_titles: vec!["Heat".to_string()],
            error: Some("Failed to fetch recommendations.".to_string()),
            ..RecommendationBoard::default()
        };
        let view = ForYouView::from(board);

        assert!(view.empty_prompt.is_none());
        assert_eq!(view.failed_titles, vec!["Heat".to_string()]);
    }
}
