use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{split_by_type, ContentId, ContentItem},
    services::ToggleRejected,
};

use super::AppState;

/// Favorites as the page shows them: two shelves
#[derive(Debug, Serialize)]
pub struct FavoritesView {
    pub movies: Vec<ContentItem>,
    pub books: Vec<ContentItem>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub content_id: ContentId,
    pub liked: bool,
}

impl IntoResponse for ToggleRejected {
    fn into_response(self) -> Response {
        let status = match self.reason {
            AppError::ToggleInFlight => StatusCode::CONFLICT,
            _ => StatusCode::BAD_GATEWAY,
        };
        let body = Json(json!({
            "error": self.reason.to_string(),
            "revert_to": self.revert_to,
        }));
        (status, body).into_response()
    }
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<FavoritesView>> {
    let user = state.session.require_user()?;
    let favorites = state.favorites.list(user.id).await?;
    let (movies, books) = split_by_type(favorites);
    Ok(Json(FavoritesView { movies, books }))
}

/// Flips the liked state of one item
pub async fn toggle(
    State(state): State<AppState>,
    Path(content_id): Path<ContentId>,
) -> Response {
    let user = match state.session.require_user() {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    match state.favorites.toggle(user.id, content_id).await {
        Ok(liked) => Json(ToggleResponse { content_id, liked }).into_response(),
        Err(rejected) => rejected.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_status_by_reason() {
        let in_flight = ToggleRejected {
            revert_to: true,
            reason: AppError::ToggleInFlight,
        };
        assert_eq!(in_flight.into_response().status(), StatusCode::CONFLICT);

        let upstream = ToggleRejected {
            revert_to: false,
            reason: AppError::Fetch("Failed to update favorites.".to_string()),
        };
        assert_eq!(upstream.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
