use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{ContentItem, ProfileUpdate, UserProfile},
};

use super::AppState;

pub async fn profile(State(state): State<AppState>) -> AppResult<Json<UserProfile>> {
    let user = state.session.require_user()?;
    Ok(Json(state.account.profile(&user).await?))
}

/// Saves the submitted fields and answers with the refreshed profile
pub async fn update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<UserProfile>> {
    let user = state.session.require_user()?;
    Ok(Json(state.account.update_profile(&user, &update).await?))
}

pub async fn library(State(state): State<AppState>) -> AppResult<Json<Vec<ContentItem>>> {
    let user = state.session.require_user()?;
    Ok(Json(state.account.library(&user).await?))
}

/// Account-details form; answers with no body
pub async fn update_account(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<StatusCode> {
    let user = state.session.require_user()?;
    state.account.update_account(&user, &update).await?;
    Ok(StatusCode::NO_CONTENT)
}
