use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Credentials, User},
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<User>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
}

/// Who is logged in, if anyone
pub async fn current(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: state.session.current(),
    })
}

pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<Json<User>> {
    let user = state
        .session
        .login(&credentials.username, &credentials.password)
        .await?;
    Ok(Json(user))
}

pub async fn logout(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.session.logout()?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn signup(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let message = state
        .session
        .signup(&credentials.username, &credentials.password)
        .await?;
    Ok((StatusCode::CREATED, Json(SignupResponse { message })))
}
