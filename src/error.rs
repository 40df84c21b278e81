use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Bad credentials or an account the API refused
    #[error("{0}")]
    Auth(String),

    /// Non-2xx answer from the discovery API
    #[error("{0}")]
    Fetch(String),

    /// Transport failure talking to the discovery API
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// A required field was blank or out of range, caught before any request
    #[error("{0}")]
    Validation(String),

    #[error("You need to log in first.")]
    Unauthenticated,

    #[error("A change for this item is already in progress.")]
    ToggleInFlight,

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for the network / non-2xx family of failures
    pub fn is_fetch(&self) -> bool {
        matches!(self, AppError::Fetch(_) | AppError::HttpClient(_))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Auth(_) | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ToggleInFlight => StatusCode::CONFLICT,
            AppError::Fetch(_) | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Auth("nope".into()), StatusCode::UNAUTHORIZED),
            (AppError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AppError::Validation("blank".into()), StatusCode::BAD_REQUEST),
            (AppError::ToggleInFlight, StatusCode::CONFLICT),
            (AppError::Fetch("down".into()), StatusCode::BAD_GATEWAY),
            (AppError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_fetch_family() {
        assert!(AppError::Fetch("x".into()).is_fetch());
        assert!(!AppError::Validation("x".into()).is_fetch());
        assert!(!AppError::Auth("x".into()).is_fetch());
    }

    #[test]
    fn test_upstream_message_is_displayed_verbatim() {
        let err = AppError::Auth("Invalid username or password.".to_string());
        assert_eq!(err.to_string(), "Invalid username or password.");
    }
}
