//! HTTP implementation of the discovery API traits
//!
//! Every call goes straight to the service; nothing is cached or retried. Non-2xx answers
//! become `AppError::Fetch` carrying the server's `{"error": ...}` message when it sent one.

use crate::{
    error::{AppError, AppResult},
    models::{
        BrowseQuery, ContentId, ContentItem, Credentials, LoginResponse, ProfileUpdate,
        ProfileUpdateRequest, RecommendationQuery, UserId, UserProfile,
    },
    services::upstream::{AccountApi, CatalogApi, FavoritesApi, RecommendationApi},
};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct FavoriteBody {
    user_id: UserId,
    content_id: ContentId,
}

#[derive(Clone)]
pub struct HttpDiscoveryApi {
    http_client: HttpClient,
    api_url: String,
}

impl HttpDiscoveryApi {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Turns a non-2xx response into a fetch error, preferring the server's own message
    async fn ensure_success(response: Response, fallback: &str) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            status = %status,
            body = %body,
            "Discovery API request failed"
        );

        Err(AppError::Fetch(
            server_message(&body).unwrap_or_else(|| format!("{} (status {})", fallback, status)),
        ))
    }

    async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> AppResult<T> {
        let response = Self::ensure_success(response, fallback).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(error = %e, response = %text, "Failed to parse discovery API response");
            AppError::Fetch(format!("{}: unexpected response format", fallback))
        })
    }
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.trim().is_empty())
}

#[async_trait::async_trait]
impl AccountApi for HttpDiscoveryApi {
    async fn login(&self, credentials: &Credentials) -> AppResult<LoginResponse> {
        let response = self
            .http_client
            .post(self.url("/account"))
            .json(credentials)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(
                server_message(&body).unwrap_or_else(|| "Invalid username or password.".to_string()),
            ));
        }

        Self::read_json(response, "Authentication failed").await
    }

    async fn create_user(&self, credentials: &Credentials) -> AppResult<String> {
        let response = self
            .http_client
            .post(self.url("/create_user"))
            .json(credentials)
            .send()
            .await?;

        let body: MessageBody = Self::read_json(response, "Failed to create user").await?;
        Ok(body
            .message
            .unwrap_or_else(|| "User created successfully.".to_string()))
    }

    async fn fetch_account(&self, user_id: UserId) -> AppResult<UserProfile> {
        let response = self
            .http_client
            .get(self.url("/account"))
            .query(&[("user_id", user_id)])
            .send()
            .await?;

        Self::read_json(response, "Failed to fetch user details").await
    }

    async fn update_account(&self, user_id: UserId, update: &ProfileUpdate) -> AppResult<()> {
        let response = self
            .http_client
            .put(self.url("/account"))
            .json(&ProfileUpdateRequest { user_id, update })
            .send()
            .await?;

        Self::ensure_success(response, "Failed to update account details").await?;
        Ok(())
    }

    async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.url("/update_profile"))
            .json(&ProfileUpdateRequest { user_id, update })
            .send()
            .await?;

        Self::ensure_success(response, "Failed to update profile").await?;
        Ok(())
    }

    async fn library(&self, user_id: UserId) -> AppResult<Vec<ContentItem>> {
        let response = self
            .http_client
            .get(self.url("/library"))
            .query(&[("user_id", user_id)])
            .send()
            .await?;

        Self::read_json(response, "Failed to fetch library items").await
    }
}

#[async_trait::async_trait]
impl FavoritesApi for HttpDiscoveryApi {
    async fn list_favorites(&self, user_id: UserId) -> AppResult<Vec<ContentItem>> {
        let response = self
            .http_client
            .get(self.url("/favorites"))
            .query(&[("user_id", user_id)])
            .send()
            .await?;

        let favorites: Vec<ContentItem> =
            Self::read_json(response, "An error occurred while fetching favorites").await?;

        tracing::debug!(user_id, count = favorites.len(), "Favorites fetched");
        Ok(favorites)
    }

    async fn add_favorite(&self, user_id: UserId, content_id: ContentId) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.url("/favorites"))
            .json(&FavoriteBody {
                user_id,
                content_id,
            })
            .send()
            .await?;

        Self::ensure_success(response, "Error adding favorite").await?;
        Ok(())
    }

    async fn remove_favorite(&self, user_id: UserId, content_id: ContentId) -> AppResult<()> {
        let response = self
            .http_client
            .delete(self.url("/favorites"))
            .json(&FavoriteBody {
                user_id,
                content_id,
            })
            .send()
            .await?;

        Self::ensure_success(response, "Error removing favorite").await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecommendationApi for HttpDiscoveryApi {
    async fn recommend(&self, query: &RecommendationQuery) -> AppResult<Vec<ContentItem>> {
        let response = self
            .http_client
            .post(self.url("/recommendations"))
            .json(query)
            .send()
            .await?;

        Self::read_json(
            response,
            "An error occurred while fetching recommendations",
        )
        .await
    }
}

#[async_trait::async_trait]
impl CatalogApi for HttpDiscoveryApi {
    async fn content(&self, query: &BrowseQuery) -> AppResult<Vec<ContentItem>> {
        let response = self
            .http_client
            .get(self.url("/content"))
            .query(&query.to_query_pairs())
            .send()
            .await?;

        let items: Vec<ContentItem> = Self::read_json(response, "Failed to fetch content").await?;

        tracing::debug!(
            page = query.page,
            results = items.len(),
            "Catalog page fetched"
        );

        Ok(items)
    }

    async fn search_suggestions(&self, term: &str) -> AppResult<Vec<String>> {
        let response = self
            .http_client
            .get(self.url("/search_suggestions"))
            .query(&[("query", term)])
            .send()
            .await?;

        Self::read_json(response, "Failed to fetch suggestions").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentFilter, ContentType, SortBy};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> HttpDiscoveryApi {
        HttpDiscoveryApi::new(server.url(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"error": "User not found."}"#),
            Some("User not found.".to_string())
        );
        assert_eq!(server_message(r#"{"error": "  "}"#), None);
        assert_eq!(server_message("<html>oops</html>"), None);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let api = HttpDiscoveryApi::new("http://api.local/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.url("/content"), "http://api.local/content");
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/account")
            .match_body(Matcher::Json(json!({"username": "alice", "password": "pw"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"user_id": 42, "username": "alice"}"#)
            .create_async()
            .await;

        let response = client_for(&server)
            .login(&Credentials::new("alice", "pw"))
            .await
            .unwrap();

        assert_eq!(response.user_id, Some(42));
        assert_eq!(response.username.as_deref(), Some("alice"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_unauthorized_is_auth_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/account")
            .with_status(401)
            .with_body(r#"{"error": "Invalid username or password."}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .login(&Credentials::new("alice", "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Auth(ref m) if m == "Invalid username or password."));
    }

    #[tokio::test]
    async fn test_non_success_uses_server_error_message() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/favorites")
            .match_query(Matcher::UrlEncoded("user_id".into(), "7".into()))
            .with_status(500)
            .with_body(r#"{"error": "database is locked"}"#)
            .create_async()
            .await;

        let err = client_for(&server).list_favorites(7).await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(ref m) if m == "database is locked"));
    }

    #[tokio::test]
    async fn test_non_success_without_body_uses_fallback() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/library")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = client_for(&server).library(1).await.unwrap_err();
        match err {
            AppError::Fetch(message) => {
                assert!(message.starts_with("Failed to fetch library items"));
                assert!(message.contains("503"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remove_favorite_sends_delete_with_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/favorites")
            .match_body(Matcher::Json(json!({"user_id": 42, "content_id": 9})))
            .with_status(200)
            .with_body(r#"{"message": "removed"}"#)
            .create_async()
            .await;

        client_for(&server).remove_favorite(42, 9).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_content_sends_catalog_parameters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/content")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "3".into()),
                Matcher::UrlEncoded("search_query".into(), "dune".into()),
                Matcher::UrlEncoded("sort_by".into(), "release".into()),
                Matcher::UrlEncoded("content_type".into(), "book".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 5, "title": "Dune", "type": "Book", "large_cover_url": null}]"#)
            .create_async()
            .await;

        let query = BrowseQuery {
            page: 3,
            search_term: "dune".to_string(),
            sort_by: SortBy::Release,
            content_type: ContentFilter::Book,
        };
        let items = client_for(&server).content(&query).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content_type, ContentType::Book);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_recommend_posts_titles() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/recommendations")
            .match_body(Matcher::Json(json!({"titles": ["Heat"]})))
            .with_status(200)
            .with_body(r#"[{"id": 1, "title": "Ronin", "type": "Movie"}]"#)
            .create_async()
            .await;

        let items = client_for(&server)
            .recommend(&RecommendationQuery::seed("Heat"))
            .await
            .unwrap();

        assert_eq!(items[0].title, "Ronin");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_body_is_fetch_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/search_suggestions")
            .match_query(Matcher::UrlEncoded("query".into(), "ha".into()))
            .with_status(200)
            .with_body(r#"{"unexpected": true}"#)
            .create_async()
            .await;

        let err = client_for(&server).search_suggestions("ha").await.unwrap_err();
        assert!(err.is_fetch());
    }
}
