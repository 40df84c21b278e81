use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::ContentId;

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ContentType {
    #[serde(alias = "movie")]
    Movie,
    #[serde(alias = "book")]
    Book,
}

impl Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Movie => write!(f, "Movie"),
            ContentType::Book => write!(f, "Book"),
        }
    }
}

/// A movie or book as served by the catalog. Owned by the API, never edited here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default)]
    pub large_cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
}

impl ContentItem {
    /// Minimal item, mostly useful for fixtures
    pub fn new(id: ContentId, title: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            id,
            title: title.into(),
            content_type,
            large_cover_url: None,
            link: None,
            author: None,
            genres: None,
            plot: None,
            vote_average: None,
            release: None,
        }
    }
}

/// A recommended item tagged with its content type for the carousel renderer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    #[serde(flatten)]
    pub item: ContentItem,
    #[serde(rename = "contentType")]
    pub content_type: ContentType,
}

impl From<ContentItem> for Recommendation {
    fn from(item: ContentItem) -> Self {
        let content_type = item.content_type;
        Self { item, content_type }
    }
}

/// Splits a listing into its movie and book columns, keeping relative order
pub fn split_by_type(items: Vec<ContentItem>) -> (Vec<ContentItem>, Vec<ContentItem>) {
    items
        .into_iter()
        .partition(|item| item.content_type == ContentType::Movie)
}

/// Catalog sort key
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Title,
    Release,
    #[serde(alias = "vote_average")]
    Rating,
}

impl SortBy {
    /// Column name the catalog service sorts on
    pub fn as_query_value(&self) -> &'static str {
        match self {
            SortBy::Title => "title",
            SortBy::Release => "release",
            SortBy::Rating => "vote_average",
        }
    }
}

/// Catalog content-type filter; `All` is sent as an empty string
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentFilter {
    #[default]
    #[serde(alias = "")]
    All,
    Movie,
    Book,
}

impl ContentFilter {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            ContentFilter::All => "",
            ContentFilter::Movie => "movie",
            ContentFilter::Book => "book",
        }
    }
}

/// One catalog listing request. `page` is 1-indexed and unbounded above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseQuery {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default, rename = "search_query")]
    pub search_term: String,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub content_type: ContentFilter,
}

fn first_page() -> u32 {
    1
}

impl Default for BrowseQuery {
    fn default() -> Self {
        Self {
            page: first_page(),
            search_term: String::new(),
            sort_by: SortBy::default(),
            content_type: ContentFilter::default(),
        }
    }
}

impl BrowseQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// "Previous Page" is only disabled on the first page
    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    /// The catalog never reports a last page, so "Next Page" is always enabled
    pub fn has_next_page(&self) -> bool {
        true
    }

    pub fn next_page(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn previous_page(&self) -> Self {
        Self {
            page: self.page.saturating_sub(1).max(1),
            ..self.clone()
        }
    }

    /// Query-string pairs in the catalog's parameter names
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("search_query", self.search_term.clone()),
            ("sort_by", self.sort_by.as_query_value().to_string()),
            ("content_type", self.content_type.as_query_value().to_string()),
        ]
    }
}

/// Body of a `/recommendations` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecommendationQuery {
    Single { title: String },
    Batch { titles: Vec<String> },
}

impl RecommendationQuery {
    /// The shape used when fanning out one request per seed title
    pub fn seed(title: impl Into<String>) -> Self {
        RecommendationQuery::Batch {
            titles: vec![title.into()],
        }
    }
}
