use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use rand::seq::SliceRandom;
use serde::Serialize;
use tokio::task::JoinSet;

use crate::{
    error::{AppError, AppResult},
    models::{ContentItem, Recommendation, RecommendationQuery},
    services::upstream::RecommendationApi,
};

/// Seed titles drawn per rebuild unless configured otherwise
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Carousels keyed by seed title, plus whatever went wrong building them
///
/// Groups that loaded are kept even when other seed titles failed; `error` then holds the
/// first failure's message for display and `failed_titles` lists every seed that failed.
#[derive(Debug, Default, Serialize)]
pub struct RecommendationBoard {
    pub groups: HashMap<String, Vec<Recommendation>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_titles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecommendationBoard {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Turns a user's favorites into "because you liked X" carousels
///
/// Every call rebuilds from scratch: no caching, no de-duplication across groups.
pub struct RecommendationAggregator {
    api: Arc<dyn RecommendationApi>,
    sample_size: usize,
}

impl RecommendationAggregator {
    pub fn new(api: Arc<dyn RecommendationApi>, sample_size: usize) -> Self {
        Self {
            api,
            sample_size: sample_size.max(1),
        }
    }

    /// Samples up to `sample_size` distinct favorite titles and fetches one recommendation
    /// list per title concurrently
    pub async fn build_for(&self, favorites: &[ContentItem]) -> RecommendationBoard {
        let seeds = sample_seed_titles(favorites, self.sample_size);
        if seeds.is_empty() {
            return RecommendationBoard::default();
        }

        tracing::info!(
            favorites = favorites.len(),
            seeds = seeds.len(),
            "Building recommendations"
        );

        // dropping the set aborts every request still running
        let mut tasks = JoinSet::new();
        for (index, title) in seeds.iter().enumerate() {
            let api = Arc::clone(&self.api);
            let query = RecommendationQuery::seed(title.clone());
            tasks.spawn(async move { (index, api.recommend(&query).await.map(shuffled)) });
        }

        let mut outcomes: Vec<Option<AppResult<Vec<Recommendation>>>> =
            seeds.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => outcomes[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "Recommendation task failed"),
            }
        }

        let mut board = RecommendationBoard::default();

        for (title, outcome) in seeds.into_iter().zip(outcomes) {
            let outcome = outcome
                .unwrap_or_else(|| Err(AppError::Internal("recommendation task failed".to_string())));

            match outcome {
                Ok(group) => {
                    board.groups.insert(title, group);
                }
                Err(e) => {
                    tracing::error!(seed_title = %title, error = %e, "Recommendation fetch failed");
                    board.error.get_or_insert_with(|| e.to_string());
                    board.failed_titles.push(title);
                }
            }
        }

        if !board.failed_titles.is_empty() {
            tracing::warn!(
                success_count = board.groups.len(),
                error_count = board.failed_titles.len(),
                "Partial recommendation failure"
            );
        }

        board
    }

    /// Direct lookup for one typed-in title
    pub async fn recommend_by_title(&self, title: &str) -> AppResult<Vec<Recommendation>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation(
                "Content title cannot be empty.".to_string(),
            ));
        }

        let items = self
            .api
            .recommend(&RecommendationQuery::Single {
                title: title.to_string(),
            })
            .await?;

        tracing::info!(title = %title, results = items.len(), "Title recommendations fetched");
        Ok(items.into_iter().map(Recommendation::from).collect())
    }
}

/// Random sample without replacement over the distinct favorite titles
fn sample_seed_titles(favorites: &[ContentItem], sample_size: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut titles: Vec<String> = favorites
        .iter()
        .filter(|item| seen.insert(item.title.as_str()))
        .map(|item| item.title.clone())
        .collect();

    titles.shuffle(&mut rand::thread_rng());
    titles.truncate(sample_size);
    titles
}

fn shuffled(items: Vec<ContentItem>) -> Vec<Recommendation> {
    let mut group: Vec<Recommendation> = items.into_iter().map(Recommendation::from).collect();
    group.shuffle(&mut rand::thread_rng());
    group
}
