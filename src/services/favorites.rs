//! Liked-content bookkeeping with optimistic toggles
//!
//! A toggle flips the local set before the API call goes out. If the call fails, or the
//! toggle is dropped before the server answers, the flip is undone and the caller gets
//! `ToggleRejected { revert_to }` so it can restore its own control. Only one toggle per
//! `(user, content)` pair may be in flight at a time.
//!
//! Every local change bumps the user's generation. A favorites listing that was requested
//! before a change cannot overwrite it: pairs touched since the request keep their local state.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use crate::{
    error::{AppError, AppResult},
    models::{ContentId, ContentItem, UserId},
    services::{lock, upstream::FavoritesApi},
};

/// A toggle that did not take effect. `revert_to` is the liked state the UI should show.
#[derive(thiserror::Error, Debug)]
#[error("{reason}")]
pub struct ToggleRejected {
    pub revert_to: bool,
    pub reason: AppError,
}

type PairKey = (UserId, ContentId);

/// One user's liked set and its change history
#[derive(Debug, Default)]
struct LikedSet {
    ids: HashSet<ContentId>,
    /// Whether a server listing has been applied at least once
    loaded: bool,
    generation: u64,
    /// Generation of the latest local change per item
    touched: HashMap<ContentId, u64>,
}

impl LikedSet {
    fn set(&mut self, content_id: ContentId, liked: bool) {
        self.generation += 1;
        self.touched.insert(content_id, self.generation);
        if liked {
            self.ids.insert(content_id);
        } else {
            self.ids.remove(&content_id);
        }
    }

    /// Replaces the set with a server listing taken at `since`, keeping local changes made
    /// after it and the state of pairs still in flight
    fn apply_listing(
        &mut self,
        mut listed: HashSet<ContentId>,
        since: u64,
        in_flight: impl IntoIterator<Item = ContentId>,
    ) {
        let newer = self
            .touched
            .iter()
            .filter(|(_, generation)| **generation > since)
            .map(|(content_id, _)| *content_id);

        for content_id in newer.chain(in_flight) {
            if self.ids.contains(&content_id) {
                listed.insert(content_id);
            } else {
                listed.remove(&content_id);
            }
        }

        self.ids = listed;
        self.loaded = true;
    }
}

/// Releases the in-flight claim however the toggle ends
struct InFlightClaim<'a> {
    pending: &'a Mutex<HashSet<PairKey>>,
    key: PairKey,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        lock(self.pending).remove(&self.key);
    }
}

/// Puts the pre-toggle state back unless the server confirmed the change
struct PendingFlip<'a> {
    reconciler: &'a FavoritesReconciler,
    key: PairKey,
    was_liked: bool,
    confirmed: bool,
}

impl PendingFlip<'_> {
    fn confirm(mut self) {
        self.confirmed = true;
    }
}

impl Drop for PendingFlip<'_> {
    fn drop(&mut self) {
        if !self.confirmed {
            let (user_id, content_id) = self.key;
            self.reconciler.set_liked(user_id, content_id, self.was_liked);
        }
    }
}

pub struct FavoritesReconciler {
    api: Arc<dyn FavoritesApi>,
    liked: Mutex<HashMap<UserId, LikedSet>>,
    pending: Mutex<HashSet<PairKey>>,
}

impl FavoritesReconciler {
    pub fn new(api: Arc<dyn FavoritesApi>) -> Self {
        Self {
            api,
            liked: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Fetches the user's favorites and makes them the local liked set.
    /// Changes made locally while the request was out win over the listing.
    pub async fn list(&self, user_id: UserId) -> AppResult<Vec<ContentItem>> {
        let since = self.generation(user_id);
        let mut favorites = self.api.list_favorites(user_id).await?;

        let mut seen = HashSet::new();
        favorites.retain(|item| seen.insert(item.id));

        let in_flight: Vec<ContentId> = lock(&self.pending)
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, content)| *content)
            .collect();

        let mut sets = lock(&self.liked);
        let local = sets.entry(user_id).or_default();
        if local.generation != since {
            tracing::debug!(
                user_id,
                since,
                current = local.generation,
                "Favorites listing predates local changes, merging"
            );
        }
        local.apply_listing(seen, since, in_flight);
        favorites.retain(|item| local.ids.contains(&item.id));
        drop(sets);

        tracing::info!(user_id, count = favorites.len(), "Favorites loaded");
        Ok(favorites)
    }

    /// Loads the user's favorites unless a listing has already been applied
    pub async fn ensure_loaded(&self, user_id: UserId) -> AppResult<()> {
        let loaded = lock(&self.liked)
            .get(&user_id)
            .is_some_and(|set| set.loaded);
        if !loaded {
            self.list(user_id).await?;
        }
        Ok(())
    }

    pub fn is_liked(&self, user_id: UserId, content_id: ContentId) -> bool {
        lock(&self.liked)
            .get(&user_id)
            .is_some_and(|set| set.ids.contains(&content_id))
    }

    pub fn liked_ids(&self, user_id: UserId) -> HashSet<ContentId> {
        lock(&self.liked)
            .get(&user_id)
            .map(|set| set.ids.clone())
            .unwrap_or_default()
    }

    pub fn is_pending(&self, user_id: UserId, content_id: ContentId) -> bool {
        lock(&self.pending).contains(&(user_id, content_id))
    }

    /// Likes an unliked item or unlikes a liked one, returning the new liked state.
    /// The user's favorites are loaded first if they never were.
    pub async fn toggle(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> Result<bool, ToggleRejected> {
        if let Err(reason) = self.ensure_loaded(user_id).await {
            tracing::warn!(user_id, content_id, error = %reason, "Toggle skipped, favorites unknown");
            return Err(ToggleRejected {
                revert_to: self.is_liked(user_id, content_id),
                reason,
            });
        }

        let Some(_claim) = self.claim(user_id, content_id) else {
            tracing::debug!(user_id, content_id, "Toggle ignored, another is in flight");
            return Err(ToggleRejected {
                revert_to: self.is_liked(user_id, content_id),
                reason: AppError::ToggleInFlight,
            });
        };

        let was_liked = self.is_liked(user_id, content_id);
        self.set_liked(user_id, content_id, !was_liked);
        let flip = PendingFlip {
            reconciler: self,
            key: (user_id, content_id),
            was_liked,
            confirmed: false,
        };

        let result = if was_liked {
            self.api.remove_favorite(user_id, content_id).await
        } else {
            self.api.add_favorite(user_id, content_id).await
        };

        match result {
            Ok(()) => {
                flip.confirm();
                tracing::info!(user_id, content_id, liked = !was_liked, "Favorite updated");
                Ok(!was_liked)
            }
            Err(reason) => {
                drop(flip);
                tracing::warn!(
                    user_id,
                    content_id,
                    error = %reason,
                    "Favorite update failed, local state reverted"
                );
                Err(ToggleRejected {
                    revert_to: was_liked,
                    reason,
                })
            }
        }
    }

    fn claim(&self, user_id: UserId, content_id: ContentId) -> Option<InFlightClaim<'_>> {
        let key = (user_id, content_id);
        lock(&self.pending).insert(key).then_some(InFlightClaim {
            pending: &self.pending,
            key,
        })
    }

    fn generation(&self, user_id: UserId) -> u64 {
        lock(&self.liked)
            .get(&user_id)
            .map_or(0, |set| set.generation)
    }

    fn set_liked(&self, user_id: UserId, content_id: ContentId, liked: bool) {
        lock(&self.liked)
            .entry(user_id)
            .or_default()
            .set(content_id, liked);
    }
}
