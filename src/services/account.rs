use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{ContentItem, ProfileUpdate, User, UserProfile},
    services::upstream::AccountApi,
};

/// Profile and library operations for the logged-in user
pub struct AccountService {
    api: Arc<dyn AccountApi>,
}

impl AccountService {
    pub fn new(api: Arc<dyn AccountApi>) -> Self {
        Self { api }
    }

    pub async fn profile(&self, user: &User) -> AppResult<UserProfile> {
        self.api.fetch_account(user.id).await
    }

    /// Saves the edited fields and returns the profile as the server now has it
    pub async fn update_profile(
        &self,
        user: &User,
        update: &ProfileUpdate,
    ) -> AppResult<UserProfile> {
        self.api.update_profile(user.id, update).await?;
        tracing::info!(user_id = user.id, "Profile updated");
        self.api.fetch_account(user.id).await
    }

    /// Older account-details form, sent as PUT /account
    pub async fn update_account(&self, user: &User, update: &ProfileUpdate) -> AppResult<()> {
        self.api.update_account(user.id, update).await?;
        tracing::info!(user_id = user.id, "Account details updated");
        Ok(())
    }

    pub async fn library(&self, user: &User) -> AppResult<Vec<ContentItem>> {
        let items = self.api.library(user.id).await?;
        tracing::debug!(user_id = user.id, count = items.len(), "Library fetched");
        Ok(items)
    }
}
