use std::sync::Arc;

use drive_core::model::{RuleChapter, RuleChapterDetails};
use storage::repository::ViewedItemsRepository;

use crate::api::{ApiClient, Auth};
use crate::error::RuleServiceError;

/// Traffic rule chapters from the backend plus the local read-marker store.
#[derive(Clone)]
pub struct RuleService {
    api: ApiClient,
    viewed: Arc<dyn ViewedItemsRepository>,
}

impl RuleService {
    #[must_use]
    pub fn new(api: ApiClient, viewed: Arc<dyn ViewedItemsRepository>) -> Self {
        Self { api, viewed }
    }

    /// Lists chapters with their viewed counts filled in from local markers.
    ///
    /// # Errors
    /// Returns an error when the backend request or the marker store fails.
    pub async fn list_chapters(&self) -> Result<Vec<RuleChapter>, RuleServiceError> {
        let mut chapters: Vec<RuleChapter> = self.api.get_json("/v1/rules", Auth::Bearer).await?;
        for chapter in &mut chapters {
            let viewed = self.viewed.viewed_items(chapter.id).await?;
            chapter.viewed_count = Some(viewed.len() as u32);
        }
        Ok(chapters)
    }

    /// # Errors
    /// Returns an error when the backend request fails.
    pub async fn chapter_details(
        &self,
        chapter_id: i64,
    ) -> Result<RuleChapterDetails, RuleServiceError> {
        Ok(self
            .api
            .get_json(&format!("/v1/rules/{chapter_id}"), Auth::Bearer)
            .await?)
    }

    /// # Errors
    /// Returns an error when the marker store fails.
    pub async fn mark_item_viewed(
        &self,
        chapter_id: i64,
        item_id: i64,
    ) -> Result<(), RuleServiceError> {
        Ok(self.viewed.mark_viewed(chapter_id, item_id).await?)
    }

    /// # Errors
    /// Returns an error when the marker store fails.
    pub async fn viewed_items(&self, chapter_id: i64) -> Result<Vec<i64>, RuleServiceError> {
        Ok(self.viewed.viewed_items(chapter_id).await?)
    }

    /// # Errors
    /// Returns an error when the marker store fails.
    pub async fn clear_viewed_items(&self) -> Result<(), RuleServiceError> {
        Ok(self.viewed.clear_all_viewed().await?)
    }
}
