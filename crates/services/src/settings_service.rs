use std::sync::Arc;

use drive_core::model::{AppSettings, ThemePreference};
use storage::repository::SettingsRepository;
use tracing::warn;

use crate::error::SettingsServiceError;

/// Reads and writes the user's app preferences. Loading never fails the
/// caller; an unreadable store falls back to defaults.
#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    pub async fn load(&self) -> AppSettings {
        match self.repo.load_settings().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "failed to load settings, using defaults");
                AppSettings::default()
            }
        }
    }

    /// # Errors
    /// Returns an error when the settings cannot be persisted.
    pub async fn save(&self, settings: &AppSettings) -> Result<(), SettingsServiceError> {
        Ok(self.repo.save_settings(settings).await?)
    }

    /// # Errors
    /// Returns an error when the settings cannot be persisted.
    pub async fn set_theme(&self, theme: ThemePreference) -> Result<(), SettingsServiceError> {
        let mut settings = self.load().await;
        settings.theme = theme;
        self.save(&settings).await
    }

    /// # Errors
    /// Returns an error when the settings cannot be persisted.
    pub async fn set_auto_advance(&self, enabled: bool) -> Result<(), SettingsServiceError> {
        let mut settings = self.load().await;
        settings.auto_advance_on_correct = enabled;
        self.save(&settings).await
    }

    /// # Errors
    /// Returns an error when the settings cannot be persisted.
    pub async fn set_shuffle_answers(&self, enabled: bool) -> Result<(), SettingsServiceError> {
        let mut settings = self.load().await;
        settings.shuffle_answers = enabled;
        self.save(&settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::Storage;

    #[tokio::test]
    async fn toggles_persist_through_the_repository() {
        let storage = Storage::in_memory();
        let service = SettingsService::new(Arc::clone(&storage.settings));

        assert_eq!(service.load().await, AppSettings::default());

        service.set_auto_advance(true).await.unwrap();
        service.set_theme(ThemePreference::Dark).await.unwrap();

        let settings = service.load().await;
        assert!(settings.auto_advance_on_correct);
        assert!(!settings.shuffle_answers);
        assert_eq!(settings.theme, ThemePreference::Dark);
    }
}
