//! Typed repositories layered as JSON over the flat key-value store.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use drive_core::model::{AppSettings, ExamResult, ThemePreference, UserAnswer};

use crate::kv::{InMemoryKvStore, KeyValueStore};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub const KEY_ACCESS_TOKEN: &str = "accessToken";
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";
pub const KEY_USER_ANSWERS: &str = "user_answers";
pub const KEY_EXAM_RESULTS: &str = "exam_results";
pub const KEY_USER_THEME: &str = "userTheme";
pub const KEY_AUTO_ADVANCE: &str = "autoNavigateOnCorrect";
pub const KEY_SHUFFLE_ANSWERS: &str = "shuffleAnswers";
const VIEWED_ITEMS_PREFIX: &str = "viewedItemsForChapter_";

fn viewed_items_key(chapter_id: i64) -> String {
    format!("{VIEWED_ITEMS_PREFIX}{chapter_id}")
}

/// Bearer-token persistence, owned exclusively by the session manager.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn access_token(&self) -> Result<Option<String>, StorageError>;
    async fn refresh_token(&self) -> Result<Option<String>, StorageError>;

    /// Store both tokens after a login.
    async fn save_tokens(&self, access: &str, refresh: &str) -> Result<(), StorageError>;

    /// Replace only the access token after a silent refresh.
    async fn save_access_token(&self, access: &str) -> Result<(), StorageError>;

    /// Drop both tokens on logout.
    async fn clear_tokens(&self) -> Result<(), StorageError>;
}

/// Practice-answer records under `user_answers`.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Upsert by (ticket, question): the prior record for the pair is
    /// removed before the new one is appended.
    async fn save_answer(&self, answer: &UserAnswer) -> Result<(), StorageError>;

    async fn list_answers(&self) -> Result<Vec<UserAnswer>, StorageError>;

    async fn clear_answers(&self) -> Result<(), StorageError>;
}

/// Append-only exam outcome log under `exam_results`.
#[async_trait]
pub trait ExamResultRepository: Send + Sync {
    async fn append_result(&self, result: &ExamResult) -> Result<(), StorageError>;

    async fn list_results(&self) -> Result<Vec<ExamResult>, StorageError>;

    async fn clear_results(&self) -> Result<(), StorageError>;
}

/// Viewed rule items, one list per chapter.
#[async_trait]
pub trait ViewedItemsRepository: Send + Sync {
    /// Append after a membership check; marking twice keeps one entry.
    async fn mark_viewed(&self, chapter_id: i64, item_id: i64) -> Result<(), StorageError>;

    async fn viewed_items(&self, chapter_id: i64) -> Result<Vec<i64>, StorageError>;

    /// Remove the viewed lists of every chapter.
    async fn clear_all_viewed(&self) -> Result<(), StorageError>;
}

/// The three scalar settings keys.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Missing or unparseable values fall back to defaults.
    async fn load_settings(&self) -> Result<AppSettings, StorageError>;

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError>;
}

/// All repositories implemented over one [`KeyValueStore`].
#[derive(Clone)]
pub struct KvRepository {
    kv: Arc<dyn KeyValueStore>,
}

impl KvRepository {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    async fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StorageError> {
        match self.kv.get(key).await? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|e| StorageError::Serialization(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    async fn write_list<T: Serialize>(&self, key: &str, list: &[T]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(list)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(key, &raw).await
    }
}

#[async_trait]
impl TokenRepository for KvRepository {
    async fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.kv.get(KEY_ACCESS_TOKEN).await
    }

    async fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.kv.get(KEY_REFRESH_TOKEN).await
    }

    async fn save_tokens(&self, access: &str, refresh: &str) -> Result<(), StorageError> {
        self.kv.set(KEY_ACCESS_TOKEN, access).await?;
        self.kv.set(KEY_REFRESH_TOKEN, refresh).await
    }

    async fn save_access_token(&self, access: &str) -> Result<(), StorageError> {
        self.kv.set(KEY_ACCESS_TOKEN, access).await
    }

    async fn clear_tokens(&self) -> Result<(), StorageError> {
        self.kv.remove(KEY_ACCESS_TOKEN).await?;
        self.kv.remove(KEY_REFRESH_TOKEN).await
    }
}

#[async_trait]
impl AnswerRepository for KvRepository {
    async fn save_answer(&self, answer: &UserAnswer) -> Result<(), StorageError> {
        let mut answers: Vec<UserAnswer> = self.read_list(KEY_USER_ANSWERS).await?;
        answers.retain(|a| {
            !(a.ticket_number == answer.ticket_number
                && a.question_number == answer.question_number)
        });
        answers.push(answer.clone());
        self.write_list(KEY_USER_ANSWERS, &answers).await
    }

    async fn list_answers(&self) -> Result<Vec<UserAnswer>, StorageError> {
        self.read_list(KEY_USER_ANSWERS).await
    }

    async fn clear_answers(&self) -> Result<(), StorageError> {
        self.kv.remove(KEY_USER_ANSWERS).await
    }
}

#[async_trait]
impl ExamResultRepository for KvRepository {
    async fn append_result(&self, result: &ExamResult) -> Result<(), StorageError> {
        let mut results: Vec<ExamResult> = self.read_list(KEY_EXAM_RESULTS).await?;
        results.push(result.clone());
        self.write_list(KEY_EXAM_RESULTS, &results).await
    }

    async fn list_results(&self) -> Result<Vec<ExamResult>, StorageError> {
        self.read_list(KEY_EXAM_RESULTS).await
    }

    async fn clear_results(&self) -> Result<(), StorageError> {
        self.kv.remove(KEY_EXAM_RESULTS).await
    }
}

#[async_trait]
impl ViewedItemsRepository for KvRepository {
    async fn mark_viewed(&self, chapter_id: i64, item_id: i64) -> Result<(), StorageError> {
        let key = viewed_items_key(chapter_id);
        let mut items: Vec<i64> = self.read_list(&key).await?;
        if !items.contains(&item_id) {
            items.push(item_id);
            self.write_list(&key, &items).await?;
        }
        Ok(())
    }

    async fn viewed_items(&self, chapter_id: i64) -> Result<Vec<i64>, StorageError> {
        self.read_list(&viewed_items_key(chapter_id)).await
    }

    async fn clear_all_viewed(&self) -> Result<(), StorageError> {
        for key in self.kv.keys_with_prefix(VIEWED_ITEMS_PREFIX).await? {
            self.kv.remove(&key).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for KvRepository {
    async fn load_settings(&self) -> Result<AppSettings, StorageError> {
        let theme = self
            .kv
            .get(KEY_USER_THEME)
            .await?
            .map(|raw| ThemePreference::parse(&raw))
            .unwrap_or_default();
        let auto_advance = self.kv.get(KEY_AUTO_ADVANCE).await?;
        let shuffle = self.kv.get(KEY_SHUFFLE_ANSWERS).await?;
        Ok(AppSettings {
            theme,
            auto_advance_on_correct: auto_advance.as_deref() == Some("true"),
            shuffle_answers: shuffle.as_deref() == Some("true"),
        })
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        self.kv.set(KEY_USER_THEME, settings.theme.as_str()).await?;
        self.kv
            .set(
                KEY_AUTO_ADVANCE,
                if settings.auto_advance_on_correct {
                    "true"
                } else {
                    "false"
                },
            )
            .await?;
        self.kv
            .set(
                KEY_SHUFFLE_ANSWERS,
                if settings.shuffle_answers { "true" } else { "false" },
            )
            .await
    }
}

/// Aggregates the repositories behind trait objects for backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub tokens: Arc<dyn TokenRepository>,
    pub answers: Arc<dyn AnswerRepository>,
    pub exam_results: Arc<dyn ExamResultRepository>,
    pub viewed_items: Arc<dyn ViewedItemsRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn from_kv(kv: Arc<dyn KeyValueStore>) -> Self {
        let repo = KvRepository::new(kv);
        Self {
            tokens: Arc::new(repo.clone()),
            answers: Arc::new(repo.clone()),
            exam_results: Arc::new(repo.clone()),
            viewed_items: Arc::new(repo.clone()),
            settings: Arc::new(repo),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_kv(Arc::new(InMemoryKvStore::new()))
    }
}
