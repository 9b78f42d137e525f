#![forbid(unsafe_code)]

pub mod kv;
pub mod repository;
pub mod sqlite;

pub use kv::{InMemoryKvStore, KeyValueStore};
pub use repository::{
    AnswerRepository, ExamResultRepository, KvRepository, SettingsRepository, Storage,
    StorageError, TokenRepository, ViewedItemsRepository,
};
pub use sqlite::{SqliteInitError, SqliteKvStore};
