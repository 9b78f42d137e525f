use chrono::TimeZone;
use chrono::Utc;
use drive_core::model::{AppSettings, ExamResult, ThemePreference, UserAnswer};
use storage::kv::KeyValueStore;
use storage::repository::{
    AnswerRepository, ExamResultRepository, SettingsRepository, TokenRepository,
    ViewedItemsRepository,
};
use storage::sqlite::SqliteKvStore;
use storage::{KvRepository, Storage};

async fn connect(name: &str) -> SqliteKvStore {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let store = SqliteKvStore::connect(&url).await.expect("connect");
    store.migrate().await.expect("migrate");
    store
}

#[tokio::test]
async fn sqlite_kv_round_trip_and_prefix_scan() {
    let store = connect("memdb_kv_roundtrip").await;

    store.set("accessToken", "tok").await.unwrap();
    assert_eq!(store.get("accessToken").await.unwrap().as_deref(), Some("tok"));

    store.set("accessToken", "tok2").await.unwrap();
    assert_eq!(store.get("accessToken").await.unwrap().as_deref(), Some("tok2"));

    store.set("viewedItemsForChapter_1", "[1]").await.unwrap();
    store.set("viewedItemsForChapter_10", "[2]").await.unwrap();
    // an underscore in the prefix must not act as a wildcard
    store.set("viewedItemsXorChapter_9", "[3]").await.unwrap();

    let keys = store
        .keys_with_prefix("viewedItemsForChapter_")
        .await
        .unwrap();
    assert_eq!(
        keys,
        vec!["viewedItemsForChapter_1", "viewedItemsForChapter_10"]
    );

    store.remove("accessToken").await.unwrap();
    assert_eq!(store.get("accessToken").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_backed_repositories_persist_records() {
    let store = connect("memdb_repos").await;
    let repo = KvRepository::new(std::sync::Arc::new(store));

    repo.save_tokens("acc", "ref").await.unwrap();
    assert_eq!(repo.refresh_token().await.unwrap().as_deref(), Some("ref"));

    repo.save_answer(&UserAnswer {
        ticket_number: 1,
        question_number: 1,
        selected_answer_id: 5,
        is_correct: false,
    })
    .await
    .unwrap();
    repo.save_answer(&UserAnswer {
        ticket_number: 1,
        question_number: 1,
        selected_answer_id: 6,
        is_correct: true,
    })
    .await
    .unwrap();
    let answers = repo.list_answers().await.unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].selected_answer_id, 6);

    repo.append_result(&ExamResult {
        ticket_number: 2,
        exam_date: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        correct_answers: 21,
        incorrect_answers: 2,
        passed: true,
    })
    .await
    .unwrap();
    assert_eq!(repo.list_results().await.unwrap().len(), 1);

    repo.mark_viewed(5, 50).await.unwrap();
    repo.mark_viewed(5, 50).await.unwrap();
    assert_eq!(repo.viewed_items(5).await.unwrap(), vec![50]);

    repo.save_settings(&AppSettings {
        theme: ThemePreference::Light,
        auto_advance_on_correct: true,
        shuffle_answers: true,
    })
    .await
    .unwrap();
    let settings = repo.load_settings().await.unwrap();
    assert_eq!(settings.theme, ThemePreference::Light);
    assert!(settings.auto_advance_on_correct);
}

#[tokio::test]
async fn storage_sqlite_constructor_migrates() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.tokens.save_tokens("a", "b").await.unwrap();
    assert_eq!(
        storage.tokens.access_token().await.unwrap().as_deref(),
        Some("a")
    );
}
