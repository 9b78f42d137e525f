//! End-to-end exam and practice flows over a mock backend and in-memory
//! storage.

use std::sync::Arc;

use drive_core::exam::{AttemptState, ExamMode};
use drive_core::model::AppSettings;
use drive_core::time::fixed_clock;
use serde_json::json;
use services::api::{ApiClient, ApiConfig};
use services::exam_loop::ExamLoopService;
use services::ticket_service::TicketService;
use storage::repository::Storage;

fn answer_json(id: i64, number: u32, question_id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "answerNumber": number,
        "answerText": format!("Answer {number}"),
        "questionId": question_id,
    })
}

/// Question whose correct answer has id `10 * id + 1`.
fn question_json(id: i64, ticket_number: u32, question_number: u32) -> serde_json::Value {
    json!({
        "id": id,
        "ticketNumber": ticket_number,
        "questionNumber": question_number,
        "questionText": format!("Question {question_number}"),
        "correctAnswer": answer_json(10 * id + 1, 1, id),
        "answers": [answer_json(10 * id + 1, 1, id), answer_json(10 * id + 2, 2, id)],
    })
}

fn ticket_body(ticket_number: u32, question_ids: &[i64]) -> String {
    let questions: Vec<_> = question_ids
        .iter()
        .enumerate()
        .map(|(i, &id)| question_json(id, ticket_number, i as u32 + 1))
        .collect();
    serde_json::Value::Array(questions).to_string()
}

fn supplement_body(first_id: i64) -> String {
    let questions: Vec<_> = (0..5)
        .map(|i| question_json(first_id + i, 99, i as u32 + 1))
        .collect();
    serde_json::Value::Array(questions).to_string()
}

async fn services_for(server: &mockito::Server) -> (ExamLoopService, TicketService, Storage) {
    let storage = Storage::in_memory();
    storage
        .tokens
        .save_tokens("access-1", "refresh-1")
        .await
        .unwrap();
    let config = ApiConfig::new(&format!("{}/api", server.url())).unwrap();
    let api = ApiClient::new(&config, Arc::clone(&storage.tokens)).unwrap();
    let tickets = TicketService::new(
        api,
        Arc::clone(&storage.answers),
        Arc::clone(&storage.exam_results),
    );
    let exam_loop = ExamLoopService::new(
        tickets.clone(),
        Arc::clone(&storage.answers),
        Arc::clone(&storage.exam_results),
        Arc::clone(&storage.settings),
        fixed_clock(),
    );
    (exam_loop, tickets, storage)
}

fn correct(question: &drive_core::model::Question) -> drive_core::model::Answer {
    question.correct_answer.clone()
}

fn wrong(question: &drive_core::model::Question) -> drive_core::model::Answer {
    question
        .answers
        .iter()
        .find(|answer| !question.is_correct(answer))
        .cloned()
        .expect("fixture question has a wrong answer")
}

#[tokio::test]
async fn practice_run_logs_answers_and_progress() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/tickets/3")
        .with_header("content-type", "application/json")
        .with_body(ticket_body(3, &[31, 32]))
        .create_async()
        .await;

    let (exam_loop, tickets, storage) = services_for(&server).await;
    let mut attempt = exam_loop.start_attempt(3, ExamMode::Practice).await.unwrap();

    let first = correct(&attempt.questions()[0]);
    let outcome = exam_loop.answer_current(&mut attempt, first).await.unwrap();
    assert!(outcome.is_correct);
    assert_eq!(outcome.state, AttemptState::InProgress);

    attempt.advance(1);
    let second = wrong(&attempt.questions()[1]);
    let outcome = exam_loop.answer_current(&mut attempt, second).await.unwrap();
    assert!(!outcome.is_correct);
    assert_eq!(outcome.state, AttemptState::Completed { passed: true });
    // practice attempts do not pass or fail
    assert_eq!(attempt.passed(), None);

    let answers = storage.answers.list_answers().await.unwrap();
    assert_eq!(answers.len(), 2);
    let progress = tickets.ticket_progress(3).await.unwrap();
    assert_eq!(progress[0], Some(true));
    assert_eq!(progress[1], Some(false));
    assert_eq!(progress[2], None);

    // practice never touches the exam history
    assert!(storage.exam_results.list_results().await.unwrap().is_empty());
}

#[tokio::test]
async fn exam_fails_fast_on_the_third_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/tickets/5")
        .with_header("content-type", "application/json")
        .with_body(ticket_body(5, &[51, 52, 53]))
        .create_async()
        .await;
    // the terminating third error must not trigger a fetch
    let random = server
        .mock("GET", "/api/v1/tickets/random")
        .match_query(mockito::Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(supplement_body(900))
        .expect(2)
        .create_async()
        .await;

    let (exam_loop, _tickets, storage) = services_for(&server).await;
    let mut attempt = exam_loop.start_attempt(5, ExamMode::Exam).await.unwrap();

    for i in 0..3 {
        let answer = wrong(&attempt.questions()[i]);
        let outcome = exam_loop.answer_current(&mut attempt, answer).await.unwrap();
        if i < 2 {
            assert_eq!(outcome.state, AttemptState::InProgress);
        } else {
            assert_eq!(outcome.state, AttemptState::FailedFast);
        }
        attempt.advance(1);
    }

    // two supplemental batches landed before the attempt ended
    assert_eq!(attempt.questions().len(), 13);
    random.assert_async().await;

    let results = storage.exam_results.list_results().await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(!results[0].passed);
    assert_eq!(results[0].ticket_number, 5);
    assert_eq!(results[0].incorrect_answers, 3);
    assert_eq!(results[0].correct_answers, 3);

    // the exam never wrote to the practice answer log
    assert!(storage.answers.list_answers().await.unwrap().is_empty());
}

#[tokio::test]
async fn exam_passes_after_answering_the_grown_sequence() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/tickets/7")
        .with_header("content-type", "application/json")
        .with_body(ticket_body(7, &[71, 72]))
        .create_async()
        .await;
    server
        .mock("GET", "/api/v1/tickets/random")
        .match_query(mockito::Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(supplement_body(700))
        .expect(1)
        .create_async()
        .await;

    let (exam_loop, _tickets, storage) = services_for(&server).await;
    let mut attempt = exam_loop.start_attempt(7, ExamMode::Exam).await.unwrap();

    let miss = wrong(&attempt.questions()[0]);
    let outcome = exam_loop.answer_current(&mut attempt, miss).await.unwrap();
    assert!(!outcome.is_correct);
    assert_eq!(attempt.questions().len(), 7);
    // supplements continue the numbering of the original sequence
    assert_eq!(attempt.questions()[2].question_number, 3);
    assert_eq!(attempt.questions()[6].question_number, 7);

    for i in 1..7 {
        attempt.advance(1);
        let answer = correct(&attempt.questions()[i]);
        let outcome = exam_loop.answer_current(&mut attempt, answer).await.unwrap();
        if i < 6 {
            assert_eq!(outcome.state, AttemptState::InProgress);
        }
    }
    assert_eq!(attempt.state(), AttemptState::Completed { passed: true });

    let results = storage.exam_results.list_results().await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].passed);
    assert_eq!(results[0].correct_answers, 7);
    assert_eq!(results[0].incorrect_answers, 1);
}

#[tokio::test]
async fn failed_supplement_fetch_releases_completion() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/tickets/9")
        .with_header("content-type", "application/json")
        .with_body(ticket_body(9, &[91]))
        .create_async()
        .await;
    server
        .mock("GET", "/api/v1/tickets/random")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let (exam_loop, _tickets, storage) = services_for(&server).await;
    let mut attempt = exam_loop.start_attempt(9, ExamMode::Exam).await.unwrap();

    let miss = wrong(&attempt.questions()[0]);
    let outcome = exam_loop.answer_current(&mut attempt, miss).await.unwrap();

    // all questions answered, under the error limit, and the failed fetch
    // no longer holds the attempt open
    assert_eq!(outcome.state, AttemptState::Completed { passed: true });
    assert_eq!(attempt.questions().len(), 1);

    let results = storage.exam_results.list_results().await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].passed);
    assert_eq!(results[0].incorrect_answers, 1);
}

#[tokio::test]
async fn auto_advance_waits_then_moves_on() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/tickets/4")
        .with_header("content-type", "application/json")
        .with_body(ticket_body(4, &[41, 42]))
        .create_async()
        .await;

    let (exam_loop, _tickets, storage) = services_for(&server).await;
    storage
        .settings
        .save_settings(&AppSettings {
            auto_advance_on_correct: true,
            ..AppSettings::default()
        })
        .await
        .unwrap();

    let mut attempt = exam_loop.start_attempt(4, ExamMode::Practice).await.unwrap();
    let first = correct(&attempt.questions()[0]);
    let outcome = exam_loop.answer_current(&mut attempt, first).await.unwrap();
    assert!(outcome.auto_advance);

    assert_eq!(attempt.current_index(), 0);
    exam_loop.advance_after_delay(&mut attempt).await;
    assert_eq!(attempt.current_index(), 1);

    // on the last question there is nothing to advance to
    let second = correct(&attempt.questions()[1]);
    let outcome = exam_loop.answer_current(&mut attempt, second).await.unwrap();
    assert!(!outcome.auto_advance);
}
