use std::collections::BTreeMap;
use std::sync::Arc;

use drive_core::model::{ExamResult, Question, TicketSummary, UserAnswer};
use drive_core::progress::{self, ProgressSummary};
use rand::seq::SliceRandom;
use storage::repository::{AnswerRepository, ExamResultRepository};

use crate::api::{ApiClient, Auth};
use crate::error::TicketServiceError;

/// Fetches ticket content from the backend and keeps the local answer log
/// and exam history.
#[derive(Clone)]
pub struct TicketService {
    api: ApiClient,
    answers: Arc<dyn AnswerRepository>,
    exam_results: Arc<dyn ExamResultRepository>,
}

impl TicketService {
    #[must_use]
    pub fn new(
        api: ApiClient,
        answers: Arc<dyn AnswerRepository>,
        exam_results: Arc<dyn ExamResultRepository>,
    ) -> Self {
        Self {
            api,
            answers,
            exam_results,
        }
    }

    /// # Errors
    /// Returns an error when the backend request fails.
    pub async fn list_tickets(&self) -> Result<Vec<TicketSummary>, TicketServiceError> {
        Ok(self.api.get_json("/v1/tickets", Auth::Bearer).await?)
    }

    /// Fetches one ticket's questions. Answers are shuffled when the user
    /// asked for it, otherwise sorted into their printed order.
    ///
    /// # Errors
    /// Returns an error when the backend request fails.
    pub async fn ticket_questions(
        &self,
        ticket_number: u32,
        shuffle_answers: bool,
    ) -> Result<Vec<Question>, TicketServiceError> {
        let mut questions: Vec<Question> = self
            .api
            .get_json(&format!("/v1/tickets/{ticket_number}"), Auth::Bearer)
            .await?;
        for question in &mut questions {
            if shuffle_answers {
                question.answers.shuffle(&mut rand::rng());
            } else {
                question.answers.sort_by_key(|answer| answer.answer_number);
            }
        }
        Ok(questions)
    }

    /// Fetches supplemental questions drawn from tickets other than the one
    /// being attempted. Numbering is left to the attempt that appends them.
    ///
    /// # Errors
    /// Returns an error when the backend request fails.
    pub async fn random_questions(
        &self,
        count: u32,
        exclude_ticket: u32,
    ) -> Result<Vec<Question>, TicketServiceError> {
        Ok(self
            .api
            .get_json(
                &format!("/v1/tickets/random?count={count}&exclude={exclude_ticket}"),
                Auth::Bearer,
            )
            .await?)
    }

    // ─── local progress ───

    /// # Errors
    /// Returns an error when the answer log cannot be read.
    pub async fn ticket_progress(
        &self,
        ticket_number: u32,
    ) -> Result<Vec<Option<bool>>, TicketServiceError> {
        let answers = self.answers.list_answers().await?;
        Ok(progress::ticket_progress(&answers, ticket_number))
    }

    /// # Errors
    /// Returns an error when the answer log cannot be read.
    pub async fn all_tickets_progress(
        &self,
    ) -> Result<BTreeMap<u32, Vec<Option<bool>>>, TicketServiceError> {
        let answers = self.answers.list_answers().await?;
        Ok(progress::all_tickets_progress(&answers))
    }

    /// # Errors
    /// Returns an error when the answer log cannot be read.
    pub async fn progress_summaries(&self) -> Result<Vec<ProgressSummary>, TicketServiceError> {
        let answers = self.answers.list_answers().await?;
        Ok(progress::progress_summaries(&answers))
    }

    /// # Errors
    /// Returns an error when the answer log cannot be written.
    pub async fn save_user_answer(&self, answer: &UserAnswer) -> Result<(), TicketServiceError> {
        Ok(self.answers.save_answer(answer).await?)
    }

    /// # Errors
    /// Returns an error when the answer log cannot be cleared.
    pub async fn clear_progress(&self) -> Result<(), TicketServiceError> {
        Ok(self.answers.clear_answers().await?)
    }

    /// # Errors
    /// Returns an error when the exam history cannot be read.
    pub async fn exam_results(&self) -> Result<Vec<ExamResult>, TicketServiceError> {
        Ok(self.exam_results.list_results().await?)
    }

    /// # Errors
    /// Returns an error when the exam history cannot be cleared.
    pub async fn clear_exam_results(&self) -> Result<(), TicketServiceError> {
        Ok(self.exam_results.clear_results().await?)
    }
}
