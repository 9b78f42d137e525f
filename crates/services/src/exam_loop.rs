use std::sync::Arc;
use std::time::Duration;

use drive_core::exam::{
    AttemptState, ExamMode, SUPPLEMENT_BATCH_SIZE, TicketAttempt,
};
use drive_core::model::{Answer, ExamResult, UserAnswer};
use drive_core::time::Clock;
use storage::repository::{AnswerRepository, ExamResultRepository, SettingsRepository};
use tracing::{debug, warn};

use crate::error::ExamLoopError;
use crate::ticket_service::TicketService;

/// Pause before moving to the next question after a correct answer.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_secs(1);

/// What a single answer did to the attempt, plus whether the caller should
/// schedule an automatic advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptAnswerOutcome {
    pub question_number: u32,
    pub is_correct: bool,
    pub state: AttemptState,
    pub auto_advance: bool,
}

/// Drives a ticket attempt end to end: builds it from fetched questions,
/// routes each answer through the state machine, persists what each mode
/// persists and grows exam attempts with supplemental questions.
#[derive(Clone)]
pub struct ExamLoopService {
    tickets: TicketService,
    answers: Arc<dyn AnswerRepository>,
    exam_results: Arc<dyn ExamResultRepository>,
    settings: Arc<dyn SettingsRepository>,
    clock: Clock,
}

impl ExamLoopService {
    #[must_use]
    pub fn new(
        tickets: TicketService,
        answers: Arc<dyn AnswerRepository>,
        exam_results: Arc<dyn ExamResultRepository>,
        settings: Arc<dyn SettingsRepository>,
        clock: Clock,
    ) -> Self {
        Self {
            tickets,
            answers,
            exam_results,
            settings,
            clock,
        }
    }

    /// Fetches the ticket and opens an attempt on it. Answer order honors
    /// the shuffle setting; unreadable settings fall back to defaults.
    ///
    /// # Errors
    /// Returns an error when the fetch fails or the ticket has no questions.
    pub async fn start_attempt(
        &self,
        ticket_number: u32,
        mode: ExamMode,
    ) -> Result<TicketAttempt, ExamLoopError> {
        let settings = match self.settings.load_settings().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "failed to load settings, using defaults");
                Default::default()
            }
        };
        let questions = self
            .tickets
            .ticket_questions(ticket_number, settings.shuffle_answers)
            .await?;
        Ok(TicketAttempt::new(ticket_number, mode, questions)?)
    }

    /// Answers the current question and performs the mode's side effects:
    /// practice answers go to the local answer log, exam errors trigger a
    /// supplemental fetch, and a finished exam is recorded exactly once.
    ///
    /// # Errors
    /// Returns an error when the attempt is already finished or the question
    /// was answered before.
    pub async fn answer_current(
        &self,
        attempt: &mut TicketAttempt,
        answer: Answer,
    ) -> Result<AttemptAnswerOutcome, ExamLoopError> {
        let outcome = attempt.select_answer(answer)?;

        match attempt.mode() {
            ExamMode::Practice => {
                let record = UserAnswer {
                    ticket_number: attempt.ticket_number(),
                    question_number: outcome.question_number,
                    selected_answer_id: outcome.selected_answer_id,
                    is_correct: outcome.is_correct,
                };
                if let Err(err) = self.answers.save_answer(&record).await {
                    warn!(error = %err, "failed to persist practice answer");
                }
            }
            ExamMode::Exam => {
                if !outcome.is_correct && attempt.begin_extension() {
                    match self
                        .tickets
                        .random_questions(SUPPLEMENT_BATCH_SIZE, attempt.ticket_number())
                        .await
                    {
                        Ok(batch) => {
                            let appended = attempt.extend_questions(batch);
                            debug!(?appended, "supplemental batch resolved");
                        }
                        Err(err) => {
                            warn!(error = %err, "supplemental fetch failed");
                            attempt.abort_extension();
                        }
                    }
                }
            }
        }

        // select_answer rejects finished attempts, so a terminal state here
        // means this call ended the exam and the result is recorded once
        if attempt.mode() == ExamMode::Exam && attempt.is_complete() {
            let result = ExamResult {
                ticket_number: attempt.ticket_number(),
                exam_date: self.clock.now(),
                correct_answers: attempt.answer_count(),
                incorrect_answers: attempt.error_count(),
                passed: attempt.passed().unwrap_or(false),
            };
            if let Err(err) = self.exam_results.append_result(&result).await {
                warn!(error = %err, "failed to record exam result");
            }
        }

        let auto_advance = outcome.is_correct
            && !attempt.state().is_terminal()
            && attempt.has_next()
            && self.auto_advance_enabled().await;

        Ok(AttemptAnswerOutcome {
            question_number: outcome.question_number,
            is_correct: outcome.is_correct,
            state: attempt.state(),
            auto_advance,
        })
    }

    /// Waits out [`AUTO_ADVANCE_DELAY`] and moves to the next question.
    pub async fn advance_after_delay(&self, attempt: &mut TicketAttempt) {
        tokio::time::sleep(AUTO_ADVANCE_DELAY).await;
        attempt.advance(1);
    }

    async fn auto_advance_enabled(&self) -> bool {
        match self.settings.load_settings().await {
            Ok(settings) => settings.auto_advance_on_correct,
            Err(err) => {
                warn!(error = %err, "failed to load settings, using defaults");
                false
            }
        }
    }
}
