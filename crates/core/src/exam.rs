//! In-memory state machine for one ticket-playing attempt.
//!
//! An attempt steps through a ticket's questions in either practice or exam
//! mode. Exam mode fails fast on the third error and grows the question
//! sequence with supplemental questions after each wrong answer; practice
//! mode just records answers until every question has been seen. Termination
//! is decided in exactly one place (`evaluate`) so the pass/fail rules stay
//! a single decision point.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::model::{Answer, Question};

/// Third error ends an exam attempt immediately.
pub const EXAM_ERROR_LIMIT: u32 = 3;

/// Number of supplemental questions fetched after a wrong exam answer.
pub const SUPPLEMENT_BATCH_SIZE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamMode {
    Practice,
    Exam,
}

/// Attempt lifecycle. Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    InProgress,
    /// Exam ended early on the error limit.
    FailedFast,
    /// Every question in the (possibly grown) sequence was answered. In
    /// practice mode `passed` is always true and carries no meaning.
    Completed { passed: bool },
}

impl AttemptState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttemptState::InProgress)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error("no questions available for ticket")]
    Empty,
    #[error("attempt already finished")]
    Finished,
    #[error("question already answered in this attempt")]
    AlreadyAnswered,
}

/// What `select_answer` decided, for callers that persist or advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question_number: u32,
    pub selected_answer_id: i64,
    pub is_correct: bool,
    pub state: AttemptState,
    /// True when this answer is the one that ended the attempt.
    pub newly_terminal: bool,
}

/// Result of handing a supplemental batch to the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendOutcome {
    /// Batch appended; holds the new total question count.
    Appended(usize),
    /// The attempt terminated while the batch was in flight; it is ignored.
    Discarded,
}

/// One ticket-playing session, held in memory for the screen's lifetime.
#[derive(Debug, Clone)]
pub struct TicketAttempt {
    ticket_number: u32,
    mode: ExamMode,
    questions: Vec<Question>,
    current: usize,
    answered: HashSet<i64>,
    selected: HashMap<u32, Answer>,
    error_count: u32,
    answer_count: u32,
    extending: bool,
    state: AttemptState,
}

impl TicketAttempt {
    /// Start an attempt over the given questions.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Empty` when the ticket has no questions.
    pub fn new(
        ticket_number: u32,
        mode: ExamMode,
        questions: Vec<Question>,
    ) -> Result<Self, ExamError> {
        if questions.is_empty() {
            return Err(ExamError::Empty);
        }
        Ok(Self {
            ticket_number,
            mode,
            questions,
            current: 0,
            answered: HashSet::new(),
            selected: HashMap::new(),
            error_count: 0,
            answer_count: 0,
            extending: false,
            state: AttemptState::InProgress,
        })
    }

    #[must_use]
    pub fn ticket_number(&self) -> u32 {
        self.ticket_number
    }

    #[must_use]
    pub fn mode(&self) -> ExamMode {
        self.mode
    }

    #[must_use]
    pub fn state(&self) -> AttemptState {
        self.state
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }

    /// Pass/fail verdict: only meaningful for terminal exam attempts.
    #[must_use]
    pub fn passed(&self) -> Option<bool> {
        if self.mode == ExamMode::Practice {
            return None;
        }
        match self.state {
            AttemptState::InProgress => None,
            AttemptState::FailedFast => Some(false),
            AttemptState::Completed { passed } => Some(passed),
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered.len()
    }

    #[must_use]
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    #[must_use]
    pub fn answer_count(&self) -> u32 {
        self.answer_count
    }

    #[must_use]
    pub fn is_answered(&self, question_id: i64) -> bool {
        self.answered.contains(&question_id)
    }

    /// Answer previously chosen for a question number, if any.
    #[must_use]
    pub fn selected_answer(&self, question_number: u32) -> Option<&Answer> {
        self.selected.get(&question_number)
    }

    #[must_use]
    pub fn is_extending(&self) -> bool {
        self.extending
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current + 1 < self.questions.len()
    }

    /// Record an answer for the current question.
    ///
    /// Counters only move forward; the termination rules run immediately so
    /// the returned state is already final for this answer.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Finished` on a terminal attempt and
    /// `ExamError::AlreadyAnswered` when the current question was answered
    /// earlier in this attempt.
    pub fn select_answer(&mut self, answer: Answer) -> Result<AnswerOutcome, ExamError> {
        if self.state.is_terminal() {
            return Err(ExamError::Finished);
        }
        let question = &self.questions[self.current];
        if self.answered.contains(&question.id) {
            return Err(ExamError::AlreadyAnswered);
        }

        let question_number = question.question_number;
        let is_correct = question.is_correct(&answer);
        let selected_answer_id = answer.id;

        self.answered.insert(question.id);
        self.selected.insert(question_number, answer);
        self.answer_count += 1;
        if !is_correct {
            self.error_count += 1;
        }

        self.evaluate();

        Ok(AnswerOutcome {
            question_number,
            selected_answer_id,
            is_correct,
            state: self.state,
            newly_terminal: self.state.is_terminal(),
        })
    }

    /// Mark a supplemental fetch as in flight.
    ///
    /// Returns false unless this is an in-progress exam attempt, so the
    /// error that ends the exam can never start a fetch.
    pub fn begin_extension(&mut self) -> bool {
        if self.mode != ExamMode::Exam || self.state.is_terminal() || self.extending {
            return false;
        }
        self.extending = true;
        true
    }

    /// Append a supplemental batch, renumbering it to continue the current
    /// sequence. A batch that resolves after the attempt terminated is
    /// discarded so it cannot mutate a finished attempt.
    pub fn extend_questions(&mut self, batch: Vec<Question>) -> ExtendOutcome {
        self.extending = false;
        if self.state.is_terminal() {
            return ExtendOutcome::Discarded;
        }

        let offset = self.questions.len() as u32;
        self.questions
            .extend(batch.into_iter().enumerate().map(|(i, mut question)| {
                question.question_number = offset + i as u32 + 1;
                question
            }));

        self.evaluate();
        ExtendOutcome::Appended(self.questions.len())
    }

    /// Give up on an in-flight supplemental fetch.
    ///
    /// Re-evaluates so a completion that was held back by the extending flag
    /// is not lost.
    pub fn abort_extension(&mut self) {
        if self.extending {
            self.extending = false;
            self.evaluate();
        }
    }

    /// Move the cursor by the given offset, clamped to the current bounds.
    pub fn advance(&mut self, delta: isize) {
        let last = self.questions.len() - 1;
        let target = self.current as isize + delta;
        self.current = target.clamp(0, last as isize) as usize;
    }

    /// The single termination decision point.
    fn evaluate(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        let all_answered = self.answered.len() == self.questions.len();
        match self.mode {
            ExamMode::Exam => {
                if self.error_count >= EXAM_ERROR_LIMIT {
                    self.state = AttemptState::FailedFast;
                } else if !self.extending && all_answered {
                    self.state = AttemptState::Completed {
                        passed: self.error_count < EXAM_ERROR_LIMIT,
                    };
                }
            }
            ExamMode::Practice => {
                if all_answered {
                    self.state = AttemptState::Completed { passed: true };
                }
            }
        }
    }
}
