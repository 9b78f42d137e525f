use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: i64,
    pub answer_number: u32,
    pub answer_text: String,
    pub question_id: i64,
}

/// Illustration attached to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub id: i64,
    pub name: String,
    pub image_path: String,
}

/// A single exam question as served by `/v1/tickets/{ticketNumber}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub ticket_number: u32,
    pub question_number: u32,
    pub question_text: String,
    pub correct_answer: Answer,
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

impl Question {
    /// Correctness is decided by identity against the designated answer.
    #[must_use]
    pub fn is_correct(&self, answer: &Answer) -> bool {
        answer.id == self.correct_answer.id
    }
}

/// Ticket listing entry from `/v1/tickets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSummary {
    pub ticket_number: u32,
    pub question_numbers: u32,
}

/// Practice-mode answer record, persisted under the `user_answers` key.
///
/// The stored list holds at most one record per (ticket, question) pair;
/// saving replaces any prior record for that pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    pub ticket_number: u32,
    pub question_number: u32,
    pub selected_answer_id: i64,
    pub is_correct: bool,
}

/// Terminal exam outcome, appended to the `exam_results` list.
///
/// `correct_answers` holds the total number of answers given in the attempt
/// and `incorrect_answers` the error count at the moment the attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub ticket_number: u32,
    pub exam_date: DateTime<Utc>,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub passed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_deserializes_camel_case() {
        let json = r#"{
            "id": 7,
            "ticketNumber": 3,
            "questionNumber": 1,
            "questionText": "Who yields?",
            "correctAnswer": {"id": 21, "answerNumber": 1, "answerText": "You", "questionId": 7},
            "answers": [
                {"id": 21, "answerNumber": 1, "answerText": "You", "questionId": 7},
                {"id": 22, "answerNumber": 2, "answerText": "They", "questionId": 7}
            ]
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.ticket_number, 3);
        assert!(question.image.is_none());
        assert!(question.is_correct(&question.answers[0].clone()));
        assert!(!question.is_correct(&question.answers[1].clone()));
    }

    #[test]
    fn user_answer_round_trips_camel_case() {
        let answer = UserAnswer {
            ticket_number: 1,
            question_number: 4,
            selected_answer_id: 99,
            is_correct: false,
        };
        let json = serde_json::to_string(&answer).unwrap();
        assert!(json.contains("\"ticketNumber\":1"));
        assert!(json.contains("\"selectedAnswerId\":99"));
        let back: UserAnswer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answer);
    }
}
