//! Per-ticket progress derived from persisted practice answers.

use std::collections::BTreeMap;

use crate::model::UserAnswer;

/// Every standard ticket has 20 questions.
pub const TICKET_QUESTION_COUNT: usize = 20;

/// Correct/incorrect tally for one ticket, for statistics views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    pub ticket_number: u32,
    pub correct: u32,
    pub incorrect: u32,
}

/// 20-slot state array for one ticket: slot `questionNumber - 1` holds
/// `Some(is_correct)` once answered, `None` otherwise. Question numbers
/// outside `1..=20` (supplemental questions) are ignored.
#[must_use]
pub fn ticket_progress(answers: &[UserAnswer], ticket_number: u32) -> Vec<Option<bool>> {
    let mut states = vec![None; TICKET_QUESTION_COUNT];
    for answer in answers.iter().filter(|a| a.ticket_number == ticket_number) {
        fill_slot(&mut states, answer);
    }
    states
}

/// State arrays for every ticket that has at least one recorded answer.
#[must_use]
pub fn all_tickets_progress(answers: &[UserAnswer]) -> BTreeMap<u32, Vec<Option<bool>>> {
    let mut progress: BTreeMap<u32, Vec<Option<bool>>> = BTreeMap::new();
    for answer in answers {
        let states = progress
            .entry(answer.ticket_number)
            .or_insert_with(|| vec![None; TICKET_QUESTION_COUNT]);
        fill_slot(states, answer);
    }
    progress
}

/// Per-ticket tallies in ticket order.
#[must_use]
pub fn progress_summaries(answers: &[UserAnswer]) -> Vec<ProgressSummary> {
    all_tickets_progress(answers)
        .into_iter()
        .map(|(ticket_number, states)| {
            let correct = states.iter().filter(|s| **s == Some(true)).count() as u32;
            let incorrect = states.iter().filter(|s| **s == Some(false)).count() as u32;
            ProgressSummary {
                ticket_number,
                correct,
                incorrect,
            }
        })
        .collect()
}

fn fill_slot(states: &mut [Option<bool>], answer: &UserAnswer) {
    if answer.question_number == 0 {
        return;
    }
    let index = (answer.question_number - 1) as usize;
    if let Some(slot) = states.get_mut(index) {
        *slot = Some(answer.is_correct);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(ticket: u32, question: u32, correct: bool) -> UserAnswer {
        UserAnswer {
            ticket_number: ticket,
            question_number: question,
            selected_answer_id: 1,
            is_correct: correct,
        }
    }

    #[test]
    fn ticket_progress_fills_twenty_slots() {
        let answers = vec![answer(1, 1, true), answer(1, 2, false), answer(2, 1, true)];
        let states = ticket_progress(&answers, 1);
        assert_eq!(states.len(), TICKET_QUESTION_COUNT);
        assert_eq!(states[0], Some(true));
        assert_eq!(states[1], Some(false));
        assert!(states[2..].iter().all(Option::is_none));
    }

    #[test]
    fn out_of_range_question_numbers_are_ignored() {
        let answers = vec![answer(1, 0, true), answer(1, 21, true), answer(1, 20, false)];
        let states = ticket_progress(&answers, 1);
        assert_eq!(states[19], Some(false));
        assert_eq!(states.iter().filter(|s| s.is_some()).count(), 1);
    }

    #[test]
    fn all_tickets_progress_groups_by_ticket() {
        let answers = vec![answer(3, 5, true), answer(1, 1, false), answer(3, 6, false)];
        let progress = all_tickets_progress(&answers);
        assert_eq!(progress.len(), 2);
        assert_eq!(progress[&3][4], Some(true));
        assert_eq!(progress[&3][5], Some(false));
        assert_eq!(progress[&1][0], Some(false));
    }

    #[test]
    fn summaries_count_correct_and_incorrect() {
        let answers = vec![
            answer(1, 1, true),
            answer(1, 2, true),
            answer(1, 3, false),
            answer(2, 1, false),
        ];
        let summaries = progress_summaries(&answers);
        assert_eq!(
            summaries,
            vec![
                ProgressSummary {
                    ticket_number: 1,
                    correct: 2,
                    incorrect: 1
                },
                ProgressSummary {
                    ticket_number: 2,
                    correct: 0,
                    incorrect: 1
                },
            ]
        );
    }
}
