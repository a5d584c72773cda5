//! Pure state machines behind a learning session.
//!
//! Neither machine touches storage; the services layer decides what to
//! persist after each transition.

//
// ─── FLASHCARDS ────────────────────────────────────────────────────────────────
//

/// Position and face of the flashcard currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashcardCursor {
    index: usize,
    len: usize,
    face_up: bool,
}

impl FlashcardCursor {
    /// Returns `None` for an empty deck.
    #[must_use]
    pub fn new(len: usize) -> Option<Self> {
        (len > 0).then_some(Self {
            index: 0,
            len,
            face_up: false,
        })
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: empty decks never get a cursor.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` when the back of the card is showing.
    #[must_use]
    pub fn is_face_up(&self) -> bool {
        self.face_up
    }

    /// Move forward, wrapping from the last card to the first.
    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.len;
        self.face_up = false;
    }

    /// Move back, wrapping from the first card to the last.
    pub fn prev(&mut self) {
        self.index = (self.index + self.len - 1) % self.len;
        self.face_up = false;
    }

    pub fn flip(&mut self) {
        self.face_up = !self.face_up;
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    /// Waiting for a pick on `question`.
    Asking { question: usize, score: usize },
    /// A pick was made; showing feedback until `advance`.
    Answered {
        question: usize,
        score: usize,
        pick: usize,
        correct: bool,
    },
    Finished { score: usize, total: usize },
}

/// Final tally of a quiz run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub percent: u32,
}

impl QuizResult {
    fn new(score: usize, total: usize) -> Self {
        Self {
            score,
            total,
            percent: percent(score, total),
        }
    }
}

/// Whole percentage, rounding halves up.
#[must_use]
pub fn percent(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * score + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// One pass through a quiz: one pick per question, no partial credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizRun {
    total: usize,
    state: QuizState,
}

impl QuizRun {
    /// Returns `None` for a quiz with no questions.
    #[must_use]
    pub fn new(total: usize) -> Option<Self> {
        (total > 0).then_some(Self {
            total,
            state: QuizState::Asking {
                question: 0,
                score: 0,
            },
        })
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        self.state
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn score(&self) -> usize {
        match self.state {
            QuizState::Asking { score, .. }
            | QuizState::Answered { score, .. }
            | QuizState::Finished { score, .. } => score,
        }
    }

    /// Question being asked or answered, `None` once finished.
    #[must_use]
    pub fn current_question(&self) -> Option<usize> {
        match self.state {
            QuizState::Asking { question, .. } | QuizState::Answered { question, .. } => {
                Some(question)
            }
            QuizState::Finished { .. } => None,
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<QuizResult> {
        match self.state {
            QuizState::Finished { score, total } => Some(QuizResult::new(score, total)),
            _ => None,
        }
    }

    /// Record a pick for the current question.
    ///
    /// Returns whether the pick was correct, or `None` if the question was
    /// already answered or the quiz is over.
    pub fn select_choice(&mut self, pick: usize, correct_index: usize) -> Option<bool> {
        let QuizState::Asking { question, score } = self.state else {
            return None;
        };
        let correct = pick == correct_index;
        self.state = QuizState::Answered {
            question,
            score: if correct { score + 1 } else { score },
            pick,
            correct,
        };
        Some(correct)
    }

    /// Leave the feedback state for the next question or the final tally.
    ///
    /// Returns the result when this call finished the quiz.
    pub fn advance(&mut self) -> Option<QuizResult> {
        let QuizState::Answered {
            question, score, ..
        } = self.state
        else {
            return None;
        };
        let next = question + 1;
        if next >= self.total {
            self.state = QuizState::Finished {
                score,
                total: self.total,
            };
            self.result()
        } else {
            self.state = QuizState::Asking {
                question: next,
                score,
            };
            None
        }
    }

    pub fn retry(&mut self) {
        self.state = QuizState::Asking {
            question: 0,
            score: 0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_have_no_machine() {
        assert!(FlashcardCursor::new(0).is_none());
        assert!(QuizRun::new(0).is_none());
    }

    #[test]
    fn flashcards_wrap_both_directions() {
        let mut cursor = FlashcardCursor::new(3).unwrap();
        cursor.prev();
        assert_eq!(cursor.index(), 2);
        cursor.next();
        assert_eq!(cursor.index(), 0);
        cursor.next();
        cursor.next();
        assert_eq!(cursor.index(), 2);
        cursor.next();
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn navigation_turns_card_face_down() {
        let mut cursor = FlashcardCursor::new(2).unwrap();
        cursor.flip();
        assert!(cursor.is_face_up());
        cursor.next();
        assert!(!cursor.is_face_up());
        cursor.flip();
        cursor.flip();
        assert!(!cursor.is_face_up());
        cursor.flip();
        cursor.prev();
        assert!(!cursor.is_face_up());
    }

    #[test]
    fn single_card_deck_stays_put() {
        let mut cursor = FlashcardCursor::new(1).unwrap();
        cursor.next();
        assert_eq!(cursor.index(), 0);
        cursor.prev();
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn second_pick_on_same_question_is_ignored() {
        let mut quiz = QuizRun::new(2).unwrap();
        assert_eq!(quiz.select_choice(1, 1), Some(true));
        assert_eq!(quiz.select_choice(0, 1), None);
        assert_eq!(quiz.score(), 1);
    }

    #[test]
    fn advance_requires_an_answer() {
        let mut quiz = QuizRun::new(2).unwrap();
        assert_eq!(quiz.advance(), None);
        assert_eq!(quiz.current_question(), Some(0));
    }

    #[test]
    fn all_correct_scores_one_hundred() {
        let mut quiz = QuizRun::new(3).unwrap();
        for _ in 0..2 {
            assert_eq!(quiz.select_choice(2, 2), Some(true));
            assert_eq!(quiz.advance(), None);
        }
        quiz.select_choice(2, 2);
        let result = quiz.advance().unwrap();
        assert_eq!(
            result,
            QuizResult {
                score: 3,
                total: 3,
                percent: 100
            }
        );
        assert_eq!(quiz.current_question(), None);
        assert_eq!(quiz.select_choice(0, 0), None);
    }

    #[test]
    fn wrong_answers_score_nothing() {
        let mut quiz = QuizRun::new(3).unwrap();
        quiz.select_choice(0, 0);
        quiz.advance();
        quiz.select_choice(1, 0);
        quiz.advance();
        quiz.select_choice(0, 0);
        let result = quiz.advance().unwrap();
        assert_eq!(result.score, 2);
        assert_eq!(result.percent, 67);
    }

    #[test]
    fn retry_resets_to_first_question() {
        let mut quiz = QuizRun::new(1).unwrap();
        quiz.select_choice(0, 0);
        quiz.advance();
        quiz.retry();
        assert_eq!(
            quiz.state(),
            QuizState::Asking {
                question: 0,
                score: 0
            }
        );
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(0, 4), 0);
        assert_eq!(percent(0, 0), 0);
    }
}
