use std::time::Duration;

use classroom_core::model::{
    CHOICES_PER_QUESTION, Capsule, CapsuleId, Flashcard, FlashcardCursor, Progress, QuizItem,
    QuizResult, QuizRun, QuizState,
};
use storage::CapsuleStore;

use crate::error::LearningError;
use crate::timings::SessionTimings;

/// The flashcard under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardView<'a> {
    pub index: usize,
    pub total: usize,
    pub card: &'a Flashcard,
    pub face_up: bool,
    pub known: bool,
}

/// The question being asked or answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionView<'a> {
    pub index: usize,
    pub total: usize,
    pub item: &'a QuizItem,
    /// The pick made so far, if any.
    pub pick: Option<usize>,
}

/// Feedback shown right after a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceFeedback {
    pub correct: bool,
    pub correct_index: usize,
}

/// A finished quiz run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub result: QuizResult,
    /// The run beat the stored best score.
    pub new_best: bool,
}

/// A pick followed through to the next question or the end of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub feedback: ChoiceFeedback,
    /// Set when this answer finished the run.
    pub finished: Option<QuizOutcome>,
}

/// Study state for one capsule: notes, a flashcard deck and a quiz run.
pub struct LearningSession {
    store: CapsuleStore,
    capsule: Capsule,
    progress: Progress,
    cards: Option<FlashcardCursor>,
    quiz: Option<QuizRun>,
    feedback_delay: Duration,
}

impl LearningSession {
    /// Start studying `id`.
    ///
    /// Returns `Ok(None)` when no readable capsule is stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::Storage` if the medium fails.
    pub async fn open(
        store: CapsuleStore,
        id: &CapsuleId,
        timings: SessionTimings,
    ) -> Result<Option<Self>, LearningError> {
        let Some(capsule) = store.get_capsule(id).await? else {
            tracing::debug!(%id, "nothing to study");
            return Ok(None);
        };
        let progress = store.get_progress(id).await?;
        Ok(Some(Self {
            cards: FlashcardCursor::new(capsule.flashcards().len()),
            quiz: QuizRun::new(capsule.quiz().len()),
            store,
            capsule,
            progress,
            feedback_delay: timings.quiz_feedback_delay,
        }))
    }

    #[must_use]
    pub fn capsule(&self) -> &Capsule {
        &self.capsule
    }

    #[must_use]
    pub fn notes(&self) -> &[String] {
        self.capsule.notes()
    }

    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    // ─── flashcards ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn current_card(&self) -> Option<CardView<'_>> {
        let cursor = self.cards?;
        let card = self.capsule.flashcards().get(cursor.index())?;
        Some(CardView {
            index: cursor.index(),
            total: cursor.len(),
            card,
            face_up: cursor.is_face_up(),
            known: self.progress.is_known(cursor.index()),
        })
    }

    /// Cards of this capsule currently marked known.
    #[must_use]
    pub fn known_count(&self) -> usize {
        let total = self.capsule.flashcards().len();
        self.progress
            .known_flashcards
            .iter()
            .filter(|&&index| index < total)
            .count()
    }

    pub fn next_card(&mut self) {
        if let Some(cursor) = self.cards.as_mut() {
            cursor.next();
        }
    }

    pub fn prev_card(&mut self) {
        if let Some(cursor) = self.cards.as_mut() {
            cursor.prev();
        }
    }

    pub fn flip_card(&mut self) {
        if let Some(cursor) = self.cards.as_mut() {
            cursor.flip();
        }
    }

    /// Mark the current card known and persist progress.
    ///
    /// Returns `false` if there is no card or it was already known.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::Storage` if progress cannot be written.
    pub async fn mark_known(&mut self) -> Result<bool, LearningError> {
        let Some(index) = self.cards.map(|c| c.index()) else {
            return Ok(false);
        };
        let changed = self.progress.mark_known(index);
        if changed {
            self.persist_progress().await?;
        }
        Ok(changed)
    }

    /// Mark the current card unknown and persist progress.
    ///
    /// Returns `false` if there is no card or it was not known.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::Storage` if progress cannot be written.
    pub async fn mark_unknown(&mut self) -> Result<bool, LearningError> {
        let Some(index) = self.cards.map(|c| c.index()) else {
            return Ok(false);
        };
        let changed = self.progress.mark_unknown(index);
        if changed {
            self.persist_progress().await?;
        }
        Ok(changed)
    }

    // ─── quiz ────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn quiz_state(&self) -> Option<QuizState> {
        self.quiz.map(|run| run.state())
    }

    #[must_use]
    pub fn current_question(&self) -> Option<QuestionView<'_>> {
        let run = self.quiz?;
        let index = run.current_question()?;
        let item = self.capsule.quiz().get(index)?;
        let pick = match run.state() {
            QuizState::Answered { pick, .. } => Some(pick),
            _ => None,
        };
        Some(QuestionView {
            index,
            total: run.total(),
            item,
            pick,
        })
    }

    #[must_use]
    pub fn quiz_result(&self) -> Option<QuizResult> {
        self.quiz.and_then(|run| run.result())
    }

    /// Answer the current question.
    ///
    /// Returns `Ok(None)` when there is nothing to answer: no quiz, the
    /// question already has a pick, or the run is over.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::InvalidChoice` for a pick outside the four
    /// choices.
    pub fn select_choice(&mut self, pick: usize) -> Result<Option<ChoiceFeedback>, LearningError> {
        if pick >= CHOICES_PER_QUESTION {
            return Err(LearningError::InvalidChoice(pick));
        }
        let Some(run) = self.quiz.as_mut() else {
            return Ok(None);
        };
        let Some(item) = run
            .current_question()
            .and_then(|index| self.capsule.quiz().get(index))
        else {
            return Ok(None);
        };
        let correct_index = usize::from(item.correct_index);
        Ok(run.select_choice(pick, correct_index).map(|correct| ChoiceFeedback {
            correct,
            correct_index,
        }))
    }

    /// Move past the feedback for the answered question.
    ///
    /// Returns the outcome when this finished the run. A percentage strictly
    /// above the stored best score replaces it.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::Storage` if a new best score cannot be written.
    pub async fn advance_quiz(&mut self) -> Result<Option<QuizOutcome>, LearningError> {
        let Some(result) = self.quiz.as_mut().and_then(QuizRun::advance) else {
            return Ok(None);
        };
        let new_best = self.progress.record_score(result.percent);
        if new_best {
            self.persist_progress().await?;
            tracing::info!(id = %self.capsule.id(), percent = result.percent, "new best score");
        }
        Ok(Some(QuizOutcome { result, new_best }))
    }

    /// Hold the feedback for the configured delay, then advance.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::Storage` if a new best score cannot be written.
    pub async fn continue_quiz(&mut self) -> Result<Option<QuizOutcome>, LearningError> {
        if !matches!(self.quiz_state(), Some(QuizState::Answered { .. })) {
            return Ok(None);
        }
        tokio::time::sleep(self.feedback_delay).await;
        self.advance_quiz().await
    }

    /// Pick, hold the feedback for the configured delay, then advance.
    ///
    /// Returns `Ok(None)` when the pick was ignored.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::InvalidChoice` for a pick outside the four
    /// choices, or `LearningError::Storage` if a new best score cannot be
    /// written.
    pub async fn answer(&mut self, pick: usize) -> Result<Option<AnswerOutcome>, LearningError> {
        let Some(feedback) = self.select_choice(pick)? else {
            return Ok(None);
        };
        let finished = self.continue_quiz().await?;
        Ok(Some(AnswerOutcome { feedback, finished }))
    }

    /// Start the quiz over from the first question.
    pub fn retry_quiz(&mut self) {
        if let Some(run) = self.quiz.as_mut() {
            run.retry();
        }
    }

    async fn persist_progress(&self) -> Result<(), LearningError> {
        self.store
            .save_progress(self.capsule.id(), &self.progress)
            .await?;
        Ok(())
    }
}
