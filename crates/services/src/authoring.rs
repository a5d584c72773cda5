use std::time::Duration;

use classroom_core::model::{
    CHOICES_PER_QUESTION, CapsuleDraft, CapsuleId, Flashcard, Level, QuizItem,
};
use storage::CapsuleStore;

use crate::error::{AuthoringError, DraftList};
use crate::schedule::ScheduledTask;
use crate::timings::SessionTimings;

/// Editing state for one capsule.
///
/// Every edit mutates the in-memory draft and (re)schedules an autosave that
/// fires once the user has been idle for the autosave window. The draft
/// itself is kept as typed, blank rows included; normalization only shapes
/// what gets persisted.
pub struct AuthoringSession {
    store: CapsuleStore,
    id: CapsuleId,
    draft: CapsuleDraft,
    is_new: bool,
    autosave: ScheduledTask,
    autosave_window: Duration,
}

impl AuthoringSession {
    /// Load `id` for editing, or start a blank draft with a fresh id when no
    /// id is given or nothing is stored under it.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Storage` if the medium fails.
    pub async fn open(
        store: CapsuleStore,
        id: Option<&CapsuleId>,
        timings: SessionTimings,
    ) -> Result<Self, AuthoringError> {
        let existing = match id {
            Some(id) => store.get_capsule(id).await?,
            None => None,
        };
        let (draft, is_new) = match existing {
            Some(capsule) => (capsule.to_draft(), false),
            None => {
                if let Some(id) = id {
                    tracing::debug!(%id, "capsule not found, starting a new draft");
                }
                let clock = store.clock();
                (CapsuleDraft::empty(CapsuleId::generate(&clock)), true)
            }
        };
        let id = draft
            .id
            .clone()
            .unwrap_or_else(|| CapsuleId::generate(&store.clock()));

        Ok(Self {
            store,
            id,
            draft,
            is_new,
            autosave: ScheduledTask::new(),
            autosave_window: timings.autosave_window,
        })
    }

    #[must_use]
    pub fn id(&self) -> &CapsuleId {
        &self.id
    }

    #[must_use]
    pub fn draft(&self) -> &CapsuleDraft {
        &self.draft
    }

    /// `true` until the draft has been saved explicitly, for drafts that did
    /// not come from storage.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    #[must_use]
    pub fn has_pending_autosave(&self) -> bool {
        self.autosave.is_pending()
    }

    // ─── metadata ────────────────────────────────────────────────────────────

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.meta.title = title.into();
        self.touched();
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.draft.meta.subject = subject.into();
        self.touched();
    }

    pub fn set_level(&mut self, level: Level) {
        self.draft.meta.level = level;
        self.touched();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.meta.description = description.into();
        self.touched();
    }

    // ─── notes ───────────────────────────────────────────────────────────────

    /// Append one note per non-blank line of `text`.
    ///
    /// Returns how many notes were added.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::EmptyNote` if `text` has no non-blank line.
    pub fn add_notes(&mut self, text: &str) -> Result<usize, AuthoringError> {
        let before = self.draft.notes.len();
        self.draft.notes.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned),
        );
        let added = self.draft.notes.len() - before;
        if added == 0 {
            return Err(AuthoringError::EmptyNote);
        }
        self.touched();
        Ok(added)
    }

    /// # Errors
    ///
    /// Returns `AuthoringError::OutOfRange` for a position past the end.
    pub fn remove_note(&mut self, index: usize) -> Result<String, AuthoringError> {
        check_index(DraftList::Notes, index, self.draft.notes.len())?;
        let removed = self.draft.notes.remove(index);
        self.touched();
        Ok(removed)
    }

    pub fn clear_notes(&mut self) {
        self.draft.notes.clear();
        self.touched();
    }

    // ─── flashcards ──────────────────────────────────────────────────────────

    /// Append a blank card and return its position.
    pub fn add_flashcard(&mut self) -> usize {
        self.draft.flashcards.push(Flashcard::default());
        self.touched();
        self.draft.flashcards.len() - 1
    }

    /// # Errors
    ///
    /// Returns `AuthoringError::OutOfRange` for a position past the end.
    pub fn set_flashcard_front(
        &mut self,
        index: usize,
        front: impl Into<String>,
    ) -> Result<(), AuthoringError> {
        self.flashcard_mut(index)?.front = front.into();
        self.touched();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AuthoringError::OutOfRange` for a position past the end.
    pub fn set_flashcard_back(
        &mut self,
        index: usize,
        back: impl Into<String>,
    ) -> Result<(), AuthoringError> {
        self.flashcard_mut(index)?.back = back.into();
        self.touched();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AuthoringError::OutOfRange` for a position past the end.
    pub fn remove_flashcard(&mut self, index: usize) -> Result<Flashcard, AuthoringError> {
        check_index(DraftList::Flashcards, index, self.draft.flashcards.len())?;
        let removed = self.draft.flashcards.remove(index);
        self.touched();
        Ok(removed)
    }

    // ─── quiz ────────────────────────────────────────────────────────────────

    /// Append a blank question (first choice marked correct) and return its
    /// position.
    pub fn add_question(&mut self) -> usize {
        self.draft.quiz.push(QuizItem::default());
        self.touched();
        self.draft.quiz.len() - 1
    }

    /// # Errors
    ///
    /// Returns `AuthoringError::OutOfRange` for a position past the end.
    pub fn set_question(
        &mut self,
        index: usize,
        question: impl Into<String>,
    ) -> Result<(), AuthoringError> {
        self.question_mut(index)?.question = question.into();
        self.touched();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AuthoringError::OutOfRange` if the question or choice does
    /// not exist.
    pub fn set_choice(
        &mut self,
        index: usize,
        choice: usize,
        text: impl Into<String>,
    ) -> Result<(), AuthoringError> {
        check_index(DraftList::Choices, choice, CHOICES_PER_QUESTION)?;
        self.question_mut(index)?.choices[choice] = text.into();
        self.touched();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AuthoringError::OutOfRange` if the question or choice does
    /// not exist.
    pub fn set_correct_index(&mut self, index: usize, choice: usize) -> Result<(), AuthoringError> {
        check_index(DraftList::Choices, choice, CHOICES_PER_QUESTION)?;
        let item = self.question_mut(index)?;
        // In range by the check above.
        item.correct_index = u8::try_from(choice).unwrap_or_default();
        self.touched();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AuthoringError::OutOfRange` for a position past the end.
    pub fn remove_question(&mut self, index: usize) -> Result<QuizItem, AuthoringError> {
        check_index(DraftList::Quiz, index, self.draft.quiz.len())?;
        let removed = self.draft.quiz.remove(index);
        self.touched();
        Ok(removed)
    }

    // ─── persistence ─────────────────────────────────────────────────────────

    /// Validate and persist now, skipping the autosave window.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Rejected` with the reason the draft cannot be
    /// stored, or `AuthoringError::Storage` if the medium fails.
    pub async fn save(&mut self) -> Result<CapsuleId, AuthoringError> {
        self.autosave.settle().await;
        let id = self.store.save_capsule(self.draft.clone()).await?;
        self.is_new = false;
        Ok(id)
    }

    /// End the session with a last save attempt.
    ///
    /// Nobody is left to tell about a rejected or failed save, so the outcome
    /// is only logged.
    pub async fn close(mut self) {
        self.autosave.settle().await;
        if let Err(err) = self.store.save_capsule(self.draft.clone()).await {
            tracing::debug!(id = %self.id, error = %err, "final save skipped");
        }
    }

    fn touched(&mut self) {
        let store = self.store.clone();
        let draft = self.draft.clone();
        self.autosave.schedule(self.autosave_window, async move {
            let id = draft.id.clone();
            if let Err(err) = store.save_capsule(draft).await {
                tracing::debug!(?id, error = %err, "autosave skipped");
            }
        });
    }

    fn flashcard_mut(&mut self, index: usize) -> Result<&mut Flashcard, AuthoringError> {
        let len = self.draft.flashcards.len();
        self.draft
            .flashcards
            .get_mut(index)
            .ok_or(AuthoringError::OutOfRange {
                list: DraftList::Flashcards,
                index,
                len,
            })
    }

    fn question_mut(&mut self, index: usize) -> Result<&mut QuizItem, AuthoringError> {
        let len = self.draft.quiz.len();
        self.draft.quiz.get_mut(index).ok_or(AuthoringError::OutOfRange {
            list: DraftList::Quiz,
            index,
            len,
        })
    }
}

fn check_index(list: DraftList, index: usize, len: usize) -> Result<(), AuthoringError> {
    if index < len {
        Ok(())
    } else {
        Err(AuthoringError::OutOfRange { list, index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::model::CapsuleError;
    use classroom_core::time::fixed_clock;
    use std::sync::Arc;
    use storage::InMemoryStore;

    async fn new_session() -> AuthoringSession {
        let store = CapsuleStore::new(fixed_clock(), Arc::new(InMemoryStore::new()));
        AuthoringSession::open(store, None, SessionTimings::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn new_draft_has_id_and_defaults() {
        let session = new_session().await;
        assert!(session.is_new());
        assert!(session.id().as_str().starts_with("capsule-"));
        assert_eq!(session.draft().id.as_ref(), Some(session.id()));
        assert_eq!(session.draft().meta.level, Level::Beginner);
    }

    #[tokio::test]
    async fn add_notes_splits_lines_and_rejects_blank() {
        let mut session = new_session().await;
        assert!(matches!(
            session.add_notes("  \n\t\n"),
            Err(AuthoringError::EmptyNote)
        ));
        assert_eq!(session.add_notes("first\n  second  \n\nthird").unwrap(), 3);
        assert_eq!(session.draft().notes, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn removing_by_position_reindexes() {
        let mut session = new_session().await;
        session.add_notes("a\nb\nc").unwrap();
        assert_eq!(session.remove_note(1).unwrap(), "b");
        assert_eq!(session.draft().notes, ["a", "c"]);
        assert!(matches!(
            session.remove_note(2),
            Err(AuthoringError::OutOfRange {
                list: DraftList::Notes,
                index: 2,
                len: 2
            })
        ));

        let first = session.add_flashcard();
        let second = session.add_flashcard();
        session.set_flashcard_front(first, "one").unwrap();
        session.set_flashcard_front(second, "two").unwrap();
        session.remove_flashcard(first).unwrap();
        session.set_flashcard_back(0, "back of two").unwrap();
        assert_eq!(
            session.draft().flashcards,
            [Flashcard::new("two", "back of two")]
        );
    }

    #[tokio::test]
    async fn quiz_edits_address_question_and_choice() {
        let mut session = new_session().await;
        let q = session.add_question();
        session.set_question(q, "2 + 2?").unwrap();
        session.set_choice(q, 0, "3").unwrap();
        session.set_choice(q, 3, "4").unwrap();
        session.set_correct_index(q, 3).unwrap();

        assert!(matches!(
            session.set_choice(q, 4, "5"),
            Err(AuthoringError::OutOfRange {
                list: DraftList::Choices,
                ..
            })
        ));
        assert!(matches!(
            session.set_correct_index(9, 0),
            Err(AuthoringError::OutOfRange {
                list: DraftList::Quiz,
                ..
            })
        ));
        assert_eq!(
            session.draft().quiz,
            [QuizItem::new("2 + 2?", ["3", "", "", "4"], 3)]
        );

        session.remove_question(q).unwrap();
        assert!(session.draft().quiz.is_empty());
    }

    #[tokio::test]
    async fn last_write_wins_on_same_field() {
        let mut session = new_session().await;
        session.set_title("Draft title");
        session.set_title("Final title");
        session.set_subject("Chem");
        session.set_level(Level::Advanced);
        session.set_description("Atoms");
        assert_eq!(session.draft().meta.title, "Final title");
        assert_eq!(session.draft().meta.level, Level::Advanced);
    }

    #[tokio::test]
    async fn explicit_save_surfaces_reason() {
        let mut session = new_session().await;
        session.add_notes("content").unwrap();
        assert!(matches!(
            session.save().await,
            Err(AuthoringError::Rejected(CapsuleError::MissingTitle))
        ));

        session.set_title("Titled");
        session.clear_notes();
        assert!(matches!(
            session.save().await,
            Err(AuthoringError::Rejected(CapsuleError::NoContent))
        ));

        session.add_notes("content").unwrap();
        let id = session.save().await.unwrap();
        assert_eq!(&id, session.id());
        assert!(!session.is_new());
        assert!(!session.has_pending_autosave());
    }

    #[tokio::test]
    async fn draft_keeps_blank_rows_after_save() {
        let mut session = new_session().await;
        session.set_title("Cards");
        let filled = session.add_flashcard();
        session.set_flashcard_front(filled, "front").unwrap();
        session.add_flashcard();
        session.save().await.unwrap();
        assert_eq!(session.draft().flashcards.len(), 2);
    }
}
