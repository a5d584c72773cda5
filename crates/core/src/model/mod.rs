mod capsule;
pub mod exchange;
mod ids;
mod index;
mod progress;
pub mod sample;
pub mod study;

pub use capsule::{
    CHOICES_PER_QUESTION, Capsule, CapsuleDraft, CapsuleError, CapsuleMeta, Flashcard, Level,
    ParseLevelError, QuizItem, SCHEMA_TAG,
};
pub use exchange::ExchangeError;
pub use ids::{CapsuleId, ParseIdError};
pub use index::{IndexEntry, remove_entry, upsert_entry};
pub use progress::Progress;
pub use study::{FlashcardCursor, QuizResult, QuizRun, QuizState};
