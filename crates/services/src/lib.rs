#![forbid(unsafe_code)]

pub mod app_services;
pub mod authoring;
pub mod error;
pub mod learning;
pub mod library_service;
pub mod schedule;
pub mod timings;

pub use classroom_core::Clock;

pub use app_services::AppServices;
pub use authoring::AuthoringSession;
pub use error::{AppServicesError, AuthoringError, DraftList, LearningError, LibraryError};
pub use learning::{
    AnswerOutcome, CardView, ChoiceFeedback, LearningSession, QuestionView, QuizOutcome,
};
pub use library_service::{ExportedCapsule, LibraryService};
pub use schedule::ScheduledTask;
pub use timings::SessionTimings;
