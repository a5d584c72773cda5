mod author_vm;
mod library_vm;
mod study_vm;
mod time_fmt;

pub use author_vm::draft_text;
pub use library_vm::{LibraryRowVm, map_library_rows};
pub use study_vm::{card_text, feedback_text, question_text, result_text};
pub use time_fmt::time_ago;
