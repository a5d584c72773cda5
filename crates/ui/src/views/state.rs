use std::io;

use services::{AuthoringError, LearningError, LibraryError};
use thiserror::Error;

/// Failures a view cannot recover from by printing a message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ViewError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Authoring(#[from] AuthoringError),
    #[error(transparent)]
    Learning(#[from] LearningError),
}

impl ViewError {
    #[must_use]
    pub fn message() -> &'static str {
        "Something went wrong. Please try again."
    }
}
