use std::time::Duration;

/// Idle time before edits are autosaved.
pub const DEFAULT_AUTOSAVE_WINDOW: Duration = Duration::from_millis(800);

/// How long answer feedback stays up before the quiz moves on.
pub const DEFAULT_QUIZ_FEEDBACK_DELAY: Duration = Duration::from_millis(800);

/// Timer settings shared by authoring and learning sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    pub autosave_window: Duration,
    pub quiz_feedback_delay: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            autosave_window: DEFAULT_AUTOSAVE_WINDOW,
            quiz_feedback_delay: DEFAULT_QUIZ_FEEDBACK_DELAY,
        }
    }
}

impl SessionTimings {
    #[must_use]
    pub fn with_autosave_window(mut self, window: Duration) -> Self {
        self.autosave_window = window;
        self
    }

    #[must_use]
    pub fn with_quiz_feedback_delay(mut self, delay: Duration) -> Self {
        self.quiz_feedback_delay = delay;
        self
    }
}
