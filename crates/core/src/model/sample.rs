use crate::model::capsule::{CapsuleDraft, CapsuleMeta, Flashcard, Level, QuizItem};

/// The "Learning to Code" starter capsule.
///
/// Returned without an id; saving assigns one.
#[must_use]
pub fn learning_to_code() -> CapsuleDraft {
    CapsuleDraft {
        meta: CapsuleMeta {
            title: "Learning to Code".into(),
            subject: "Programming Basics".into(),
            level: Level::Beginner,
            description: "A simple capsule for trying out Pocket Classroom. Includes notes, \
                          flashcards, and a short quiz about programming."
                .into(),
        },
        notes: vec![
            "Programming is the process of writing instructions for computers to follow.".into(),
            "A variable stores data that can change during program execution.".into(),
            "Functions are reusable blocks of code that perform specific tasks.".into(),
        ],
        flashcards: vec![
            Flashcard::new(
                "What is a variable?",
                "A storage location identified by a name that holds data.",
            ),
            Flashcard::new(
                "What does a function do?",
                "It executes a block of code when called.",
            ),
            Flashcard::new(
                "What is JavaScript?",
                "A programming language used mainly for web development.",
            ),
        ],
        quiz: vec![
            QuizItem::new(
                "What is the purpose of a variable?",
                [
                    "To store data values",
                    "To perform math operations",
                    "To display text on screen",
                    "To connect to the internet",
                ],
                0,
            ),
            QuizItem::new(
                "Which keyword is used to declare a variable in JavaScript?",
                ["func", "let", "if", "print"],
                1,
            ),
            QuizItem::new(
                "Which of the following is a JavaScript function?",
                ["for", "while", "console.log()", "var"],
                2,
            ),
        ],
        ..CapsuleDraft::default()
    }
}
