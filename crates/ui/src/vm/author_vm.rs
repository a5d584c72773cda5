use classroom_core::model::CapsuleDraft;

/// Full listing of a draft with 1-based positions, as the author commands
/// address them.
#[must_use]
pub fn draft_text(draft: &CapsuleDraft) -> String {
    let meta = &draft.meta;
    let mut lines = vec![
        format!("Title:       {}", meta.title),
        format!("Subject:     {}", meta.subject),
        format!("Level:       {}", meta.level),
        format!("Description: {}", meta.description),
        format!("Notes ({}):", draft.notes.len()),
    ];
    for (i, note) in draft.notes.iter().enumerate() {
        lines.push(format!("  {}. {note}", i + 1));
    }

    lines.push(format!("Flashcards ({}):", draft.flashcards.len()));
    for (i, card) in draft.flashcards.iter().enumerate() {
        lines.push(format!("  {}. {} | {}", i + 1, card.front, card.back));
    }

    lines.push(format!("Quiz ({}):", draft.quiz.len()));
    for (i, item) in draft.quiz.iter().enumerate() {
        lines.push(format!("  {}. {}", i + 1, item.question));
        for (j, choice) in item.choices.iter().enumerate() {
            let mark = if item.is_correct(j) { "*" } else { " " };
            lines.push(format!("     {mark}{}) {choice}", j + 1));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::model::{Flashcard, QuizItem};

    #[test]
    fn lists_every_section_with_positions() {
        let mut draft = CapsuleDraft::default();
        draft.meta.title = "Rust".into();
        draft.notes = vec!["Ownership".into(), "Borrowing".into()];
        draft.flashcards = vec![Flashcard::new("move", "transfer")];
        draft.quiz = vec![QuizItem::new("Keyword?", ["let", "var", "", ""], 0)];

        let text = draft_text(&draft);
        assert!(text.contains("Title:       Rust"));
        assert!(text.contains("Level:       Beginner"));
        assert!(text.contains("  2. Borrowing"));
        assert!(text.contains("  1. move | transfer"));
        assert!(text.contains("     *1) let"));
        assert!(text.contains("      2) var"));
    }
}
