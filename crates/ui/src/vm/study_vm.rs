use classroom_core::model::QuizResult;
use services::{CardView, ChoiceFeedback, QuestionView};

/// Text for the flashcard under the cursor, showing whichever side is up.
#[must_use]
pub fn card_text(view: &CardView<'_>) -> String {
    let (side, text) = if view.face_up {
        ("Back", view.card.back.as_str())
    } else {
        ("Front", view.card.front.as_str())
    };
    let known = if view.known { "  [known]" } else { "" };
    format!(
        "Card {}/{}{known}\n  {side}: {}",
        view.index + 1,
        view.total,
        display_or_dash(text)
    )
}

/// The question with numbered choices; after a pick, the correct choice and
/// the pick are flagged.
#[must_use]
pub fn question_text(view: &QuestionView<'_>) -> String {
    let mut lines = vec![format!(
        "Question {}/{}: {}",
        view.index + 1,
        view.total,
        view.item.question
    )];
    for (i, choice) in view.item.choices.iter().enumerate() {
        let marker = match view.pick {
            Some(_) if view.item.is_correct(i) => " ✓",
            Some(pick) if pick == i => " ✗",
            _ => "",
        };
        lines.push(format!(
            "  {}) {}{marker}",
            i + 1,
            display_or_dash(choice)
        ));
    }
    lines.join("\n")
}

#[must_use]
pub fn feedback_text(feedback: ChoiceFeedback) -> String {
    if feedback.correct {
        "Correct!".to_owned()
    } else {
        format!("Wrong. The answer was {}.", feedback.correct_index + 1)
    }
}

#[must_use]
pub fn result_text(result: QuizResult) -> String {
    format!(
        "Quiz finished. Score: {}/{} ({}%)",
        result.score, result.total, result.percent
    )
}

fn display_or_dash(text: &str) -> &str {
    if text.is_empty() { "-" } else { text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::model::{Flashcard, QuizItem};

    #[test]
    fn card_shows_the_side_that_is_up() {
        let card = Flashcard::new("H2O", "");
        let mut view = CardView {
            index: 1,
            total: 3,
            card: &card,
            face_up: false,
            known: true,
        };
        assert_eq!(card_text(&view), "Card 2/3  [known]\n  Front: H2O");
        view.face_up = true;
        view.known = false;
        assert_eq!(card_text(&view), "Card 2/3\n  Back: -");
    }

    #[test]
    fn answered_question_flags_pick_and_answer() {
        let item = QuizItem::new("Largest planet?", ["Mars", "Jupiter", "Venus", "Earth"], 1);
        let view = QuestionView {
            index: 0,
            total: 2,
            item: &item,
            pick: Some(0),
        };
        let text = question_text(&view);
        assert!(text.starts_with("Question 1/2: Largest planet?"));
        assert!(text.contains("1) Mars ✗"));
        assert!(text.contains("2) Jupiter ✓"));
        assert!(text.contains("3) Venus\n"));
    }

    #[test]
    fn feedback_and_result_wording() {
        assert_eq!(
            feedback_text(ChoiceFeedback {
                correct: false,
                correct_index: 2
            }),
            "Wrong. The answer was 3."
        );
        let result = QuizResult {
            score: 2,
            total: 3,
            percent: 67,
        };
        assert_eq!(result_text(result), "Quiz finished. Score: 2/3 (67%)");
    }
}
