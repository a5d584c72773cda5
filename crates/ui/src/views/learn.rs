use std::io::{BufRead, Write};

use classroom_core::model::{CapsuleId, QuizState};
use services::{AppServices, LearningError, LearningSession};

use crate::routes::Route;
use crate::views::{ViewError, read_command, split_command};
use crate::vm::{card_text, feedback_text, question_text, result_text};

const HELP: &str = "\
Commands:
  notes                 list the notes
  card                  show the current flashcard
  flip | next | prev    work the flashcards
  known | unknown       mark the current flashcard
  quiz                  show the current question
  1-4                   answer the current question
  retry                 restart the quiz
  edit                  edit this capsule
  back                  return to the library";

/// Study one capsule.
///
/// # Errors
///
/// Returns `ViewError` if the terminal or the storage medium fails.
pub async fn run_learn<R: BufRead, W: Write>(
    app: &AppServices,
    id: &CapsuleId,
    input: &mut R,
    out: &mut W,
) -> Result<Option<Route>, ViewError> {
    let Some(mut session) = app.open_learn(id).await? else {
        writeln!(out, "Capsule not found.")?;
        return Ok(Some(Route::Library));
    };

    let meta = session.capsule().meta();
    writeln!(out, "{}", meta.title)?;
    writeln!(out, "{} · {}", meta.subject, meta.level)?;
    if !meta.description.is_empty() {
        writeln!(out, "{}", meta.description)?;
    }
    writeln!(out, "Best score: {}%", session.progress().best_score)?;
    print_notes(&session, out)?;
    print_card(&session, out)?;
    print_quiz(&session, out)?;

    loop {
        let Some(line) = read_command(input, out, "learn> ")? else {
            return Ok(None);
        };
        let (cmd, _) = split_command(&line);
        match cmd {
            "" => {}
            "help" | "?" => writeln!(out, "{HELP}")?,
            "notes" => print_notes(&session, out)?,
            "card" => print_card(&session, out)?,
            "flip" | "f" => {
                session.flip_card();
                print_card(&session, out)?;
            }
            "next" | "n" => {
                session.next_card();
                print_card(&session, out)?;
            }
            "prev" | "p" => {
                session.prev_card();
                print_card(&session, out)?;
            }
            "known" => {
                if session.mark_known().await? {
                    writeln!(out, "Marked as known.")?;
                }
                print_card(&session, out)?;
            }
            "unknown" => {
                if session.mark_unknown().await? {
                    writeln!(out, "Marked as unknown.")?;
                }
                print_card(&session, out)?;
            }
            "quiz" => print_quiz(&session, out)?,
            pick if pick.bytes().all(|b| b.is_ascii_digit()) => {
                answer(&mut session, pick, out).await?;
            }
            "retry" => {
                session.retry_quiz();
                print_quiz(&session, out)?;
            }
            "edit" => {
                return Ok(Some(Route::Author {
                    id: Some(session.capsule().id().clone()),
                }));
            }
            "back" | "quit" | "exit" | "q" => return Ok(Some(Route::Library)),
            other => writeln!(out, "Unknown command `{other}`. Type `help`.")?,
        }
    }
}

async fn answer<W: Write>(
    session: &mut LearningSession,
    typed: &str,
    out: &mut W,
) -> Result<(), ViewError> {
    let pick = typed
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .unwrap_or(usize::MAX);
    let feedback = match session.select_choice(pick) {
        Ok(Some(feedback)) => feedback,
        Ok(None) => {
            if session.quiz_state().is_none() {
                writeln!(out, "This capsule has no quiz.")?;
            } else {
                writeln!(out, "Nothing to answer. Type `retry` to start over.")?;
            }
            return Ok(());
        }
        Err(LearningError::InvalidChoice(_)) => {
            writeln!(out, "Pick 1 to 4.")?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if let Some(view) = session.current_question() {
        writeln!(out, "{}", question_text(&view))?;
    }
    writeln!(out, "{}", feedback_text(feedback))?;
    out.flush()?;

    match session.continue_quiz().await? {
        Some(outcome) => {
            writeln!(out, "{}", result_text(outcome.result))?;
            if outcome.new_best {
                writeln!(out, "New best score saved: {}%", outcome.result.percent)?;
            }
            writeln!(out, "Type `retry` to try again.")?;
        }
        None => print_quiz(session, out)?,
    }
    Ok(())
}

fn print_notes<W: Write>(session: &LearningSession, out: &mut W) -> Result<(), ViewError> {
    if session.notes().is_empty() {
        writeln!(out, "No notes.")?;
        return Ok(());
    }
    writeln!(out, "Notes:")?;
    for note in session.notes() {
        writeln!(out, "  - {note}")?;
    }
    Ok(())
}

fn print_card<W: Write>(session: &LearningSession, out: &mut W) -> Result<(), ViewError> {
    match session.current_card() {
        Some(view) => writeln!(
            out,
            "{}\n  Known: {}/{}",
            card_text(&view),
            session.known_count(),
            view.total
        )?,
        None => writeln!(out, "No flashcards.")?,
    }
    Ok(())
}

fn print_quiz<W: Write>(session: &LearningSession, out: &mut W) -> Result<(), ViewError> {
    match session.quiz_state() {
        None => writeln!(out, "No quiz.")?,
        Some(QuizState::Finished { .. }) => {
            if let Some(result) = session.quiz_result() {
                writeln!(out, "{}", result_text(result))?;
            }
        }
        Some(_) => {
            if let Some(view) = session.current_question() {
                writeln!(out, "{}", question_text(&view))?;
            }
        }
    }
    Ok(())
}
