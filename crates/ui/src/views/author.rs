use std::io::{BufRead, Write};

use classroom_core::model::{CapsuleId, Level};
use services::{AppServices, AuthoringError, AuthoringSession};

use crate::routes::Route;
use crate::views::{ViewError, confirm, parse_position, read_command, split_command};
use crate::vm::draft_text;

const HELP: &str = "\
Commands (positions start at 1):
  show                          print the draft
  title|subject|desc <text>     set metadata
  level <beginner|intermediate|advanced>
  note <text>                   add a note
  rmnote <n>  |  clearnotes     remove notes
  card <front> | <back>         add a flashcard
  front <n> <text>  |  back <n> <text>
  rmcard <n>                    remove a flashcard
  question <text>               add a question
  choice <q> <1-4> <text>       set a choice
  correct <q> <1-4>             mark the correct choice
  rmq <n>                       remove a question
  save                          save now
  learn                         save and study this capsule
  done                          save and return to the library";

/// The editor. Edits autosave after a short idle window; leaving the view
/// makes a final save attempt.
///
/// # Errors
///
/// Returns `ViewError` if the terminal or the storage medium fails.
pub async fn run_author<R: BufRead, W: Write>(
    app: &AppServices,
    id: Option<&CapsuleId>,
    input: &mut R,
    out: &mut W,
) -> Result<Option<Route>, ViewError> {
    let mut session = app.open_author(id).await?;
    if id.is_some() && session.is_new() {
        writeln!(out, "Capsule not found. Starting a new capsule.")?;
    }
    writeln!(out, "Editing {}", session.id())?;
    writeln!(out, "{}", draft_text(session.draft()))?;

    loop {
        let Some(line) = read_command(input, out, "author> ")? else {
            session.close().await;
            return Ok(None);
        };
        let (cmd, arg) = split_command(&line);
        match cmd {
            "done" | "quit" | "exit" | "q" => {
                session.close().await;
                return Ok(Some(Route::Library));
            }
            "learn" => {
                let id = session.id().clone();
                session.close().await;
                return Ok(Some(Route::Learn { id }));
            }
            "clearnotes" => {
                if confirm(input, out, "Clear all notes?")? {
                    session.clear_notes();
                }
            }
            "save" => match session.save().await {
                Ok(_) => writeln!(out, "Saved successfully.")?,
                Err(err) => report(err, out)?,
            },
            _ => match edit(&mut session, cmd, arg) {
                Ok(Some(message)) => writeln!(out, "{message}")?,
                Ok(None) => {}
                Err(err) => report(err, out)?,
            },
        }
    }
}

/// Apply one editing command, returning a message for the user if there is
/// one.
fn edit(
    session: &mut AuthoringSession,
    cmd: &str,
    arg: &str,
) -> Result<Option<String>, AuthoringError> {
    match cmd {
        "" => {}
        "help" | "?" => return Ok(Some(HELP.to_owned())),
        "show" => return Ok(Some(draft_text(session.draft()))),
        "title" => session.set_title(arg),
        "subject" => session.set_subject(arg),
        "desc" | "description" => session.set_description(arg),
        "level" => match arg.parse::<Level>() {
            Ok(level) => session.set_level(level),
            Err(err) => return Ok(Some(err.to_string())),
        },
        "note" => {
            session.add_notes(arg)?;
        }
        "rmnote" => return with_position(arg, |i| session.remove_note(i).map(drop)),
        "card" => {
            let (front, back) = arg.split_once('|').unwrap_or((arg, ""));
            let i = session.add_flashcard();
            session.set_flashcard_front(i, front.trim())?;
            session.set_flashcard_back(i, back.trim())?;
        }
        "front" => {
            let (pos, text) = split_command(arg);
            return with_position(pos, |i| session.set_flashcard_front(i, text));
        }
        "back" => {
            let (pos, text) = split_command(arg);
            return with_position(pos, |i| session.set_flashcard_back(i, text));
        }
        "rmcard" => return with_position(arg, |i| session.remove_flashcard(i).map(drop)),
        "question" => {
            let i = session.add_question();
            session.set_question(i, arg)?;
            return Ok(Some(format!(
                "Added question {n}. Set choices with `choice {n} <1-4> <text>`.",
                n = i + 1
            )));
        }
        "choice" => {
            let (pos, rest) = split_command(arg);
            let (choice, text) = split_command(rest);
            let (Some(q), Some(c)) = (parse_position(pos), parse_position(choice)) else {
                return Ok(Some("Usage: choice <question> <1-4> <text>".to_owned()));
            };
            session.set_choice(q, c, text)?;
        }
        "correct" => {
            let (pos, choice) = split_command(arg);
            let (Some(q), Some(c)) = (parse_position(pos), parse_position(choice)) else {
                return Ok(Some("Usage: correct <question> <1-4>".to_owned()));
            };
            session.set_correct_index(q, c)?;
        }
        "rmq" => return with_position(arg, |i| session.remove_question(i).map(drop)),
        other => return Ok(Some(format!("Unknown command `{other}`. Type `help`."))),
    }
    Ok(None)
}

fn with_position(
    raw: &str,
    apply: impl FnOnce(usize) -> Result<(), AuthoringError>,
) -> Result<Option<String>, AuthoringError> {
    match parse_position(raw) {
        Some(i) => apply(i).map(|()| None),
        None => Ok(Some("Expected a position number.".to_owned())),
    }
}

fn report<W: Write>(err: AuthoringError, out: &mut W) -> Result<(), ViewError> {
    match err {
        AuthoringError::Storage(_) => Err(err.into()),
        AuthoringError::OutOfRange { list, index, .. } => {
            writeln!(out, "There is no {list} {}.", index + 1)?;
            Ok(())
        }
        other => {
            writeln!(out, "{other}")?;
            Ok(())
        }
    }
}
