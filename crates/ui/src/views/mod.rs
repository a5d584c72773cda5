//! Line-driven views. Each view reads commands from any `BufRead`, writes to
//! any `Write`, and hands back the route to show next (`None` ends the run).

use std::io::{self, BufRead, Write};

use services::AppServices;

use crate::routes::Route;

mod author;
mod learn;
mod library;
mod state;

pub use author::run_author;
pub use learn::run_learn;
pub use library::run_library;
pub use state::ViewError;

/// Show `route` and keep following navigation until a view ends the run.
///
/// # Errors
///
/// Returns `ViewError` if the terminal or the storage medium fails.
pub async fn run<R: BufRead, W: Write>(
    app: &AppServices,
    route: Route,
    input: &mut R,
    out: &mut W,
) -> Result<(), ViewError> {
    let mut next = Some(route);
    while let Some(route) = next {
        tracing::debug!(%route, "navigating");
        next = run_route(app, route, input, out).await?;
    }
    Ok(())
}

/// Show a single view.
///
/// # Errors
///
/// Returns `ViewError` if the terminal or the storage medium fails.
pub async fn run_route<R: BufRead, W: Write>(
    app: &AppServices,
    route: Route,
    input: &mut R,
    out: &mut W,
) -> Result<Option<Route>, ViewError> {
    match route {
        Route::Library => run_library(app, input, out).await,
        Route::Author { id } => run_author(app, id.as_ref(), input, out).await,
        Route::Learn { id } => run_learn(app, &id, input, out).await,
    }
}

/// Print `prompt` and read one trimmed line; `None` at end of input.
pub(crate) fn read_command<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

/// Ask a yes/no question; anything but `y`/`yes` declines.
pub(crate) fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    question: &str,
) -> io::Result<bool> {
    let answer = read_command(input, out, &format!("{question} [y/N] "))?;
    Ok(answer.is_some_and(|a| matches!(a.to_ascii_lowercase().as_str(), "y" | "yes")))
}

/// Split `"cmd rest of line"` into the command word and its argument text.
pub(crate) fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    }
}

/// Parse a 1-based position into an index.
pub(crate) fn parse_position(raw: &str) -> Option<usize> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
}
