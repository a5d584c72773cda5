use std::io::{BufRead, Write};
use std::path::Path;

use classroom_core::model::{CapsuleId, IndexEntry};
use services::{AppServices, LibraryError};

use crate::routes::Route;
use crate::views::{ViewError, confirm, parse_position, read_command, split_command};
use crate::vm::map_library_rows;

const HELP: &str = "\
Commands:
  list                    show the library
  new                     author a new capsule
  edit <n|id>             edit a capsule
  learn <n|id>            study a capsule
  export <n|id> [dir]     write a capsule to a JSON file
  import <file>           add a capsule from a JSON file
  delete <n|id>           delete a capsule and its progress
  sample                  add the \"Learning to Code\" sample
  clear                   remove all capsules and progress
  quit                    leave";

/// The library: list capsules and run library-wide actions.
///
/// # Errors
///
/// Returns `ViewError` if the terminal or the storage medium fails.
pub async fn run_library<R: BufRead, W: Write>(
    app: &AppServices,
    input: &mut R,
    out: &mut W,
) -> Result<Option<Route>, ViewError> {
    let library = app.library();
    let mut entries = library.list().await?;
    print_rows(app, &entries, out)?;

    loop {
        let Some(line) = read_command(input, out, "library> ")? else {
            return Ok(None);
        };
        let (cmd, arg) = split_command(&line);
        match cmd {
            "" | "list" | "ls" => {
                entries = library.list().await?;
                print_rows(app, &entries, out)?;
            }
            "help" | "?" => writeln!(out, "{HELP}")?,
            "new" => return Ok(Some(Route::Author { id: None })),
            "edit" => {
                if let Some(id) = resolve(&entries, arg, out)? {
                    return Ok(Some(Route::Author { id: Some(id) }));
                }
            }
            "learn" | "open" => {
                if let Some(id) = resolve(&entries, arg, out)? {
                    return Ok(Some(Route::Learn { id }));
                }
            }
            "export" => {
                let (target, dir) = split_command(arg);
                if let Some(id) = resolve(&entries, target, out)? {
                    let dir = if dir.is_empty() { "." } else { dir };
                    export(app, &id, Path::new(dir), out).await?;
                }
            }
            "import" => {
                if arg.is_empty() {
                    writeln!(out, "Usage: import <file>")?;
                    continue;
                }
                let text = match std::fs::read_to_string(arg) {
                    Ok(text) => text,
                    Err(err) => {
                        writeln!(out, "Cannot read {arg}: {err}")?;
                        continue;
                    }
                };
                match library.import_json(&text).await {
                    Ok(id) => writeln!(out, "Imported {id}.")?,
                    Err(err) => report(err, out)?,
                }
                entries = library.list().await?;
            }
            "delete" | "rm" => {
                let Some(id) = resolve(&entries, arg, out)? else {
                    continue;
                };
                if confirm(
                    input,
                    out,
                    "Are you sure you want to delete this capsule? This action cannot be undone.",
                )? {
                    library.delete(&id).await?;
                    writeln!(out, "Deleted {id}.")?;
                    entries = library.list().await?;
                    print_rows(app, &entries, out)?;
                }
            }
            "sample" => {
                let id = library.add_sample().await?;
                writeln!(out, "Added sample capsule {id}.")?;
                entries = library.list().await?;
                print_rows(app, &entries, out)?;
            }
            "clear" => {
                if confirm(
                    input,
                    out,
                    "Clear all storage? This will remove all capsules and progress.",
                )? {
                    library.clear_all().await?;
                    entries.clear();
                    print_rows(app, &entries, out)?;
                }
            }
            "quit" | "exit" | "q" => return Ok(None),
            other => writeln!(out, "Unknown command `{other}`. Type `help`.")?,
        }
    }
}

/// Write one capsule's exchange document into `dir`. A missing capsule or an
/// unwritable file is reported, not returned.
async fn export<W: Write>(
    app: &AppServices,
    id: &CapsuleId,
    dir: &Path,
    out: &mut W,
) -> Result<(), ViewError> {
    let exported = match app.library().export(id).await {
        Ok(exported) => exported,
        Err(err) => return report(err, out),
    };
    let path = dir.join(&exported.file_name);
    match std::fs::write(&path, exported.json) {
        Ok(()) => writeln!(out, "Exported to {}.", path.display())?,
        Err(err) => writeln!(out, "Cannot write {}: {err}", path.display())?,
    }
    Ok(())
}

fn print_rows<W: Write>(
    app: &AppServices,
    entries: &[IndexEntry],
    out: &mut W,
) -> Result<(), ViewError> {
    writeln!(out, "Library")?;
    if entries.is_empty() {
        writeln!(out, "No capsules yet. Type `new` to create one.")?;
        return Ok(());
    }
    for (i, row) in map_library_rows(entries, app.clock().now())
        .iter()
        .enumerate()
    {
        writeln!(out, "{}", row.line(i + 1))?;
    }
    Ok(())
}

/// A row number from the listing, or a capsule id typed out.
fn resolve<W: Write>(
    entries: &[IndexEntry],
    raw: &str,
    out: &mut W,
) -> Result<Option<CapsuleId>, ViewError> {
    if let Some(entry) = parse_position(raw).and_then(|i| entries.get(i)) {
        return Ok(Some(entry.id.clone()));
    }
    match CapsuleId::new(raw) {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            writeln!(out, "Which capsule? Give a row number or an id.")?;
            Ok(None)
        }
    }
}

/// Print what the user can act on; only storage failures propagate.
fn report<W: Write>(err: LibraryError, out: &mut W) -> Result<(), ViewError> {
    match err {
        LibraryError::Storage(_) => Err(err.into()),
        other => {
            writeln!(out, "{other}")?;
            Ok(())
        }
    }
}
