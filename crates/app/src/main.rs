use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use classroom_core::model::CapsuleId;
use services::{AppServices, Clock, SessionTimings};
use tracing_subscriber::EnvFilter;
use ui::{Route, ViewError};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingOperand { command: &'static str },
    UnknownArg(String),
    UnexpectedArg(String),
    InvalidMillis { flag: &'static str, raw: String },
    InvalidCapsuleId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingOperand { command } => write!(f, "{command} requires an argument"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnexpectedArg(arg) => write!(f, "unexpected argument: {arg}"),
            ArgsError::InvalidMillis { flag, raw } => {
                write!(f, "invalid {flag} value: {raw} (expected milliseconds)")
            }
            ArgsError::InvalidCapsuleId { raw } => write!(f, "invalid capsule id: {raw:?}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  pocket-classroom [options] [open] <route>   # /library, /author/new, /learn/<id>");
    eprintln!("  pocket-classroom [options] library");
    eprintln!("  pocket-classroom [options] author [<id>|new]");
    eprintln!("  pocket-classroom [options] learn <id>");
    eprintln!("  pocket-classroom [options] import <file>");
    eprintln!("  pocket-classroom [options] export <id> [--out <dir>]");
    eprintln!("  pocket-classroom [options] delete <id>");
    eprintln!("  pocket-classroom [options] clear");
    eprintln!("  pocket-classroom [options] sample");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>        default sqlite://<cwd>/classroom.sqlite3");
    eprintln!("  --autosave-ms <ms>       idle time before edits are saved (800)");
    eprintln!("  --quiz-delay-ms <ms>     time answer feedback stays up (800)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CLASSROOM_DB_URL, CLASSROOM_AUTOSAVE_MS, CLASSROOM_QUIZ_DELAY_MS, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Open(Route),
    Import { file: PathBuf },
    Export { id: CapsuleId, out_dir: PathBuf },
    Delete { id: CapsuleId },
    Clear,
    Sample,
}

#[derive(Debug)]
struct Args {
    db_url: String,
    timings: SessionTimings,
    command: Command,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("CLASSROOM_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(
                || normalize_sqlite_url("classroom.sqlite3".into()),
                normalize_sqlite_url,
            );
        let mut timings = SessionTimings::default();
        if let Some(window) = env_millis("CLASSROOM_AUTOSAVE_MS") {
            timings = timings.with_autosave_window(window);
        }
        if let Some(delay) = env_millis("CLASSROOM_QUIZ_DELAY_MS") {
            timings = timings.with_quiz_feedback_delay(delay);
        }
        let mut out_dir = None;
        let mut operands = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--autosave-ms" => {
                    let value = require_value(&mut args, "--autosave-ms")?;
                    timings = timings.with_autosave_window(parse_millis("--autosave-ms", value)?);
                }
                "--quiz-delay-ms" => {
                    let value = require_value(&mut args, "--quiz-delay-ms")?;
                    timings =
                        timings.with_quiz_feedback_delay(parse_millis("--quiz-delay-ms", value)?);
                }
                "--out" => out_dir = Some(PathBuf::from(require_value(&mut args, "--out")?)),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => operands.push(arg),
            }
        }

        let command = parse_command(operands, out_dir)?;
        Ok(Self {
            db_url,
            timings,
            command,
        })
    }
}

fn parse_command(operands: Vec<String>, out_dir: Option<PathBuf>) -> Result<Command, ArgsError> {
    let mut operands = operands.into_iter();
    let first = operands.next();
    let second = operands.next();
    if let Some(extra) = operands.next() {
        return Err(ArgsError::UnexpectedArg(extra));
    }

    let command = match (first.as_deref(), second) {
        (None, _) => Command::Open(Route::Library),
        (Some("open"), Some(path)) => Command::Open(Route::parse(&path)),
        (Some("open"), None) => Command::Open(Route::Library),
        (Some(path), None) if path.starts_with('/') || path.starts_with('#') => {
            Command::Open(Route::parse(path))
        }
        (Some("library"), None) => Command::Open(Route::Library),
        (Some("author"), None) => Command::Open(Route::Author { id: None }),
        (Some("author"), Some(id)) if id == "new" => Command::Open(Route::Author { id: None }),
        (Some("author"), Some(id)) => Command::Open(Route::Author {
            id: Some(capsule_id(id)?),
        }),
        (Some("learn"), Some(id)) => Command::Open(Route::Learn { id: capsule_id(id)? }),
        (Some("learn"), None) => return Err(ArgsError::MissingOperand { command: "learn" }),
        (Some("import"), Some(file)) => Command::Import {
            file: PathBuf::from(file),
        },
        (Some("import"), None) => return Err(ArgsError::MissingOperand { command: "import" }),
        (Some("export"), Some(id)) => Command::Export {
            id: capsule_id(id)?,
            out_dir: out_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        },
        (Some("export"), None) => return Err(ArgsError::MissingOperand { command: "export" }),
        (Some("delete"), Some(id)) => Command::Delete { id: capsule_id(id)? },
        (Some("delete"), None) => return Err(ArgsError::MissingOperand { command: "delete" }),
        (Some("clear"), None) => Command::Clear,
        (Some("sample"), None) => Command::Sample,
        (Some(_), Some(extra)) => return Err(ArgsError::UnexpectedArg(extra)),
        (Some(other), None) => return Err(ArgsError::UnknownArg(other.to_owned())),
    };
    if out_dir.is_some() && !matches!(command, Command::Export { .. }) {
        return Err(ArgsError::UnexpectedArg("--out".into()));
    }
    Ok(command)
}

fn capsule_id(raw: String) -> Result<CapsuleId, ArgsError> {
    CapsuleId::new(raw.as_str()).map_err(|_| ArgsError::InvalidCapsuleId { raw })
}

fn parse_millis(flag: &'static str, raw: String) -> Result<Duration, ArgsError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ArgsError::InvalidMillis { flag, raw })
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Opening and migrating the database stays in the binary glue.
    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(&parsed.db_url, Clock::system(), parsed.timings).await?;
    tracing::debug!(db = %parsed.db_url, "storage ready");

    let library = app.library();
    match parsed.command {
        Command::Open(route) => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut out = std::io::stdout();
            if let Err(err) = ui::run(&app, route, &mut input, &mut out).await {
                tracing::error!(error = %err, "view failed");
                eprintln!("{}", ViewError::message());
                return Err(err.into());
            }
        }
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            let id = library.import_json(&text).await?;
            println!("Imported {id}.");
        }
        Command::Export { id, out_dir } => {
            let exported = library.export(&id).await?;
            std::fs::create_dir_all(&out_dir)?;
            let path = out_dir.join(&exported.file_name);
            std::fs::write(&path, exported.json)?;
            println!("Exported to {}.", path.display());
        }
        Command::Delete { id } => {
            library.delete(&id).await?;
            println!("Deleted {id}.");
        }
        Command::Clear => {
            library.clear_all().await?;
            println!("All capsules and progress removed.");
        }
        Command::Sample => {
            let id = library.add_sample().await?;
            println!("Added sample capsule {id}.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
