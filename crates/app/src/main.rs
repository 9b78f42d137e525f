use std::fmt;
use std::sync::Arc;

use drive_core::time::Clock;
use services::api::ApiConfig;
use services::app_services::AppServices;
use services::connectivity::AssumeOnline;
use services::session_manager::{ServerHealth, SessionManager};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidApiUrl { raw: String },
    MissingCredentials,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api value: {raw}"),
            ArgsError::MissingCredentials => {
                write!(f, "login requires --email and --password")
            }
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
    eprintln!("  cargo run -p app -- status   [--db <sqlite_url>] [--api <base_url>]");
    eprintln!("  cargo run -p app -- login    --email <email> --password <password>");
    eprintln!("  cargo run -p app -- logout");
    eprintln!("  cargo run -p app -- tickets");
    eprintln!("  cargo run -p app -- progress");
    eprintln!("  cargo run -p app -- results");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:drive.sqlite3");
    eprintln!("  --api http://127.0.0.1:8080/api");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DRIVE_DB_URL, DRIVE_API_BASE_URL");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Status,
    Login,
    Logout,
    Tickets,
    Progress,
    Results,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "status" => Some(Self::Status),
            "login" => Some(Self::Login),
            "logout" => Some(Self::Logout),
            "tickets" => Some(Self::Tickets),
            "progress" => Some(Self::Progress),
            "results" => Some(Self::Results),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    api_base: String,
    email: Option<String>,
    password: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("DRIVE_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://drive.sqlite3".into(), normalize_sqlite_url);
        let mut api_base =
            std::env::var("DRIVE_API_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080/api".into());
        let mut email = None;
        let mut password = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api" => {
                    let value = require_value(args, "--api")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                    api_base = value;
                }
                "--email" => email = Some(require_value(args, "--email")?),
                "--password" => password = Some(require_value(args, "--password")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            api_base,
            email,
            password,
        })
    }
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
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
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
    if !std::path::Path::new(path).exists() {
        std::fs::File::create(path)?;
    }
    Ok(())
}

async fn restore_session(app: &AppServices) -> Arc<SessionManager> {
    let session = app.session();
    session.initialize(&AssumeOnline).await;
    // periodic health probe runs until shutdown() at command exit
    session.spawn_health_loop();
    session
}

fn health_label(health: ServerHealth) -> &'static str {
    match health {
        ServerHealth::Unknown => "unknown",
        ServerHealth::Healthy => "healthy",
        ServerHealth::Unhealthy => "unhealthy",
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    argv.remove(0);

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup so services see a ready store.
    prepare_sqlite_file(&parsed.db_url)?;
    let config = ApiConfig::new(&parsed.api_base)
        .map_err(|_| ArgsError::InvalidApiUrl {
            raw: parsed.api_base.clone(),
        })?;
    let app = AppServices::new_sqlite(&config, &parsed.db_url, Clock::default()).await?;

    match cmd {
        Command::Status => {
            let session = restore_session(&app).await;
            println!("server:        {}", health_label(session.server_health().await));
            println!("authenticated: {}", session.is_authenticated().await);
            if let Some(identity) = session.identity().await {
                println!("user id:       {}", identity.user_id);
                println!("roles:         {}", identity.roles.join(", "));
            }
            session.shutdown();
        }
        Command::Login => {
            let (Some(email), Some(password)) = (parsed.email, parsed.password) else {
                eprintln!("{}", ArgsError::MissingCredentials);
                print_usage();
                return Err(ArgsError::MissingCredentials.into());
            };
            let session = restore_session(&app).await;
            if session.login(&email, &password).await {
                let user = session.user_id().await.unwrap_or_default();
                println!("logged in as user {user}");
                session.shutdown();
            } else {
                session.shutdown();
                return Err("login failed".into());
            }
        }
        Command::Logout => {
            let session = app.session();
            session.logout().await;
            println!("logged out");
        }
        Command::Tickets => {
            let session = restore_session(&app).await;
            let summaries = app.tickets().list_tickets().await?;
            for summary in summaries {
                println!(
                    "ticket {:>3}  {} questions",
                    summary.ticket_number, summary.question_numbers
                );
            }
            session.shutdown();
        }
        Command::Progress => {
            let summaries = app.tickets().progress_summaries().await?;
            if summaries.is_empty() {
                println!("no practice answers recorded yet");
            }
            for summary in summaries {
                println!(
                    "ticket {:>3}  {} correct / {} incorrect",
                    summary.ticket_number, summary.correct, summary.incorrect
                );
            }
        }
        Command::Results => {
            let results = app.tickets().exam_results().await?;
            if results.is_empty() {
                println!("no exam attempts recorded yet");
            }
            for result in results {
                let verdict = if result.passed { "passed" } else { "failed" };
                println!(
                    "{}  ticket {:>3}  {verdict}  {} answered, {} errors",
                    result.exam_date.format("%Y-%m-%d %H:%M"),
                    result.ticket_number,
                    result.correct_answers,
                    result.incorrect_answers
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
