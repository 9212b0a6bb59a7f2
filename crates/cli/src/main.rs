mod config;
mod error;

use std::path::PathBuf;

use app::{App, Note};
use chrono::Local;
use clap::{Parser, Subcommand};
use safeauth::{Enforcer, Mode};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "defprog.toml";

#[derive(Parser)]
#[command(name = "defprog")]
#[command(about = "Notes guarded by privilege capabilities and trusted SQL", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Log authorization violations instead of enforcing them
    #[arg(long)]
    report_only: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the tables and default users
    Init,
    /// Exchange credentials for a session id
    Login {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        password: String,
    },
    /// Show the user and privileges behind a session
    Whoami {
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Manage notes
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },
}

#[derive(Subcommand)]
enum NotesCommand {
    /// List notes (requires read)
    List {
        #[arg(short, long)]
        session: Option<String>,
        /// Show only the newest N notes
        #[arg(short, long)]
        limit: Option<u32>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a note (requires write)
    Add {
        #[arg(short, long)]
        session: Option<String>,
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        body: String,
    },
    /// Delete a note (requires delete)
    Delete {
        #[arg(short, long)]
        session: Option<String>,
        id: i64,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;
    init_tracing(&config.log.filter);

    let mode = if cli.report_only {
        Mode::ReportOnly
    } else {
        config.auth.mode
    };
    if mode == Mode::ReportOnly {
        tracing::warn!("report-only mode: authorization violations are logged, not enforced");
    }

    let app = App::open(&config.database.path, Enforcer::new(mode))?;
    tracing::debug!(database = %config.database.path.display(), %mode, "application opened");
    bootstrap(&app)?;

    match cli.command {
        Commands::Init => cmd_init(&app, &config),
        Commands::Login { name, password } => cmd_login(&app, &name, &password),
        Commands::Whoami { session } => cmd_whoami(&app, session.as_deref()),
        Commands::Notes { command } => match command {
            NotesCommand::List {
                session,
                limit,
                json,
            } => cmd_notes_list(&app, session.as_deref(), limit, json),
            NotesCommand::Add {
                session,
                title,
                body,
            } => cmd_notes_add(&app, session.as_deref(), &title, &body),
            NotesCommand::Delete { session, id } => cmd_notes_delete(&app, session.as_deref(), id),
        },
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Runs with every privilege; the startup carrier does not outlive this call.
fn bootstrap(app: &App) -> Result<()> {
    let startup = app.startup_carrier()?;
    app.users().bootstrap(&startup)?;
    Ok(())
}

fn cmd_init(app: &App, config: &Config) -> Result<()> {
    let request = app.preprocess(None)?;
    let checked = app.enforcer().check(request.carrier(), &[])?;
    let count = app.users().count(&checked)?;
    println!(
        "Database ready at {} ({count} users)",
        config.database.path.display()
    );
    Ok(())
}

fn cmd_login(app: &App, name: &str, password: &str) -> Result<()> {
    let request = app.preprocess(None)?;
    // Anyone may attempt to log in.
    let checked = app.enforcer().check(request.carrier(), &[])?;
    let id = app
        .users()
        .authenticate(&checked, name, password)?
        .ok_or(Error::InvalidCredentials)?;
    tracing::info!(user = name, "logged in");
    println!("{id}");
    Ok(())
}

fn cmd_whoami(app: &App, session: Option<&str>) -> Result<()> {
    let request = app.preprocess(session)?;
    let name = request.user().map(|u| u.name.as_str()).unwrap_or("anonymous");
    let privileges = request
        .carrier()
        .privileges()
        .map(ToString::to_string)
        .unwrap_or_default();
    println!("{name} {privileges}");
    Ok(())
}

fn cmd_notes_list(app: &App, session: Option<&str>, limit: Option<u32>, json: bool) -> Result<()> {
    let request = app.preprocess(session)?;
    let notes = app.notes().list(&request, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }
    if notes.is_empty() {
        println!("No notes found.");
        return Ok(());
    }

    println!("{:<6}  {:<6}  {:<16}  TITLE", "ID", "OWNER", "CREATED");
    println!("{}", "-".repeat(60));
    for note in &notes {
        print_note(note);
    }
    Ok(())
}

fn print_note(note: &Note) {
    let created = note
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M");
    // Truncate long titles for display
    let title = if note.title.chars().count() > 40 {
        format!("{}...", note.title.chars().take(40).collect::<String>())
    } else {
        note.title.clone()
    };
    println!("{:<6}  {:<6}  {:<16}  {title}", note.id, note.owner.0, created.to_string());
}

fn cmd_notes_add(app: &App, session: Option<&str>, title: &str, body: &str) -> Result<()> {
    let request = app.preprocess(session)?;
    let note = app.notes().create(&request, title, body)?;
    println!("Created note {}", note.id);
    Ok(())
}

fn cmd_notes_delete(app: &App, session: Option<&str>, id: i64) -> Result<()> {
    let request = app.preprocess(session)?;
    app.notes().delete(&request, id)?;
    println!("Deleted note {id}");
    Ok(())
}
