//! ticketdesk - Ticket system setup wizard
//!
//! Drives the per-tenant setup wizard from recorded administrator events and
//! inspects the stored ticket settings.
//!
//! ## Usage
//!
//! ```bash
//! # Replay a file of wizard events (one JSON object per line)
//! ticketdesk replay events.jsonl --options entities.yaml
//!
//! # Show what is stored for a tenant
//! ticketdesk show 112233445566778899
//!
//! # With verbose logging and a custom log directory
//! ticketdesk -v --log-dir /path/to/logs/ replay events.jsonl
//! ```

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ticketdesk_core::logging::default_home_dir;
use ticketdesk_core::{LogGuard, TenantId, TicketdeskError, init_logging};
use ticketdesk_store::{SettingsStore, SqliteSettingsStore};
use ticketdesk_wizard::{
    RecordingPublisher, Render, Reply, StaticDirectory, Summary, WizardConfig, WizardEngine,
    WizardError, WizardEvent,
};
use tracing::{error, info};

/// Ticket system setup wizard
///
/// Replays administrator interactions through the setup wizard and shows the
/// resulting per-tenant ticket settings.
#[derive(Parser, Debug)]
#[command(name = "ticketdesk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.ticketdesk/logs/)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed recorded wizard events through the engine
    Replay {
        /// File with one JSON wizard event per line
        events: PathBuf,

        /// Settings database (defaults to ~/.ticketdesk/ticket_settings.db)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Wizard configuration file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Selectable categories, roles and text channels (YAML)
        #[arg(long)]
        options: Option<PathBuf>,

        /// Print replies as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the stored settings of a tenant
    Show {
        /// Tenant (guild) id
        tenant_id: TenantId,

        /// Settings database (defaults to ~/.ticketdesk/ticket_settings.db)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("ticketdesk error: {:#}", e);
            eprintln!("Error: {:#}", e);
            let cause = e.downcast_ref::<TicketdeskError>().or_else(|| {
                match e.downcast_ref::<WizardError>() {
                    Some(WizardError::Config(inner)) => Some(inner),
                    _ => None,
                }
            });
            if let Some(guidance) = cause.and_then(TicketdeskError::guidance) {
                eprintln!("\n{}", guidance);
            }
            ExitCode::from(1)
        }
    }
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> ticketdesk_core::Result<LogGuard> {
    init_logging(cli.log_dir.clone(), cli.verbose > 0)
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Replay {
            events,
            db,
            config,
            options,
            json,
        } => replay(&events, db, config, options, json).await,
        Command::Show { tenant_id, db } => show(tenant_id, db).await,
    }
}

fn open_store(db: Option<PathBuf>) -> Result<SqliteSettingsStore> {
    let path = match db {
        Some(path) => path,
        None => {
            let home = default_home_dir()?;
            std::fs::create_dir_all(&home)
                .with_context(|| format!("creating {}", home.display()))?;
            home.join("ticket_settings.db")
        }
    };
    info!(path = %path.display(), "Opening settings database");
    SqliteSettingsStore::open(&path)
        .with_context(|| format!("opening settings database {}", path.display()))
}

async fn replay(
    events: &Path,
    db: Option<PathBuf>,
    config: Option<PathBuf>,
    options: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => WizardConfig::from_yaml(&path)?,
        None => WizardConfig::default(),
    };
    let directory = match options {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            StaticDirectory::from_yaml_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => StaticDirectory::new(),
    };
    let store = open_store(db)?;
    let publisher = Arc::new(RecordingPublisher::new());
    let engine = WizardEngine::new(
        Arc::new(store),
        Arc::new(directory),
        publisher.clone(),
        config,
    );

    let file = std::fs::File::open(events)
        .with_context(|| format!("opening {}", events.display()))?;
    let mut count = 0usize;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", events.display()))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event: WizardEvent = serde_json::from_str(line).map_err(|e| {
            TicketdeskError::json_parse(format!("{}:{}", events.display(), index + 1), e)
        })?;

        let reply = engine.handle(&event).await;
        count += 1;
        if json {
            println!("{}", serde_json::to_string(&reply)?);
        } else {
            println!(
                "[{} tenant={} admin={}]",
                event.name(),
                event.tenant_id,
                event.admin_id
            );
            print_reply(&reply);
        }
    }

    let published = publisher.published().await;
    info!(events = count, published = published.len(), "Replay finished");
    if !json {
        println!(
            "{} event(s) replayed, {} entry point(s) published",
            count,
            published.len()
        );
    }
    Ok(())
}

fn print_reply(reply: &Reply) {
    for render in &reply.renders {
        match render {
            Render::Notice(notice) => println!("  {}", notice.message),
            Render::Prompt(prompt) => {
                println!("  {}", prompt.title);
                println!(
                    "  {} (choose {}..={})",
                    prompt.placeholder, prompt.min_values, prompt.max_values
                );
                for option in &prompt.options {
                    println!("    - {} [{}]", option.label, option.entity.id);
                }
            }
            Render::Summary(summary) => {
                println!("  {}", summary.title);
                println!("  {}", summary.description);
                for field in &summary.fields {
                    println!("    {}: {}", field.label, field.value);
                }
                println!("  [{}]", summary.confirm_label);
            }
        }
    }
}

async fn show(tenant_id: TenantId, db: Option<PathBuf>) -> Result<()> {
    let store = open_store(db)?;
    let Some(settings) = store.read(tenant_id).await? else {
        println!("No ticket settings stored for tenant {}", tenant_id);
        return Ok(());
    };

    let summary = Summary::from_settings(tenant_id, Some(&settings));
    println!("Tenant {}", tenant_id);
    for field in &summary.fields {
        println!("  {}: {}", field.label, field.value);
    }
    match settings.published_at {
        Some(at) => println!("  Published: {}", at.to_rfc3339()),
        None => println!("  Published: never"),
    }
    if let Some(updated) = store.last_updated(tenant_id).await? {
        println!("  Last updated: {}", updated.to_rfc3339());
    }
    Ok(())
}
