//! # TaskForge CLI
//!
//! Task and project tracker backend with a self-healing deadline
//! reconciliation engine.
//!
//! Usage:
//!   taskforge run                                  # Start the reconciliation scheduler
//!   taskforge sweep --kind task --check overdue    # One-shot guarded sweep
//!   taskforge add --kind task --title "…" --due …  # Stock the store
//!   taskforge config show                          # Show configuration
//!   taskforge info                                 # Show system info

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use taskforge_core::clock::SystemClock;
use taskforge_core::types::{EntityKind, EntitySnapshot, ProjectStatus, TaskStatus};
use taskforge_core::TaskForgeConfig;
use taskforge_reconcile::{
    EventBus, NotificationDispatcher, ReconcileEngine, ReconciliationScheduler,
};
use taskforge_store::SqliteStore;

#[derive(Parser)]
#[command(
    name = "taskforge",
    version,
    about = "TaskForge — task tracker backend with deadline reconciliation",
    long_about = "Tracks tasks and projects and reconciles their deadlines in the background:\noverdue transitions and day-before reminders, each notified exactly once."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Task,
    Project,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Task => EntityKind::Task,
            KindArg::Project => EntityKind::Project,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CheckArg {
    Overdue,
    Upcoming,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the reconciliation scheduler (runs until Ctrl+C)
    Run,

    /// Run one guarded sweep and exit
    Sweep {
        /// Entity kind to sweep
        #[arg(short, long, value_enum)]
        kind: KindArg,

        /// Condition to check
        #[arg(long, value_enum)]
        check: CheckArg,
    },

    /// Add a task or project
    Add {
        /// Entity kind
        #[arg(short, long, value_enum, default_value = "task")]
        kind: KindArg,

        /// Title
        #[arg(short, long)]
        title: String,

        /// Due date, RFC 3339 (e.g. 2026-08-07T18:00:00Z)
        #[arg(short, long)]
        due: DateTime<Utc>,

        /// Owner id (defaults to a fresh id)
        #[arg(short, long)]
        owner: Option<Uuid>,

        /// Description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Mark an entity completed
    Complete {
        #[arg(short, long, value_enum, default_value = "task")]
        kind: KindArg,
        id: Uuid,
    },

    /// List entities, soonest due first
    List {
        #[arg(short, long, value_enum, default_value = "task")]
        kind: KindArg,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show system info
    Info,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Write default configuration
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "taskforge=debug,taskforge_core=debug,taskforge_reconcile=debug,taskforge_store=debug,taskforge_notify=debug"
    } else {
        "taskforge=info,taskforge_reconcile=info,taskforge_notify=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        TaskForgeConfig::load_from(std::path::Path::new(path))?
    } else {
        TaskForgeConfig::load()?
    };

    match cli.command {
        Commands::Run => {
            let (scheduler, dispatcher) = wire_engine(&config)?;

            scheduler.start();
            println!("TaskForge reconciliation engine running. Press Ctrl+C to stop.");
            tokio::signal::ctrl_c().await?;

            scheduler.stop();
            scheduler.join().await;
            dispatcher.flush().await;
            dispatcher.shutdown();
            println!("Scheduler stopped.");
        }

        Commands::Sweep { kind, check } => {
            let (scheduler, dispatcher) = wire_engine(&config)?;
            let kind: EntityKind = kind.into();

            let stats = match check {
                CheckArg::Overdue => scheduler.run_overdue_sweep(kind).await?,
                CheckArg::Upcoming => scheduler.run_upcoming_sweep(kind).await?,
            };
            dispatcher.flush().await;
            dispatcher.shutdown();

            match stats {
                Some(stats) => println!(
                    "Sweep complete: {} scanned, {} transitioned, {} notified, {} failed",
                    stats.scanned, stats.transitioned, stats.notified, stats.failed
                ),
                None => println!("Sweep skipped: already running."),
            }
        }

        Commands::Add { kind, title, due, owner, description } => {
            let store = SqliteStore::open(&config.store.db_path())?;
            let owner = owner.unwrap_or_else(Uuid::new_v4);
            let id = Uuid::new_v4();
            let snapshot = match kind {
                KindArg::Task => EntitySnapshot::task(id, owner, title, due, TaskStatus::Todo),
                KindArg::Project => {
                    EntitySnapshot::project(id, owner, title, due, ProjectStatus::Active)
                }
            };
            store.create(&snapshot, &description)?;
            println!("Created {} {id} (due {due})", EntityKind::from(kind));
        }

        Commands::Complete { kind, id } => {
            let store = SqliteStore::open(&config.store.db_path())?;
            store.complete(kind.into(), id)?;
            println!("Completed {} {id}", EntityKind::from(kind));
        }

        Commands::List { kind } => {
            let store = SqliteStore::open(&config.store.db_path())?;
            let entities = store.list(kind.into())?;
            if entities.is_empty() {
                println!("No {}s.", EntityKind::from(kind));
            }
            for entity in entities {
                let flags = match (entity.notified_overdue, entity.notified_upcoming) {
                    (true, _) => " [notified: overdue]",
                    (false, true) => " [notified: upcoming]",
                    (false, false) => "",
                };
                println!(
                    "{}  {:<12} due {}  {}{flags}",
                    entity.id,
                    entity.status.display_name(),
                    entity.due_date.format("%Y-%m-%d %H:%M"),
                    entity.title,
                );
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(&config)?;
                println!("{content}");
            }
            ConfigAction::Init => {
                let config = TaskForgeConfig::default();
                config.save()?;
                println!("Config saved to: {}", TaskForgeConfig::default_path().display());
            }
        },

        Commands::Info => {
            println!("TaskForge v{}", env!("CARGO_PKG_VERSION"));
            println!("   Platform: {} / {}", std::env::consts::OS, std::env::consts::ARCH);
            println!("   Config: {}", TaskForgeConfig::default_path().display());
            println!("   Store: {}", config.store.db_path().display());
            println!("   Notifier: {}", config.notifier.backend);
        }
    }

    Ok(())
}

/// Construct store, gateway, bus, engine, and scheduler.
fn wire_engine(
    config: &TaskForgeConfig,
) -> Result<(ReconciliationScheduler, NotificationDispatcher)> {
    let store = Arc::new(SqliteStore::open(&config.store.db_path())?);
    let gateway = taskforge_notify::create_gateway(&config.notifier)?;

    let dispatcher = NotificationDispatcher::spawn(gateway);
    let mut bus = EventBus::new();
    dispatcher.attach(&mut bus);

    let engine = Arc::new(ReconcileEngine::new(
        store.clone(),
        store,
        Arc::new(bus),
        Arc::new(SystemClock),
    ));
    Ok((ReconciliationScheduler::new(engine), dispatcher))
}
