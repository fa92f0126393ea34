use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use salon_manager::{config, db, functions::admins, http, ui};

const TUI_LOG_FILE: &str = "salon-manager.log";

#[derive(Parser)]
#[command(name = "salon-manager", about = "Salon booking and back-office manager")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Keep everything in memory instead of PostgreSQL
    #[arg(long, global = true)]
    memory: bool,
}

#[derive(Subcommand, Clone, Copy, PartialEq)]
enum Command {
    /// Run the public booking API and the admin API
    Serve,
    /// Open the admin console (default)
    Admin,
    /// Open the client booking kiosk
    Book,
    /// Apply database migrations and exit
    Migrate,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The terminal front-ends own the screen, so their logs go to a file.
fn init_tracing(command: Command) -> Result<()> {
    match command {
        Command::Admin | Command::Book => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(TUI_LOG_FILE)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Command::Serve | Command::Migrate => {
            tracing_subscriber::fmt().with_env_filter(env_filter()).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Admin);
    init_tracing(command)?;

    // Load configuration
    let config = config::init()?;

    if command == Command::Migrate {
        let store = db::PgStore::connect(config.database_url()?).await?;
        store.migrate().await?;
        tracing::info!("Migrations applied");
        return Ok(());
    }

    // Initialize the store and make sure someone can log in
    let db = db::init(&config, cli.memory).await?;
    admins::ensure_admin(db.as_ref(), &config.admin_username, &config.admin_password).await?;

    match command {
        Command::Serve => {
            let state = http::AppState {
                db,
                config: Arc::new(config),
            };
            http::serve(state).await?;
        }
        Command::Book => {
            let result = ui::booking::run_booking(db, &config).await;
            if let Err(err) = &result {
                println!("Error: {}", err);
            }
            println!("Booking kiosk closed.");
        }
        Command::Admin | Command::Migrate => {
            let result = ui::app::run_admin(db, config).await;
            if let Err(err) = &result {
                println!("Error: {}", err);
            }
            println!("Thanks for using Salon Manager!");
        }
    }

    Ok(())
}
