//! Maison CLI - Store seeding and management tools.
//!
//! All commands operate directly on the JSON store snapshot named by
//! `MAISON_STORE_PATH`; run them while the server is stopped, or re-import
//! the file afterwards.
//!
//! # Usage
//!
//! ```bash
//! # Seed the initial household roster
//! maison-cli seed users
//!
//! # Create an extra admin account with a password already set
//! maison-cli admin create -u superadmin -n "Super Admin" -p <password>
//!
//! # Replace a year's ledger with historical stays from a JSON file
//! maison-cli history import --year 2026 --file stays.json --yes
//!
//! # Erase a year's ledger
//! maison-cli history clear --year 2026 --yes
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "maison-cli")]
#[command(author, version, about = "Maison calendar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the store
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage directory accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Bulk ledger operations
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Create any missing initial household users
    Users,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// User key (username or email)
        #[arg(short, long)]
        user: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Initial password
        #[arg(short, long)]
        password: String,

        /// Role (`admin`, `super_admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Display color, `#RRGGBB` (default gold)
        #[arg(long, default_value = "#FFD700")]
        color: String,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Replace a year's ledger with stays from a JSON file of
    /// {start, end, user} ranges
    Import {
        /// Year the stays belong to
        #[arg(short, long)]
        year: i32,

        /// Path to the JSON file
        #[arg(short, long)]
        file: std::path::PathBuf,

        /// Confirm replacing the year's existing ledger
        #[arg(long)]
        yes: bool,
    },
    /// Erase a year's ledger
    Clear {
        /// Year to clear
        #[arg(short, long)]
        year: i32,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { target } => match target {
            SeedTarget::Users => commands::seed::users().await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                user,
                name,
                password,
                role,
                color,
            } => {
                commands::admin::create_account(&user, &name, &password, &role, &color).await?;
            }
        },
        Commands::History { action } => match action {
            HistoryAction::Import { year, file, yes } => {
                commands::history::import(year, &file, yes).await?;
            }
            HistoryAction::Clear { year, yes } => {
                commands::history::clear(year, yes).await?;
            }
        },
    }
    Ok(())
}
