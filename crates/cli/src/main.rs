//! The Breakfast Club CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (including the session table)
//! bc-cli migrate
//!
//! # Create a user
//! bc-cli user create -u thandi -e thandi@example.com -p 'correct horse' -r admin
//!
//! # Upgrade a pending registration to a customer
//! bc-cli user set-role -u sipho -r customer
//!
//! # Seed books for a user
//! bc-cli seed books -f books.yaml -o thandi
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` / `user set-role` - Manage users
//! - `seed books` - Insert books from a YAML file

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bc-cli")]
#[command(author, version, about = "The Breakfast Club CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user with a password
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (8-255 characters)
        #[arg(short, long)]
        password: String,

        /// Role (`user`, `customer`, `admin`, `super_admin`)
        #[arg(short, long, default_value = "user")]
        role: String,
    },
    /// Change an existing user's role
    SetRole {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// New role (`user`, `customer`, `admin`, `super_admin`)
        #[arg(short, long)]
        role: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert books from a YAML file
    Books {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,

        /// Username that will own the books
        #[arg(short, long)]
        owner: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                password,
                role,
            } => {
                commands::user::create(&username, &email, &password, &role).await?;
            }
            UserAction::SetRole { username, role } => {
                commands::user::set_role(&username, &role).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Books { file, owner } => {
                commands::seed::books(&file, &owner).await?;
            }
        },
    }
    Ok(())
}
