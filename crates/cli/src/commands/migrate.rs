//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! bc-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `BOOKSTORE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Schema migrations live in `crates/server/migrations/`. The session table
//! (`tower_sessions.session`) is created by the session store itself.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CliError, connect};

/// Run schema migrations, then create the session table.
///
/// # Errors
///
/// Returns `CliError` if the connection or any migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running schema migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool)
        .migrate()
        .await
        .map_err(|e| CliError::SessionStore(e.to_string()))?;

    tracing::info!("Migrations complete!");
    Ok(())
}
