//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin
//! bc-cli user create -u thandi -e thandi@example.com -p 'correct horse' -r admin
//!
//! # Upgrade a pending registration
//! bc-cli user set-role -u sipho -r customer
//! ```

use breakfast_club_core::{UserRole, Username};
use breakfast_club_server::db::{RepositoryError, UserRepository};
use breakfast_club_server::models::User;
use breakfast_club_server::services::auth::AuthService;

use super::{CliError, connect};

fn parse_role(role: &str) -> Result<UserRole, CliError> {
    role.parse()
        .map_err(|_| CliError::InvalidRole(role.to_owned()))
}

/// Create a user with a password and an explicit role.
///
/// # Errors
///
/// Returns `CliError` for an invalid role, invalid input, a taken username or
/// email, or a database failure.
pub async fn create(
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> Result<User, CliError> {
    let role = parse_role(role)?;
    let pool = connect().await?;

    tracing::info!("Creating user: {} ({})", username, role);
    let user = AuthService::new(&pool)
        .create_user(username, email, password, role)
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );
    Ok(user)
}

/// Change a user's role. Upgrading to `customer` counts towards the
/// dashboard's newly upgraded customers.
///
/// # Errors
///
/// Returns `CliError::UserNotFound` if no user has this username.
pub async fn set_role(username: &str, role: &str) -> Result<User, CliError> {
    let role = parse_role(role)?;
    let parsed = Username::parse(username)?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .set_role(&parsed, role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CliError::UserNotFound(username.to_owned()),
            other => CliError::Repository(other),
        })?;

    tracing::info!("{} is now {}", user.username, user.role);
    Ok(user)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("customer").unwrap(), UserRole::Customer);
        assert_eq!(parse_role("super_admin").unwrap(), UserRole::SuperAdmin);
        assert!(matches!(
            parse_role("owner"),
            Err(CliError::InvalidRole(r)) if r == "owner"
        ));
    }
}
