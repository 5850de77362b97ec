//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] breakfast_club_core::UsernameError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] breakfast_club_core::EmailError),

    /// Unknown user, no password set, or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username or email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message safe to show on the login and sign-up pages.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Incorrect username or password".to_string(),
            Self::UserAlreadyExists => "Username or email already taken".to_string(),
            Self::InvalidUsername(e) => capitalize(&e.to_string()),
            Self::InvalidEmail(_) => "Invalid email address".to_string(),
            Self::WeakPassword(msg) => capitalize(msg),
            Self::Repository(_) | Self::PasswordHash => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    /// Whether this failure is the client's fault rather than ours.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repository(_) | Self::PasswordHash)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_messages() {
        assert_eq!(
            AuthError::InvalidCredentials.user_message(),
            "Incorrect username or password"
        );
        assert_eq!(
            AuthError::PasswordHash.user_message(),
            "Something went wrong. Please try again."
        );
        assert_eq!(
            AuthError::Repository(RepositoryError::NotFound).user_message(),
            "Something went wrong. Please try again."
        );
    }

    #[test]
    fn test_validation_messages_are_capitalized() {
        let err = AuthError::WeakPassword("password must be at least 8 characters".to_string());
        assert_eq!(err.user_message(), "Password must be at least 8 characters");
        assert!(err.is_client_error());
        assert!(!AuthError::PasswordHash.is_client_error());
    }
}
