//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use breakfast_club_core::{Email, UserId, UserRole, Username};

/// A registered user (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Contact email.
    pub email: Email,
    /// Access level.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated. For customers this doubles as the
    /// upgrade date.
    pub updated_at: DateTime<Utc>,
}

/// A customer whose role changed recently, as shown in the admin panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub upgrade_date: DateTime<Utc>,
}
