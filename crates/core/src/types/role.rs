//! User roles.

use serde::{Deserialize, Serialize};

/// Role attached to every user record.
///
/// New sign-ups start as [`UserRole::User`] (a pending registration) and are
/// upgraded to [`UserRole::Customer`] by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Registered but not yet upgraded.
    #[default]
    User,
    /// A paying customer.
    Customer,
    /// Store administrator.
    Admin,
    /// Administrator who can also manage other administrators.
    SuperAdmin,
}

impl UserRole {
    /// All roles, lowest privilege first.
    pub const ALL: [Self; 4] = [Self::User, Self::Customer, Self::Admin, Self::SuperAdmin];

    /// Whether this role may see admin-only statistics and actions.
    #[must_use]
    pub const fn has_admin_privileges(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Human-readable label for templates.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Customer => "Customer",
            Self::Admin => "Admin",
            Self::SuperAdmin => "Super Admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
            Self::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_privileges() {
        assert!(!UserRole::User.has_admin_privileges());
        assert!(!UserRole::Customer.has_admin_privileges());
        assert!(UserRole::Admin.has_admin_privileges());
        assert!(UserRole::SuperAdmin.has_admin_privileges());
    }

    #[test]
    fn test_parse_accepts_both_spellings() {
        assert_eq!("SUPERADMIN".parse::<UserRole>().unwrap(), UserRole::SuperAdmin);
        assert_eq!("super_admin".parse::<UserRole>().unwrap(), UserRole::SuperAdmin);
        assert_eq!("CUSTOMER".parse::<UserRole>().unwrap(), UserRole::Customer);
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_display_parse_agree() {
        for role in UserRole::ALL {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&UserRole::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
    }
}
