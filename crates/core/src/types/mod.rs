//! Core types for The Breakfast Club.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod book;
pub mod email;
pub mod id;
pub mod price;
pub mod role;
pub mod username;

pub use book::{BookDraft, BookInput, BookInputError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use role::UserRole;
pub use username::{Username, UsernameError};
