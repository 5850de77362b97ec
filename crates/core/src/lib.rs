//! The Breakfast Club Core - Shared types library.
//!
//! This crate provides the domain types used across all bookstore components:
//! - `server` - Storefront pages, admin dashboard and JSON API
//! - `cli` - Command-line tools for migrations, users and seed data
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. With the `postgres` feature the types gain `sqlx`
//! encode/decode support so they can be bound directly in queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, usernames, emails, roles, prices and book input

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
