//! Domain models for the bookstore.

pub mod book;
pub mod session;
pub mod user;

pub use book::{Book, BookPage};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{NewCustomer, User};
