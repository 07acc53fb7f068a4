//! Kanban Common Library
//!
//! Domain records shared by the kanban E2E test kit: boards, lists, cards,
//! the composite fixtures built from them, and a reader for the application's
//! JSON-file database.

pub mod db;
pub mod error;
pub mod types;

pub use db::{StoredUser, UserStore};
pub use error::{Error, Result};
pub use types::*;

/// Kit version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
