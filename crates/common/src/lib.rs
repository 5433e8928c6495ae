//! Amy Common Library
//!
//! Data model, SQLite store and the baseline fixtures shared by Amy tests.

pub mod db;
pub mod error;
pub mod fixtures;
pub mod types;

// Re-export commonly used types
pub use db::Database;
pub use error::{Error, Result};
pub use fixtures::Fixtures;
pub use types::*;
