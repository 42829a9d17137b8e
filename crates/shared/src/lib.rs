//! niceNovel shared types and utilities
//!
//! Row types for the Stripe mirror tables and database helpers shared by the
//! billing and API crates.

pub mod db;
pub mod types;

pub use db::*;
pub use types::*;
