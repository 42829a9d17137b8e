//! niceNovel API Library
//!
//! HTTP surface for the subscription backend: catalog bootstrap, price
//! listing, subscription creation and the Stripe webhook receiver.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{Config, Environment};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
