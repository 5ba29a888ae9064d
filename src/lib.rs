//! GridLab Store
//!
//! PostgreSQL persistence for users, time series datasets, scenarios,
//! reports and labels: table declarations, typed records, and a small
//! store to read and write them.

pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod pool;
pub mod schema;
pub mod store;

pub use config::Config;
pub use error::{Result, StoreError};
pub use store::Store;
