//! SQLite persistence for the local session.

pub mod pool;
pub mod vault;

pub use pool::{DatabasePool, default_database_url};
pub use vault::SqliteAuthVault;
