//! Database layer
//!
//! SQLite (default, single-file deployment) or MySQL, selected by
//! `database.driver` in the configuration.
//!
//! ```ignore
//! use dfa::config::DatabaseConfig;
//! use dfa::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
