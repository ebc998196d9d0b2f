//! Database repositories
//!
//! One repository per entity; services depend on the traits, `main` wires
//! in the `Sqlx*` implementations.

pub mod news;
pub mod session;
pub mod user;

pub use news::{NewsRepository, SqlxNewsRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
