//! Data models
//!
//! Persisted entities (accounts, sessions, news articles) and the static
//! figures shown on the home page.

mod climate;
mod news;
mod session;
mod user;

pub use climate::GlobalWarmingData;
pub use news::{News, NEWS_TITLE_MAX_LENGTH};
pub use session::Session;
pub use user::{Gender, User};
