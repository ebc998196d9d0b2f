//! Business logic services

pub mod accounts;
pub mod news;
pub mod password;
pub mod rate_limiter;

pub use accounts::{AccountService, AccountServiceError, RegistrationData};
pub use news::{NewsService, NewsServiceError};
pub use rate_limiter::LoginRateLimiter;
