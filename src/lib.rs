//! DFA - party website
//!
//! Member registration and login, a public news list and members-only news
//! articles, rendered server-side with Tera.

pub mod config;
pub mod db;
pub mod forms;
pub mod models;
pub mod services;
pub mod templates;
pub mod web;

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::db::repositories::{SqlxNewsRepository, SqlxSessionRepository, SqlxUserRepository};
use crate::db::DynDatabasePool;
use crate::services::{AccountService, LoginRateLimiter, NewsService};
use crate::templates::TemplateEngine;
use crate::web::AppState;

/// Wire repositories, services and templates into the shared application state
pub fn build_state(config: Config, pool: DynDatabasePool) -> Result<AppState> {
    config.validate()?;

    let accounts = AccountService::new(
        SqlxUserRepository::boxed(pool.clone()),
        SqlxSessionRepository::boxed(pool.clone()),
        config.session.lifetime(),
    );
    let news = NewsService::new(SqlxNewsRepository::boxed(pool.clone()));
    let templates = TemplateEngine::new(config.site.templates_path.as_deref())?;

    Ok(AppState {
        pool,
        config: Arc::new(config),
        accounts: Arc::new(accounts),
        news: Arc::new(news),
        templates: Arc::new(templates),
        rate_limiter: Arc::new(LoginRateLimiter::new()),
    })
}
