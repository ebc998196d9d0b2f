//! Web layer - HTTP handlers and routing
//!
//! Server-rendered pages:
//! - Home page
//! - Login, logout and member registration
//! - News list and (members only) news articles
//! - Health check

pub mod auth;
pub mod error;
pub mod middleware;
pub mod news;
pub mod pages;

#[cfg(test)]
mod tests;

use axum::{
    middleware as axum_middleware,
    response::Html,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tera::Context as TeraContext;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::DynDatabasePool;
use crate::models::User;
use crate::services::{AccountService, LoginRateLimiter, NewsService};
use crate::templates::{CurrentUser, StandardTemplateVars, TemplateEngine};

pub use error::WebError;
pub use middleware::{AuthenticatedUser, OptionalUser};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub config: Arc<Config>,
    pub accounts: Arc<AccountService>,
    pub news: Arc<NewsService>,
    pub templates: Arc<TemplateEngine>,
    pub rate_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    /// Standard template variables for a page at `path`
    pub fn page_vars(&self, path: &str, user: Option<&User>) -> StandardTemplateVars {
        StandardTemplateVars::new(&self.config.site.name, path).with_user(user.map(CurrentUser::from))
    }

    pub fn render(
        &self,
        template: &str,
        context: &TeraContext,
        vars: &StandardTemplateVars,
    ) -> Result<Html<String>, WebError> {
        Ok(Html(self.templates.render_page(template, context, vars)?))
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let members_only = Router::new()
        .route("/news/{id}", get(news::view))
        .route_layer(axum_middleware::from_fn(middleware::require_login));

    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/registration", get(auth::registration_page).post(auth::register))
        .route("/news", get(news::list))
        .route("/health", get(pages::health))
        .merge(members_only)
        .fallback(pages::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::render_error_pages,
        ))
        // Runs first so every later layer and handler sees the member
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
