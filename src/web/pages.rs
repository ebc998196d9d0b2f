//! Static pages and the health check

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use tera::Context as TeraContext;

use super::{AppState, OptionalUser, WebError};
use crate::models::GlobalWarmingData;

/// GET /
pub async fn home(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    let mut context = TeraContext::new();
    context.insert("global_warming_data", &GlobalWarmingData::current());
    state.render("home.html", &context, &state.page_vars(uri.path(), user.as_ref()))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Response {
    match state.pool.ping().await {
        Ok(()) => Json(json!({ "status": "ok" })).into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {:#}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

pub async fn not_found() -> WebError {
    WebError::NotFound
}
