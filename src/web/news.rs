//! News handlers

use axum::{
    extract::{Path, State},
    http::Uri,
    response::Html,
};
use tera::Context as TeraContext;

use super::{AppState, AuthenticatedUser, OptionalUser, WebError};

/// GET /news
pub async fn list(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    let news_items = state.news.list_all().await?;

    let mut context = TeraContext::new();
    context.insert("news_items", &news_items);
    state.render("news_list.html", &context, &state.page_vars(uri.path(), user.as_ref()))
}

/// GET /news/{id}, members only
pub async fn view(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    // Non-numeric ids are simply pages that don't exist
    let id: i64 = id.parse().map_err(|_| WebError::NotFound)?;
    let selected_news = state.news.get(id).await?.ok_or(WebError::NotFound)?;

    let mut context = TeraContext::new();
    context.insert("selected_news", &selected_news);
    state.render("News_View.html", &context, &state.page_vars(uri.path(), Some(&user)))
}
