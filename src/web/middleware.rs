//! Request middleware and extractors
//!
//! - Session cookie handling
//! - Optional authentication (attaches the logged-in member to the request)
//! - Login-required redirect
//! - Error page rendering

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::convert::Infallible;

use super::error::ErrorPage;
use super::AppState;
use crate::models::User;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "sessionid";

/// Logged-in member, present in request extensions after [`optional_auth`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| login_redirect(parts.uri.path_and_query().map(|pq| pq.as_str())))
    }
}

/// Extractor for pages that render differently for members
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|u| u.0.clone()),
        ))
    }
}

/// Read the session token from the `Cookie` header
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

/// `Set-Cookie` value for a fresh session
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Attach the session's member to the request if the cookie is valid.
///
/// Lookup failures are logged and the request proceeds anonymously.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(request.headers()) {
        match state.accounts.user_for_session(&token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(AuthenticatedUser(user));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Session lookup failed: {}", e),
        }
    }
    next.run(request).await
}

/// Send anonymous visitors to the login page, remembering where they were going
pub async fn require_login(request: Request, next: Next) -> Response {
    if request.extensions().get::<AuthenticatedUser>().is_some() {
        return next.run(request).await;
    }

    login_redirect(request.uri().path_and_query().map(|pq| pq.as_str()))
}

fn login_redirect(target: Option<&str>) -> Response {
    let location = format!("/login?next={}", urlencoding::encode(target.unwrap_or("/")));
    Redirect::to(&location).into_response()
}

/// Fill in bodies for responses produced by [`WebError`](super::WebError)
pub async fn render_error_pages(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|u| u.0.clone());

    let response = next.run(request).await;
    let page = match response.extensions().get::<ErrorPage>() {
        Some(page) => *page,
        None => return response,
    };

    let vars = state.page_vars(&path, user.as_ref());
    match page {
        ErrorPage::NotFound => {
            match state
                .templates
                .render_page("404.html", &tera::Context::new(), &vars)
            {
                Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
                Err(e) => {
                    tracing::error!("Failed to render 404 page: {}", e);
                    (
                        StatusCode::NOT_FOUND,
                        Html(state.templates.render_error_page(&vars)),
                    )
                        .into_response()
                }
            }
        }
        ErrorPage::Internal => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(state.templates.render_error_page(&vars)),
        )
            .into_response(),
    }
}
