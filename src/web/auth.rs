//! Login, logout and registration handlers

use axum::{
    extract::State,
    http::{header, HeaderMap, Uri},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tera::Context as TeraContext;

use super::middleware::{clear_session_cookie, extract_session_token, session_cookie};
use super::{AppState, OptionalUser, WebError};
use crate::forms::{FormErrors, LoginForm, RegistrationForm};
use crate::models::{Gender, User};
use crate::services::AccountServiceError;
use crate::templates::MessageLevel;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";
pub const TOO_MANY_ATTEMPTS: &str = "Too many failed login attempts. Please try again later.";

/// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    uri: Uri,
) -> Result<Response, WebError> {
    render_login(&state, &uri, user.as_ref(), &LoginForm::default(), &FormErrors::new(), None)
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
    uri: Uri,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let data = match form.clean() {
        Ok(data) => data,
        Err(errors) => {
            return render_login(&state, &uri, current.as_ref(), &form, &errors, Some(INVALID_CREDENTIALS))
        }
    };

    if state.rate_limiter.is_limited(&data.username).await {
        tracing::warn!(username = %data.username, "Login refused: too many failed attempts");
        return render_login(&state, &uri, current.as_ref(), &form, &FormErrors::new(), Some(TOO_MANY_ATTEMPTS));
    }

    let user = match state.accounts.authenticate(&data.username, &data.password).await? {
        Some(user) => user,
        None => {
            state.rate_limiter.record_failure(&data.username).await;
            tracing::info!(username = %data.username, "Failed login attempt");
            return render_login(&state, &uri, current.as_ref(), &form, &FormErrors::new(), Some(INVALID_CREDENTIALS));
        }
    };

    state.rate_limiter.clear(&data.username).await;
    let session = state.accounts.login(&user).await?;
    let cookie = session_cookie(
        &session.id,
        state.config.session.max_age_secs(),
        state.config.session.cookie_secure,
    );

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/news")).into_response())
}

/// POST /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, WebError> {
    if let Some(token) = extract_session_token(&headers) {
        state.accounts.logout(&token).await?;
    }
    let cookie = clear_session_cookie(state.config.session.cookie_secure);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// GET /registration
pub async fn registration_page(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    uri: Uri,
) -> Result<Response, WebError> {
    render_registration(&state, &uri, user.as_ref(), &RegistrationForm::default(), &FormErrors::new())
}

/// POST /registration
pub async fn register(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
    uri: Uri,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, WebError> {
    let username = form.username.trim();
    let taken = !username.is_empty() && state.accounts.username_taken(username).await?;

    let errors = match form.clean(taken) {
        Ok(data) => match state.accounts.register(data).await {
            Ok(_) => return Ok(Redirect::to("/login").into_response()),
            Err(AccountServiceError::UserExists(_)) => {
                let mut errors = FormErrors::new();
                errors.add("username", "A user with that username already exists.");
                errors
            }
            Err(e) => return Err(e.into()),
        },
        Err(errors) => errors,
    };

    render_registration(&state, &uri, current.as_ref(), &form.without_passwords(), &errors)
}

fn render_login(
    state: &AppState,
    uri: &Uri,
    user: Option<&User>,
    form: &LoginForm,
    errors: &FormErrors,
    message: Option<&str>,
) -> Result<Response, WebError> {
    let mut context = TeraContext::new();
    context.insert("form", form);
    context.insert("errors", errors);

    let mut vars = state.page_vars(uri.path(), user);
    if let Some(text) = message {
        vars = vars.with_message(MessageLevel::Error, text);
    }
    Ok(state.render("login.html", &context, &vars)?.into_response())
}

fn render_registration(
    state: &AppState,
    uri: &Uri,
    user: Option<&User>,
    form: &RegistrationForm,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let choices: Vec<(&str, &str)> = Gender::CHOICES
        .iter()
        .map(|g| (g.code(), g.label()))
        .collect();

    let mut context = TeraContext::new();
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("gender_choices", &choices);
    Ok(state
        .render("registration.html", &context, &state.page_vars(uri.path(), user))?
        .into_response())
}
