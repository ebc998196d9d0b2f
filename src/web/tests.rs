//! End-to-end tests for the router

use super::*;
use crate::db::repositories::{SqlxUserRepository, UserRepository};
use crate::db::{create_test_pool, migrations};
use crate::models::Gender;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use chrono::NaiveDate;

async fn setup() -> (TestServer, AppState) {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let state = crate::build_state(Config::default(), pool).expect("Failed to build state");

    let server = TestServer::new(build_router(state.clone())).expect("Failed to start test server");
    (server, state)
}

const PASSWORD: &str = "renewables-now-2030";

fn registration_form(username: &str) -> Vec<(&'static str, String)> {
    vec![
        ("first_name", "Vandana".to_string()),
        ("surname", "Shiva".to_string()),
        ("email", "vandana@example.org".to_string()),
        ("id_number", "IN-1952".to_string()),
        ("gender", "F".to_string()),
        ("username", username.to_string()),
        ("password1", PASSWORD.to_string()),
        ("password2", PASSWORD.to_string()),
    ]
}

async fn register(server: &TestServer, username: &str) -> TestResponse {
    server
        .post("/registration")
        .form(&registration_form(username))
        .await
}

async fn login(server: &TestServer, username: &str, password: &str) -> TestResponse {
    server
        .post("/login")
        .form(&[("username", username), ("password", password)])
        .await
}

/// `name=value` part of the response's Set-Cookie header
fn session_cookie_of(response: &TestResponse) -> HeaderValue {
    let set_cookie = response.header("set-cookie");
    let pair = set_cookie
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    HeaderValue::from_str(&pair).unwrap()
}

async fn logged_in_cookie(server: &TestServer) -> HeaderValue {
    register(server, "vandana").await;
    let response = login(server, "vandana", PASSWORD).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    session_cookie_of(&response)
}

async fn publish(state: &AppState, title: &str, content: &str) -> i64 {
    let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
    state.news.create(title, content, date).await.unwrap().id
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
async fn test_home_shows_climate_figures() {
    let (server, _) = setup().await;
    let response = server.get("/").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("1.1°C"));
    assert!(html.contains("20cm"));
    assert!(html.contains("419 ppm"));
}

#[tokio::test]
async fn test_health() {
    let (server, _) = setup().await;
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("ok"));
}

#[tokio::test]
async fn test_unknown_path_renders_404_page() {
    let (server, _) = setup().await;
    let response = server.get("/no/such/page").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(response.text().contains("Page not found"));
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_registration_page_renders_form() {
    let (server, _) = setup().await;
    let response = server.get("/registration").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("name=\"password2\""));
    assert!(html.contains("<option value=\"O\""));
}

#[tokio::test]
async fn test_valid_registration_creates_account() {
    let (server, state) = setup().await;

    let response = register(&server, "vandana").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login");

    assert!(state.accounts.username_taken("vandana").await.unwrap());
    let users = SqlxUserRepository::new(state.pool.clone());
    let user = users.get_by_username("vandana").await.unwrap().unwrap();
    assert_eq!(user.first_name, "Vandana");
    assert_eq!(user.gender, Gender::Female);
    assert_ne!(user.password_hash, PASSWORD);
}

#[tokio::test]
async fn test_mismatched_passwords_create_nothing() {
    let (server, state) = setup().await;

    let mut form = registration_form("vandana");
    form[7].1 = "something-different-1".to_string();
    let response = server.post("/registration").form(&form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("The two password fields didn&#x27;t match."));
    // Submitted values are kept, passwords are not
    assert!(html.contains("value=\"Vandana\""));
    assert!(!html.contains(PASSWORD));
    assert!(!state.accounts.username_taken("vandana").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let (server, _) = setup().await;
    register(&server, "vandana").await;

    let response = register(&server, "vandana").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("A user with that username already exists."));
}

#[tokio::test]
async fn test_missing_fields_reported() {
    let (server, _) = setup().await;
    let response = server
        .post("/registration")
        .form(&[("first_name", "Vandana")])
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("This field is required."));
}

// ============================================================================
// Login / logout
// ============================================================================

#[tokio::test]
async fn test_valid_login_redirects_to_news() {
    let (server, _) = setup().await;
    register(&server, "vandana").await;

    let response = login(&server, "vandana", PASSWORD).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/news");

    let set_cookie = response.header("set-cookie");
    let set_cookie = set_cookie.to_str().unwrap();
    assert!(set_cookie.starts_with("sessionid="));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_invalid_login_rerenders_with_message() {
    let (server, _) = setup().await;
    register(&server, "vandana").await;

    for (username, password) in [("vandana", "wrong-password"), ("nobody", PASSWORD)] {
        let response = login(&server, username, password).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.text().contains("Invalid username or password."));
    }
}

#[tokio::test]
async fn test_blank_login_field_shows_message() {
    let (server, state) = setup().await;
    register(&server, "vandana").await;

    let response = login(&server, "vandana", "").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("Invalid username or password."));
    assert!(html.contains("This field is required."));
    assert!(!state.rate_limiter.is_limited("vandana").await);
}

#[tokio::test]
async fn test_state_rejects_unusable_session_lifetime() {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    for days in [0, 1_000_000_000] {
        let mut config = Config::default();
        config.session.lifetime_days = days;
        assert!(crate::build_state(config, pool.clone()).is_err());
    }
}

#[tokio::test]
async fn test_session_cookie_max_age_follows_config() {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool).await.unwrap();
    let mut config = Config::default();
    config.session.lifetime_days = 2;
    let state = crate::build_state(config, pool).unwrap();
    let server = TestServer::new(build_router(state)).unwrap();
    register(&server, "vandana").await;

    let response = login(&server, "vandana", PASSWORD).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    let set_cookie = response.header("set-cookie");
    assert!(set_cookie.to_str().unwrap().contains("Max-Age=172800"));
}

#[tokio::test]
async fn test_login_rate_limited_after_repeated_failures() {
    let (server, _) = setup().await;
    register(&server, "vandana").await;

    for _ in 0..5 {
        login(&server, "vandana", "wrong-password").await;
    }

    // Even the right password is refused now
    let response = login(&server, "vandana", PASSWORD).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("Too many failed login attempts."));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (server, state) = setup().await;
    let cookie = logged_in_cookie(&server).await;
    let id = publish(&state, "Tree planting", "Saturday 9am").await;

    let response = server
        .post("/logout")
        .add_header(header::COOKIE, cookie.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");
    assert!(response.header("set-cookie").to_str().unwrap().contains("Max-Age=0"));

    // The old token no longer works
    let response = server
        .get(&format!("/news/{}", id))
        .add_header(header::COOKIE, cookie)
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
}

// ============================================================================
// News
// ============================================================================

#[tokio::test]
async fn test_news_list_is_public() {
    let (server, state) = setup().await;
    publish(&state, "Climate march", "Join us").await;
    publish(&state, "Solar subsidies", "Our proposal").await;

    let html = server.get("/news").await.text();
    let first = html.find("Climate march").expect("first title listed");
    let second = html.find("Solar subsidies").expect("second title listed");
    assert!(first < second);
}

#[tokio::test]
async fn test_news_view_requires_login() {
    let (server, state) = setup().await;
    let id = publish(&state, "Members briefing", "Confidential").await;

    let response = server.get(&format!("/news/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.header("location"),
        format!("/login?next=%2Fnews%2F{}", id).as_str()
    );
}

#[tokio::test]
async fn test_news_view_for_member() {
    let (server, state) = setup().await;
    let cookie = logged_in_cookie(&server).await;
    let id = publish(&state, "Members briefing", "Meet at the hall").await;

    let response = server
        .get(&format!("/news/{}", id))
        .add_header(header::COOKIE, cookie)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("Members briefing"));
    assert!(html.contains("Meet at the hall"));
    assert!(html.contains("Hello, Vandana"));
}

#[tokio::test]
async fn test_news_view_unknown_or_invalid_id() {
    let (server, _) = setup().await;
    let cookie = logged_in_cookie(&server).await;

    for path in ["/news/999", "/news/abc"] {
        let response = server
            .get(path)
            .add_header(header::COOKIE, cookie.clone())
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "{}", path);
        assert!(response.text().contains("Page not found"));
    }
}
