use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use pet_lover_server::{
    AppError, AppState, MemoryRepository,
    auth::{self, AuthUser, Claims, TOKEN_LIFETIME_DAYS},
    config::AppConfig,
};
use serde_json::{Map, Value, json};
use std::sync::Arc;

// --- Helper Functions ---

const TEST_TOKEN_SECRET: &str = "test-secret-value-1234567890";

fn email_payload(email: &str) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("email".to_string(), Value::from(email));
    payload
}

fn create_app_state(token_secret: &str) -> AppState {
    let mut config = AppConfig::default();
    config.token_secret = token_secret.to_string();

    AppState {
        repo: Arc::new(MemoryRepository::new()),
        config,
    }
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
}

// --- Tests ---

#[tokio::test]
async fn test_issued_token_round_trips_email() {
    let token = auth::issue_token(TEST_TOKEN_SECRET, email_payload("a@x.com")).unwrap();
    let app_state = create_app_state(TEST_TOKEN_SECRET);

    let mut parts = get_request_parts(Method::GET, "/pets".parse().unwrap());
    with_bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(auth_user.email(), Some("a@x.com"));
}

#[tokio::test]
async fn test_issued_token_keeps_extra_claims_and_one_year_lifetime() {
    let mut payload = email_payload("a@x.com");
    payload.insert("name".to_string(), json!("Alice"));

    let token = auth::issue_token(TEST_TOKEN_SECRET, payload).unwrap();
    let claims = auth::verify_token(TEST_TOKEN_SECRET, &token).unwrap();

    assert_eq!(claims.payload.get("name"), Some(&json!("Alice")));
    assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_DAYS * 86_400);
    assert!(claims.exp > Utc::now().timestamp());
}

#[tokio::test]
async fn test_payload_with_audience_claim_is_accepted() {
    let mut payload = email_payload("a@x.com");
    payload.insert("aud".to_string(), json!("web"));
    let token = auth::issue_token(TEST_TOKEN_SECRET, payload).unwrap();
    let app_state = create_app_state(TEST_TOKEN_SECRET);

    let mut parts = get_request_parts(Method::GET, "/pets".parse().unwrap());
    with_bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(auth_user.email(), Some("a@x.com"));
    assert_eq!(auth_user.claims.payload.get("aud"), Some(&json!("web")));
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(TEST_TOKEN_SECRET);
    let mut parts = get_request_parts(Method::GET, "/pets".parse().unwrap());

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(matches!(auth_user, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_auth_failure_without_bearer_scheme() {
    let token = auth::issue_token(TEST_TOKEN_SECRET, email_payload("a@x.com")).unwrap();
    let app_state = create_app_state(TEST_TOKEN_SECRET);

    let mut parts = get_request_parts(Method::GET, "/pets".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&token).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert!(matches!(auth_user, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_auth_failure_with_foreign_signature() {
    let token = auth::issue_token("some-other-secret", email_payload("a@x.com")).unwrap();
    let app_state = create_app_state(TEST_TOKEN_SECRET);

    let mut parts = get_request_parts(Method::GET, "/pets".parse().unwrap());
    with_bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert!(matches!(auth_user, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_auth_failure_with_expired_token() {
    // Well past the validator's default leeway.
    let issued = Utc::now().timestamp() - 7_200;
    let claims = Claims {
        payload: email_payload("a@x.com"),
        iat: issued,
        exp: issued + 60,
    };
    let key = EncodingKey::from_secret(TEST_TOKEN_SECRET.as_bytes());
    let token = encode(&Header::default(), &claims, &key).unwrap();

    let app_state = create_app_state(TEST_TOKEN_SECRET);
    let mut parts = get_request_parts(Method::GET, "/pets".parse().unwrap());
    with_bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert!(matches!(auth_user, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_claims_in_extensions_take_precedence() {
    let app_state = create_app_state(TEST_TOKEN_SECRET);
    let mut parts = get_request_parts(Method::GET, "/pets".parse().unwrap());
    parts.extensions.insert(AuthUser {
        claims: Claims::new(email_payload("cached@x.com")),
    });

    // No Authorization header: the claims attached by the middleware are enough.
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(auth_user.email(), Some("cached@x.com"));
}
