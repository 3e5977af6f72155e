use axum::http::{HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use foodgram_api::router::build_router;
use foodgram_api::state::AppState;
use foodgram_auth_types::identity::TokenSecret;
use foodgram_auth_types::token::issue_access_token;
use foodgram_core::middleware::X_REQUEST_ID;
use foodgram_domain::user::UserRole;
use foodgram_testing::auth::{MockAuth, TEST_JWT_SECRET};

use crate::helpers::GIF_DATA_URI;

/// Router without a database: only paths that fail or succeed before any
/// query runs are exercised here.
fn server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        token_secret: TokenSecret::new(TEST_JWT_SECRET),
        token_ttl_secs: 3600,
        media_root: std::env::temp_dir().join("foodgram-http-test-media"),
        media_url: "/media/".into(),
    };
    TestServer::new(build_router(state)).unwrap()
}

fn assert_kind(body: &Value, kind: &str) {
    assert_eq!(body["kind"], kind, "unexpected body {body}");
    assert!(body["message"].is_string());
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_live_but_not_ready_without_database() {
    let server = server();

    server.get("/healthz").await.assert_status(StatusCode::OK);
    server
        .get("/readyz")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_attach_request_id_to_responses() {
    let response = server().get("/healthz").await;

    assert!(response.headers().contains_key(X_REQUEST_ID));
}

#[tokio::test]
async fn should_render_unknown_path_as_json_not_found() {
    let response = server().get("/no/such/route").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_kind(&response.json::<Value>(), "NOT_FOUND");
}

#[tokio::test]
async fn should_return_404_for_missing_media_file() {
    server()
        .get("/media/recipes/missing.gif")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ── Authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_anonymous_writes() {
    let server = server();

    for response in [
        server.get("/users/me").await,
        server.get("/users/subscriptions").await,
        server.post("/users/2/subscribe").await,
        server.post("/recipes").json(&json!({})).await,
        server.delete("/recipes/1").await,
        server.post("/recipes/1/favorite").await,
        server.delete("/recipes/1/shopping_cart").await,
        server.get("/recipes/download_shopping_cart").await,
        server.post("/auth/token/logout").await,
    ] {
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_kind(&response.json::<Value>(), "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn should_reject_invalid_token_even_on_public_reads() {
    let response = server()
        .get("/recipes")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Token not-a-jwt"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_token_signed_with_foreign_secret() {
    let (token, _) = issue_access_token(1, UserRole::User, "someone-else", 3600).unwrap();
    let header = HeaderValue::from_str(&format!("Bearer {token}")).unwrap();

    let response = server()
        .get("/users/me")
        .add_header(AUTHORIZATION, header)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_logout_with_valid_token() {
    server()
        .post("/auth/token/logout")
        .add_header(AUTHORIZATION, MockAuth::user(1).header_value())
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

// ── Validation before persistence ────────────────────────────────────────────

#[tokio::test]
async fn should_reject_short_password_on_registration() {
    let response = server()
        .post("/users")
        .json(&json!({
            "email": "cook@example.com",
            "username": "cook",
            "first_name": "Ivan",
            "last_name": "Petrov",
            "password": "short"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_kind(&response.json::<Value>(), "VALIDATION_FAILED");
}

#[tokio::test]
async fn should_reject_recipe_without_tags() {
    let response = server()
        .post("/recipes")
        .add_header(AUTHORIZATION, MockAuth::user(1).header_value())
        .json(&json!({
            "ingredients": [{"id": 1, "amount": 10}],
            "tags": [],
            "image": GIF_DATA_URI,
            "name": "Borscht",
            "text": "Boil the beets.",
            "cooking_time": 60
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_kind(&body, "VALIDATION_FAILED");
    assert_eq!(body["message"], "at least one tag is required");
}

#[tokio::test]
async fn should_reject_out_of_range_cooking_time() {
    let response = server()
        .post("/recipes")
        .add_header(AUTHORIZATION, MockAuth::admin(1).header_value())
        .json(&json!({
            "ingredients": [{"id": 1, "amount": 10}],
            "tags": [1],
            "image": GIF_DATA_URI,
            "name": "Borscht",
            "text": "Boil the beets.",
            "cooking_time": 0
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_kind(&response.json::<Value>(), "VALIDATION_FAILED");
}

#[tokio::test]
async fn should_reject_self_subscription_before_lookup() {
    let response = server()
        .post("/users/7/subscribe")
        .add_header(AUTHORIZATION, MockAuth::user(7).header_value())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_kind(&response.json::<Value>(), "SELF_SUBSCRIPTION");
}
