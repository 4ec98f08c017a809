//! API Integration Tests for the MatchPoint backend
//!
//! Drives the full router over an in-memory database.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::{Service, ServiceExt};

use matchpoint_backend::api;
use matchpoint_backend::infrastructure::app_state::AppState;
use matchpoint_backend::infrastructure::config::AppConfig;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

struct TestApp {
    router: Router,
    state: Arc<AppState>,
}

impl TestApp {
    fn token(&self, user_id: &str) -> String {
        self.state.jwt_service.sign(user_id, user_id).unwrap()
    }
}

/// Helper to create a test application
async fn create_test_app() -> TestApp {
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret-key".to_string(),
        ..AppConfig::default()
    };

    let state = Arc::new(AppState::new(config).await.expect("Failed to create app state"));

    TestApp {
        router: api::create_app(state.clone()),
        state,
    }
}

/// Helper to send a request with optional JSON body and bearer token
async fn send(
    app: &mut TestApp,
    method: &str,
    path: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = ServiceExt::<Request<Body>>::ready(&mut app.router)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

async fn post_json_auth(app: &mut TestApp, path: &str, body: Value, token: &str) -> (StatusCode, Value) {
    send(app, "POST", path, Some(body), Some(token)).await
}

async fn put_json_auth(app: &mut TestApp, path: &str, body: Value, token: &str) -> (StatusCode, Value) {
    send(app, "PUT", path, Some(body), Some(token)).await
}

async fn get_auth(app: &mut TestApp, path: &str, token: &str) -> (StatusCode, Value) {
    send(app, "GET", path, None, Some(token)).await
}

async fn delete_auth(app: &mut TestApp, path: &str, token: &str) -> (StatusCode, Value) {
    send(app, "DELETE", path, None, Some(token)).await
}

/// Create a group owned by `host` and a game in it, returning (group id, game id)
async fn setup_game(app: &mut TestApp, host: &str, max: Option<u32>) -> (String, String) {
    let token = app.token(host);

    let (status, body) = post_json_auth(app, "/api/groups", json!({ "name": "Thursday Padel" }), &token).await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = body["group"]["id"].as_str().unwrap().to_string();

    let scheduled = chrono::Utc::now().timestamp_millis() + DAY_MS;
    let (status, body) = post_json_auth(
        app,
        "/api/games",
        json!({
            "groupId": group_id,
            "title": "Doubles night",
            "scheduledTime": scheduled,
            "maxParticipants": max,
        }),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let game_id = body["game"]["id"].as_str().unwrap().to_string();

    (group_id, game_id)
}

// ============================================================================
// Health & Auth Tests
// ============================================================================

#[tokio::test]
async fn test_health() {
    let mut app = create_test_app().await;
    let (status, body) = send(&mut app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_routes_require_auth() {
    let mut app = create_test_app().await;

    let (status, _) = send(&mut app, "POST", "/api/groups", Some(json!({ "name": "x" })), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&mut app, "POST", "/api/games/any/participants", None, Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&mut app, "GET", "/api/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Group Tests
// ============================================================================

#[tokio::test]
async fn test_create_group_missing_name() {
    let mut app = create_test_app().await;
    let token = app.token("host");

    let (status, body) = post_json_auth(&mut app, "/api/groups", json!({ "name": "  " }), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_GROUP_NAME");
}

#[tokio::test]
async fn test_group_membership_rules() {
    let mut app = create_test_app().await;
    let (group_id, _) = setup_game(&mut app, "host", Some(4)).await;
    let host = app.token("host");
    let alice = app.token("alice");
    let path = format!("/api/groups/{}/members", group_id);

    let (status, body) = post_json_auth(&mut app, &path, json!({ "userId": "alice" }), &host).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["member"]["role"], "member");

    let (status, body) = post_json_auth(&mut app, &path, json!({ "userId": "alice" }), &host).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_MEMBER");

    let (status, _) = post_json_auth(&mut app, &path, json!({ "userId": "bob", "role": "owner" }), &host).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json_auth(&mut app, &path, json!({ "userId": "bob" }), &alice).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, body) = get_auth(&mut app, &path, &alice).await;
    assert_eq!(status, StatusCode::OK);
    let members = body["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["role"], "owner");
}

// ============================================================================
// Game & Registration Tests
// ============================================================================

#[tokio::test]
async fn test_create_game_requires_host() {
    let mut app = create_test_app().await;
    let (group_id, _) = setup_game(&mut app, "host", None).await;
    let alice = app.token("alice");

    let (status, _) = post_json_auth(
        &mut app,
        "/api/games",
        json!({ "groupId": group_id, "title": "Sneaky", "scheduledTime": 0 }),
        &alice,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_join_waitlist_and_promotion_flow() {
    let mut app = create_test_app().await;
    let (_, game_id) = setup_game(&mut app, "host", Some(1)).await;
    let alice = app.token("alice");
    let bob = app.token("bob");
    let participants = format!("/api/games/{}/participants", game_id);

    let (status, body) = post_json_auth(&mut app, &participants, json!({}), &alice).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "confirmed");

    let (status, body) = send(&mut app, "POST", &participants, None, Some(bob.as_str())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "waitlist");

    let (status, body) = post_json_auth(&mut app, &participants, json!({}), &alice).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_REGISTERED");

    let (status, body) = get_auth(&mut app, &format!("/api/games/{}", game_id), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game"]["currentParticipants"], 1);
    assert_eq!(body["game"]["participantIds"], json!(["alice"]));
    assert_eq!(body["game"]["waitlistIds"], json!(["bob"]));

    let (status, body) = delete_auth(&mut app, &format!("{}?participantId=alice", participants), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"]["userId"], "alice");
    assert_eq!(body["promoted"][0]["participant"]["userId"], "bob");

    let (status, body) = get_auth(&mut app, &participants, &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentParticipants"], 1);
    assert_eq!(body["participants"]["confirmed"][0]["userId"], "bob");
    assert_eq!(body["participants"]["waitlist"], json!([]));
}

#[tokio::test]
async fn test_join_unknown_game() {
    let mut app = create_test_app().await;
    let alice = app.token("alice");

    let (status, body) = post_json_auth(&mut app, "/api/games/missing/participants", json!({}), &alice).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "GAME_NOT_FOUND");
}

#[tokio::test]
async fn test_accepting_invite_on_full_game() {
    let mut app = create_test_app().await;
    let (_, game_id) = setup_game(&mut app, "host", Some(1)).await;
    let host = app.token("host");
    let alice = app.token("alice");
    let carol = app.token("carol");
    let participants = format!("/api/games/{}/participants", game_id);

    post_json_auth(&mut app, &participants, json!({}), &alice).await;

    let (status, body) = post_json_auth(
        &mut app,
        &participants,
        json!({ "userId": "carol", "status": "invited" }),
        &host,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "invited");

    let (status, body) = put_json_auth(
        &mut app,
        &participants,
        json!({ "participantId": "carol", "status": "confirmed" }),
        &carol,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "GAME_FULL");

    let (status, body) = put_json_auth(
        &mut app,
        &participants,
        json!({ "participantId": "alice", "status": "declined" }),
        &alice,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["previousStatus"], "confirmed");
    assert_eq!(body["participant"]["status"], "declined");
    // Invited users are not on the waitlist
    assert_eq!(body["promoted"], json!([]));

    let (status, _) = put_json_auth(
        &mut app,
        &participants,
        json!({ "participantId": "carol", "status": "confirmed" }),
        &carol,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = put_json_auth(
        &mut app,
        &participants,
        json!({ "participantId": "nobody", "status": "declined" }),
        &host,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PARTICIPANT_NOT_FOUND");
}

#[tokio::test]
async fn test_game_lifecycle_endpoint() {
    let mut app = create_test_app().await;
    let (_, game_id) = setup_game(&mut app, "host", Some(4)).await;
    let host = app.token("host");
    let alice = app.token("alice");
    let path = format!("/api/games/{}/status", game_id);

    let (status, _) = post_json_auth(&mut app, &path, json!({ "status": "in_progress" }), &alice).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = post_json_auth(&mut app, &path, json!({ "status": "completed" }), &host).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    post_json_auth(&mut app, &format!("/api/games/{}/participants", game_id), json!({}), &alice).await;

    let (status, body) = post_json_auth(&mut app, &path, json!({ "status": "canceled" }), &host).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game"]["status"], "canceled");
    assert_eq!(body["previousStatus"], "upcoming");
    assert_eq!(body["notified"], 1);

    let bob = app.token("bob");
    let (status, body) = post_json_auth(
        &mut app,
        &format!("/api/games/{}/participants", game_id),
        json!({}),
        &bob,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "GAME_NOT_OPEN");
}

#[tokio::test]
async fn test_waitlist_preview_and_priority() {
    let mut app = create_test_app().await;
    let (group_id, game_id) = setup_game(&mut app, "host", Some(1)).await;
    let participants = format!("/api/games/{}/participants", game_id);

    for user in ["alice", "bob", "carol"] {
        let token = app.token(user);
        post_json_auth(&mut app, &participants, json!({}), &token).await;
    }

    let host = app.token("host");
    let (status, body) = get_auth(&mut app, &format!("/api/games/{}/waitlist", game_id), &host).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["availableSpots"], 0);
    let candidates = body["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0]["participant"]["userId"], "bob");
    assert_eq!(candidates[0]["score"]["total"], 50.0);

    let (status, body) = get_auth(
        &mut app,
        &format!("/api/groups/{}/members/bob/priority", group_id),
        &host,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["coldStart"], true);
    assert_eq!(body["score"]["total"], 50.0);
}
