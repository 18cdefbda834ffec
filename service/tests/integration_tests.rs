//! Integration tests exercising the full service stack:
//! HTTP request → handlers → engines → LMDB persistence → readback.
//!
//! These tests wire together the components that `service.rs` normally
//! connects, driving real storage through the public HTTP surface,
//! including a restart over the same data directory.

use agora_engine::{ProposalLifecycle, StaticTokenGate, SECS_PER_DAY};
use agora_nullables::NullClock;
use agora_rpc::{router, AppState, ADMIN_TOKEN_HEADER};
use agora_service::{AgoraService, ServiceConfig};
use agora_store_lmdb::LmdbStore;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TOKEN: &str = "council-key";
const T0: u64 = 1_700_000_000;

/// Build the stack `AgoraService::open` builds, but over the caller's
/// directory and clock, so tests can restart it and steer time.
fn open_app(dir: &Path, clock: Arc<NullClock>) -> Router {
    let config = ServiceConfig {
        admin_token: Some(TOKEN.to_string()),
        ..ServiceConfig::default()
    };
    let store = LmdbStore::open(dir).expect("open store");
    let gate = Arc::new(StaticTokenGate::new(config.admin_token.clone()));
    let window = u64::from(config.default_open_days) * SECS_PER_DAY;
    let lifecycle = ProposalLifecycle::new(store, gate, window);
    router(AppState::new(lifecycle, clock), false)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn close(id: u64, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::PATCH)
        .uri(format!("/proposals/{id}/close"));
    if let Some(token) = token {
        builder = builder.header(ADMIN_TOKEN_HEADER, token);
    }
    builder.body(Body::empty()).unwrap()
}

async fn create_proposal(app: &Router, title: &str, days_open: Option<u32>) -> Value {
    let mut body = json!({ "title": title, "description": "raised from the floor" });
    if let Some(days) = days_open {
        body["days_open"] = json!(days);
    }
    let (status, body) = send(app, post_json("/proposals", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn cast(app: &Router, proposal: u64, voter: &str, choice: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            &format!("/proposals/{proposal}/vote"),
            json!({ "voter_name": voter, "vote": choice }),
        ),
    )
    .await
}

// ---------------------------------------------------------------------------
// 1. Proposal lifecycle over real storage
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_vote_and_close_round_trip_through_lmdb() {
    let dir = tempfile::tempdir().expect("temp dir");
    let clock = Arc::new(NullClock::new(T0));
    let app = open_app(dir.path(), clock);

    let created = create_proposal(&app, "Adopt the new meeting cadence", None).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["status"], "active");
    // Default window comes from the config: two days.
    assert_eq!(created["deadline"], T0 + 2 * SECS_PER_DAY);

    let (status, _) = cast(&app, 1, "alice", "yes").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = cast(&app, 1, "bob", "yes").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = cast(&app, 1, "carol", "abstain").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, get("/proposals/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["yes_count"], 2);
    assert_eq!(body["no_count"], 0);
    assert_eq!(body["abstain_count"], 1);

    let (status, body) = send(&app, close(1, Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");
    assert_eq!(body["yes_count"], 2);

    // The frozen ledger still counts, but no new votes land.
    let (status, body) = cast(&app, 1, "dave", "no").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "invalid_state");
}

// ---------------------------------------------------------------------------
// 2. Restart persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn proposals_and_votes_survive_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let clock = Arc::new(NullClock::new(T0));

    let app = open_app(dir.path(), clock.clone());
    create_proposal(&app, "Repaint the common room", None).await;
    create_proposal(&app, "Extend quiet hours", None).await;
    let (status, _) = cast(&app, 1, "alice", "yes").await;
    assert_eq!(status, StatusCode::CREATED);
    drop(app);

    let app = open_app(dir.path(), clock);
    let (status, body) = send(&app, get("/proposals")).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["title"], "Repaint the common room");
    assert_eq!(listed[0]["yes_count"], 1);

    // The voter index survived, so alice is still spent on proposal 1.
    let (status, body) = cast(&app, 1, "alice", "no").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "conflict");

    // So did the id counter.
    let created = create_proposal(&app, "Buy a second kettle", None).await;
    assert_eq!(created["id"], 3);
}

#[tokio::test]
async fn closed_status_survives_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let clock = Arc::new(NullClock::new(T0));

    let app = open_app(dir.path(), clock.clone());
    create_proposal(&app, "Switch suppliers", None).await;
    let (status, _) = send(&app, close(1, Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    drop(app);

    let app = open_app(dir.path(), clock);
    let (status, body) = send(&app, get("/proposals/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");

    let (status, body) = cast(&app, 1, "alice", "yes").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "invalid_state");
}

#[tokio::test]
async fn revoked_votes_stay_revoked_after_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let clock = Arc::new(NullClock::new(T0));

    let app = open_app(dir.path(), clock.clone());
    create_proposal(&app, "Name the new server rack", None).await;
    let (status, vote) = cast(&app, 1, "alice", "yes").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, delete(&format!("/votes/{}", vote["id"]))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    drop(app);

    let app = open_app(dir.path(), clock);
    let (status, body) = send(&app, get("/votes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Revocation freed the voter; the recast takes a fresh id from the
    // persisted counter.
    let (status, recast) = cast(&app, 1, "alice", "no").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recast["id"], 2);

    let (_, body) = send(&app, get("/proposals/1")).await;
    assert_eq!(body["yes_count"], 0);
    assert_eq!(body["no_count"], 1);
}

// ---------------------------------------------------------------------------
// 3. Expiry across restarts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn expiry_is_computed_from_the_stored_deadline_after_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let clock = Arc::new(NullClock::new(T0));

    let app = open_app(dir.path(), clock.clone());
    let created = create_proposal(&app, "Trial a four-day week", Some(1)).await;
    assert_eq!(created["deadline"], T0 + SECS_PER_DAY);
    let (status, _) = cast(&app, 1, "alice", "yes").await;
    assert_eq!(status, StatusCode::CREATED);
    drop(app);

    clock.set(T0 + SECS_PER_DAY + 1);
    let app = open_app(dir.path(), clock);
    let (status, body) = send(&app, get("/proposals/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "expired");
    assert_eq!(body["yes_count"], 1);

    let (status, body) = cast(&app, 1, "bob", "no").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "invalid_state");
}

// ---------------------------------------------------------------------------
// 4. Service composition
// ---------------------------------------------------------------------------

#[tokio::test]
async fn service_open_serves_the_http_surface() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = ServiceConfig {
        data_dir: dir.path().to_path_buf(),
        admin_token: Some(TOKEN.to_string()),
        ..ServiceConfig::default()
    };
    let service = AgoraService::open(config).expect("open service");
    let app = router(service.state(), false);

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let created = create_proposal(&app, "Adopt the proposal process itself", None).await;
    assert_eq!(created["status"], "active");

    let (status, body) = send(&app, close(1, Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");
}

#[tokio::test]
async fn service_without_admin_token_rejects_every_close() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = ServiceConfig {
        data_dir: dir.path().to_path_buf(),
        admin_token: None,
        ..ServiceConfig::default()
    };
    let service = AgoraService::open(config).expect("open service");
    let app = router(service.state(), false);

    create_proposal(&app, "Unclosable without a configured token", None).await;
    let (status, body) = send(&app, close(1, Some("anything"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["kind"], "forbidden");
    let (status, _) = send(&app, close(1, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
