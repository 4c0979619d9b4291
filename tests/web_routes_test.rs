//! Integration tests for the HTTP surface, with always-succeeding stub
//! adapters behind the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use rebound_publisher::adapters::{ContentSitePublisher, PublishOutcome, SocialPublisher};
use rebound_publisher::db::{Database, Post};
use rebound_publisher::publish::Orchestrator;
use rebound_publisher::web::{router, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

struct StubSite;

#[async_trait]
impl ContentSitePublisher for StubSite {
    async fn publish(&self, _post: &Post) -> PublishOutcome {
        PublishOutcome::Ok {
            detail: "https://ecotv.pe/nota".to_string(),
        }
    }
}

struct StubSocial;

#[async_trait]
impl SocialPublisher for StubSocial {
    async fn publish(&self, _post: &Post, _link: &str, _force_link_post: bool) -> PublishOutcome {
        PublishOutcome::Ok {
            detail: "fb-1".to_string(),
        }
    }
}

async fn create_test_app() -> (Router, Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("test.sqlite"))
        .await
        .expect("Failed to create database");

    let orchestrator = Arc::new(Orchestrator::new(
        db.clone(),
        Arc::new(StubSite),
        Arc::new(StubSocial),
        Duration::from_secs(5),
    ));

    let state = AppState {
        db: db.clone(),
        orchestrator,
    };

    (router().with_state(state), db, temp_dir)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body was not JSON")
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _db, _tmp) = create_test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_categories() {
    let (app, _db, _tmp) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts/categories")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(names.contains(&"Deporte"));
    assert!(names.contains(&"General"));
}

#[tokio::test]
async fn test_ingest_and_duplicate() {
    let (app, _db, _tmp) = create_test_app().await;

    let body = serde_json::json!({
        "source_url": "https://fuente.pe/nota",
        "source_title": "Titular",
        "category": "Nacional",
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/posts", body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["created"], true);

    let response = app.oneshot(json_request("POST", "/posts", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["created"], false);
}

#[tokio::test]
async fn test_publish_next_empty_queue() {
    let (app, _db, _tmp) = create_test_app().await;

    let response = app.oneshot(empty_post("/posts/publish-next")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Nada en cola");
}

#[tokio::test]
async fn test_publish_scheduled_nothing_due() {
    let (app, _db, _tmp) = create_test_app().await;

    let response = app
        .oneshot(empty_post("/posts/publish-scheduled"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Nada programado");
}

#[tokio::test]
async fn test_queue_flow_publishes_edited_post() {
    let (app, db, _tmp) = create_test_app().await;

    let create = serde_json::json!({"source_url": "https://fuente.pe/en-cola"});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/posts", create))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    // Operator fills in the rewritten content and queues the post.
    let update = serde_json::json!({
        "status": "queued",
        "fb_title": "Titular FB",
        "fb_content": "Texto FB",
        "wp_title": "Titular WP",
        "wp_content": "<p>Texto</p>",
    });
    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/posts/{id}"), update))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(empty_post("/posts/publish-next")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["message"], "Cola: published");

    let stored: (String,) = sqlx::query_as("SELECT status FROM posts WHERE id = ?")
        .bind(id)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(stored.0, "published");
}

#[tokio::test]
async fn test_manual_rebound_missing_post_is_404() {
    let (app, _db, _tmp) = create_test_app().await;

    let response = app
        .oneshot(empty_post("/posts/999/publish-rebound"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manual_rebound_reports_status_and_targets() {
    let (app, _db, _tmp) = create_test_app().await;

    let create = serde_json::json!({"source_url": "https://fuente.pe/manual"});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/posts", create))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .oneshot(empty_post(&format!("/posts/{id}/publish-rebound-link")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with("published: Rebote Link."));
    assert!(message.contains("WP:OK"));
    assert!(message.contains("FB:OK"));
}

#[tokio::test]
async fn test_edit_post_rejects_bad_status_and_timestamp() {
    let (app, _db, _tmp) = create_test_app().await;

    let create = serde_json::json!({"source_url": "https://fuente.pe/editada"});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/posts", create))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let bad_status = serde_json::json!({"status": "publicando"});
    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/posts/{id}"), bad_status))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bad_timestamp = serde_json::json!({"scheduled_at": "mañana a las 9"});
    let response = app
        .oneshot(json_request("PUT", &format!("/posts/{id}"), bad_timestamp))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_edit_post_scheduled_requires_timestamp() {
    let (app, _db, _tmp) = create_test_app().await;

    let create = serde_json::json!({"source_url": "https://fuente.pe/sin-fecha"});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/posts", create))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    // Neither the update nor the row carries a timestamp.
    let no_timestamp = serde_json::json!({"status": "scheduled"});
    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/posts/{id}"), no_timestamp))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let with_timestamp = serde_json::json!({
        "status": "scheduled",
        "scheduled_at": "2030-01-01 09:00:00",
    });
    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/posts/{id}"), with_timestamp))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Once the row carries a timestamp, re-scheduling alone is fine.
    let status_only = serde_json::json!({"status": "scheduled"});
    let response = app
        .oneshot(json_request("PUT", &format!("/posts/{id}"), status_only))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_clear_errors() {
    let (app, db, _tmp) = create_test_app().await;

    sqlx::query(
        "INSERT INTO posts (source_url, status) VALUES ('https://fuente.pe/rota', 'error_publishing')",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let response = app.oneshot(empty_post("/posts/errors/clear")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["deleted"], 1);
}
