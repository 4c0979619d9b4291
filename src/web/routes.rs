use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;

use super::AppState;
use crate::categories::category_names;
use crate::db::{
    clear_error_posts, get_post, insert_post, update_post, NewPost, PostStatus, PostUpdate,
    PublicationMode,
};

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", post(ingest_post))
        .route("/posts/categories", get(list_categories))
        .route("/posts/:id", put(edit_post))
        .route("/posts/publish-scheduled", post(publish_scheduled))
        .route("/posts/publish-next", post(publish_next))
        .route("/posts/:id/publish-rebound", post(publish_rebound))
        .route("/posts/:id/publish-rebound-link", post(publish_rebound_link))
        .route("/posts/errors/clear", post(clear_errors))
        .route("/healthz", get(health))
}

// ========== Ingestion & operator edits ==========

/// Ingest a scraped article. Re-submitting a known `source_url` is a no-op.
async fn ingest_post(State(state): State<AppState>, Json(new_post): Json<NewPost>) -> Response {
    match insert_post(state.db.pool(), &new_post).await {
        Ok(Some(id)) => (
            StatusCode::CREATED,
            Json(json!({"message": "OK", "created": true, "id": id})),
        )
            .into_response(),
        Ok(None) => Json(json!({"message": "OK", "created": false})).into_response(),
        Err(e) => {
            tracing::error!("Failed to ingest post: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

async fn edit_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<PostUpdate>,
) -> Response {
    if let Some(status) = &update.status {
        match PostStatus::from_str(status) {
            None => return (StatusCode::UNPROCESSABLE_ENTITY, "Unknown status").into_response(),
            // A scheduled post without a timestamp never comes due.
            Some(PostStatus::Scheduled) if update.scheduled_at.is_none() => {
                match get_post(state.db.pool(), id).await {
                    Ok(Some(post)) if post.scheduled_at.is_none() => {
                        return (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            "scheduled status requires scheduled_at",
                        )
                            .into_response();
                    }
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        return (StatusCode::NOT_FOUND, "Post not found").into_response();
                    }
                    Err(e) => {
                        tracing::error!("Failed to load post: {e:#}");
                        return (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
                            .into_response();
                    }
                }
            }
            Some(_) => {}
        }
    }
    // scheduled_at is compared against datetime('now') in the store, so it
    // must arrive in SQLite's UTC format.
    if let Some(ts) = &update.scheduled_at {
        if chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").is_err() {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                "scheduled_at must be 'YYYY-MM-DD HH:MM:SS' (UTC)",
            )
                .into_response();
        }
    }

    match update_post(state.db.pool(), id, &update).await {
        Ok(Some(updated)) => Json(updated).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Post not found").into_response(),
        Err(e) => {
            tracing::error!("Failed to update post: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

// ========== Publish triggers ==========

/// Claim and publish one due scheduled post; reports "Nada programado" when
/// nothing is due.
async fn publish_scheduled(State(state): State<AppState>) -> Response {
    match state.orchestrator.publish_scheduled().await {
        Ok(message) => Json(json!({ "message": message })).into_response(),
        Err(e) => {
            tracing::error!("Scheduled publish failed: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

/// Claim and publish the oldest queued post; reports "Nada en cola" when
/// the queue is empty.
async fn publish_next(State(state): State<AppState>) -> Response {
    match state.orchestrator.publish_next().await {
        Ok(message) => Json(json!({ "message": message })).into_response(),
        Err(e) => {
            tracing::error!("Queue publish failed: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

/// Manual trigger, forcing photo-mode rebound for one post.
async fn publish_rebound(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    publish_manual(&state, id, PublicationMode::ReboteFoto).await
}

/// Manual trigger, forcing link-card rebound for one post.
async fn publish_rebound_link(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    publish_manual(&state, id, PublicationMode::ReboteLink).await
}

async fn publish_manual(state: &AppState, id: i64, mode: PublicationMode) -> Response {
    match state.orchestrator.publish_by_id(id, mode).await {
        Ok(Some(message)) => Json(json!({ "message": message })).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Post not found").into_response(),
        Err(e) => {
            tracing::error!(post_id = id, "Manual publish failed: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

/// Category names an operator can assign, mirroring the remote taxonomy.
async fn list_categories() -> Json<Vec<&'static str>> {
    Json(category_names())
}

// ========== Maintenance ==========

async fn clear_errors(State(state): State<AppState>) -> Response {
    match clear_error_posts(state.db.pool()).await {
        Ok(deleted) => Json(json!({"message": "OK", "deleted": deleted})).into_response(),
        Err(e) => {
            tracing::error!("Failed to clear error posts: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

async fn health() -> &'static str {
    "OK"
}
