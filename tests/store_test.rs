//! Integration tests for post store operations: ingestion de-duplication,
//! claim exclusivity and queue ordering.

use rebound_publisher::db::{
    claim_next_queued, claim_scheduled_due, count_posts_by_status, get_post,
    get_post_by_source_url, insert_post, write_publish_result, Database, NewPost, PostStatus,
};
use tempfile::TempDir;

async fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.sqlite");
    let db = Database::new(&db_path)
        .await
        .expect("Failed to create database");
    (db, temp_dir)
}

fn new_post(source_url: &str) -> NewPost {
    NewPost {
        source_url: source_url.to_string(),
        source_title: Some("Titular de prueba".to_string()),
        image_url: None,
        category: Some("Nacional".to_string()),
    }
}

/// Move a post into an eligible state with explicit timestamps. Claims order
/// by `updated_at`, which has one-second resolution, so tests set it
/// directly instead of racing the clock.
async fn make_eligible(db: &Database, id: i64, status: &str, scheduled_at: Option<&str>, updated_at: &str) {
    sqlx::query("UPDATE posts SET status = ?, scheduled_at = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(scheduled_at)
        .bind(updated_at)
        .bind(id)
        .execute(db.pool())
        .await
        .expect("Failed to prepare post");
}

#[tokio::test]
async fn test_ingestion_is_idempotent() {
    let (db, _temp_dir) = setup_db().await;

    let first = insert_post(db.pool(), &new_post("https://fuente.pe/nota-1"))
        .await
        .expect("Failed to insert post");
    assert!(first.is_some());

    let second = insert_post(db.pool(), &new_post("https://fuente.pe/nota-1"))
        .await
        .expect("Failed to re-insert post");
    assert!(second.is_none(), "duplicate source_url must be a no-op");

    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(row.0, 1);

    let stored = get_post_by_source_url(db.pool(), "https://fuente.pe/nota-1")
        .await
        .unwrap()
        .expect("Post not found");
    assert_eq!(stored.status, "raw");
    assert_eq!(stored.category, "Nacional");
}

#[tokio::test]
async fn test_claim_scheduled_respects_due_time() {
    let (db, _temp_dir) = setup_db().await;

    let id = insert_post(db.pool(), &new_post("https://fuente.pe/nota-futura"))
        .await
        .unwrap()
        .unwrap();
    make_eligible(&db, id, "scheduled", Some("2099-01-01 00:00:00"), "2024-01-01 00:00:00").await;

    assert!(
        claim_scheduled_due(db.pool()).await.unwrap().is_none(),
        "post scheduled in the future must not be claimable"
    );

    make_eligible(&db, id, "scheduled", Some("2024-01-01 00:00:00"), "2024-01-01 00:00:00").await;

    let claimed = claim_scheduled_due(db.pool())
        .await
        .unwrap()
        .expect("due post should be claimed");
    assert_eq!(claimed.id, id);
    assert_eq!(claimed.status, "claimed");

    // Already claimed: a second call sees nothing.
    assert!(claim_scheduled_due(db.pool()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_queue_claim_is_fifo_by_updated_at() {
    let (db, _temp_dir) = setup_db().await;

    let mut ids = Vec::new();
    for i in 0..3 {
        let id = insert_post(db.pool(), &new_post(&format!("https://fuente.pe/cola-{i}")))
            .await
            .unwrap()
            .unwrap();
        ids.push(id);
    }

    // Enqueue in reverse id order so FIFO has to follow updated_at, not id.
    make_eligible(&db, ids[2], "queued", None, "2024-01-01 00:00:01").await;
    make_eligible(&db, ids[0], "queued", None, "2024-01-01 00:00:02").await;
    make_eligible(&db, ids[1], "queued", None, "2024-01-01 00:00:03").await;

    let order: Vec<i64> = [
        claim_next_queued(db.pool()).await.unwrap().unwrap().id,
        claim_next_queued(db.pool()).await.unwrap().unwrap().id,
        claim_next_queued(db.pool()).await.unwrap().unwrap().id,
    ]
    .to_vec();

    assert_eq!(order, vec![ids[2], ids[0], ids[1]]);
    assert!(claim_next_queued(db.pool()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_claims_are_exclusive() {
    let (db, _temp_dir) = setup_db().await;

    let id = insert_post(db.pool(), &new_post("https://fuente.pe/unica"))
        .await
        .unwrap()
        .unwrap();
    make_eligible(&db, id, "queued", None, "2024-01-01 00:00:00").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = db.pool().clone();
        handles.push(tokio::spawn(async move {
            claim_next_queued(&pool).await.unwrap()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            winners += 1;
        }
    }

    assert_eq!(winners, 1, "exactly one claimant may win the post");
    assert_eq!(
        count_posts_by_status(db.pool(), PostStatus::Claimed)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_write_publish_result() {
    let (db, _temp_dir) = setup_db().await;

    let id = insert_post(db.pool(), &new_post("https://fuente.pe/resultado"))
        .await
        .unwrap()
        .unwrap();
    make_eligible(&db, id, "queued", None, "2024-01-01 00:00:00").await;
    let claimed = claim_next_queued(db.pool()).await.unwrap().unwrap();

    write_publish_result(
        db.pool(),
        claimed.id,
        PostStatus::ErrorPublishing,
        "Auto. WP:OK FB:Fail",
    )
    .await
    .unwrap();

    let stored = get_post(db.pool(), id).await.unwrap().unwrap();
    assert_eq!(stored.status, "error_publishing");
    assert_eq!(stored.last_error.as_deref(), Some("Auto. WP:OK FB:Fail"));
    // The diagnostic must not leak into the social text field.
    assert!(stored.fb_content.is_none());
}
