use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::models::{NewPost, Post, PostStatus, PostUpdate};

// ========== Ingestion ==========

/// Ingest a freshly scraped post.
///
/// `source_url` carries a UNIQUE constraint, so re-scraping the same article
/// is a no-op. Returns the new row id, or `None` when the URL was already
/// known.
pub async fn insert_post(pool: &SqlitePool, post: &NewPost) -> Result<Option<i64>> {
    let result = sqlx::query(
        r"
        INSERT INTO posts (source_url, source_title, image_url, category, status)
        VALUES (?, ?, ?, COALESCE(?, 'General'), 'raw')
        ON CONFLICT(source_url) DO NOTHING
        ",
    )
    .bind(&post.source_url)
    .bind(&post.source_title)
    .bind(&post.image_url)
    .bind(&post.category)
    .execute(pool)
    .await
    .context("Failed to insert post")?;

    if result.rows_affected() == 0 {
        Ok(None)
    } else {
        Ok(Some(result.last_insert_rowid()))
    }
}

/// Get a post by ID.
pub async fn get_post(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    sqlx::query_as("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch post")
}

/// Get a post by its source URL.
pub async fn get_post_by_source_url(pool: &SqlitePool, source_url: &str) -> Result<Option<Post>> {
    sqlx::query_as("SELECT * FROM posts WHERE source_url = ?")
        .bind(source_url)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch post by source URL")
}

// ========== Claims ==========
//
// Both claims are single UPDATE statements with an eligibility sub-select.
// SQLite serializes writers, so exactly one concurrent claimant matches the
// row and flips it to 'claimed'; everyone else matches nothing and gets
// `None` back instead of blocking on the winner.

/// Claim one scheduled post whose due time has passed.
///
/// No ordering guarantee beyond "due". Returns `None` when nothing is due.
pub async fn claim_scheduled_due(pool: &SqlitePool) -> Result<Option<Post>> {
    sqlx::query_as(
        r"
        UPDATE posts
        SET status = 'claimed', updated_at = datetime('now')
        WHERE id IN (
            SELECT id FROM posts
            WHERE status = 'scheduled'
              AND scheduled_at IS NOT NULL
              AND scheduled_at <= datetime('now')
            LIMIT 1
        )
        RETURNING *
        ",
    )
    .fetch_optional(pool)
    .await
    .context("Failed to claim scheduled post")
}

/// Claim the oldest queued post (FIFO by `updated_at`).
///
/// Returns `None` when the queue is empty.
pub async fn claim_next_queued(pool: &SqlitePool) -> Result<Option<Post>> {
    sqlx::query_as(
        r"
        UPDATE posts
        SET status = 'claimed', updated_at = datetime('now')
        WHERE id IN (
            SELECT id FROM posts
            WHERE status = 'queued'
            ORDER BY updated_at ASC, id ASC
            LIMIT 1
        )
        RETURNING *
        ",
    )
    .fetch_optional(pool)
    .await
    .context("Failed to claim queued post")
}

// ========== Write-back ==========

/// Persist the outcome of a publish attempt.
///
/// This is the only path that writes `published`.
pub async fn write_publish_result(
    pool: &SqlitePool,
    id: i64,
    status: PostStatus,
    message: &str,
) -> Result<()> {
    sqlx::query(
        r"
        UPDATE posts
        SET status = ?, last_error = ?, updated_at = datetime('now')
        WHERE id = ?
        ",
    )
    .bind(status.as_str())
    .bind(message)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to write publish result")?;

    Ok(())
}

// ========== Operator actions ==========

/// Apply a partial operator update and bump `updated_at`.
///
/// `updated_at` is the FIFO key for the queue, so editing a post sends it to
/// the back of the line.
pub async fn update_post(pool: &SqlitePool, id: i64, update: &PostUpdate) -> Result<Option<Post>> {
    sqlx::query_as(
        r"
        UPDATE posts
        SET status = COALESCE(?, status),
            image_url = COALESCE(?, image_url),
            category = COALESCE(?, category),
            fb_title = COALESCE(?, fb_title),
            fb_content = COALESCE(?, fb_content),
            wp_title = COALESCE(?, wp_title),
            wp_content = COALESCE(?, wp_content),
            scheduled_at = COALESCE(?, scheduled_at),
            publication_mode = COALESCE(?, publication_mode),
            updated_at = datetime('now')
        WHERE id = ?
        RETURNING *
        ",
    )
    .bind(&update.status)
    .bind(&update.image_url)
    .bind(&update.category)
    .bind(&update.fb_title)
    .bind(&update.fb_content)
    .bind(&update.wp_title)
    .bind(&update.wp_content)
    .bind(&update.scheduled_at)
    .bind(&update.publication_mode)
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to update post")
}

/// Bulk-delete posts stuck in an error state.
pub async fn clear_error_posts(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM posts WHERE status IN ('error', 'error_publishing')")
        .execute(pool)
        .await
        .context("Failed to clear error posts")?;

    Ok(result.rows_affected())
}

/// Count posts in a given status.
pub async fn count_posts_by_status(pool: &SqlitePool, status: PostStatus) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE status = ?")
        .bind(status.as_str())
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.0)
}
