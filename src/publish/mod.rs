//! The publish orchestrator.
//!
//! One claimed post at a time: WordPress first (it produces the canonical
//! link), then Facebook with a composition picked by the rebound mode, then
//! a single status write-back. Adapter failures never escape a publish
//! attempt; they only shape the final status and diagnostic message.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::adapters::{ContentSitePublisher, PublishOutcome, SocialPublisher};
use crate::db::{
    claim_next_queued, claim_scheduled_due, get_post, write_publish_result, Database, Post,
    PostStatus, PublicationMode,
};

/// Reply when no scheduled post is due.
pub const NOTHING_SCHEDULED: &str = "Nada programado";
/// Reply when the publish queue is empty.
pub const NOTHING_QUEUED: &str = "Nada en cola";

/// Result of one publish attempt, ready for write-back.
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub status: PostStatus,
    pub message: String,
}

/// Sequences the two publishing targets for one post at a time.
pub struct Orchestrator {
    db: Database,
    site: Arc<dyn ContentSitePublisher>,
    social: Arc<dyn SocialPublisher>,
    call_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        db: Database,
        site: Arc<dyn ContentSitePublisher>,
        social: Arc<dyn SocialPublisher>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            db,
            site,
            social,
            call_timeout,
        }
    }

    /// Publish one post to both targets.
    ///
    /// The content site always goes first; the social call uses its
    /// canonical link, falling back to the post's source URL when the site
    /// call failed. Final status is `published` only when both targets
    /// succeeded.
    pub async fn execute_publish(&self, post: &Post, mode: PublicationMode) -> PublishReport {
        let site_outcome = self.call_with_timeout(self.site.publish(post)).await;
        if let PublishOutcome::Failed { error } = &site_outcome {
            warn!(post_id = post.id, "Content-site publish failed: {error}");
        }

        let canonical_link = site_outcome.link();
        let link = canonical_link.unwrap_or(&post.source_url);

        // The link-card only makes sense when a canonical link exists; a
        // failed site publish degrades rebote_link to caption composition
        // over the source URL.
        let (label, force_link_post) = match mode {
            PublicationMode::ReboteLink => ("Rebote Link", canonical_link.is_some()),
            PublicationMode::ReboteFoto => ("Rebote Foto", false),
            PublicationMode::Auto => ("Auto", false),
        };

        let social_outcome = self
            .call_with_timeout(self.social.publish(post, link, force_link_post))
            .await;
        if let PublishOutcome::Failed { error } = &social_outcome {
            warn!(post_id = post.id, "Social publish failed: {error}");
        }

        let wp_ok = site_outcome.is_ok();
        let fb_ok = social_outcome.is_ok();

        let status = if wp_ok && fb_ok {
            PostStatus::Published
        } else {
            PostStatus::ErrorPublishing
        };
        let message = format!("{label}. WP:{} FB:{}", ok_fail(wp_ok), ok_fail(fb_ok));

        info!(
            post_id = post.id,
            status = status.as_str(),
            message = %message,
            "Publish attempt finished"
        );

        PublishReport { status, message }
    }

    /// Claim one due scheduled post and publish it.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store is unreachable; that ends the
    /// scheduler tick without claiming anything.
    pub async fn publish_scheduled(&self) -> Result<String> {
        let Some(post) = claim_scheduled_due(self.db.pool()).await? else {
            return Ok(NOTHING_SCHEDULED.to_string());
        };

        let report = self.execute_publish(&post, post.mode()).await;
        write_publish_result(self.db.pool(), post.id, report.status, &report.message).await?;

        Ok(format!("Programado: {}", report.status.as_str()))
    }

    /// Claim the oldest queued post and publish it.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store is unreachable.
    pub async fn publish_next(&self) -> Result<String> {
        let Some(post) = claim_next_queued(self.db.pool()).await? else {
            return Ok(NOTHING_QUEUED.to_string());
        };

        let report = self.execute_publish(&post, post.mode()).await;
        write_publish_result(self.db.pool(), post.id, report.status, &report.message).await?;

        Ok(format!("Cola: {}", report.status.as_str()))
    }

    /// Manual trigger: publish one post with an operator-forced mode.
    ///
    /// Returns `None` when the post does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store is unreachable.
    pub async fn publish_by_id(&self, id: i64, mode: PublicationMode) -> Result<Option<String>> {
        let Some(post) = get_post(self.db.pool(), id).await? else {
            return Ok(None);
        };

        let report = self.execute_publish(&post, mode).await;
        write_publish_result(self.db.pool(), post.id, report.status, &report.message).await?;

        Ok(Some(format!("{}: {}", report.status.as_str(), report.message)))
    }

    /// Bound one adapter call; a timeout counts as that adapter failing,
    /// not as an orchestrator failure.
    async fn call_with_timeout(
        &self,
        call: impl std::future::Future<Output = PublishOutcome> + Send,
    ) -> PublishOutcome {
        match timeout(self.call_timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => PublishOutcome::Failed {
                error: format!("adapter call timed out after {:?}", self.call_timeout),
            },
        }
    }
}

fn ok_fail(ok: bool) -> &'static str {
    if ok {
        "OK"
    } else {
        "Fail"
    }
}
