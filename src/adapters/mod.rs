mod facebook;
mod wordpress;

pub use facebook::FacebookAdapter;
pub use wordpress::WordPressAdapter;

use async_trait::async_trait;

use crate::db::Post;

/// Outcome of one publish attempt against one target.
///
/// Adapters never return `Err`: network and API failures are absorbed here
/// so a broken target can't abort the orchestrator.
#[derive(Debug, Clone)]
pub enum PublishOutcome {
    /// The target accepted the post. For the content site, `detail` is the
    /// canonical public link; for the social feed it is the platform's
    /// response id.
    Ok { detail: String },
    /// The target rejected the post or was unreachable.
    Failed { error: String },
}

impl PublishOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// The canonical link carried by a successful content-site outcome.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        match self {
            Self::Ok { detail } => Some(detail.as_str()),
            Self::Failed { .. } => None,
        }
    }
}

/// The content-management site, source of the canonical public link.
#[async_trait]
pub trait ContentSitePublisher: Send + Sync {
    /// Publish the post and return the canonical link on success.
    async fn publish(&self, post: &Post) -> PublishOutcome;
}

/// The social feed target.
#[async_trait]
pub trait SocialPublisher: Send + Sync {
    /// Post to the social feed.
    ///
    /// `link` is the canonical link when the content site produced one,
    /// otherwise the post's original source URL — never empty.
    /// `force_link_post` selects the link-card branch, where the platform
    /// renders its own preview and the message text omits the URL.
    async fn publish(&self, post: &Post, link: &str, force_link_post: bool) -> PublishOutcome;
}
