use serde::{Deserialize, Serialize};

/// A scraped article on its way to being republished.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub source_url: String,
    pub source_title: Option<String>,
    pub image_url: Option<String>,
    pub category: String,
    pub fb_title: Option<String>,
    pub fb_content: Option<String>,
    pub wp_title: Option<String>,
    pub wp_content: Option<String>,
    pub status: String,
    pub publication_mode: String,
    pub scheduled_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub last_error: Option<String>,
}

impl Post {
    #[must_use]
    pub fn status_enum(&self) -> Option<PostStatus> {
        PostStatus::from_str(&self.status)
    }

    /// The operator-selected rebound strategy, defaulting to `auto` for
    /// unset or unrecognized values.
    #[must_use]
    pub fn mode(&self) -> PublicationMode {
        PublicationMode::parse(&self.publication_mode)
    }
}

/// Lifecycle status of a post.
///
/// raw → pending → {scheduled | queued} → claimed → {published | error_publishing};
/// `deleted` is a soft delete, `error` marks upstream content-generation
/// failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Raw,
    Pending,
    Scheduled,
    Queued,
    Claimed,
    Published,
    ErrorPublishing,
    Error,
    Deleted,
}

impl PostStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Queued => "queued",
            Self::Claimed => "claimed",
            Self::Published => "published",
            Self::ErrorPublishing => "error_publishing",
            Self::Error => "error",
            Self::Deleted => "deleted",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "raw" => Some(Self::Raw),
            "pending" => Some(Self::Pending),
            "scheduled" => Some(Self::Scheduled),
            "queued" => Some(Self::Queued),
            "claimed" => Some(Self::Claimed),
            "published" => Some(Self::Published),
            "error_publishing" => Some(Self::ErrorPublishing),
            "error" => Some(Self::Error),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// How a post is mirrored to the social feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationMode {
    /// Photo-style composition without forcing a link-card.
    Auto,
    /// Photo submission, canonical link visible in the caption.
    ReboteFoto,
    /// Link-card submission, platform renders the preview from the link.
    ReboteLink,
}

impl PublicationMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::ReboteFoto => "rebote_foto",
            Self::ReboteLink => "rebote_link",
        }
    }

    /// Parse an operator-supplied mode string. Anything unrecognized falls
    /// back to `Auto`, matching the default publishing behavior.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "rebote_foto" => Self::ReboteFoto,
            "rebote_link" => Self::ReboteLink,
            _ => Self::Auto,
        }
    }
}

/// Data for ingesting a freshly scraped post.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub source_url: String,
    pub source_title: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

/// Partial operator update of a post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostUpdate {
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub fb_title: Option<String>,
    pub fb_content: Option<String>,
    pub wp_title: Option<String>,
    pub wp_content: Option<String>,
    pub scheduled_at: Option<String>,
    pub publication_mode: Option<String>,
}
