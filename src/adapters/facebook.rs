use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{PublishOutcome, SocialPublisher};
use crate::db::Post;

const API_TIMEOUT: Duration = Duration::from_secs(60);

/// Facebook Graph API page adapter.
///
/// Three composition branches: a forced link-card post, a photo post when a
/// publicly reachable image exists, and a plain text post otherwise.
pub struct FacebookAdapter {
    client: Client,
    graph_url: String,
    page_id: String,
    access_token: String,
    public_base_url: Option<String>,
}

impl FacebookAdapter {
    /// Create a new adapter for the given page.
    #[must_use]
    pub fn new(
        graph_url: &str,
        page_id: &str,
        access_token: &str,
        public_base_url: Option<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            graph_url: graph_url.trim_end_matches('/').to_string(),
            page_id: page_id.to_string(),
            access_token: access_token.to_string(),
            public_base_url,
        }
    }

    async fn submit(&self, endpoint: &str, form: &[(&str, &str)]) -> PublishOutcome {
        let url = format!("{}/{}/{endpoint}", self.graph_url, self.page_id);

        let response = self.client.post(&url).form(form).send().await;

        match response {
            Ok(r) if r.status().is_success() => {
                let detail = r
                    .json::<serde_json::Value>()
                    .await
                    .ok()
                    .and_then(|v| {
                        v.get("id")
                            .or_else(|| v.get("post_id"))
                            .and_then(serde_json::Value::as_str)
                            .map(ToString::to_string)
                    })
                    .unwrap_or_else(|| "ok".to_string());
                PublishOutcome::Ok { detail }
            }
            Ok(r) => PublishOutcome::Failed {
                error: format!("Facebook rejected post: HTTP {}", r.status()),
            },
            Err(e) => PublishOutcome::Failed {
                error: format!("Facebook request failed: {e}"),
            },
        }
    }
}

#[async_trait]
impl SocialPublisher for FacebookAdapter {
    async fn publish(&self, post: &Post, link: &str, force_link_post: bool) -> PublishOutcome {
        let title = post.fb_title.as_deref().unwrap_or_default();
        let text = post.fb_content.as_deref().unwrap_or_default();

        // Link-card branch: the platform renders its own preview from the
        // link field, so the message text leaves the URL out.
        if force_link_post {
            debug!(post_id = post.id, "Submitting link-card post");
            let message = format!("{title}\n\n{text}");
            return self
                .submit(
                    "feed",
                    &[
                        ("message", message.as_str()),
                        ("link", link),
                        ("access_token", self.access_token.as_str()),
                    ],
                )
                .await;
        }

        let caption = compose_caption(title, text, link);

        // Photo branch needs an image Facebook can fetch; a local-only path
        // degrades to the text branch.
        let image = post
            .image_url
            .as_deref()
            .and_then(|img| resolve_public_image(img, self.public_base_url.as_deref()));

        if let Some(image_url) = image {
            debug!(post_id = post.id, "Submitting photo post");
            return self
                .submit(
                    "photos",
                    &[
                        ("url", image_url.as_str()),
                        ("caption", caption.as_str()),
                        ("access_token", self.access_token.as_str()),
                    ],
                )
                .await;
        }

        debug!(post_id = post.id, "Submitting text post");
        self.submit(
            "feed",
            &[
                ("message", caption.as_str()),
                ("access_token", self.access_token.as_str()),
            ],
        )
        .await
    }
}

/// Caption for photo and text posts: title, body, then the visible link.
fn compose_caption(title: &str, text: &str, link: &str) -> String {
    format!("{title}\n\n{text}\n\n📲 Ver nota: {link}")
}

/// Absolute image URL the platform can fetch, or `None` when the image is
/// only reachable locally.
fn resolve_public_image(image_url: &str, public_base_url: Option<&str>) -> Option<String> {
    if image_url.starts_with("http") {
        return Some(image_url.to_string());
    }
    if image_url.starts_with("/static") {
        return public_base_url.map(|base| format!("{}{image_url}", base.trim_end_matches('/')));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_caption_contains_link() {
        let caption = compose_caption("Titular", "Cuerpo", "https://eco.tv/nota");
        assert!(caption.contains("Titular"));
        assert!(caption.contains("Cuerpo"));
        assert!(caption.contains("📲 Ver nota: https://eco.tv/nota"));
    }

    #[test]
    fn test_resolve_public_image() {
        assert_eq!(
            resolve_public_image("https://cdn.example.com/a.jpg", None).as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
        assert_eq!(
            resolve_public_image("/static/images/2.jpg", Some("https://pub.example.com")).as_deref(),
            Some("https://pub.example.com/static/images/2.jpg")
        );
        assert_eq!(resolve_public_image("/static/images/2.jpg", None), None);
    }
}
