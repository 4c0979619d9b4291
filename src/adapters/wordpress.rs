use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::{ContentSitePublisher, PublishOutcome};
use crate::categories::wp_category_id;
use crate::db::Post;

const IMAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(20);
const API_TIMEOUT: Duration = Duration::from_secs(45);

/// WordPress REST API adapter.
///
/// Creates a remote article from `wp_title`/`wp_content`, attaching the
/// post's image as featured media when it can be fetched.
pub struct WordPressAdapter {
    client: Client,
    base_url: String,
    user: String,
    app_password: String,
    public_base_url: Option<String>,
}

impl WordPressAdapter {
    /// Create a new adapter for the given WordPress installation.
    #[must_use]
    pub fn new(
        base_url: &str,
        user: &str,
        app_password: &str,
        public_base_url: Option<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
            app_password: app_password.to_string(),
            public_base_url,
        }
    }

    /// Upload the post's image to the media library, best-effort.
    ///
    /// Failure here only means the article goes out without a featured
    /// image; it never fails the publish itself.
    async fn upload_image(&self, image_url: &str) -> Option<i64> {
        let full_url = resolve_image_url(image_url, self.public_base_url.as_deref())?;

        let response = match self
            .client
            .get(&full_url)
            .timeout(IMAGE_FETCH_TIMEOUT)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
        {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %full_url, "Failed to fetch image for upload: {e}");
                return None;
            }
        };

        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                warn!(url = %full_url, "Failed to read image bytes: {e}");
                return None;
            }
        };

        let filename = image_filename(&full_url);
        let mime = mime_guess::from_path(&filename)
            .first_raw()
            .unwrap_or("image/jpeg");

        let part = match multipart::Part::bytes(bytes.to_vec())
            .file_name(filename.clone())
            .mime_str(mime)
        {
            Ok(p) => p,
            Err(e) => {
                warn!(mime = %mime, "Invalid media mime type: {e}");
                return None;
            }
        };
        let form = multipart::Form::new().part("file", part);

        let upload = self
            .client
            .post(format!("{}/wp-json/wp/v2/media", self.base_url))
            .basic_auth(&self.user, Some(&self.app_password))
            .multipart(form)
            .send()
            .await;

        match upload {
            Ok(r) if r.status().is_success() => {
                let body: serde_json::Value = r.json().await.ok()?;
                let id = body.get("id").and_then(serde_json::Value::as_i64);
                debug!(media_id = ?id, "Uploaded featured image");
                id
            }
            Ok(r) => {
                warn!(status = %r.status(), "Media upload rejected");
                None
            }
            Err(e) => {
                warn!("Media upload failed: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl ContentSitePublisher for WordPressAdapter {
    async fn publish(&self, post: &Post) -> PublishOutcome {
        let media_id = match post.image_url.as_deref() {
            Some(img) => self.upload_image(img).await,
            None => None,
        };

        let content = format!(
            "{}<p>Fuente: {}</p>",
            post.wp_content.as_deref().unwrap_or_default(),
            pretty_source_name(&post.source_url)
        );

        let mut body = serde_json::json!({
            "title": post.wp_title.as_deref().unwrap_or_default(),
            "content": content,
            "status": "publish",
            "categories": [wp_category_id(&post.category)],
        });
        if let Some(id) = media_id {
            body["featured_media"] = serde_json::Value::from(id);
        }

        let response = self
            .client
            .post(format!("{}/wp-json/wp/v2/posts", self.base_url))
            .basic_auth(&self.user, Some(&self.app_password))
            .json(&body)
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => match r.json::<serde_json::Value>().await {
                Ok(json) => match json.get("link").and_then(serde_json::Value::as_str) {
                    Some(link) => PublishOutcome::Ok {
                        detail: link.to_string(),
                    },
                    None => PublishOutcome::Failed {
                        error: "WordPress response had no link".to_string(),
                    },
                },
                Err(e) => PublishOutcome::Failed {
                    error: format!("Invalid WordPress response: {e}"),
                },
            },
            Ok(r) => PublishOutcome::Failed {
                error: format!("WordPress rejected post: HTTP {}", r.status()),
            },
            Err(e) => PublishOutcome::Failed {
                error: format!("WordPress request failed: {e}"),
            },
        }
    }
}

/// Rewrite locally hosted `/static` paths against the public base URL.
///
/// Returns `None` when the image cannot be reached from outside.
fn resolve_image_url(image_url: &str, public_base_url: Option<&str>) -> Option<String> {
    if image_url.starts_with("http") {
        return Some(image_url.to_string());
    }
    if image_url.starts_with("/static") {
        return public_base_url.map(|base| format!("{}{image_url}", base.trim_end_matches('/')));
    }
    None
}

/// File name for the media upload, derived from the URL path.
fn image_filename(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut s| s.next_back().map(ToString::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "image.jpg".to_string())
}

/// Human-readable source attribution from a URL, e.g.
/// `https://www.exitosanoticias.pe/...` → "Exitosanoticias.pe".
#[must_use]
pub fn pretty_source_name(source_url: &str) -> String {
    let Some(domain) = Url::parse(source_url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
    else {
        return "Fuente Externa".to_string();
    };

    let domain = domain.strip_prefix("www.").unwrap_or(&domain);
    let mut chars = domain.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Fuente Externa".to_string(),
    }
}
