//! Link preview scraper - local HTTP + HTML parsing
//!
//! Fetches a page and pulls a display title and image out of its Open Graph
//! (or Twitter card) metadata. Strictly best-effort: any failure here means
//! a link card without a preview, never a failed submission.
//!
//! Limitations:
//! - No JavaScript rendering (static HTML metadata only)

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use super::traits::{BaseMetadataFetcher, PagePreview};

/// Simple preview scraper using reqwest + scraper
pub struct PreviewScraper {
    client: reqwest::Client,
}

impl PreviewScraper {
    pub fn new() -> Result<Self> {
        // Use a browser-like User-Agent to avoid bot detection
        let user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Pull (title, image) out of a parsed document. Returns the raw image
    /// reference, which may still be relative to the page URL.
    fn extract_preview(html: &str) -> (Option<String>, Option<String>) {
        let document = Html::parse_document(html);

        let title = Self::meta_content(&document, "meta[property='og:title']")
            .or_else(|| Self::meta_content(&document, "meta[name='twitter:title']"))
            .or_else(|| Self::extract_title_tag(&document));

        let image = Self::meta_content(&document, "meta[property='og:image']")
            .or_else(|| Self::meta_content(&document, "meta[name='twitter:image']"));

        (title, image)
    }

    fn meta_content(document: &Html, selector_str: &str) -> Option<String> {
        let selector = Selector::parse(selector_str).ok()?;
        document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
    }

    fn extract_title_tag(document: &Html) -> Option<String> {
        let title_selector = Selector::parse("title").ok()?;
        document
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Resolve a possibly-relative image reference against the page URL.
    fn resolve_image(page_url: &str, image: &str) -> Option<String> {
        if image.starts_with("http://") || image.starts_with("https://") {
            return Some(image.to_string());
        }
        let base = Url::parse(page_url).ok()?;
        base.join(image).ok().map(|joined| joined.to_string())
    }
}

#[async_trait]
impl BaseMetadataFetcher for PreviewScraper {
    async fn fetch_preview(&self, url: &str) -> Result<PagePreview> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} for {}", status, url);
        }

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        // `Html` is not Send; keep parsing out of any await span.
        let (title, raw_image) = Self::extract_preview(&body);
        let image = raw_image.and_then(|img| Self::resolve_image(url, &img));

        Ok(PagePreview { title, image })
    }
}
