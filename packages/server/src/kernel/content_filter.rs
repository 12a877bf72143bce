//! Blocklist content filter.
//!
//! Screens the submitted URL and message before acceptance. This is the
//! lightweight stand-in for a real moderation service: a word blocklist over
//! both fields, checked synchronously in the submission path.

use anyhow::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::traits::{BaseContentFilter, ContentVerdict};

lazy_static! {
    /// Terms that reject a submission outright, matched case-insensitively
    /// on word boundaries in either the URL or the message.
    static ref BLOCKED_TERMS: Regex = Regex::new(
        r"(?i)\b(porn|xxx|nsfw|casino|viagra|warez|phishing|nude)\b"
    )
    .expect("blocklist pattern is valid");
}

/// Regex blocklist filter
#[derive(Default)]
pub struct BlocklistContentFilter;

impl BlocklistContentFilter {
    pub fn new() -> Self {
        Self
    }

    fn find_blocked(text: &str) -> Option<String> {
        BLOCKED_TERMS
            .find(text)
            .map(|m| m.as_str().to_lowercase())
    }
}

#[async_trait]
impl BaseContentFilter for BlocklistContentFilter {
    async fn check(&self, url: &str, message: &str) -> Result<ContentVerdict> {
        if let Some(term) = Self::find_blocked(url).or_else(|| Self::find_blocked(message)) {
            return Ok(ContentVerdict::Unsafe {
                reason: format!("contains blocked term \"{term}\""),
            });
        }
        Ok(ContentVerdict::Safe)
    }
}
