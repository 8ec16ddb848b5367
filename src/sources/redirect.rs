// src/sources/redirect.rs

//! Redirect-based "latest item" feed adapter.
//!
//! The feed endpoint answers with a redirect: the `Location` header is the
//! latest item's identity (and asset URL), and the `Index` header carries
//! the reference index for the human-facing link. The request must be made
//! with redirect-following disabled or both are lost.

use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{RedirectFeedConfig, RedirectItem};

/// Response header carrying the reference index.
const INDEX_HEADER: &str = "Index";

/// Adapter for the redirect-based feed.
pub struct RedirectFeed {
    config: RedirectFeedConfig,
}

impl RedirectFeed {
    /// Create a new adapter for the given feed.
    pub fn new(config: RedirectFeedConfig) -> Self {
        Self { config }
    }

    /// The feed configuration this adapter serves.
    pub fn config(&self) -> &RedirectFeedConfig {
        &self.config
    }

    /// Fetch the latest item.
    ///
    /// `client` must have redirects disabled; see
    /// [`crate::utils::http::create_no_redirect_client`].
    pub async fn fetch(&self, client: &Client) -> Result<RedirectItem> {
        let response = client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| AppError::fetch(&self.config.url, e))?;

        let location = header_value(&response, reqwest::header::LOCATION.as_str())
            .ok_or_else(|| AppError::malformed(&self.config.url, "missing Location header"))?;
        let index = header_value(&response, INDEX_HEADER)
            .ok_or_else(|| AppError::malformed(&self.config.url, "missing Index header"))?;

        Ok(RedirectItem { location, index })
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .filter(|v| !v.is_empty())
}
