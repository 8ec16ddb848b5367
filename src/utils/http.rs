// src/utils/http.rs

//! HTTP client construction.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| AppError::config(format!("failed to build HTTP client: {e}")))?;
    Ok(client)
}

/// Create a client that does not follow redirects.
///
/// The redirect feed's contract is the redirect itself: the `Location`
/// header carries the item identity, so the client must surface the 3xx
/// response instead of chasing it.
pub fn create_no_redirect_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| AppError::config(format!("failed to build HTTP client: {e}")))?;
    Ok(client)
}
