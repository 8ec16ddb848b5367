// src/sources/assets.rs

//! Binary asset retrieval.

use reqwest::Client;

use crate::error::{AppError, Result};

/// Fetch the binary resource at `url` into memory.
///
/// No retry: a failure aborts notification for the calling source this
/// cycle only, and the item is picked up again on the next cycle because
/// nothing was committed to the ledger.
pub async fn fetch_asset(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::fetch(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::malformed(
            url,
            format!("unexpected status {status}"),
        ));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::fetch(url, e))?;
    Ok(bytes.to_vec())
}
