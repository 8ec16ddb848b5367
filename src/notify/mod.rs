// src/notify/mod.rs

//! Outbound webhook delivery.
//!
//! The endpoint accepts a multipart POST: a `payload_json` part with the
//! JSON payload, plus an optional `file` part carrying a binary image
//! attachment. Delivery failures are not retried here; the ledger is left
//! uncommitted and the same payload comes around on the next cycle.

use reqwest::Client;
use reqwest::multipart::{Form, Part};

use crate::error::{AppError, Result};
use crate::models::NotificationPayload;

/// Filename reported for the binary attachment part.
const ATTACHMENT_FILENAME: &str = "image.png";

/// Sends notifications to the configured webhook endpoint.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a notifier for the given endpoint.
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Deliver a payload, with an optional binary attachment.
    pub async fn send(
        &self,
        payload: &NotificationPayload,
        attachment: Option<Vec<u8>>,
    ) -> Result<()> {
        let json_part = Part::text(payload.canonical())
            .mime_str("application/json")
            .map_err(|e| AppError::delivery(format!("invalid payload part: {e}")))?;

        let mut form = Form::new().part("payload_json", json_part);

        if let Some(bytes) = attachment {
            let file_part = Part::bytes(bytes)
                .file_name(ATTACHMENT_FILENAME)
                .mime_str("image/png")
                .map_err(|e| AppError::delivery(format!("invalid attachment part: {e}")))?;
            form = form.part("file", file_part);
        }

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::delivery(format!("webhook request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::delivery(format!(
                "webhook returned {status}: {body}"
            )));
        }

        Ok(())
    }
}
