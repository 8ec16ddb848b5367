// src/pipeline/cycle.rs

//! One fetch→detect→notify cycle across all configured sources.
//!
//! Per-entity state machine, re-evaluated every cycle: fetched content is
//! compared against last-seen state; unchanged or suppressed content is
//! dropped; changed content is checked against the dedup ledger; a ledger
//! miss triggers delivery, and only a confirmed successful send is followed
//! by a ledger commit and a last-seen update. A failed send leaves both
//! untouched, so the same payload is retried on the next cycle.

use std::sync::Arc;

use reqwest::Client;

use crate::error::{AppError, Result};
use crate::ledger::DedupLedger;
use crate::models::{canonical_key, Config, NotificationPayload, RedirectItem, StatusRecord};
use crate::notify::WebhookNotifier;
use crate::pipeline::detect::{Disposition, LastSeen};
use crate::sources::{fetch_asset, RedirectFeed, StatusFeed};
use crate::utils::http;

/// Last-seen slot for the redirect feed (it tracks a single item stream).
const REDIRECT_ENTITY_KEY: &str = "redirect";

/// Counters for one cycle, logged after each run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Notifications delivered and committed
    pub sent: usize,
    /// Entities whose content matched last-seen state
    pub unchanged: usize,
    /// Entities suppressed by an empty status
    pub suppressed: usize,
    /// Changed content already present in the ledger
    pub duplicates: usize,
    /// Per-entity failures (delivery, ledger, asset)
    pub failures: usize,
    /// Whole-source failures (feed fetch or malformed response)
    pub source_failures: usize,
}

impl CycleOutcome {
    /// Total number of entities examined this cycle.
    pub fn examined(&self) -> usize {
        self.sent + self.unchanged + self.suppressed + self.duplicates + self.failures
    }
}

/// The poll–diff–dedup–notify pipeline over all configured sources.
pub struct Watcher {
    config: Arc<Config>,
    client: Client,
    no_redirect_client: Client,
    redirect_feed: Option<RedirectFeed>,
    status_feed: Option<StatusFeed>,
    notifier: WebhookNotifier,
    ledger: Arc<dyn DedupLedger>,
}

impl Watcher {
    /// Build the pipeline from configuration and a ledger backend.
    pub fn new(config: Arc<Config>, ledger: Arc<dyn DedupLedger>) -> Result<Self> {
        let client = http::create_client(&config.http)?;
        let no_redirect_client = http::create_no_redirect_client(&config.http)?;
        let notifier = WebhookNotifier::new(client.clone(), config.webhook_url.clone());

        let redirect_feed = config.redirect_feed.clone().map(RedirectFeed::new);
        let status_feed = config.status_feed.clone().map(StatusFeed::new);

        Ok(Self {
            config,
            client,
            no_redirect_client,
            redirect_feed,
            status_feed,
            notifier,
            ledger,
        })
    }

    /// Run one full cycle.
    ///
    /// Each source is isolated: a failure in one is counted and logged but
    /// never affects the other, and never propagates to the caller.
    pub async fn run_cycle(&self, last_seen: &mut LastSeen) -> CycleOutcome {
        let mut outcome = CycleOutcome::default();

        // The two feeds have no ordering dependency; fetch them together.
        let redirect_fetch = async {
            match &self.redirect_feed {
                Some(feed) => Some(feed.fetch(&self.no_redirect_client).await),
                None => None,
            }
        };
        let status_fetch = async {
            match &self.status_feed {
                Some(feed) => Some(feed.fetch(&self.client).await),
                None => None,
            }
        };
        let (redirect_result, status_result) = futures::join!(redirect_fetch, status_fetch);

        match redirect_result {
            Some(Ok(item)) => {
                if let Err(e) = self.process_redirect_item(item, last_seen, &mut outcome).await {
                    if e.is_ledger() {
                        log::error!("ledger unavailable, redirect send skipped (fail closed): {e}");
                    } else {
                        log::error!("redirect source aborted for this cycle: {e}");
                    }
                    outcome.source_failures += 1;
                }
            }
            Some(Err(e)) => {
                log::error!("redirect feed fetch failed: {e}");
                outcome.source_failures += 1;
            }
            None => {}
        }

        match status_result {
            Some(Ok(response)) => {
                for (entity_id, record) in &response.entities {
                    self.process_status_entity(entity_id, record, last_seen, &mut outcome)
                        .await;
                }
            }
            Some(Err(e)) => {
                log::error!("status feed fetch failed: {e}");
                outcome.source_failures += 1;
            }
            None => {}
        }

        log::info!(
            "cycle done: {} sent, {} unchanged, {} suppressed, {} duplicates, {} failures",
            outcome.sent,
            outcome.unchanged,
            outcome.suppressed,
            outcome.duplicates,
            outcome.failures
        );

        outcome
    }

    /// Handle the latest redirect-feed item.
    ///
    /// Returns `Err` when the whole redirect source must be abandoned for
    /// this cycle (failed idempotency check or asset fetch).
    async fn process_redirect_item(
        &self,
        item: RedirectItem,
        last_seen: &mut LastSeen,
        outcome: &mut CycleOutcome,
    ) -> Result<()> {
        let feed = self
            .redirect_feed
            .as_ref()
            .ok_or_else(|| AppError::config("redirect feed not configured"))?;

        // Redirect items carry no status, so suppression never applies.
        let canonical = item.canonical().to_string();
        if last_seen.disposition(REDIRECT_ENTITY_KEY, &canonical, false) == Disposition::Unchanged {
            outcome.unchanged += 1;
            return Ok(());
        }

        // Fail closed: no send without a working idempotency check.
        let key = canonical_key(&canonical);
        if self.ledger.exists(&key).await? {
            log::debug!("redirect item already delivered: {}", item.location);
            last_seen.record(REDIRECT_ENTITY_KEY, &canonical);
            outcome.duplicates += 1;
            return Ok(());
        }

        let asset = fetch_asset(&self.client, &item.location).await?;
        let payload = NotificationPayload::for_redirect(&item, feed.config());

        match self.notifier.send(&payload, Some(asset)).await {
            Ok(()) => {
                self.commit_delivered(&key).await;
                last_seen.record(REDIRECT_ENTITY_KEY, &canonical);
                outcome.sent += 1;
                log::info!("delivered redirect item {}", item.location);
            }
            Err(e) => {
                log::error!("redirect item delivery failed, will retry next cycle: {e}");
                outcome.failures += 1;
            }
        }

        Ok(())
    }

    /// Handle one tracked entity from the status feed.
    ///
    /// Failures here are per-entity: they are counted and logged, and the
    /// remaining entities still get processed this cycle.
    async fn process_status_entity(
        &self,
        entity_id: &str,
        record: &StatusRecord,
        last_seen: &mut LastSeen,
        outcome: &mut CycleOutcome,
    ) {
        let Some(feed) = self.status_feed.as_ref() else {
            return;
        };
        let Some(entity) = self.config.entity(entity_id) else {
            log::warn!("status feed reports untracked entity '{entity_id}', skipping");
            return;
        };

        let payload = NotificationPayload::for_status(entity, record, feed.config());
        let canonical = payload.canonical();

        match last_seen.disposition(entity_id, &canonical, record.is_suppressed()) {
            Disposition::Suppressed => {
                outcome.suppressed += 1;
                return;
            }
            Disposition::Unchanged => {
                outcome.unchanged += 1;
                return;
            }
            Disposition::Changed => {}
        }

        // Fail closed on ledger errors: skip this entity, send nothing.
        let key = canonical_key(&canonical);
        match self.ledger.exists(&key).await {
            Ok(true) => {
                log::debug!("entity '{entity_id}' payload already delivered");
                last_seen.record(entity_id, &canonical);
                outcome.duplicates += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                log::error!("ledger check failed for entity '{entity_id}', skipping send: {e}");
                outcome.failures += 1;
                return;
            }
        }

        match self.notifier.send(&payload, None).await {
            Ok(()) => {
                self.commit_delivered(&key).await;
                last_seen.record(entity_id, &canonical);
                outcome.sent += 1;
                log::info!("delivered status update for entity '{entity_id}'");
            }
            Err(e) => {
                log::error!(
                    "delivery failed for entity '{entity_id}', will retry next cycle: {e}"
                );
                outcome.failures += 1;
            }
        }
    }

    /// Commit a delivered key, logging (but not propagating) failures.
    ///
    /// The send already happened; a failed commit can only cause a
    /// duplicate after restart, never a lost notification.
    async fn commit_delivered(&self, key: &str) {
        if let Err(e) = self.ledger.commit(key).await {
            log::error!("ledger commit failed for delivered key {key}: {e}");
        }
    }
}
