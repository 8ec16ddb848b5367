// src/pipeline/poller.rs

//! Periodic driver loop.
//!
//! A single task owns the schedule: the interval tick is awaited on the
//! same task that runs the cycle, so cycles can never overlap; the next
//! tick is not observed until the previous cycle fully completes. There is
//! no catch-up for skipped ticks (`MissedTickBehavior::Delay`); a failed
//! cycle is simply followed by the next scheduled one.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::pipeline::cycle::Watcher;
use crate::pipeline::detect::LastSeen;

/// Run the poll loop until `shutdown` resolves.
///
/// Last-seen state lives for the duration of the loop and is dropped with
/// it; durability across restarts comes from the ledger alone. Shutdown
/// stops scheduling further cycles; an in-flight cycle finishes first
/// because ticks and cycles share one task.
pub async fn run_poller(watcher: &Watcher, period: Duration, shutdown: impl Future<Output = ()>) {
    let mut last_seen = LastSeen::new();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    log::info!("poller started, cycle period {}s", period.as_secs());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcome = watcher.run_cycle(&mut last_seen).await;
                if outcome.source_failures > 0 {
                    log::warn!(
                        "{} source(s) failed this cycle; continuing on schedule",
                        outcome.source_failures
                    );
                }
            }
            _ = &mut shutdown => {
                log::info!("shutdown requested, stopping poller");
                break;
            }
        }
    }
}
