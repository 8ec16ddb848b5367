// src/lib.rs

//! feedring — watches external feeds and delivers deduplicated webhook
//! notifications, at most once per distinct item, durable across restarts.

pub mod error;
pub mod ledger;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod sources;
pub mod utils;
