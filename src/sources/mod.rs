// src/sources/mod.rs

//! Source adapters for the external feeds.
//!
//! - `redirect`: redirect-based "latest item" feed (identity in `Location`)
//! - `status`: structured multi-entity status feed (JSON entities map)
//! - `assets`: binary resource retrieval for changed redirect items

pub mod assets;
pub mod redirect;
pub mod status;

pub use assets::fetch_asset;
pub use redirect::RedirectFeed;
pub use status::StatusFeed;
