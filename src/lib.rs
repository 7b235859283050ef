//! REST service for browsing and curating Seinfeld quotes.
//!
//! Quotes live in SQLite behind [`store::QuoteStore`]. Listing and random
//! selection share the filters resolved by [`query`]; mutations pass through
//! [`validation`] and require the bearer token checked by [`auth`].

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod importer;
pub mod models;
pub mod query;
pub mod random;
pub mod state;
pub mod store;
pub mod validation;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

///Installs the fmt subscriber, honoring `RUST_LOG` and defaulting to `info`
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
