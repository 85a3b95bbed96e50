//! NYC Events Calendar API fetcher.

mod client;
mod config;

pub use client::NycEventsClient;
pub use config::NycApiConfig;
