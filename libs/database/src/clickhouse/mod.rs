//! ClickHouse client over the HTTP interface (port 8123)
//!
//! Statements are sent as request bodies; row data travels as `JSONEachRow`.

mod client;
mod config;
mod health;

pub use client::{ClickHouseClient, escape_string, quote_identifier};
pub use config::ClickHouseConfig;
pub use health::check_health;
