//! # Spreadsheet Feed Loader
//!
//! Turns the public cell feed of an online spreadsheet into typed rows and
//! serves them through a time-bounded local cache, so repeated requests do not
//! re-fetch the remote document.
//!
//! ## Features
//!
//! - **Typed columns**: header cells declare `name:type` with the types
//!   `int`, `bool`, `float`, `array`, `json` and `string`
//! - **Null filling**: every row can carry every header column, `null` when empty
//! - **Worksheet selection**: by name or position, with a first-sheet fallback
//! - **Load modes**: `load`, `update`, `cache` and `fetch` decide between the
//!   cache and the remote source
//! - **Stale fallback**: `load` serves an expired snapshot when the source is down
//!
//! ## Example
//!
//! ```no_run
//! use rusty_sheet_feed::{Config, LoadMode, Loader, SheetSelector};
//!
//! let loader = Loader::new(Config::default());
//! if let Some(table) = loader.get("1AbCdEf", &SheetSelector::from("Sheet1"), LoadMode::Load) {
//!     println!("{} rows", table.items.len());
//! }
//! ```
pub mod cache;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod feed;
pub mod loader;
pub mod sheet;
pub mod transport;

pub use crate::cache::CacheStore;
pub use crate::config::Config;
pub use crate::error::SheetFeedError;
pub use crate::feed::table::{ParsedTable, Row};
pub use crate::feed::FeedParser;
pub use crate::loader::{LoadMode, Loader};
pub use crate::sheet::{SheetListEntry, SheetSelector};
pub use crate::transport::{HttpTransport, Transport, TransportError};
