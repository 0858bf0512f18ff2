//! # preso-slides
//!
//! Content refresher for hosted presentations.
//!
//! A presentation author types markers such as `${title}` into text boxes or
//! into the top-left cell of a table. The refresher then:
//!
//! 1. Renames each marked element to a managed id that encodes its position
//!    and key (`<prefix>_<slide>_<element>_<run>_<key>`), and renames every
//!    slide to `<prefix>_<index>_<total>`.
//! 2. Re-fetches the deck and rewrites managed text shapes from a text mapping
//!    and managed tables from spreadsheet ranges.
//! 3. Refreshes every spreadsheet-linked chart.
//!
//! Renaming happens once; afterwards the key is read back from the id alone,
//! so markers may be overwritten freely.
//!
//! ```no_run
//! use preso_slides::{ChainedTokenProvider, Refresher, SheetsClient, SlidesClient};
//! use preso_slides::{TableMappings, TextMappings};
//! use preso_core::PresoConfig;
//! use std::sync::Arc;
//!
//! # async fn run() -> preso_core::Result<()> {
//! let config = PresoConfig::default().refresher;
//! let tokens = Arc::new(ChainedTokenProvider::from_config(&config));
//! let refresher = Refresher::new(
//!     SlidesClient::new(&config.slides_api_base, tokens.clone()),
//!     SheetsClient::new(&config.sheets_api_base, tokens),
//!     &config.managed_prefix,
//! )?;
//!
//! let mut text = TextMappings::new();
//! text.insert("title".to_string(), "Weekly numbers".to_string());
//! refresher.update_presentation("1AbC", &text, &TableMappings::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod model;
pub mod naming;
pub mod refresher;
pub mod requests;

pub use api::{MockSheetsApi, MockSlidesApi, SheetsApi, SlidesApi};
pub use auth::{
    ChainedTokenProvider, EnvTokenProvider, GcloudTokenProvider, StaticToken, TokenProvider,
};
pub use client::{SheetsClient, SlidesClient};
pub use model::{ElementKind, Page, PageElement, Presentation};
pub use naming::{marker_key, ManagedElementId, Naming};
pub use refresher::{
    OccupancyMask, RefreshSummary, Refresher, SheetSource, TableMappings, TextMappings,
};
pub use requests::{BatchUpdate, Request};
