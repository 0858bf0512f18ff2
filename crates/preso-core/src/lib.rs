//! # preso-core
//!
//! Shared building blocks for the preso workspace.
//!
//! preso automates two unrelated chores around hosted presentations:
//!
//! - **Looping**: keep a presenting browser tab fullscreen and step it through
//!   its slides on a timer (`preso-looper`).
//! - **Refreshing**: rewrite text shapes and tables of a presentation from
//!   caller-supplied data and spreadsheet ranges (`preso-slides`).
//!
//! Both sides share one convention: a managed object-id prefix. Slides renamed
//! to `<prefix>_<index>_<total>` show up in presenting URLs as position tokens
//! the looper knows how to advance.

pub mod config;
mod error;
pub mod fail_open;

pub use config::{LooperConfig, PresoConfig, RefresherConfig};
pub use error::{PresoError, Result};
