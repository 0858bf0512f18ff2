//! Fullscreen slide looping for presenting browser tabs
//!
//! Point a Chrome tab at a presentation's "present" view with `loop=1` in the
//! query and the looper will fullscreen it and step to the next slide every
//! interval, wrapping after the last one.
//!
//! Slides have to carry their position in their object id for this to work
//! (`<prefix>_<index>_<total>`); `preso-slides` renames them that way. A
//! `slide` token that does not follow the convention keeps the tab on the
//! same slide instead of failing.
//!
//! # Example
//!
//! ```no_run
//! use preso_core::LooperConfig;
//! use preso_looper::{BrowserSession, PresentationTab, SlideLooper};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> preso_core::Result<()> {
//!     let config = LooperConfig::default();
//!     let session = Arc::new(BrowserSession::from_config(&config).await?);
//!
//!     let url = "https://docs.google.com/presentation/d/ABC/present?slide=id.__preso_0_5&loop=1";
//!     session.navigate(url).await?;
//!
//!     let handle = SlideLooper::from_config(session, &config)?.spawn();
//!     handle.navigation_complete(url).await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     handle.shutdown().await
//! }
//! ```
//!
//! # Architecture
//!
//! - [`query`] / [`token`] / [`url`]: string grammars, pure
//! - [`state_machine`]: pure loop transitions
//! - [`looper`]: tokio driver owning the single timer
//! - [`browser`]: Chrome DevTools backend

pub mod browser;
pub mod error;
pub mod looper;
pub mod query;
pub mod state_machine;
pub mod token;
pub mod url;

// Re-export commonly used types
pub use browser::{BrowserConfig, BrowserSession};
pub use error::{PresoError, Result};
pub use looper::{LoopCommand, LoopHandle, MockTab, PresentationTab, SlideLooper};
pub use query::QueryParams;
pub use state_machine::{transition, LoopAction, LoopEvent, LoopState};
pub use token::SlidePosition;
pub use url::{has_loop_flag, next_slide_url, PresentingMatcher, SlideStep};
