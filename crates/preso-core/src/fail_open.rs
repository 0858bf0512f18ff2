//! Fail-open utilities for best-effort side effects
//!
//! Some host interactions are allowed to fail without stopping the caller:
//! switching a window to fullscreen, or surfacing a "start looping" hint.
//!
//! DO NOT use fail-open for:
//! - Remote presentation mutations
//! - Navigation (the loop depends on it)

use std::future::Future;
use tracing::warn;

use crate::Result;

/// Execute an operation whose failure should only be logged
///
/// Logs the error via `tracing::warn!` on failure and returns `None`.
///
/// # Usage
///
/// ```no_run
/// use preso_core::fail_open::fail_open;
/// use preso_core::Result;
///
/// async fn go_fullscreen() -> Result<()> {
///     Ok(())
/// }
///
/// async fn example() {
///     let result = fail_open("fullscreen", || go_fullscreen()).await;
///     // result is None if go_fullscreen() failed, otherwise Some(())
/// }
/// ```
pub async fn fail_open<F, Fut, T>(operation_name: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match f().await {
        Ok(val) => Some(val),
        Err(e) => {
            warn!("{} failed (fail-open): {}", operation_name, e);
            None
        }
    }
}
