//! Looper error types - re-exports the unified PresoError from preso-core
//!
//! Browser and tab failures use `PresoError::Browser`; malformed presenting
//! URLs use `PresoError::InvalidUrl`. Slide tokens that fail to parse are not
//! errors: the loop just stays on the same slide.

pub use preso_core::{PresoError, Result};
