//! Core types shared by every SnapLocate crate.
//!
//! This crate holds the vocabulary of the barcode-locator: decode events,
//! monotonic timestamps, opaque bounding regions, the mutable target set of
//! serial numbers, payload normalization, and scanner configuration.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod targets;
pub mod types;

pub use clock::{Clock, MonotonicClock};
pub use config::{DecoderKind, ScannerConfig};
pub use error::{Error, Result};
pub use targets::TargetSet;
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
