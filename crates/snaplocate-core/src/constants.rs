//! Core constants for the barcode-locator.
//!
//! Timing defaults, channel sizing, and the CSV export layout live here so
//! that every crate agrees on them.
//!
//! # Usage
//!
//! ```
//! use snaplocate_core::constants::*;
//! use std::time::Duration;
//!
//! let cooldown = Duration::from_millis(DEFAULT_COOLDOWN_MS);
//! assert_eq!(cooldown.as_millis(), 500);
//! ```

// ============================================================================
// Cooldown Gate
// ============================================================================

/// Default minimum time between two accepted decode events (milliseconds).
///
/// A physical barcode stays in view across many consecutive camera frames.
/// Only one decode per cooldown window is let through for matching; the rest
/// are dropped.
///
/// # Value: 500ms
pub const DEFAULT_COOLDOWN_MS: u64 = 500;

// ============================================================================
// Presentation
// ============================================================================

/// Default lifetime of the match highlight (milliseconds).
///
/// After a match the highlight stays on the matched bounds for this long and
/// is then cleared automatically. When pause-on-match is enabled the decoder
/// feed is paused for the same duration.
///
/// # Value: 1000ms
pub const DEFAULT_HIGHLIGHT_MS: u64 = 1000;

/// Upper bound accepted for the highlight duration (milliseconds).
///
/// # Value: 60000ms
pub const MAX_HIGHLIGHT_MS: u64 = 60_000;

// ============================================================================
// Channels
// ============================================================================

/// Default capacity of the bounded channels between feed, pipeline and
/// presenter.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

// ============================================================================
// Target Entry
// ============================================================================

/// Separator used when several serial numbers are submitted as one string.
///
/// # Examples
///
/// ```
/// use snaplocate_core::constants::TARGET_INPUT_SEPARATOR;
///
/// let parts: Vec<&str> = "SN001, SN002".split(TARGET_INPUT_SEPARATOR).collect();
/// assert_eq!(parts, vec!["SN001", " SN002"]);
/// ```
pub const TARGET_INPUT_SEPARATOR: char = ',';

// ============================================================================
// CSV Export
// ============================================================================

/// Header line of the exported scanned-history file.
pub const CSV_HEADER: &str = "Barcode";

/// Default file name of the exported scanned-history file.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "ScannedBarcodes.csv";
