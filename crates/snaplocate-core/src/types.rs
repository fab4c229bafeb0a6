use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// Monotonic point in time, expressed as an offset from a clock origin.
///
/// Timestamps are only meaningful relative to each other: the cooldown gate
/// compares the distance between two of them. The origin is whatever the
/// producing clock or decoder chose (session start, script start, ...).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// The clock origin.
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    /// Create a timestamp from an offset since the clock origin.
    #[must_use]
    pub const fn from_duration(offset: Duration) -> Self {
        Timestamp(offset)
    }

    /// Create a timestamp from a millisecond offset since the clock origin.
    ///
    /// # Examples
    ///
    /// ```
    /// use snaplocate_core::Timestamp;
    ///
    /// let t = Timestamp::from_millis(600);
    /// assert_eq!(t.as_millis(), 600);
    /// ```
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(Duration::from_millis(millis))
    }

    /// Offset since the clock origin.
    #[must_use]
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Offset since the clock origin in whole milliseconds.
    #[must_use]
    pub fn as_millis(&self) -> u128 {
        self.0.as_millis()
    }

    /// Time elapsed from `earlier` to `self`.
    ///
    /// Returns zero when `earlier` is actually later than `self`, so an
    /// out-of-order timestamp never looks like a long gap.
    ///
    /// # Examples
    ///
    /// ```
    /// use snaplocate_core::Timestamp;
    /// use std::time::Duration;
    ///
    /// let a = Timestamp::from_millis(200);
    /// let b = Timestamp::from_millis(600);
    /// assert_eq!(b.saturating_duration_since(a), Duration::from_millis(400));
    /// assert_eq!(a.saturating_duration_since(b), Duration::ZERO);
    /// ```
    #[must_use]
    pub fn saturating_duration_since(&self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        Timestamp(self.0.saturating_add(rhs))
    }
}

impl From<Duration> for Timestamp {
    fn from(offset: Duration) -> Self {
        Timestamp(offset)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}

/// Bounding region of a decoded barcode.
///
/// The geometry is opaque to the matching core: it is carried from the
/// decoder to the presentation layer unchanged and never validated, so
/// zero-sized or negative regions pass through as reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Create a new bounding region.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The empty region at the origin.
    pub const ZERO: Bounds = Bounds::new(0.0, 0.0, 0.0, 0.0);

    /// Check whether the region covers no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}x{})",
            self.x, self.y, self.width, self.height
        )
    }
}

/// One raw decode result as delivered by a decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeEvent {
    /// Decoded payload, exactly as reported (not normalized).
    pub payload: String,

    /// Region of the barcode in the frame.
    pub bounds: Bounds,

    /// When the barcode was decoded.
    pub timestamp: Timestamp,
}

impl DecodeEvent {
    /// Create a new decode event.
    ///
    /// # Examples
    ///
    /// ```
    /// use snaplocate_core::{Bounds, DecodeEvent, Timestamp};
    ///
    /// let event = DecodeEvent::new(" SN001 ", Bounds::ZERO, Timestamp::from_millis(0));
    /// assert_eq!(event.payload, " SN001 ");
    /// ```
    pub fn new(payload: impl Into<String>, bounds: Bounds, timestamp: Timestamp) -> Self {
        Self {
            payload: payload.into(),
            bounds,
            timestamp,
        }
    }
}

/// Normalize a payload or serial number for comparison.
///
/// Surrounding whitespace is trimmed and the result is lowercased. Inner
/// whitespace is kept.
///
/// # Examples
///
/// ```
/// use snaplocate_core::normalize_payload;
///
/// assert_eq!(normalize_payload("  ABC123\n"), "abc123");
/// assert_eq!(normalize_payload("Sn 01"), "sn 01");
/// ```
#[must_use]
pub fn normalize_payload(raw: &str) -> String {
    raw.trim().to_lowercase()
}
