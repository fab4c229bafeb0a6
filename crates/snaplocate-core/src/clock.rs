//! Monotonic clocks that stamp decode events.

use crate::Timestamp;
use tokio::time::Instant;

/// Source of monotonic timestamps.
pub trait Clock: Send + Sync {
    /// Current time relative to the clock's origin.
    fn now(&self) -> Timestamp;
}

/// Clock backed by tokio's [`Instant`], with its origin at construction time.
///
/// Reads follow the runtime clock, so a runtime with paused time advances
/// this clock together with timers and `sleep`.
///
/// Clones share the same origin, so timestamps taken from any clone are
/// comparable.
///
/// # Examples
///
/// ```
/// use snaplocate_core::{Clock, MonotonicClock};
///
/// let clock = MonotonicClock::new();
/// let a = clock.now();
/// let b = clock.now();
/// assert!(b >= a);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Create a clock with an explicit origin.
    pub fn with_origin(origin: Instant) -> Self {
        Self { origin }
    }

    /// The instant this clock measures from.
    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_duration(self.origin.elapsed())
    }
}
