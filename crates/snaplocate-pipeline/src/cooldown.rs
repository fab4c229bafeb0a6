//! Cooldown gate.
//!
//! The only state machine in the pipeline. It has two states, accepting and
//! suppressing, and moves between them purely by elapsed time: an event is
//! accepted when no event was accepted yet, or when at least the cooldown
//! period has passed since the last accepted one.

use snaplocate_core::Timestamp;
use snaplocate_core::constants::DEFAULT_COOLDOWN_MS;
use std::time::Duration;

/// Rate limiter admitting at most one event per cooldown period.
///
/// Suppressed events do not extend the window; only accepted events move
/// the reference point.
///
/// # Examples
///
/// ```
/// use snaplocate_pipeline::CooldownGate;
/// use snaplocate_core::Timestamp;
/// use std::time::Duration;
///
/// let mut gate = CooldownGate::new(Duration::from_millis(500));
///
/// assert!(gate.try_accept(Timestamp::from_millis(0)));
/// assert!(!gate.try_accept(Timestamp::from_millis(499)));
/// assert!(gate.try_accept(Timestamp::from_millis(500)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownGate {
    cooldown: Duration,
    last_accepted_at: Option<Timestamp>,
}

impl CooldownGate {
    /// Create a gate that has never accepted an event.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted_at: None,
        }
    }

    /// Accept `timestamp` if the cooldown has elapsed, recording it.
    ///
    /// A timestamp earlier than the last accepted one counts as zero elapsed
    /// time and is suppressed.
    pub fn try_accept(&mut self, timestamp: Timestamp) -> bool {
        if let Some(last) = self.last_accepted_at
            && timestamp.saturating_duration_since(last) < self.cooldown
        {
            return false;
        }

        self.last_accepted_at = Some(timestamp);
        true
    }

    /// Check whether `timestamp` would be accepted, without recording it.
    pub fn would_accept(&self, timestamp: Timestamp) -> bool {
        match self.last_accepted_at {
            Some(last) => timestamp.saturating_duration_since(last) >= self.cooldown,
            None => true,
        }
    }

    /// Time left at `now` before the gate accepts again.
    pub fn remaining(&self, now: Timestamp) -> Duration {
        match self.last_accepted_at {
            Some(last) => self
                .cooldown
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Forget the last accepted event.
    pub fn reset(&mut self) {
        self.last_accepted_at = None;
    }

    /// Time of the last accepted event, `None` if none yet.
    pub fn last_accepted_at(&self) -> Option<Timestamp> {
        self.last_accepted_at
    }

    /// Configured cooldown period.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_COOLDOWN_MS))
    }
}
