//! Debounced barcode-match pipeline.
//!
//! Consumes raw decode events and, for each one:
//!
//! 1. Runs it through the [`CooldownGate`]; events inside the cooldown
//!    window are dropped.
//! 2. Normalizes the payload (trim, lowercase).
//! 3. Checks the normalized payload against the current [`TargetSet`],
//!    whose entries are normalized the same way at lookup time.
//! 4. Emits an [`ObservedEvent`] for every accepted event and a
//!    [`MatchedEvent`] when the payload is a target.
//!
//! `ingest` never fails. Empty payloads and degenerate bounds are processed
//! like any other value.
//!
//! # Examples
//!
//! ```
//! use snaplocate_core::{Bounds, DecodeEvent, TargetSet, Timestamp};
//! use snaplocate_pipeline::MatchPipeline;
//!
//! let targets = TargetSet::from_entries(["SN001", "sn002"]);
//! let mut pipeline = MatchPipeline::new(targets.clone());
//!
//! let result = pipeline.ingest(DecodeEvent::new("SN001", Bounds::ZERO, Timestamp::ZERO));
//! assert_eq!(result.matched().unwrap().payload, "SN001");
//!
//! // Edits to the shared target set apply to the very next event.
//! targets.clear();
//! let result = pipeline.ingest(DecodeEvent::new("SN002", Bounds::ZERO, Timestamp::from_millis(600)));
//! assert!(!result.is_matched());
//! ```

use crate::cooldown::CooldownGate;
use crate::events::{MatchedEvent, ObservedEvent, PipelineResult};
use serde::{Deserialize, Serialize};
use snaplocate_core::constants::DEFAULT_COOLDOWN_MS;
use snaplocate_core::{
    Bounds, Clock, DecodeEvent, MonotonicClock, TargetSet, Timestamp, normalize_payload,
};
use std::time::Duration;
use tracing::{debug, trace};

/// Counters kept by a pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Events that passed the cooldown gate.
    pub accepted: u64,

    /// Events dropped by the cooldown gate.
    pub suppressed: u64,

    /// Accepted events whose payload was a target.
    pub matched: u64,
}

impl PipelineStats {
    /// Total number of ingested events.
    pub fn total(&self) -> u64 {
        self.accepted + self.suppressed
    }
}

/// The debounced match pipeline.
///
/// Not internally synchronized: exactly one owner calls `ingest`, which
/// keeps the cooldown check-and-set atomic.
#[derive(Debug)]
pub struct MatchPipeline {
    gate: CooldownGate,
    targets: TargetSet,
    clock: MonotonicClock,
    stats: PipelineStats,
}

impl MatchPipeline {
    /// Create a pipeline with the default cooldown.
    pub fn new(targets: TargetSet) -> Self {
        Self::builder(targets).build()
    }

    /// Create a builder for a pipeline matching against `targets`.
    ///
    /// # Examples
    ///
    /// ```
    /// use snaplocate_core::TargetSet;
    /// use snaplocate_pipeline::MatchPipeline;
    /// use std::time::Duration;
    ///
    /// let pipeline = MatchPipeline::builder(TargetSet::new())
    ///     .with_cooldown(Duration::from_millis(250))
    ///     .build();
    ///
    /// assert_eq!(pipeline.cooldown(), Duration::from_millis(250));
    /// ```
    pub fn builder(targets: TargetSet) -> MatchPipelineBuilder {
        MatchPipelineBuilder::new(targets)
    }

    /// Process one decode event.
    pub fn ingest(&mut self, event: DecodeEvent) -> PipelineResult {
        if !self.gate.try_accept(event.timestamp) {
            self.stats.suppressed += 1;
            trace!(
                payload = %event.payload,
                timestamp = %event.timestamp,
                "Decode suppressed by cooldown"
            );
            return PipelineResult::Suppressed;
        }
        self.stats.accepted += 1;

        let normalized = normalize_payload(&event.payload);
        let is_target = self.targets.contains_normalized(&normalized);

        let observed = ObservedEvent {
            payload: event.payload.clone(),
            timestamp: event.timestamp,
        };

        let matched = if is_target {
            self.stats.matched += 1;
            debug!(
                payload = %event.payload,
                timestamp = %event.timestamp,
                bounds = %event.bounds,
                "Target matched"
            );
            Some(MatchedEvent {
                payload: event.payload,
                normalized,
                bounds: event.bounds,
                timestamp: event.timestamp,
            })
        } else {
            trace!(payload = %event.payload, "Decode observed, no match");
            None
        };

        PipelineResult::Processed { observed, matched }
    }

    /// Process a payload stamped with the pipeline clock.
    pub fn ingest_now(&mut self, payload: impl Into<String>, bounds: Bounds) -> PipelineResult {
        let timestamp = self.clock.now();
        self.ingest(DecodeEvent::new(payload, bounds, timestamp))
    }

    /// Return the cooldown gate to "never accepted".
    pub fn reset_cooldown(&mut self) {
        debug!("Cooldown reset");
        self.gate.reset();
    }

    /// Counters since creation.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Configured cooldown period.
    pub fn cooldown(&self) -> Duration {
        self.gate.cooldown()
    }

    /// Time of the last accepted event.
    pub fn last_accepted_at(&self) -> Option<Timestamp> {
        self.gate.last_accepted_at()
    }

    /// Shared handle to the target set.
    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }
}

/// Builder for [`MatchPipeline`].
#[derive(Debug, Clone)]
pub struct MatchPipelineBuilder {
    targets: TargetSet,
    cooldown: Duration,
    clock: Option<MonotonicClock>,
}

impl MatchPipelineBuilder {
    /// Create a builder with the default cooldown.
    pub fn new(targets: TargetSet) -> Self {
        Self {
            targets,
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            clock: None,
        }
    }

    /// Set the cooldown period.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set the clock used by `ingest_now`.
    ///
    /// If not set, a clock starting at `build()` is used.
    pub fn with_clock(mut self, clock: MonotonicClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> MatchPipeline {
        MatchPipeline {
            gate: CooldownGate::new(self.cooldown),
            targets: self.targets,
            clock: self.clock.unwrap_or_default(),
            stats: PipelineStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn event(payload: &str, millis: u64) -> DecodeEvent {
        DecodeEvent::new(payload, Bounds::ZERO, Timestamp::from_millis(millis))
    }

    #[test]
    fn test_events_spaced_by_cooldown_all_processed() {
        let mut pipeline = MatchPipeline::new(TargetSet::new());
        for millis in [0, 500, 1000, 1750, 5000] {
            assert!(!pipeline.ingest(event("x", millis)).is_suppressed());
        }
        assert_eq!(pipeline.stats().accepted, 5);
    }

    #[test]
    fn test_close_pair_second_suppressed() {
        let mut pipeline = MatchPipeline::new(TargetSet::from_entries(["x"]));
        assert!(pipeline.ingest(event("x", 0)).is_matched());
        assert_eq!(pipeline.ingest(event("x", 499)), PipelineResult::Suppressed);
    }

    #[rstest]
    #[case(" ABC123 ", "abc123", true)]
    #[case("abc123", " ABC123\t", true)]
    #[case("AbC123", "abc123", true)]
    #[case("abc1234", "abc123", false)]
    #[case("abc12", "abc123", false)]
    #[case("abc 123", "abc123", false)]
    fn test_normalized_membership(
        #[case] payload: &str,
        #[case] target: &str,
        #[case] matched: bool,
    ) {
        let mut pipeline = MatchPipeline::new(TargetSet::from_entries([target]));
        assert_eq!(pipeline.ingest(event(payload, 0)).is_matched(), matched);
    }

    #[test]
    fn test_matched_event_keeps_original_payload_and_bounds() {
        let mut pipeline = MatchPipeline::new(TargetSet::from_entries(["abc123"]));
        let bounds = Bounds::new(10.0, 20.0, 30.0, 40.0);

        let result = pipeline.ingest(DecodeEvent::new(" ABC123 ", bounds, Timestamp::from_millis(7)));

        let matched = result.matched().unwrap();
        assert_eq!(matched.payload, " ABC123 ");
        assert_eq!(matched.normalized, "abc123");
        assert_eq!(matched.bounds, bounds);
        assert_eq!(matched.timestamp, Timestamp::from_millis(7));
        assert_eq!(result.observed().unwrap().payload, " ABC123 ");
    }

    #[test]
    fn test_target_mutation_visible_on_next_ingest() {
        let targets = TargetSet::new();
        let mut pipeline = MatchPipeline::new(targets.clone());

        assert!(!pipeline.ingest(event("SN9", 0)).is_matched());

        targets.add("sn9");
        assert!(pipeline.ingest(event("SN9", 500)).is_matched());

        targets.remove("SN9");
        assert!(!pipeline.ingest(event("SN9", 1000)).is_matched());
    }

    #[test]
    fn test_empty_payload_processed() {
        let mut pipeline = MatchPipeline::new(TargetSet::new());
        let result = pipeline.ingest(event("", 0));
        assert_eq!(result.observed().unwrap().payload, "");
        assert!(!result.is_matched());
    }

    #[test]
    fn test_empty_target_entry_matches_blank_payload() {
        let mut pipeline = MatchPipeline::new(TargetSet::from_entries(["   "]));
        assert!(pipeline.ingest(event(" ", 0)).is_matched());
    }

    #[test]
    fn test_degenerate_bounds_pass_through() {
        let mut pipeline = MatchPipeline::new(TargetSet::from_entries(["x"]));
        let bounds = Bounds::new(-5.0, -5.0, 0.0, -1.0);
        let result = pipeline.ingest(DecodeEvent::new("x", bounds, Timestamp::ZERO));
        assert_eq!(result.matched().unwrap().bounds, bounds);
    }

    #[test]
    fn test_stats() {
        let mut pipeline = MatchPipeline::new(TargetSet::from_entries(["a"]));
        pipeline.ingest(event("a", 0));
        pipeline.ingest(event("a", 100));
        pipeline.ingest(event("b", 600));

        let stats = pipeline.stats();
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.suppressed, 1);
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_reset_cooldown() {
        let mut pipeline = MatchPipeline::new(TargetSet::new());
        pipeline.ingest(event("a", 0));
        assert!(pipeline.ingest(event("a", 10)).is_suppressed());

        pipeline.reset_cooldown();
        assert_eq!(pipeline.last_accepted_at(), None);
        assert!(!pipeline.ingest(event("a", 20)).is_suppressed());
    }

    #[test]
    fn test_ingest_now_uses_pipeline_clock() {
        let clock = MonotonicClock::new();
        let mut pipeline = MatchPipeline::builder(TargetSet::from_entries(["now"]))
            .with_clock(clock)
            .with_cooldown(Duration::from_secs(3600))
            .build();

        let first = pipeline.ingest_now("NOW", Bounds::ZERO);
        assert!(first.is_matched());
        assert!(first.observed().unwrap().timestamp <= clock.now());

        // Back-to-back calls land well within an hour.
        assert!(pipeline.ingest_now("NOW", Bounds::ZERO).is_suppressed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ingest_now_follows_runtime_time() {
        let mut pipeline = MatchPipeline::builder(TargetSet::from_entries(["SN001"]))
            .with_cooldown(Duration::from_millis(500))
            .build();

        assert!(pipeline.ingest_now("SN001", Bounds::ZERO).is_matched());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(pipeline.ingest_now("SN001", Bounds::ZERO).is_suppressed());
        tokio::time::sleep(Duration::from_millis(400)).await;

        let third = pipeline.ingest_now("SN001", Bounds::ZERO);
        assert!(third.is_matched());
        assert_eq!(third.observed().unwrap().timestamp, Timestamp::from_millis(600));
    }

    #[test]
    fn test_end_to_end_scenario() {
        let targets = TargetSet::from_entries(["SN001", "sn002"]);
        let mut pipeline = MatchPipeline::builder(targets)
            .with_cooldown(Duration::from_millis(500))
            .build();

        let first = pipeline.ingest(event("SN001", 0));
        assert_eq!(first.matched().unwrap().payload, "SN001");

        assert!(pipeline.ingest(event("sn002", 200)).is_suppressed());

        let third = pipeline.ingest(event("SN002", 600));
        assert_eq!(third.matched().unwrap().payload, "SN002");

        let fourth = pipeline.ingest(event("other", 1200));
        assert!(!fourth.is_suppressed());
        assert!(!fourth.is_matched());
    }
}
