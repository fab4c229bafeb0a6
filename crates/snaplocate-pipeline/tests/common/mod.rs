//! Common test utilities for integration tests.
//!
//! Builders for decode events and pipelines with the defaults used across
//! the scenario and property tests.

#![allow(dead_code)]

use snaplocate_core::{Bounds, DecodeEvent, TargetSet, Timestamp};
use snaplocate_pipeline::{MatchPipeline, PipelineResult};
use std::time::Duration;

/// Cooldown used by the reference scenario.
pub const COOLDOWN_MS: u64 = 500;

/// Build a decode event with empty bounds at `millis`.
pub fn event_at(payload: &str, millis: u64) -> DecodeEvent {
    DecodeEvent::new(payload, Bounds::ZERO, Timestamp::from_millis(millis))
}

/// Build a pipeline over `targets` with the reference cooldown.
pub fn pipeline_with(targets: &TargetSet) -> MatchPipeline {
    MatchPipeline::builder(targets.clone())
        .with_cooldown(Duration::from_millis(COOLDOWN_MS))
        .build()
}

/// Assert that `result` matched with `payload` as the original payload.
pub fn assert_matched(result: &PipelineResult, payload: &str) {
    let matched = result
        .matched()
        .unwrap_or_else(|| panic!("expected a match for {payload:?}, got {result:?}"));
    assert_eq!(matched.payload, payload);
}

/// Assert that `result` was accepted but did not match.
pub fn assert_observed_only(result: &PipelineResult, payload: &str) {
    let observed = result
        .observed()
        .unwrap_or_else(|| panic!("expected {payload:?} to be processed, got {result:?}"));
    assert_eq!(observed.payload, payload);
    assert!(result.matched().is_none(), "unexpected match for {payload:?}");
}
