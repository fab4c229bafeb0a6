//! Events emitted by the match pipeline.

use serde::{Deserialize, Serialize};
use snaplocate_core::{Bounds, Timestamp};

/// A decode event that passed the cooldown gate.
///
/// Emitted for every accepted event, matched or not. Whether the payload was
/// already in the scan history is decided by the presenter, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedEvent {
    /// Payload exactly as decoded.
    pub payload: String,

    /// Time of the decode event.
    pub timestamp: Timestamp,
}

/// An accepted decode event whose payload is in the target set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedEvent {
    /// Payload exactly as decoded.
    pub payload: String,

    /// Normalized payload that matched a target entry.
    pub normalized: String,

    /// Region of the barcode in the frame.
    pub bounds: Bounds,

    /// Time of the decode event.
    pub timestamp: Timestamp,
}

/// Everything an accepted decode event produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Always present for an accepted event.
    pub observed: ObservedEvent,

    /// Present when the payload matched a target.
    pub matched: Option<MatchedEvent>,
}

/// Outcome of one `ingest` call.
///
/// # Examples
///
/// ```
/// use snaplocate_core::{Bounds, DecodeEvent, TargetSet, Timestamp};
/// use snaplocate_pipeline::{MatchPipeline, PipelineResult};
///
/// let mut pipeline = MatchPipeline::new(TargetSet::from_entries(["abc123"]));
///
/// let result = pipeline.ingest(DecodeEvent::new(" ABC123 ", Bounds::ZERO, Timestamp::ZERO));
/// assert!(result.is_matched());
///
/// let result = pipeline.ingest(DecodeEvent::new("ABC123", Bounds::ZERO, Timestamp::from_millis(10)));
/// assert_eq!(result, PipelineResult::Suppressed);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PipelineResult {
    /// Dropped by the cooldown gate.
    Suppressed,

    /// Accepted and checked against the target set.
    Processed {
        observed: ObservedEvent,
        matched: Option<MatchedEvent>,
    },
}

impl PipelineResult {
    /// Check whether the event was dropped by the cooldown gate.
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }

    /// Check whether the event produced a match.
    pub fn is_matched(&self) -> bool {
        self.matched().is_some()
    }

    /// Get the observed event, if the event was accepted.
    pub fn observed(&self) -> Option<&ObservedEvent> {
        match self {
            Self::Processed { observed, .. } => Some(observed),
            Self::Suppressed => None,
        }
    }

    /// Get the matched event, if any.
    pub fn matched(&self) -> Option<&MatchedEvent> {
        match self {
            Self::Processed { matched, .. } => matched.as_ref(),
            Self::Suppressed => None,
        }
    }

    /// Convert into the output handed to the presenter.
    pub fn into_output(self) -> Option<PipelineOutput> {
        match self {
            Self::Processed { observed, matched } => Some(PipelineOutput { observed, matched }),
            Self::Suppressed => None,
        }
    }
}
