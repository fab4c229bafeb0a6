//! Presentation side effects.
//!
//! The [`Presenter`] is the single consumer of pipeline output. It owns the
//! scan history and performs every side effect through a
//! [`PresentationSink`], one output at a time:
//!
//! - every observed payload is appended to the history unless already
//!   present, and the sink is told whether it was a duplicate;
//! - every match shows a highlight on the matched bounds, cleared after the
//!   highlight duration (a newer match replaces it and restarts the timer);
//! - every match raises exactly one alert;
//! - optionally, the decoder feed is paused while the highlight is up.

use crate::events::{MatchedEvent, ObservedEvent, PipelineOutput};
use crate::history::ScanHistory;
use snaplocate_core::constants::DEFAULT_HIGHLIGHT_MS;
use snaplocate_decoder::FeedControl;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

/// Receiver of presentation side effects.
///
/// Implementations render to whatever the host has: a terminal, a UI
/// overlay, a haptic engine. Calls arrive from a single task, in order.
pub trait PresentationSink: Send {
    /// Show a highlight on the matched barcode.
    fn highlight(&mut self, matched: &MatchedEvent);

    /// Remove the current highlight.
    fn clear_highlight(&mut self);

    /// Raise one haptic or audible alert.
    fn alert(&mut self);

    /// Report an observed payload and whether it was already in the history.
    fn observed(&mut self, observed: &ObservedEvent, duplicate: bool);
}

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Highlight(MatchedEvent),
    ClearHighlight,
    Alert,
    Observed { payload: String, duplicate: bool },
}

/// Sink that records every call, for tests and headless runs.
///
/// Clones share the same log, so a clone kept by the caller can inspect
/// calls made after the sink was handed to a session.
///
/// # Examples
///
/// ```
/// use snaplocate_pipeline::presenter::{PresentationSink, RecordingSink, SinkCall};
///
/// let sink = RecordingSink::new();
/// let mut handed_out = sink.clone();
/// handed_out.alert();
///
/// assert_eq!(sink.calls(), vec![SinkCall::Alert]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<SinkCall>>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of alerts raised so far.
    pub fn alert_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, SinkCall::Alert))
            .count()
    }

    fn push(&self, call: SinkCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl PresentationSink for RecordingSink {
    fn highlight(&mut self, matched: &MatchedEvent) {
        self.push(SinkCall::Highlight(matched.clone()));
    }

    fn clear_highlight(&mut self) {
        self.push(SinkCall::ClearHighlight);
    }

    fn alert(&mut self) {
        self.push(SinkCall::Alert);
    }

    fn observed(&mut self, observed: &ObservedEvent, duplicate: bool) {
        self.push(SinkCall::Observed {
            payload: observed.payload.clone(),
            duplicate,
        });
    }
}

/// Single consumer applying pipeline output to a sink.
pub struct Presenter<S> {
    sink: S,
    history: ScanHistory,
    highlight_duration: Duration,
    highlight_deadline: Option<Instant>,
    feed: Option<FeedControl>,
}

impl<S: PresentationSink> Presenter<S> {
    /// Create a presenter with the default highlight duration.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            history: ScanHistory::new(),
            highlight_duration: Duration::from_millis(DEFAULT_HIGHLIGHT_MS),
            highlight_deadline: None,
            feed: None,
        }
    }

    /// Set how long a highlight stays up.
    pub fn with_highlight_duration(mut self, duration: Duration) -> Self {
        self.highlight_duration = duration;
        self
    }

    /// Start from an existing history.
    pub fn with_history(mut self, history: ScanHistory) -> Self {
        self.history = history;
        self
    }

    /// Pause `feed` while a highlight is up.
    pub fn pause_feed_on_match(mut self, feed: FeedControl) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Apply one pipeline output.
    pub fn present(&mut self, output: PipelineOutput) {
        let observed = output.observed;
        let duplicate = !self.history.record(&observed.payload);
        self.sink.observed(&observed, duplicate);

        if let Some(matched) = output.matched {
            info!(payload = %matched.payload, bounds = %matched.bounds, "Match found");

            self.sink.highlight(&matched);
            self.sink.alert();
            self.highlight_deadline = Some(Instant::now() + self.highlight_duration);

            if let Some(feed) = &self.feed {
                feed.pause();
            }
        }
    }

    /// Clear the highlight now, if one is up, and resume the feed.
    pub fn clear_highlight(&mut self) {
        if self.highlight_deadline.take().is_none() {
            return;
        }

        debug!("Highlight cleared");
        self.sink.clear_highlight();

        if let Some(feed) = &self.feed {
            feed.resume();
        }
    }

    /// Check whether a highlight is up.
    pub fn is_highlighted(&self) -> bool {
        self.highlight_deadline.is_some()
    }

    /// History so far.
    pub fn history(&self) -> &ScanHistory {
        &self.history
    }

    /// Consume outputs until `rx` closes, clearing highlights as they expire.
    ///
    /// A highlight still up when the channel closes is cleared immediately.
    /// Returns the history.
    pub async fn run(mut self, mut rx: mpsc::Receiver<PipelineOutput>) -> ScanHistory {
        loop {
            let deadline = self.highlight_deadline;

            tokio::select! {
                output = rx.recv() => match output {
                    Some(output) => self.present(output),
                    None => break,
                },
                () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    self.clear_highlight();
                }
            }
        }

        self.clear_highlight();
        debug!(entries = self.history.len(), "Presenter stopped");
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaplocate_core::{Bounds, Timestamp};

    fn observed_only(payload: &str) -> PipelineOutput {
        PipelineOutput {
            observed: ObservedEvent {
                payload: payload.to_string(),
                timestamp: Timestamp::ZERO,
            },
            matched: None,
        }
    }

    fn matched(payload: &str, millis: u64) -> PipelineOutput {
        let timestamp = Timestamp::from_millis(millis);
        PipelineOutput {
            observed: ObservedEvent {
                payload: payload.to_string(),
                timestamp,
            },
            matched: Some(MatchedEvent {
                payload: payload.to_string(),
                normalized: payload.trim().to_lowercase(),
                bounds: Bounds::new(1.0, 1.0, 10.0, 10.0),
                timestamp,
            }),
        }
    }

    #[test]
    fn test_observed_reports_duplicates() {
        let sink = RecordingSink::new();
        let mut presenter = Presenter::new(sink.clone());

        presenter.present(observed_only("a"));
        presenter.present(observed_only("a"));
        presenter.present(observed_only("A"));

        assert_eq!(
            sink.calls(),
            vec![
                SinkCall::Observed { payload: "a".into(), duplicate: false },
                SinkCall::Observed { payload: "a".into(), duplicate: true },
                SinkCall::Observed { payload: "A".into(), duplicate: false },
            ]
        );
        assert_eq!(presenter.history().entries(), ["a", "A"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_match_highlights_and_alerts_once() {
        let sink = RecordingSink::new();
        let mut presenter = Presenter::new(sink.clone());

        presenter.present(matched("SN001", 0));

        let calls = sink.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[0], SinkCall::Observed { duplicate: false, .. }));
        assert!(matches!(&calls[1], SinkCall::Highlight(m) if m.payload == "SN001"));
        assert_eq!(calls[2], SinkCall::Alert);
        assert!(presenter.is_highlighted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_highlight_only_when_up() {
        let sink = RecordingSink::new();
        let mut presenter = Presenter::new(sink.clone());

        presenter.clear_highlight();
        assert!(sink.calls().is_empty());

        presenter.present(matched("SN001", 0));
        presenter.clear_highlight();
        presenter.clear_highlight();

        let clears = sink
            .calls()
            .into_iter()
            .filter(|c| *c == SinkCall::ClearHighlight)
            .count();
        assert_eq!(clears, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_highlight_clears_after_duration() {
        let sink = RecordingSink::new();
        let presenter =
            Presenter::new(sink.clone()).with_highlight_duration(Duration::from_millis(1000));
        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(presenter.run(rx));

        tx.send(matched("SN001", 0)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(!sink.calls().contains(&SinkCall::ClearHighlight));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(sink.calls().last(), Some(&SinkCall::ClearHighlight));

        drop(tx);
        let history = task.await.unwrap();
        assert_eq!(history.entries(), ["SN001"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_match_restarts_timer() {
        let sink = RecordingSink::new();
        let presenter =
            Presenter::new(sink.clone()).with_highlight_duration(Duration::from_millis(1000));
        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(presenter.run(rx));

        tx.send(matched("SN001", 0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;

        tx.send(matched("SN002", 600)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;

        // 1200ms after the first match, but only 600ms after the second.
        assert!(!sink.calls().contains(&SinkCall::ClearHighlight));

        tokio::time::sleep(Duration::from_millis(401)).await;
        let clears = sink
            .calls()
            .into_iter()
            .filter(|c| *c == SinkCall::ClearHighlight)
            .count();
        assert_eq!(clears, 1);
        assert_eq!(sink.alert_count(), 2);

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_highlight_cleared_on_close() {
        let sink = RecordingSink::new();
        let presenter = Presenter::new(sink.clone());
        let (tx, rx) = mpsc::channel(8);

        tx.send(matched("SN001", 0)).await.unwrap();
        drop(tx);

        presenter.run(rx).await;
        assert_eq!(sink.calls().last(), Some(&SinkCall::ClearHighlight));
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_paused_while_highlighted() {
        let control = FeedControl::new();
        let presenter = Presenter::new(RecordingSink::new())
            .with_highlight_duration(Duration::from_millis(1000))
            .pause_feed_on_match(control.clone());
        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(presenter.run(rx));

        tx.send(observed_only("noise")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!control.is_paused());

        tx.send(matched("SN001", 0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(control.is_paused());

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(!control.is_paused());

        drop(tx);
        task.await.unwrap();
    }
}
