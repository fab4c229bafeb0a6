//! Scan session wiring.
//!
//! A session connects a decoder to a sink through three tasks:
//!
//! ```text
//! ┌──────────┐  FeedEvent  ┌──────────┐  PipelineOutput  ┌───────────┐
//! │ Decoder  │────────────►│ Pipeline │─────────────────►│ Presenter │──► sink
//! │ feed     │   (mpsc)    │ task     │      (mpsc)      │ task      │
//! └──────────┘             └──────────┘                  └───────────┘
//!      ▲                                                       │
//!      └──────────────── pause / resume (watch) ───────────────┘
//! ```
//!
//! The pipeline task is the only owner of the [`MatchPipeline`], so
//! `ingest` calls never overlap. The presenter task is the only place side
//! effects happen.

use crate::error::{Result, SessionError};
use crate::events::PipelineOutput;
use crate::export::export_csv;
use crate::history::ScanHistory;
use crate::pipeline::{MatchPipeline, PipelineStats};
use crate::presenter::{PresentationSink, Presenter};
use chrono::{DateTime, Utc};
use serde::Serialize;
use snaplocate_core::{ScannerConfig, TargetSet};
use snaplocate_decoder::mock::MockDecoderHandle;
use snaplocate_decoder::{AnyDecoder, DecoderFeed, FeedControl, FeedEvent, FeedHandle};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Summary of a finished session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionReport {
    /// Distinct payloads observed, in first-seen order.
    pub history: ScanHistory,

    /// Pipeline counters.
    pub stats: PipelineStats,

    /// Error that ended the decoder stream, if any.
    pub decoder_error: Option<String>,

    /// Wall clock capture time of the first decoded barcode.
    pub first_capture: Option<DateTime<Utc>>,

    /// Wall clock capture time of the last decoded barcode.
    pub last_capture: Option<DateTime<Utc>>,
}

impl SessionReport {
    /// Write the history as CSV to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Export`] if the file cannot be written.
    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        export_csv(path, self.history.entries())
            .map_err(|e| SessionError::export(path.display().to_string(), e))
    }
}

struct PipelineTaskOutcome {
    stats: PipelineStats,
    decoder_error: Option<String>,
    first_capture: Option<DateTime<Utc>>,
    last_capture: Option<DateTime<Utc>>,
    feed_panics: usize,
}

/// A running scan session.
///
/// # Examples
///
/// ```
/// use snaplocate_core::{ScannerConfig, TargetSet};
/// use snaplocate_decoder::{AnyDecoder, mock::MockDecoder};
/// use snaplocate_pipeline::{ScanSession, presenter::RecordingSink};
///
/// #[tokio::main]
/// async fn main() -> snaplocate_pipeline::Result<()> {
///     let (decoder, handle) = MockDecoder::new();
///     let targets = TargetSet::from_entries(["SN001"]);
///
///     let session = ScanSession::start(
///         &ScannerConfig::default(),
///         AnyDecoder::Mock(decoder),
///         targets,
///         RecordingSink::new(),
///     );
///
///     handle.present(" sn001 ").await?;
///     handle.finish().await?;
///
///     let report = session.join().await?;
///     assert_eq!(report.stats.matched, 1);
///     assert_eq!(report.history.entries(), [" sn001 "]);
///     Ok(())
/// }
/// ```
pub struct ScanSession {
    pipeline_task: JoinHandle<PipelineTaskOutcome>,
    presenter_task: JoinHandle<ScanHistory>,
    feed_control: FeedControl,
    targets: TargetSet,
}

impl ScanSession {
    /// Start a session reading from `decoder`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<S>(
        config: &ScannerConfig,
        decoder: AnyDecoder,
        targets: TargetSet,
        sink: S,
    ) -> Self
    where
        S: PresentationSink + 'static,
    {
        let feed = DecoderFeed::new(decoder, config.channel_capacity).start();
        let feed_control = feed.control();

        let pipeline = MatchPipeline::builder(targets.clone())
            .with_cooldown(config.cooldown())
            .build();

        let mut presenter =
            Presenter::new(sink).with_highlight_duration(config.highlight_duration());
        if config.pause_on_match {
            presenter = presenter.pause_feed_on_match(feed_control.clone());
        }

        let (output_tx, output_rx) = mpsc::channel(config.channel_capacity.max(1));

        info!(
            cooldown_ms = config.cooldown_ms,
            highlight_ms = config.highlight_ms,
            pause_on_match = config.pause_on_match,
            targets = targets.len(),
            "Scan session started"
        );

        Self {
            pipeline_task: tokio::spawn(Self::pipeline_task(feed, pipeline, output_tx)),
            presenter_task: tokio::spawn(presenter.run(output_rx)),
            feed_control,
            targets,
        }
    }

    /// Build the decoder selected by `config` and start a session on it.
    ///
    /// For the mock decoder the handle used to inject frames is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Decoder`] if the decoder cannot be created.
    pub fn from_config<S>(
        config: &ScannerConfig,
        targets: TargetSet,
        sink: S,
    ) -> Result<(Self, Option<MockDecoderHandle>)>
    where
        S: PresentationSink + 'static,
    {
        let (decoder, handle) = AnyDecoder::from_kind(&config.decoder)?;
        Ok((Self::start(config, decoder, targets, sink), handle))
    }

    /// Pause switch of the decoder feed.
    pub fn feed_control(&self) -> FeedControl {
        self.feed_control.clone()
    }

    /// Shared handle to the target set; edits apply to the next event.
    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Wait for the decoder stream to end and the presenter to drain.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TaskFailed`] if a session task panicked.
    pub async fn join(self) -> Result<SessionReport> {
        let outcome = self
            .pipeline_task
            .await
            .map_err(|e| SessionError::task_failed("pipeline", e.to_string()))?;

        let history = self
            .presenter_task
            .await
            .map_err(|e| SessionError::task_failed("presenter", e.to_string()))?;

        if outcome.feed_panics > 0 {
            return Err(SessionError::task_failed(
                "decoder feed",
                format!("{} task(s) panicked", outcome.feed_panics),
            ));
        }

        info!(
            accepted = outcome.stats.accepted,
            suppressed = outcome.stats.suppressed,
            matched = outcome.stats.matched,
            distinct = history.len(),
            "Scan session finished"
        );

        Ok(SessionReport {
            history,
            stats: outcome.stats,
            decoder_error: outcome.decoder_error,
            first_capture: outcome.first_capture,
            last_capture: outcome.last_capture,
        })
    }

    async fn pipeline_task(
        mut feed: FeedHandle,
        mut pipeline: MatchPipeline,
        tx: mpsc::Sender<PipelineOutput>,
    ) -> PipelineTaskOutcome {
        let mut decoder_error = None;
        let mut first_capture = None;
        let mut last_capture = None;

        while let Some(event) = feed.recv().await {
            match event {
                FeedEvent::Decoded { event, captured_at } => {
                    first_capture.get_or_insert(captured_at);
                    last_capture = Some(captured_at);

                    if let Some(output) = pipeline.ingest(event).into_output()
                        && tx.send(output).await.is_err()
                    {
                        warn!("Presenter stopped before the feed finished");
                        break;
                    }
                }
                FeedEvent::DecoderError { decoder, error } => {
                    warn!(decoder = %decoder, error = %error, "Decoder stream ended with error");
                    decoder_error = Some(format!("{decoder}: {error}"));
                }
                _ => {}
            }
        }

        let shutdown = feed.shutdown().await;

        PipelineTaskOutcome {
            stats: pipeline.stats(),
            decoder_error,
            first_capture,
            last_capture,
            feed_panics: shutdown.panics,
        }
    }
}
