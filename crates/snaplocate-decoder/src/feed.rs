//! Decoder feed.
//!
//! This module provides the `DecoderFeed`, which runs a decoder in its own
//! task and flattens the frames it produces into a stream of decode events
//! for the matching pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐       ┌─────────────────┐
//! │ Decoder  │──────►│  Event Channel  │──────► Match Pipeline
//! │ Task     │       │  (mpsc)         │
//! └──────────┘       └─────────────────┘
//!      ▲
//!      │ watch (Running / Paused)
//! ┌──────────┐
//! │ Feed     │
//! │ Control  │
//! └──────────┘
//! ```
//!
//! While the feed is paused the decoder keeps running but every frame it
//! produces is discarded, the same as a capture session that was stopped and
//! started again.
//!
//! # Examples
//!
//! ```no_run
//! use snaplocate_decoder::feed::{DecoderFeed, FeedEvent};
//! use snaplocate_decoder::devices::AnyDecoder;
//! use snaplocate_decoder::mock::MockDecoder;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (decoder, handle) = MockDecoder::new();
//!     let mut feed = DecoderFeed::new(AnyDecoder::Mock(decoder), 100).start();
//!
//!     handle.present("SN001").await.unwrap();
//!     handle.finish().await.unwrap();
//!
//!     while let Some(event) = feed.recv().await {
//!         println!("Event: {:?}", event);
//!     }
//!
//!     feed.shutdown().await;
//! }
//! ```

use crate::devices::AnyDecoder;
use crate::traits::Decoder;
use crate::Result;
use chrono::{DateTime, Utc};
use snaplocate_core::DecodeEvent;
use snaplocate_core::constants::DEFAULT_CHANNEL_CAPACITY;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

/// Delay before retrying a send into a full channel.
const BACKPRESSURE_RETRY_MS: u64 = 100;

/// Event delivered by the feed.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FeedEvent {
    /// One decoded barcode, in decoder order.
    Decoded {
        /// The barcode, stamped on the decoder's monotonic clock.
        event: DecodeEvent,

        /// Wall clock capture time of the frame it came from.
        captured_at: DateTime<Utc>,
    },

    /// Decoder error occurred.
    ///
    /// The decoder task terminates after sending this event.
    DecoderError {
        /// Name of the decoder that failed.
        decoder: String,

        /// Error message.
        error: String,
    },

    /// The decoder stream ended; no more events follow.
    Finished,
}

/// Delivery state of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedState {
    /// Frames are forwarded.
    #[default]
    Running,

    /// Frames are discarded.
    Paused,
}

/// Cloneable switch that pauses and resumes a feed.
///
/// # Examples
///
/// ```
/// use snaplocate_decoder::feed::{FeedControl, FeedState};
///
/// let control = FeedControl::new();
/// control.pause();
/// assert!(control.is_paused());
///
/// control.resume();
/// assert_eq!(control.state(), FeedState::Running);
/// ```
#[derive(Debug, Clone)]
pub struct FeedControl {
    state_tx: Arc<watch::Sender<FeedState>>,
}

impl FeedControl {
    /// Create a control in the running state.
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(FeedState::Running);
        Self {
            state_tx: Arc::new(state_tx),
        }
    }

    /// Stop forwarding frames.
    pub fn pause(&self) {
        if self.state_tx.send_replace(FeedState::Paused) == FeedState::Running {
            debug!("Decoder feed paused");
        }
    }

    /// Resume forwarding frames.
    pub fn resume(&self) {
        if self.state_tx.send_replace(FeedState::Running) == FeedState::Paused {
            debug!("Decoder feed resumed");
        }
    }

    /// Current state.
    pub fn state(&self) -> FeedState {
        *self.state_tx.borrow()
    }

    /// Check whether frames are currently discarded.
    pub fn is_paused(&self) -> bool {
        self.state() == FeedState::Paused
    }

    fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state_tx.subscribe()
    }
}

impl Default for FeedControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of shutting a feed down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedShutdown {
    /// Tasks that ended with a decoder error.
    pub errors: usize,

    /// Tasks that panicked.
    pub panics: usize,
}

impl FeedShutdown {
    /// Check whether every task ended cleanly or was cancelled.
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.panics == 0
    }
}

/// Handle for receiving events from a started feed.
pub struct FeedHandle {
    /// Event receiver.
    event_rx: mpsc::Receiver<FeedEvent>,

    /// Running decoder task.
    tasks: JoinSet<Result<()>>,

    /// Pause switch shared with the task.
    control: FeedControl,
}

impl FeedHandle {
    /// Receive the next event.
    ///
    /// Returns `None` once the decoder task has terminated and every
    /// buffered event was consumed.
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        self.event_rx.recv().await
    }

    /// Get the pause switch for this feed.
    pub fn control(&self) -> FeedControl {
        self.control.clone()
    }

    /// Abort the decoder task and wait for it to terminate.
    ///
    /// Tasks that already finished are classified by how they ended; a task
    /// cancelled by this call counts as clean.
    pub async fn shutdown(mut self) -> FeedShutdown {
        self.tasks.abort_all();

        let mut outcome = FeedShutdown::default();

        while let Some(result) = self.tasks.join_next().await {
            match Self::classify_task_result(result) {
                TaskTermination::Success | TaskTermination::Cancelled => {}
                TaskTermination::Error => outcome.errors += 1,
                TaskTermination::Panic => outcome.panics += 1,
            }
        }

        if outcome.is_clean() {
            debug!("Decoder feed shut down");
        } else {
            warn!(
                errors = outcome.errors,
                panics = outcome.panics,
                "Decoder feed shut down with failures"
            );
        }

        outcome
    }

    fn classify_task_result(
        result: std::result::Result<Result<()>, tokio::task::JoinError>,
    ) -> TaskTermination {
        match result {
            Ok(Ok(())) => TaskTermination::Success,
            Ok(Err(_)) => TaskTermination::Error,
            Err(e) if e.is_cancelled() => TaskTermination::Cancelled,
            Err(_) => TaskTermination::Panic,
        }
    }
}

/// Task termination classification for shutdown handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskTermination {
    Success,
    Error,
    Cancelled,
    Panic,
}

/// Runs a decoder and forwards its symbols as decode events.
///
/// # Lifecycle
///
/// 1. Create the feed with a decoder and channel capacity
/// 2. Optionally take a [`FeedControl`] to pause delivery
/// 3. Call `start()` to spawn the decoder task and get a [`FeedHandle`]
/// 4. Receive events until `None`
/// 5. Call `shutdown()` on the handle
pub struct DecoderFeed {
    decoder: AnyDecoder,
    capacity: usize,
    control: FeedControl,
}

impl DecoderFeed {
    /// Create a feed for `decoder` with a bounded channel of `capacity`
    /// events. A zero capacity falls back to the default.
    pub fn new(decoder: AnyDecoder, capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CHANNEL_CAPACITY
        } else {
            capacity
        };

        Self {
            decoder,
            capacity,
            control: FeedControl::new(),
        }
    }

    /// Use an existing pause switch instead of a fresh one.
    pub fn with_control(mut self, control: FeedControl) -> Self {
        self.control = control;
        self
    }

    /// Get the pause switch for this feed.
    pub fn control(&self) -> FeedControl {
        self.control.clone()
    }

    /// Spawn the decoder task and return the event handle.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> FeedHandle {
        let (event_tx, event_rx) = mpsc::channel(self.capacity);
        let mut tasks = JoinSet::new();

        tasks.spawn(Self::decoder_task(
            self.decoder,
            event_tx,
            self.control.subscribe(),
        ));

        FeedHandle {
            event_rx,
            tasks,
            control: self.control,
        }
    }

    async fn decoder_task(
        mut decoder: AnyDecoder,
        tx: mpsc::Sender<FeedEvent>,
        state_rx: watch::Receiver<FeedState>,
    ) -> Result<()> {
        let name = match decoder.info().await {
            Ok(info) => info.name,
            Err(_) => "decoder".to_string(),
        };
        info!(decoder = %name, "Decoder feed started");

        loop {
            match decoder.next_frame().await {
                Ok(Some(frame)) => {
                    if *state_rx.borrow() == FeedState::Paused {
                        trace!(
                            decoder = %name,
                            symbols = frame.symbols.len(),
                            timestamp = %frame.timestamp,
                            captured_at = %frame.captured_at,
                            "Frame discarded while paused"
                        );
                        continue;
                    }

                    let captured_at = frame.captured_at;
                    trace!(
                        decoder = %name,
                        symbols = frame.symbols.len(),
                        timestamp = %frame.timestamp,
                        captured_at = %captured_at,
                        "Frame decoded"
                    );

                    for event in frame.into_events() {
                        let event = FeedEvent::Decoded { event, captured_at };
                        if !Self::forward(&tx, event).await {
                            debug!(decoder = %name, "Feed receiver dropped");
                            return Ok(());
                        }
                    }
                }
                Ok(None) => {
                    info!(decoder = %name, "Decoder stream finished");
                    let _ = tx.send(FeedEvent::Finished).await;
                    return Ok(());
                }
                Err(e) => {
                    warn!(decoder = %name, error = %e, "Decoder failed");
                    let _ = tx
                        .send(FeedEvent::DecoderError {
                            decoder: name,
                            error: e.to_string(),
                        })
                        .await;
                    return Err(e);
                }
            }
        }
    }

    /// Send an event without waiting when there is room.
    ///
    /// If the channel is full, waits a short delay and then blocks until
    /// the receiver makes room.
    ///
    /// Returns `false` once the receiver is gone.
    async fn forward(tx: &mpsc::Sender<FeedEvent>, event: FeedEvent) -> bool {
        match tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                trace!("Feed channel full, applying backpressure");
                tokio::time::sleep(tokio::time::Duration::from_millis(BACKPRESSURE_RETRY_MS))
                    .await;
                tx.send(event).await.is_ok()
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}
