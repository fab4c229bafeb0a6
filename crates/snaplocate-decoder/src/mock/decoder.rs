//! Mock barcode decoder implementation for testing and development.
//!
//! This module provides a simulated decoder that can be controlled
//! programmatically for testing without a camera or vision framework.

use crate::{
    DecoderError, Result,
    traits::{DecodedFrame, DecodedSymbol, Decoder},
    types::DecoderInfo,
};
use snaplocate_core::{Bounds, Clock, MonotonicClock, Timestamp};
use tokio::sync::mpsc;

/// Mock decoder for testing and development.
///
/// Frames are injected through the paired [`MockDecoderHandle`] and come out
/// of [`Decoder::next_frame`] in the order they were sent.
///
/// # Examples
///
/// ```
/// use snaplocate_decoder::mock::MockDecoder;
/// use snaplocate_decoder::traits::Decoder;
///
/// #[tokio::main]
/// async fn main() -> snaplocate_decoder::Result<()> {
///     let (mut decoder, handle) = MockDecoder::new();
///
///     handle.present("SN001").await?;
///
///     let frame = decoder.next_frame().await?.unwrap();
///     assert_eq!(frame.symbols[0].payload, "SN001");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockDecoder {
    /// Channel receiver for injected frames
    event_rx: mpsc::Receiver<FrameEvent>,

    /// Decoder name
    name: String,

    /// Set once the handle signalled the end of the stream
    finished: bool,
}

impl MockDecoder {
    /// Create a new mock decoder with the default name.
    ///
    /// Returns a tuple of (MockDecoder, MockDecoderHandle) where the handle
    /// is used to inject frames.
    pub fn new() -> (Self, MockDecoderHandle) {
        Self::with_name("Mock Decoder".to_string())
    }

    /// Create a new mock decoder with a custom name.
    pub fn with_name(name: String) -> (Self, MockDecoderHandle) {
        Self::with_clock(name, MonotonicClock::new())
    }

    /// Create a new mock decoder whose handle stamps frames with `clock`.
    pub fn with_clock(name: String, clock: MonotonicClock) -> (Self, MockDecoderHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);

        let decoder = Self {
            event_rx,
            name: name.clone(),
            finished: false,
        };

        let handle = MockDecoderHandle {
            event_tx,
            name,
            clock,
        };

        (decoder, handle)
    }

    /// Check whether the end of the stream was reached.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Default for MockDecoder {
    fn default() -> Self {
        Self::new().0
    }
}

impl Decoder for MockDecoder {
    async fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
        if self.finished {
            return Ok(None);
        }

        let event = self
            .event_rx
            .recv()
            .await
            .ok_or_else(|| DecoderError::disconnected("Mock decoder channel closed"))?;

        match event {
            FrameEvent::Frame(frame) => Ok(Some(frame)),
            FrameEvent::Failure(message) => Err(DecoderError::other(message)),
            FrameEvent::Finished => {
                self.finished = true;
                Ok(None)
            }
        }
    }

    async fn info(&self) -> Result<DecoderInfo> {
        Ok(DecoderInfo::new(self.name.clone(), "mock"))
    }
}

/// Internal event type for mock decoder.
#[derive(Debug, Clone)]
enum FrameEvent {
    Frame(DecodedFrame),
    Failure(String),
    Finished,
}

/// Handle for controlling a mock decoder.
///
/// Cloned handles feed the same decoder.
#[derive(Debug, Clone)]
pub struct MockDecoderHandle {
    /// Channel sender for injected frames
    event_tx: mpsc::Sender<FrameEvent>,

    /// Decoder name
    name: String,

    /// Clock used to stamp frames without an explicit timestamp
    clock: MonotonicClock,
}

impl MockDecoderHandle {
    /// Present one barcode with empty bounds, stamped now.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder has been dropped.
    pub async fn present(&self, payload: impl Into<String>) -> Result<()> {
        self.present_symbols(vec![DecodedSymbol::new(payload, Bounds::ZERO)])
            .await
    }

    /// Present a frame with several symbols, stamped now.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder has been dropped.
    pub async fn present_symbols(&self, symbols: Vec<DecodedSymbol>) -> Result<()> {
        self.present_at(self.clock.now(), symbols).await
    }

    /// Present a frame with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder has been dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use snaplocate_decoder::mock::MockDecoder;
    /// use snaplocate_decoder::traits::{DecodedSymbol, Decoder};
    /// use snaplocate_core::{Bounds, Timestamp};
    ///
    /// #[tokio::main]
    /// async fn main() -> snaplocate_decoder::Result<()> {
    ///     let (mut decoder, handle) = MockDecoder::new();
    ///
    ///     handle
    ///         .present_at(
    ///             Timestamp::from_millis(600),
    ///             vec![DecodedSymbol::new("SN002", Bounds::new(4.0, 8.0, 60.0, 20.0))],
    ///         )
    ///         .await?;
    ///
    ///     let frame = decoder.next_frame().await?.unwrap();
    ///     assert_eq!(frame.timestamp, Timestamp::from_millis(600));
    ///     Ok(())
    /// }
    /// ```
    pub async fn present_at(&self, timestamp: Timestamp, symbols: Vec<DecodedSymbol>) -> Result<()> {
        self.send(FrameEvent::Frame(DecodedFrame::new(timestamp, symbols)))
            .await
    }

    /// Make the decoder's next read fail with `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder has been dropped.
    pub async fn fail(&self, message: impl Into<String>) -> Result<()> {
        self.send(FrameEvent::Failure(message.into())).await
    }

    /// Signal the end of the stream; the decoder returns `None` from then on.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder has been dropped.
    pub async fn finish(&self) -> Result<()> {
        self.send(FrameEvent::Finished).await
    }

    /// Get the decoder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the clock used for implicit timestamps.
    pub fn clock(&self) -> MonotonicClock {
        self.clock
    }

    async fn send(&self, event: FrameEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| DecoderError::disconnected("Mock decoder channel closed"))
    }
}
