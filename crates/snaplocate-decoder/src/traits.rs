//! Decoder trait definitions.
//!
//! This module defines the capability interface between the matching core
//! and whatever turns camera frames into barcode payloads. The core never
//! decodes anything itself: a decoder hands over frames, each carrying zero
//! or more decoded symbols, and the feed forwards them one at a time.
//!
//! The trait uses native `async fn` methods (Rust 1.90 + Edition 2024
//! RPITIT), eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DecoderInfo, Symbology};
use snaplocate_core::{Bounds, DecodeEvent, Timestamp};

/// One barcode decoded from a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSymbol {
    /// Decoded payload, exactly as reported.
    pub payload: String,

    /// Region of the barcode in the frame.
    pub bounds: Bounds,

    /// Symbology of the barcode.
    pub symbology: Symbology,
}

impl DecodedSymbol {
    /// Create a symbol with unknown symbology.
    pub fn new(payload: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            payload: payload.into(),
            bounds,
            symbology: Symbology::Unknown,
        }
    }

    /// Set the symbology.
    pub fn with_symbology(mut self, symbology: Symbology) -> Self {
        self.symbology = symbology;
        self
    }
}

/// Everything a decoder found in one camera frame.
///
/// Carries the monotonic timestamp used for cooldown decisions and the wall
/// clock capture time used for logs.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Monotonic time of the frame.
    pub timestamp: Timestamp,

    /// Wall clock time the frame was captured.
    pub captured_at: chrono::DateTime<chrono::Utc>,

    /// Symbols decoded from the frame, in decoder order.
    pub symbols: Vec<DecodedSymbol>,
}

impl DecodedFrame {
    /// Create a frame captured now.
    pub fn new(timestamp: Timestamp, symbols: Vec<DecodedSymbol>) -> Self {
        DecodedFrameBuilder::new(timestamp).symbols(symbols).build()
    }

    /// Create a builder for constructing a frame with optional fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use snaplocate_decoder::traits::{DecodedFrame, DecodedSymbol};
    /// use snaplocate_core::{Bounds, Timestamp};
    /// use chrono::{TimeZone, Utc};
    ///
    /// let captured = Utc.with_ymd_and_hms(2024, 11, 29, 9, 30, 0).unwrap();
    /// let frame = DecodedFrame::builder(Timestamp::from_millis(40))
    ///     .symbol(DecodedSymbol::new("SN001", Bounds::ZERO))
    ///     .captured_at(captured)
    ///     .build();
    ///
    /// assert_eq!(frame.symbols.len(), 1);
    /// assert_eq!(frame.captured_at, captured);
    /// ```
    pub fn builder(timestamp: Timestamp) -> DecodedFrameBuilder {
        DecodedFrameBuilder::new(timestamp)
    }

    /// Check whether the frame carries no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Split the frame into decode events, one per symbol, in order.
    ///
    /// Every event carries the frame's timestamp.
    pub fn into_events(self) -> impl Iterator<Item = DecodeEvent> {
        let timestamp = self.timestamp;
        self.symbols
            .into_iter()
            .map(move |symbol| DecodeEvent::new(symbol.payload, symbol.bounds, timestamp))
    }
}

/// Builder for constructing DecodedFrame with optional fields.
#[derive(Debug, Clone)]
pub struct DecodedFrameBuilder {
    timestamp: Timestamp,
    captured_at: Option<chrono::DateTime<chrono::Utc>>,
    symbols: Vec<DecodedSymbol>,
}

impl DecodedFrameBuilder {
    /// Create a new builder for a frame at `timestamp`.
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            captured_at: None,
            symbols: Vec::new(),
        }
    }

    /// Append one decoded symbol.
    pub fn symbol(mut self, symbol: DecodedSymbol) -> Self {
        self.symbols.push(symbol);
        self
    }

    /// Append several decoded symbols.
    pub fn symbols(mut self, symbols: impl IntoIterator<Item = DecodedSymbol>) -> Self {
        self.symbols.extend(symbols);
        self
    }

    /// Set a custom wall clock capture time.
    ///
    /// If not set, the current time will be used when build() is called.
    pub fn captured_at(mut self, captured_at: chrono::DateTime<chrono::Utc>) -> Self {
        self.captured_at = Some(captured_at);
        self
    }

    /// Build the frame.
    pub fn build(self) -> DecodedFrame {
        DecodedFrame {
            timestamp: self.timestamp,
            captured_at: self.captured_at.unwrap_or_else(chrono::Utc::now),
            symbols: self.symbols,
        }
    }
}

/// Barcode decoder abstraction.
///
/// Represents a source of decoded camera frames: a platform vision
/// framework, a scripted replay, or a test double. Frames arrive
/// continuously while the source is live.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. You cannot use `Box<dyn Decoder>`.
///
/// For dynamic dispatch selected by configuration, use the enum wrapper
/// [`AnyDecoder`](crate::devices::AnyDecoder).
///
/// # Examples
///
/// ```no_run
/// use snaplocate_decoder::traits::Decoder;
/// use snaplocate_decoder::error::Result;
///
/// async fn first_payload<D: Decoder>(decoder: &mut D) -> Result<Option<String>> {
///     while let Some(frame) = decoder.next_frame().await? {
///         if let Some(symbol) = frame.symbols.into_iter().next() {
///             return Ok(Some(symbol.payload));
///         }
///     }
///     Ok(None)
/// }
/// ```
pub trait Decoder: Send + Sync {
    /// Wait for the next decoded frame.
    ///
    /// Returns `Ok(None)` when the source has finished and no more frames
    /// will follow. Live camera sources never finish.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The source is disconnected
    /// - The source produced data that cannot be turned into a frame
    async fn next_frame(&mut self) -> Result<Option<DecodedFrame>>;

    /// Get decoder information.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder cannot be queried.
    async fn info(&self) -> Result<DecoderInfo>;
}
