//! Decoder capability layer for SnapLocate.
//!
//! The matching core never decodes images. This crate defines what it needs
//! from a decoder, a stream of frames each carrying zero or more decoded
//! payloads with their bounds, and provides the sources used without a
//! camera:
//!
//! - [`MockDecoder`](mock::MockDecoder): frames injected programmatically.
//! - [`ReplayDecoder`](replay::ReplayDecoder): a recorded session replayed
//!   from a tab-separated script in real time.
//!
//! The [`DecoderFeed`] runs the selected decoder in its own task and turns
//! frames into [`DecodeEvent`](snaplocate_core::DecodeEvent)s, one per symbol
//! and in decoder order. A [`FeedControl`] pauses delivery; frames decoded
//! while paused are dropped.
//!
//! ```no_run
//! use snaplocate_decoder::traits::Decoder;
//! use snaplocate_decoder::error::Result;
//!
//! async fn count_symbols<D: Decoder>(decoder: &mut D) -> Result<usize> {
//!     let mut total = 0;
//!     while let Some(frame) = decoder.next_frame().await? {
//!         total += frame.symbols.len();
//!     }
//!     Ok(total)
//! }
//! ```
//!
//! # Thread Safety
//!
//! [`Decoder`] requires `Send + Sync` so decoders can move into Tokio tasks.

pub mod devices;
pub mod error;
pub mod feed;
pub mod mock;
pub mod replay;
pub mod traits;
pub mod types;

pub use devices::AnyDecoder;
pub use error::{DecoderError, Result};
pub use traits::{DecodedFrame, DecodedFrameBuilder, DecodedSymbol, Decoder};
pub use types::{DecoderInfo, Symbology};

pub use feed::{DecoderFeed, FeedControl, FeedEvent, FeedHandle, FeedShutdown, FeedState};
