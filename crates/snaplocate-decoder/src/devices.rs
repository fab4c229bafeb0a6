//! Enum wrapper for decoder dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn Decoder>` is
//! not available. [`AnyDecoder`] provides concrete type dispatch instead and
//! is what configuration selects at startup.
//!
//! # Examples
//!
//! ```
//! use snaplocate_decoder::devices::AnyDecoder;
//! use snaplocate_decoder::mock::MockDecoder;
//!
//! let (decoder, _handle) = MockDecoder::new();
//! let any_decoder = AnyDecoder::Mock(decoder);
//!
//! // Can now be used polymorphically through the Decoder trait
//! ```

use crate::mock::{MockDecoder, MockDecoderHandle};
use crate::replay::ReplayDecoder;
use crate::traits::{DecodedFrame, Decoder};
use crate::{DecoderInfo, Result};
use snaplocate_core::DecoderKind;

/// Enum wrapper for decoder dispatch.
///
/// # Examples
///
/// ```
/// use snaplocate_decoder::devices::AnyDecoder;
/// use snaplocate_decoder::traits::Decoder;
/// use snaplocate_decoder::replay::ReplayDecoder;
///
/// #[tokio::main]
/// async fn main() -> snaplocate_decoder::Result<()> {
///     let replay = ReplayDecoder::from_script("inline", "0\tSN001\n")?;
///     let decoder = AnyDecoder::Replay(replay);
///
///     let info = decoder.info().await?;
///     assert_eq!(info.backend, "replay");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyDecoder {
    /// Mock decoder driven through a [`MockDecoderHandle`].
    Mock(MockDecoder),

    /// Scripted replay of a recorded session.
    Replay(ReplayDecoder),
}

impl AnyDecoder {
    /// Build the decoder selected by configuration.
    ///
    /// The mock handle is returned for [`DecoderKind::Mock`] so the caller
    /// can inject frames; it is `None` for every other kind.
    ///
    /// # Errors
    ///
    /// Returns an error if a replay script cannot be read or parsed.
    pub fn from_kind(kind: &DecoderKind) -> Result<(Self, Option<MockDecoderHandle>)> {
        match kind {
            DecoderKind::Mock => {
                let (decoder, handle) = MockDecoder::new();
                Ok((Self::Mock(decoder), Some(handle)))
            }
            DecoderKind::Replay { script } => {
                Ok((Self::Replay(ReplayDecoder::from_path(script)?), None))
            }
        }
    }
}

impl Decoder for AnyDecoder {
    async fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
        match self {
            Self::Mock(decoder) => decoder.next_frame().await,
            Self::Replay(decoder) => decoder.next_frame().await,
        }
    }

    async fn info(&self) -> Result<DecoderInfo> {
        match self {
            Self::Mock(decoder) => decoder.info().await,
            Self::Replay(decoder) => decoder.info().await,
        }
    }
}

impl From<MockDecoder> for AnyDecoder {
    fn from(decoder: MockDecoder) -> Self {
        Self::Mock(decoder)
    }
}

impl From<ReplayDecoder> for AnyDecoder {
    fn from(decoder: ReplayDecoder) -> Self {
        Self::Replay(decoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecoderError;
    use std::io::Write;

    #[tokio::test]
    async fn test_any_decoder_mock_dispatch() {
        let (decoder, handle) = AnyDecoder::from_kind(&DecoderKind::Mock).unwrap();
        let mut decoder = decoder;
        let handle = handle.unwrap();

        handle.present("SN001").await.unwrap();
        let frame = decoder.next_frame().await.unwrap().unwrap();
        assert_eq!(frame.symbols[0].payload, "SN001");

        let info = decoder.info().await.unwrap();
        assert_eq!(info.backend, "mock");
    }

    #[tokio::test]
    async fn test_any_decoder_replay_from_kind() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0\tSN001").unwrap();

        let kind = DecoderKind::Replay {
            script: file.path().to_path_buf(),
        };
        let (mut decoder, handle) = AnyDecoder::from_kind(&kind).unwrap();
        assert!(handle.is_none());

        let frame = decoder.next_frame().await.unwrap().unwrap();
        assert_eq!(frame.symbols[0].payload, "SN001");
        assert!(decoder.next_frame().await.unwrap().is_none());
    }

    #[test]
    fn test_any_decoder_replay_missing_script() {
        let kind = DecoderKind::Replay {
            script: "/nonexistent/session.tsv".into(),
        };
        assert!(matches!(
            AnyDecoder::from_kind(&kind),
            Err(DecoderError::Io(_))
        ));
    }
}
