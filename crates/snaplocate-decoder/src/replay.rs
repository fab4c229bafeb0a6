//! Scripted replay decoder.
//!
//! Replays a recorded scan session from a tab-separated script so the whole
//! pipeline can be driven without a camera. Each line describes one decoded
//! symbol:
//!
//! ```text
//! # millis  payload  [x,y,w,h]
//! 0	SN001	10,20,120,40
//! 200	sn002
//! 600	SN002	12,22,118,38
//! 600	other
//! ```
//!
//! - `#` starts a comment line; blank lines are ignored.
//! - Consecutive lines sharing the same millis value form one frame.
//! - Millis are offsets from the moment replay starts and must not decrease.
//! - Bounds are optional and default to empty.

use crate::error::{DecoderError, Result};
use crate::traits::{DecodedFrame, DecodedSymbol, Decoder};
use crate::types::DecoderInfo;
use snaplocate_core::{Bounds, Timestamp};
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

/// Column separator in replay scripts.
const FIELD_SEPARATOR: char = '\t';

/// Comment marker in replay scripts.
const COMMENT_PREFIX: char = '#';

/// One frame of a parsed replay script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptFrame {
    /// Offset from the start of replay.
    pub offset: Duration,

    /// Symbols decoded in this frame.
    pub symbols: Vec<DecodedSymbol>,
}

/// Parse a replay script into frames.
///
/// # Errors
///
/// Returns [`DecoderError::Script`] naming the 1-based line when a line has
/// no payload column, an unparseable offset or bounds, or an offset earlier
/// than the previous line.
///
/// # Examples
///
/// ```
/// use snaplocate_decoder::replay::parse_script;
///
/// let frames = parse_script("0\tSN001\n0\tSN002\n600\tSN003\n").unwrap();
/// assert_eq!(frames.len(), 2);
/// assert_eq!(frames[0].symbols.len(), 2);
/// ```
pub fn parse_script(input: &str) -> Result<Vec<ScriptFrame>> {
    let mut frames: Vec<ScriptFrame> = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim_end_matches('\r');

        if trimmed.trim().is_empty() || trimmed.trim_start().starts_with(COMMENT_PREFIX) {
            continue;
        }

        let mut fields = trimmed.split(FIELD_SEPARATOR);

        let millis_field = fields.next().unwrap_or_default().trim();
        let millis: u64 = millis_field
            .parse()
            .map_err(|_| DecoderError::script(line, format!("invalid offset '{millis_field}'")))?;

        let payload = fields
            .next()
            .ok_or_else(|| DecoderError::script(line, "missing payload column"))?;

        let bounds = match fields.next() {
            Some(field) if !field.trim().is_empty() => parse_bounds(line, field)?,
            _ => Bounds::ZERO,
        };

        if fields.next().is_some() {
            return Err(DecoderError::script(line, "too many columns"));
        }

        let offset = Duration::from_millis(millis);
        let symbol = DecodedSymbol::new(payload, bounds);

        match frames.last_mut() {
            Some(last) if last.offset == offset => last.symbols.push(symbol),
            Some(last) if last.offset > offset => {
                return Err(DecoderError::script(
                    line,
                    format!(
                        "offset {millis}ms is earlier than previous {}ms",
                        last.offset.as_millis()
                    ),
                ));
            }
            _ => frames.push(ScriptFrame {
                offset,
                symbols: vec![symbol],
            }),
        }
    }

    Ok(frames)
}

fn parse_bounds(line: usize, field: &str) -> Result<Bounds> {
    let values = field
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| DecoderError::script(line, format!("invalid bounds '{field}'")))?;

    match values.as_slice() {
        [x, y, width, height] => Ok(Bounds::new(*x, *y, *width, *height)),
        _ => Err(DecoderError::script(
            line,
            format!("bounds need 4 values, got {}", values.len()),
        )),
    }
}

/// Decoder that replays a parsed script in real time.
///
/// Frames are paced against the instant of the first `next_frame` call with
/// `tokio::time::sleep_until`, so a slow consumer does not stretch the
/// timeline. Frame timestamps are the script offsets.
#[derive(Debug)]
pub struct ReplayDecoder {
    name: String,
    frames: VecDeque<ScriptFrame>,
    started_at: Option<Instant>,
}

impl ReplayDecoder {
    /// Create a replay decoder from already parsed frames.
    pub fn new(name: impl Into<String>, frames: Vec<ScriptFrame>) -> Self {
        Self {
            name: name.into(),
            frames: frames.into(),
            started_at: None,
        }
    }

    /// Parse a script from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the script is malformed.
    pub fn from_script(name: impl Into<String>, script: &str) -> Result<Self> {
        Ok(Self::new(name, parse_script(script)?))
    }

    /// Read and parse a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let script = std::fs::read_to_string(path)?;
        Self::from_script(path.display().to_string(), &script)
    }

    /// Number of frames not yet delivered.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl Decoder for ReplayDecoder {
    async fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
        let started_at = *self.started_at.get_or_insert_with(Instant::now);

        let Some(frame) = self.frames.pop_front() else {
            return Ok(None);
        };

        tokio::time::sleep_until(started_at + frame.offset).await;

        Ok(Some(DecodedFrame::new(
            Timestamp::from_duration(frame.offset),
            frame.symbols,
        )))
    }

    async fn info(&self) -> Result<DecoderInfo> {
        Ok(DecoderInfo::new(self.name.clone(), "replay"))
    }
}
