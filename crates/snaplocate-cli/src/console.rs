//! Terminal rendering of presentation side effects.

use std::io::{self, Write};

use serde_json::json;
use snaplocate_pipeline::{MatchedEvent, ObservedEvent, PresentationSink};
use tracing::warn;

use crate::cli::OutputFormat;

/// Prints scan events to a writer, as text or JSON lines.
pub struct ConsoleSink<W: Write + Send> {
    out: W,
    format: OutputFormat,
}

impl ConsoleSink<io::Stdout> {
    /// Sink that prints to stdout.
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: impl FnOnce() -> String, value: impl FnOnce() -> serde_json::Value) {
        let result = match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", text()),
            OutputFormat::Json => writeln!(self.out, "{}", value()),
        };
        self.flush_after(result);
    }

    // A closed pipe must not take the session down.
    fn flush_after(&mut self, result: io::Result<()>) {
        if let Err(e) = result.and_then(|()| self.out.flush()) {
            warn!("Failed to write scan output: {}", e);
        }
    }
}

impl<W: Write + Send> PresentationSink for ConsoleSink<W> {
    fn highlight(&mut self, matched: &MatchedEvent) {
        self.emit(
            || {
                format!(
                    "[{}] MATCH {} at {}",
                    matched.timestamp, matched.payload, matched.bounds
                )
            },
            || json!({ "event": "matched", "data": matched }),
        );
    }

    fn clear_highlight(&mut self) {
        self.emit(
            || "       highlight cleared".to_string(),
            || json!({ "event": "highlight_cleared" }),
        );
    }

    fn alert(&mut self) {
        // BEL; terminals turn it into a beep or flash.
        if self.format == OutputFormat::Text {
            let result = self.out.write_all(b"\x07");
            self.flush_after(result);
        }
    }

    fn observed(&mut self, observed: &ObservedEvent, duplicate: bool) {
        self.emit(
            || {
                let marker = if duplicate { " (seen)" } else { "" };
                format!("[{}] {}{}", observed.timestamp, observed.payload, marker)
            },
            || json!({ "event": "observed", "data": observed, "duplicate": duplicate }),
        );
    }
}
