//! Debounced barcode-match pipeline.
//!
//! Raw decode events are throttled by a cooldown gate, normalized, and
//! matched against a mutable [`TargetSet`](snaplocate_core::TargetSet).
//! Every accepted event is reported as observed; events whose payload is a
//! target are also reported as matched and turned into a highlight and an
//! alert by the [`Presenter`](presenter::Presenter).
//!
//! [`ScanSession`] wires a decoder, the pipeline, and a presentation sink
//! together as three tasks and collects the scan history.

pub mod cooldown;
pub mod error;
pub mod events;
pub mod export;
pub mod history;
pub mod pipeline;
pub mod presenter;
pub mod session;

pub use cooldown::CooldownGate;
pub use error::{Result, SessionError};
pub use events::{MatchedEvent, ObservedEvent, PipelineOutput, PipelineResult};
pub use export::{export_csv, write_csv};
pub use history::ScanHistory;
pub use pipeline::{MatchPipeline, MatchPipelineBuilder, PipelineStats};
pub use presenter::{PresentationSink, Presenter, RecordingSink};
pub use session::{ScanSession, SessionReport};
