//! Core streaming primitives: buffer, subscribers, analyzer, runtime

pub mod analyzer;
pub mod buffer;
pub mod runtime;
pub mod subscribers;

pub use analyzer::{AnalysisPipeline, RealtimeAnalyzer, TickOutcome};
pub use buffer::ObservationBuffer;
pub use runtime::AnalyzerRuntime;
pub use subscribers::*;
