//! Signal generation, filtering, and batch evaluation.

pub mod engine;
pub mod filter;
pub mod generator;
pub mod scoring;

pub use engine::{Evaluation, SignalEngine, MIN_OBSERVATIONS};
pub use filter::{FilterConfig, FilterDecision, RejectReason, SignalFilter};
pub use generator::{SignalGenerator, Strategy};
pub use scoring::StrengthScaling;
