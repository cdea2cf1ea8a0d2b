//! Historical (non-realtime) signal evaluation over a batch of observations.

use crate::indicators::{IndicatorEngine, IndicatorError, IndicatorFrame, IndicatorParams};
use crate::models::{IndicatorSnapshot, Observation, Signal};
use crate::signals::generator::SignalGenerator;

/// Points required before indicators are computed at all.
pub const MIN_OBSERVATIONS: usize = 14;

/// Result of evaluating a batch: every series, the latest snapshot, and the
/// signals it produced.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub frame: IndicatorFrame,
    pub snapshot: IndicatorSnapshot,
    pub signals: Vec<Signal>,
}

pub struct SignalEngine {
    indicators: IndicatorEngine,
    generator: SignalGenerator,
}

impl SignalEngine {
    pub fn new(params: IndicatorParams, generator: SignalGenerator) -> Self {
        Self {
            indicators: IndicatorEngine::new(params),
            generator,
        }
    }

    /// Evaluate a batch of observations; `Ok(None)` below [`MIN_OBSERVATIONS`].
    pub fn evaluate(&self, observations: &[Observation]) -> Result<Option<Evaluation>, IndicatorError> {
        if observations.len() < MIN_OBSERVATIONS {
            return Ok(None);
        }
        let frame = self.indicators.compute(observations)?;
        let Some(snapshot) = frame.latest() else {
            return Ok(None);
        };
        let signals = self.generator.generate(&snapshot);
        Ok(Some(Evaluation {
            frame,
            snapshot,
            signals,
        }))
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new(IndicatorParams::default(), SignalGenerator::new())
    }
}
