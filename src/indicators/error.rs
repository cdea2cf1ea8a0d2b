use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: {required} points required, {available} available")]
    InsufficientData { required: usize, available: usize },

    #[error("invalid period for {0}: {1}")]
    InvalidPeriod(&'static str, u32),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Reject zero periods up front; every rolling window needs at least one point.
pub(crate) fn ensure_period(name: &'static str, period: u32) -> Result<usize, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(name, period));
    }
    Ok(period as usize)
}
