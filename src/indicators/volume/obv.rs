//! OBV (On-Balance Volume) indicator

use crate::models::Observation;

/// Calculate OBV
///
/// Running sum of volume, added on an up close and subtracted on a down
/// close; an unchanged close contributes nothing. Starts at 0.
pub fn calculate_obv(observations: &[Observation]) -> Vec<f64> {
    let mut out = Vec::with_capacity(observations.len());
    let mut running = 0.0;
    for (i, obs) in observations.iter().enumerate() {
        if i > 0 {
            let prev = observations[i - 1].close;
            if obs.close > prev {
                running += obs.volume;
            } else if obs.close < prev {
                running -= obs.volume;
            }
        }
        out.push(running);
    }
    out
}
