//! The utilies module provides general capabilities, that may span the
//! input modeling, models, output analysis, and simulator modules.  The
//! utilities are centered around error reporting and the validation of
//! simulated time values.

pub mod errors;

use errors::SimulationError;

/// Delays are relative to the current simulation time, so they must be
/// finite and non-negative.  A zero delay is valid, and requests an
/// activation at the current time.
pub fn validate_delay(delay: f64) -> Result<f64, SimulationError> {
    if delay.is_finite() && delay >= 0.0 {
        Ok(delay)
    } else {
        Err(SimulationError::InvalidDelay { delay })
    }
}

/// Absolute activation times must be finite and must not precede the
/// current simulation time.
pub fn validate_time(time: f64, clock: f64) -> Result<f64, SimulationError> {
    if time.is_finite() && time >= clock {
        Ok(time)
    } else {
        Err(SimulationError::ScheduledInPast { time, clock })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_must_be_finite_and_non_negative() {
        assert_eq![validate_delay(0.0), Ok(0.0)];
        assert_eq![validate_delay(2.5), Ok(2.5)];
        assert![matches!(
            validate_delay(-1.0),
            Err(SimulationError::InvalidDelay { .. })
        )];
        assert![validate_delay(f64::NAN).is_err()];
        assert![validate_delay(f64::INFINITY).is_err()];
    }

    #[test]
    fn times_must_not_precede_the_clock() {
        assert_eq![validate_time(3.0, 3.0), Ok(3.0)];
        assert_eq![
            validate_time(2.0, 3.0),
            Err(SimulationError::ScheduledInPast {
                time: 2.0,
                clock: 3.0
            })
        ];
        assert![validate_time(f64::NAN, 0.0).is_err()];
    }
}
