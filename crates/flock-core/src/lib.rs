//! Deterministic broiler fleet engine: seeded telemetry synthesis, anomaly scanning,
//! weekly KPI roll-ups, and the causal advisory model behind the dashboard.

pub mod anomaly;
pub mod causal;
pub mod economy;
pub mod fleet;
pub mod insights;
pub mod registry;
pub mod rng;
pub mod telemetry;
pub mod weekly;

use contracts::{ParseFactorError, CYCLE_DAYS, CYCLE_WEEKS};
use thiserror::Error;

pub use fleet::{FleetState, FleetStore, HouseRecord};
pub use rng::{SeededStream, StreamSeed};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    UnknownFactor(#[from] ParseFactorError),
    #[error("week {0} is outside the 1..=6 growth cycle")]
    WeekOutOfRange(u32),
    #[error("day {0} is outside the 1..=42 growth cycle")]
    DayOutOfRange(u32),
}

pub type EngineResult<T> = Result<T, EngineError>;

pub(crate) fn ensure_week(week: u32) -> EngineResult<u32> {
    if (1..=CYCLE_WEEKS).contains(&week) {
        Ok(week)
    } else {
        Err(EngineError::WeekOutOfRange(week))
    }
}

pub(crate) fn ensure_day(day: u32) -> EngineResult<u32> {
    if (1..=CYCLE_DAYS).contains(&day) {
        Ok(day)
    } else {
        Err(EngineError::DayOutOfRange(day))
    }
}

/// Rounds half away from zero to `decimals` places, the precision the dashboard displays.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_and_day_guards_reject_out_of_cycle_values() {
        assert_eq!(ensure_week(3), Ok(3));
        assert_eq!(ensure_week(0), Err(EngineError::WeekOutOfRange(0)));
        assert_eq!(ensure_week(7), Err(EngineError::WeekOutOfRange(7)));
        assert_eq!(ensure_day(42), Ok(42));
        assert_eq!(ensure_day(43), Err(EngineError::DayOutOfRange(43)));
    }

    #[test]
    fn round_to_matches_display_precision() {
        assert_eq!(round_to(1.2345, 2), 1.23);
        assert_eq!(round_to(14.96, 1), 15.0);
        assert_eq!(round_to(-3.25, 1), -3.3);
        assert_eq!(round_to(1234.5, 0), 1235.0);
    }

    #[test]
    fn engine_error_messages_name_the_bad_argument() {
        let err = EngineError::from(ParseFactorError("heat".to_string()));
        assert!(err.to_string().contains("heat"));
        assert_eq!(
            EngineError::WeekOutOfRange(9).to_string(),
            "week 9 is outside the 1..=6 growth cycle"
        );
    }
}
