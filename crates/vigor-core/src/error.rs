//! Error types for Vigor Core

use chrono::NaiveDate;
use thiserror::Error;

/// Boundary errors for malformed input.
///
/// Too little data is never an error: the statistics return `None` or an
/// empty collection for that and callers render "not enough data yet".
#[derive(Error, Debug, PartialEq)]
pub enum VigorError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Duplicate date in series: {0}")]
    DuplicateDate(NaiveDate),

    #[error("Series length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Unknown signal: {0}")]
    UnknownSignal(String),

    #[error("Unknown habit: {0}")]
    UnknownHabit(i64),
}

pub type VigorResult<T> = Result<T, VigorError>;

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> VigorResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| VigorError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-09"),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
        );
        assert_eq!(
            parse_date("03/09/2024"),
            Err(VigorError::InvalidDate("03/09/2024".to_string()))
        );
    }
}
