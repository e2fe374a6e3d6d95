use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::Cadence;

/// Errors raised by the analysis pipeline itself (load -> smooth -> detect -> segment).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CycleError {
    /// A row's date or value could not be parsed under the strict policy.
    #[error("malformed input at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    /// Series is shorter than the cadence allows.
    #[error("insufficient data for {cadence} cadence: need at least {needed} points, got {got}")]
    InsufficientData {
        cadence: Cadence,
        needed: usize,
        got: usize,
    },

    /// Two rows share the same date.
    #[error("duplicate date {date} (rows {first_row} and {second_row})")]
    DuplicateKey {
        date: NaiveDate,
        first_row: usize,
        second_row: usize,
    },

    /// Percent change from a zero-valued turning point.
    #[error("percent change undefined: turning point at index {index} ({date}) has value 0")]
    UndefinedChange { index: usize, date: NaiveDate },

    /// A peak and a trough landed on the same index.
    #[error("peak and trough both detected at index {index}")]
    ExtremumCollision { index: usize },

    /// Smoothed values do not line up with the observations they came from.
    #[error("smoothed series has {smoothed} values for {series} observations")]
    LengthMismatch { series: usize, smoothed: usize },
}

impl CycleError {
    /// Pipeline stage that raised the error.
    pub fn stage(&self) -> &'static str {
        match self {
            CycleError::MalformedInput { .. } | CycleError::DuplicateKey { .. } => "load",
            CycleError::InsufficientData { .. } => "smooth",
            CycleError::LengthMismatch { .. } => "detect",
            CycleError::UndefinedChange { .. } | CycleError::ExtremumCollision { .. } => "segment",
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            CycleError::MalformedInput { .. } | CycleError::DuplicateKey { .. } => 2,
            CycleError::InsufficientData { .. } => 3,
            CycleError::LengthMismatch { .. }
            | CycleError::UndefinedChange { .. }
            | CycleError::ExtremumCollision { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<CycleError> for AppError {
    fn from(err: CycleError) -> Self {
        AppError::new(err.exit_code(), format!("{} stage failed: {err}", err.stage()))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_errors_name_their_stage() {
        let err = CycleError::MalformedInput {
            line: 7,
            message: "Invalid value '.'".to_string(),
        };
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 2);
        assert_eq!(
            app.to_string(),
            "load stage failed: malformed input at line 7: Invalid value '.'"
        );

        let err = CycleError::InsufficientData {
            cadence: Cadence::Monthly,
            needed: 12,
            got: 5,
        };
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 3);
        assert_eq!(
            app.to_string(),
            "smooth stage failed: insufficient data for monthly cadence: need at least 12 points, got 5"
        );
    }

    #[test]
    fn undefined_change_reports_index_and_date() {
        let err = CycleError::UndefinedChange {
            index: 3,
            date: NaiveDate::from_ymd_opt(2008, 1, 1).unwrap(),
        };
        assert_eq!(err.stage(), "segment");
        assert_eq!(
            err.to_string(),
            "percent change undefined: turning point at index 3 (2008-01-01) has value 0"
        );
    }
}
