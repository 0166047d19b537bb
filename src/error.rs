//! Error type for chart composition.

use thiserror::Error;

/// Errors raised while turning input data into a draw plan.
///
/// Degenerate data (an all-zero ring, say) is not an error; only caller
/// mistakes and unusable input end up here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChartError {
    /// Tabular input was given without the column designations this chart needs.
    #[error("{chart} chart on tabular input requires column(s): {}", missing.join(", "))]
    MissingColumns {
        chart: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("no data to plot: {0}")]
    EmptyData(&'static str),

    /// Input shape this chart kind cannot consume.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;
