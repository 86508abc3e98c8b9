use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the data layer.
///
/// Load-time variants are fatal for the dataset they concern. `InvalidRange`,
/// `UnknownColumn` and `UnsupportedColumn` only reject the request that
/// produced them.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("data source {path} is unavailable: {reason}")]
    DataSourceUnavailable { path: PathBuf, reason: String },

    #[error("data source {path} is missing required columns: {}", missing.join(", "))]
    SchemaMismatch { path: PathBuf, missing: Vec<String> },

    #[error("invalid {option}: min {min} is greater than max {max}")]
    InvalidRange {
        option: &'static str,
        min: f64,
        max: f64,
    },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{column}' cannot be used as {role}")]
    UnsupportedColumn {
        column: &'static str,
        role: &'static str,
    },

    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),
}

impl DataError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DataError::DataSourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = DataError> = std::result::Result<T, E>;
