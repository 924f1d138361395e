//! Error type shared by every analyzer, the loader and the output writers.

use thiserror::Error;

use crate::analyzers::types::NodeId;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// A required column is missing, a value is not a usable number, or a
    /// row cannot be placed in any category or time band.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The reference identifier does not appear as an `id_start`.
    #[error("identifier {0} not found in table")]
    Lookup(NodeId),
    #[error("i/o error")]
    Io(#[from] std::io::Error),
    #[error("json serialization failed")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

impl AnalyticsError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        AnalyticsError::Validation(msg.into())
    }
}

impl From<csv::Error> for AnalyticsError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => AnalyticsError::Io(io),
                other => AnalyticsError::Validation(format!("{:?}", other)),
            }
        } else {
            AnalyticsError::Validation(err.to_string())
        }
    }
}
