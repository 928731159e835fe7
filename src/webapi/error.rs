// WebAPI error module

use thiserror::Error;

/// Vendor error code for a malformed parameter
pub const CODE_INVALID_PARAMETER: u16 = 101;
/// Vendor error code for a task id that does not exist
pub const CODE_INVALID_TASK_ID: u16 = 404;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Required query parameter absent; answered with HTTP 400
    #[error("missing argument {0}")]
    MissingArgument(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("no task at index {index} (have {len})")]
    InvalidTaskId { index: usize, len: usize },
}

impl ApiError {
    /// Vendor error code, `None` for errors reported at the HTTP level
    pub const fn code(&self) -> Option<u16> {
        match self {
            Self::MissingArgument(_) => None,
            Self::InvalidParameter { .. } => Some(CODE_INVALID_PARAMETER),
            Self::InvalidTaskId { .. } => Some(CODE_INVALID_TASK_ID),
        }
    }
}
