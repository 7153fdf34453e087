//! Convenience result type alias for Touchline.

use crate::error::AppError;

/// A specialized `Result` type for Touchline operations.
pub type AppResult<T> = Result<T, AppError>;
