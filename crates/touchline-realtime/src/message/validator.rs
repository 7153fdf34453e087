//! Frame-level checks applied before parsing.

use touchline_core::{AppError, AppResult};

/// Rejects empty frames and frames larger than `max_size` bytes.
pub fn validate_frame(raw: &str, max_size: usize) -> AppResult<()> {
    if raw.len() > max_size {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_size} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}
