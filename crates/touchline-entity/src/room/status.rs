//! Room status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle phase of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    /// Lobby, waiting for the host to start.
    #[default]
    Waiting,
    /// A phase (such as an auction) is running.
    InProgress,
    /// Temporarily halted by the host.
    Paused,
    /// Play has ended.
    Finished,
    /// Abandoned by the host.
    Cancelled,
}

impl RoomStatus {
    /// Wire form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "WAITING",
            Self::InProgress => "IN_PROGRESS",
            Self::Paused => "PAUSED",
            Self::Finished => "FINISHED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RoomStatus {
    type Err = touchline_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "WAITING" => Ok(Self::Waiting),
            "IN_PROGRESS" | "INPROGRESS" => Ok(Self::InProgress),
            "PAUSED" => Ok(Self::Paused),
            "FINISHED" => Ok(Self::Finished),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(touchline_core::AppError::validation(format!(
                "Invalid room status: '{s}'. Expected one of: WAITING, IN_PROGRESS, PAUSED, FINISHED, CANCELLED"
            ))),
        }
    }
}
