//! Catalog item entities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A football player as served by the catalog.
///
/// Field names follow the catalog's JSON layout. Attributes the engine does
/// not interpret are preserved verbatim in [`Player::extra`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Player name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Age in years.
    #[serde(rename = "Age", default)]
    pub age: u32,
    /// Nationality.
    #[serde(rename = "Nationality", default)]
    pub nationality: String,
    /// Overall rating.
    #[serde(rename = "Overall", default)]
    pub overall: u32,
    /// Current club.
    #[serde(rename = "Club", default)]
    pub club: String,
    /// Market value.
    #[serde(rename = "Value", default)]
    pub value: u64,
    /// Playing position label (for example `"GK"` or `"ST"`).
    #[serde(rename = "Position", default)]
    pub position: String,
    /// Photo URL.
    #[serde(rename = "Photo", default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Flag URL.
    #[serde(rename = "Flag", default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    /// Club logo URL.
    #[serde(rename = "Club Logo", default, skip_serializing_if = "Option::is_none")]
    pub club_logo: Option<String>,
    /// Remaining catalog attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Player {
    /// Minimal player with the given name and position.
    pub fn new(name: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: 0,
            nationality: String::new(),
            overall: 0,
            club: String::new(),
            value: 0,
            position: position.into(),
            photo: None,
            flag: None,
            club_logo: None,
            extra: Map::new(),
        }
    }

    /// Whether this player plays `position` (case-insensitive).
    pub fn plays(&self, position: &str) -> bool {
        self.position.eq_ignore_ascii_case(position)
    }
}
