//! Pattern Keys
//!
//! Stable identifiers for every elite behavior pattern and the typed
//! sub-state a pattern may persist alongside its grant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::spawner::SpawnerState;

/// Stable key of an elite behavior pattern.
///
/// The serialized form is the snake_case name; it must never change once
/// saves exist in the wild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKey {
    Charge,
    Jump,
    Leap,
    Sprint,
    Barrage,
    Shaman,
    Thief,
    ThrowAlly,
    ThrowEnemy,
    Spawner,
}

impl PatternKey {
    /// Every key, in catalog declaration order.
    pub const ALL: [PatternKey; 10] = [
        PatternKey::Charge,
        PatternKey::Jump,
        PatternKey::Leap,
        PatternKey::Sprint,
        PatternKey::Barrage,
        PatternKey::Shaman,
        PatternKey::Thief,
        PatternKey::ThrowAlly,
        PatternKey::ThrowEnemy,
        PatternKey::Spawner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKey::Charge => "charge",
            PatternKey::Jump => "jump",
            PatternKey::Leap => "leap",
            PatternKey::Sprint => "sprint",
            PatternKey::Barrage => "barrage",
            PatternKey::Shaman => "shaman",
            PatternKey::Thief => "thief",
            PatternKey::ThrowAlly => "throw_ally",
            PatternKey::ThrowEnemy => "throw_enemy",
            PatternKey::Spawner => "spawner",
        }
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pattern key: {0}")]
pub struct ParsePatternKeyError(pub String);

impl FromStr for PatternKey {
    type Err = ParsePatternKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ParsePatternKeyError(s.to_string()))
    }
}

/// Extra state a granted pattern keeps across reloads.
///
/// Only patterns with a sub-simulation carry data; everything else is
/// fully described by the grant itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternData {
    Spawner(SpawnerState),
}

impl PatternData {
    /// The pattern this data belongs to.
    pub fn key(&self) -> PatternKey {
        match self {
            PatternData::Spawner(_) => PatternKey::Spawner,
        }
    }
}
