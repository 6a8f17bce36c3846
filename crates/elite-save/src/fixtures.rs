//! Sample save data for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // elite-save = { path = "../elite-save", features = ["test-fixtures"] }
//!
//! use elite_save::fixtures;
//!
//! let save = fixtures::sample_save();
//! ```

use uuid::Uuid;

use crate::{AgentRecord, PatternKey, SaveFile};

/// Returns the sample save file.
///
/// Contains 3 agents at tick 240:
/// - a player
/// - a zombie granted `charge` (no pattern data), targeting the player
/// - a skeleton granted `spawner` with persisted cooldown 37
pub fn sample_save() -> SaveFile {
    let json = include_str!("../tests/fixtures/sample_save.json");
    SaveFile::from_json(json).expect("Failed to parse sample_save.json")
}

/// Returns the first sample agent granted the given pattern.
pub fn agent_with_pattern(key: PatternKey) -> Option<AgentRecord> {
    sample_save().agents.into_iter().find(|agent| {
        agent
            .profile
            .elite()
            .is_some_and(|elite| elite.is_granted(key))
    })
}

/// Identity of the sample player.
pub fn player_id() -> Uuid {
    sample_save()
        .agents
        .iter()
        .find(|agent| agent.player)
        .map(|agent| agent.id)
        .expect("sample save has a player")
}
