//! Spawner State
//!
//! The persisted half of the self-spawning pattern's periodic wave
//! sub-simulation. Unlike the rest of the profile this state is re-read
//! and re-written on every load: once attached, the saved values are
//! authoritative and configuration edits no longer reach the agent.

use serde::{Deserialize, Serialize};

/// One entry of the weighted pool of spawnable species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedSpawn {
    pub species: String,
    pub weight: u32,
}

impl WeightedSpawn {
    pub fn new(species: impl Into<String>, weight: u32) -> Self {
        Self {
            species: species.into(),
            weight,
        }
    }
}

/// Cooldown, wave shape and pool of a spawner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerState {
    /// Ticks left until the next wave
    pub cooldown: u32,
    pub min_cooldown: u32,
    pub max_cooldown: u32,
    /// Placements attempted per wave
    pub spawn_count: u32,
    /// Horizontal radius new agents are placed in
    pub spawn_range: f32,
    /// Wave aborts once this many same-species agents are within range
    pub max_nearby: u32,
    /// Cooldown only runs while the target is this close
    pub activation_range: f32,
    /// Position samples per placement before the wave gives up
    pub placement_attempts: u32,
    pub pool: Vec<WeightedSpawn>,
    /// Descriptor used for the next placement
    pub next: Option<String>,
}

impl SpawnerState {
    /// Sum of all non-negative pool weights.
    pub fn total_weight(&self) -> u32 {
        self.pool.iter().map(|entry| entry.weight).sum()
    }

    /// Picks a pool entry for a draw in `[0, total_weight)`.
    ///
    /// Walks the pool in order, subtracting each weight, and returns the
    /// first entry that takes the running value below zero.
    pub fn select(&self, draw: u32) -> Option<&WeightedSpawn> {
        let mut remaining = i64::from(draw);
        for entry in &self.pool {
            remaining -= i64::from(entry.weight);
            if remaining < 0 {
                return Some(entry);
            }
        }
        None
    }
}
