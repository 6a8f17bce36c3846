//! Elite Agent Behavior Library
//!
//! Decide-once elite patterns and behavior dispositions for simulated
//! agents. Decisions live in each agent's persisted [`Profile`]; the
//! behaviors themselves run as ECS-driven goals on a bevy world.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod assignment;
pub mod behaviors;
pub mod components;
pub mod config;
pub mod error;
pub mod persistence;
pub mod services;
pub mod sim;
pub mod systems;

pub use components::*;
pub use config::{ConfigError, EliteConfig};
pub use error::EngineError;
pub use sim::EliteSim;

pub use elite_save::{PatternKey, Profile, SaveFile};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
