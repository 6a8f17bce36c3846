//! Agent Spawning
//!
//! Builds agents from registered species descriptors. Only the species
//! listed in the configuration can be spawned.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use elite_save::{AttributeKind, Profile};

use crate::components::{
    Agent, AgentId, AgentProfile, AgentRng, Attributes, Body, Equipment, Health, Inventory,
    Navigator, PendingAttach, Player, Species, StatusEffects, Target,
};
use crate::config::{EliteConfig, SpeciesConfig};
use crate::error::EngineError;
use crate::SimRng;

/// Species key used for players
pub const PLAYER_SPECIES: &str = "player";

/// Looks up a registered species descriptor.
pub fn species_descriptor(world: &World, species: &str) -> Result<SpeciesConfig, EngineError> {
    world
        .get_resource::<EliteConfig>()
        .and_then(|config| config.species(species))
        .cloned()
        .ok_or_else(|| EngineError::UnknownSpecies(species.to_string()))
}

pub fn base_attributes(descriptor: &SpeciesConfig) -> Attributes {
    let mut attributes = Attributes::default()
        .with_base(AttributeKind::MaxHealth, descriptor.max_health)
        .with_base(AttributeKind::MovementSpeed, descriptor.movement_speed)
        .with_base(AttributeKind::KnockbackResistance, 0.0)
        .with_base(AttributeKind::FollowRange, 16.0);
    if let Some(damage) = descriptor.attack_damage {
        attributes = attributes.with_base(AttributeKind::AttackDamage, damage);
    }
    attributes
}

/// Draws a seed from the world stream so runs stay reproducible.
pub fn next_seed(world: &mut World) -> u64 {
    match world.get_resource_mut::<SimRng>() {
        Some(mut rng) => rng.0.gen(),
        None => rand::random(),
    }
}

pub fn next_agent_id(world: &mut World) -> AgentId {
    let mut rng = SmallRng::seed_from_u64(next_seed(world));
    AgentId(uuid::Builder::from_random_bytes(rng.gen()).into_uuid())
}

/// Spawns a fresh non-player agent. It owes one-time initialization and
/// waits for the attach pass.
pub fn spawn_agent(world: &mut World, species: &str, pos: Vec3) -> Result<Entity, EngineError> {
    let descriptor = species_descriptor(world, species)?;
    let id = next_agent_id(world);
    let mut profile = Profile::new();
    profile.mark_needs_init();
    Ok(spawn_with(world, &descriptor, id, pos, profile))
}

/// Spawns an agent from explicit parts, for loading saved agents.
pub fn spawn_with(
    world: &mut World,
    descriptor: &SpeciesConfig,
    id: AgentId,
    pos: Vec3,
    profile: Profile,
) -> Entity {
    let rng = AgentRng(SmallRng::seed_from_u64(next_seed(world)));
    world
        .spawn((
            Agent,
            id,
            Species::new(descriptor.key.clone()),
            Body::new(pos, descriptor.width, descriptor.height),
            Health::new(descriptor.max_health),
            base_attributes(descriptor),
            Equipment::default(),
            Navigator::default(),
            Target::default(),
            StatusEffects::default(),
            AgentProfile(profile),
            rng,
            PendingAttach,
        ))
        .id()
}

/// Spawns a player. Players carry an inventory and never attach a profile.
pub fn spawn_player(world: &mut World, pos: Vec3) -> Entity {
    let descriptor = species_descriptor(world, PLAYER_SPECIES).unwrap_or_else(|_| SpeciesConfig {
        key: PLAYER_SPECIES.to_string(),
        width: 0.6,
        height: 1.8,
        max_health: 20.0,
        attack_damage: Some(1.0),
        movement_speed: 0.1,
        hostile: false,
    });
    let id = next_agent_id(world);
    spawn_player_with(world, &descriptor, id, pos)
}

pub fn spawn_player_with(
    world: &mut World,
    descriptor: &SpeciesConfig,
    id: AgentId,
    pos: Vec3,
) -> Entity {
    world
        .spawn((
            Agent,
            Player,
            id,
            Species::new(descriptor.key.clone()),
            Body::new(pos, descriptor.width, descriptor.height),
            Health::new(descriptor.max_health),
            base_attributes(descriptor),
            Equipment::default(),
            Inventory::new(),
            StatusEffects::default(),
        ))
        .id()
}

/// Finds the live entity carrying a saved identity.
pub fn find_by_id(world: &mut World, id: Uuid) -> Option<Entity> {
    let mut query = world.query::<(Entity, &AgentId)>();
    query
        .iter(world)
        .find(|(_, agent_id)| agent_id.0 == id)
        .map(|(entity, _)| entity)
}
