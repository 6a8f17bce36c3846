//! World Persistence
//!
//! Converts between the live world and a [`SaveFile`]. Behaviors are not
//! saved as objects: their persistent sub-state is folded into each
//! agent's profile first, and loading rebuilds them from that profile.

use bevy_ecs::prelude::*;
use glam::Vec3;
use std::collections::HashMap;
use uuid::Uuid;

use elite_save::{AgentRecord, BodyRecord, SaveFile};

use crate::behaviors::EliteGoals;
use crate::components::{
    AgentId, AgentProfile, Attributes, Body, Equipment, Health, Player, RidingOn, Species,
    Target, WorldClock,
};
use crate::config::SpeciesConfig;
use crate::services::spawning::{
    base_attributes, species_descriptor, spawn_player_with, spawn_with,
};

/// Copies every running and idle behavior's persistent state into its
/// agent's profile.
pub fn sync_pattern_data(world: &mut World) {
    let mut query = world.query::<(&EliteGoals, &mut AgentProfile)>();
    for (goals, mut profile) in query.iter_mut(world) {
        let data: Vec<_> = goals
            .slots()
            .iter()
            .filter_map(|slot| slot.behavior.save_data())
            .collect();
        if data.is_empty() {
            continue;
        }
        if let Some(elite) = profile.0.elite_mut() {
            for entry in data {
                elite.set_pattern_data(entry);
            }
        }
    }
}

/// Snapshots every agent. Records are ordered by identity so the same
/// world always produces the same file.
pub fn save_world(world: &mut World) -> SaveFile {
    sync_pattern_data(world);

    let mut ids = world.query::<(Entity, &AgentId)>();
    let identity: HashMap<Entity, Uuid> = ids
        .iter(world)
        .map(|(entity, id)| (entity, id.0))
        .collect();

    let mut query = world.query::<(
        &AgentId,
        &Species,
        Has<Player>,
        &Body,
        &Health,
        &Attributes,
        &Equipment,
        Option<&Target>,
        Option<&RidingOn>,
        Option<&AgentProfile>,
    )>();
    let mut agents: Vec<AgentRecord> = query
        .iter(world)
        .map(
            |(id, species, player, body, health, attributes, equipment, target, riding, profile)| {
                AgentRecord {
                    id: id.0,
                    species: species.0.clone(),
                    player,
                    body: BodyRecord {
                        position: body.pos.to_array(),
                        velocity: body.vel.to_array(),
                        yaw: body.yaw,
                    },
                    health: health.current,
                    base_attributes: attributes.base().clone(),
                    modifiers: attributes.modifiers().to_vec(),
                    equipment: equipment.slots().clone(),
                    target: target
                        .and_then(|target| target.0)
                        .and_then(|entity| identity.get(&entity).copied()),
                    riding: riding.and_then(|riding| identity.get(&riding.0).copied()),
                    profile: profile.map(|profile| profile.0.clone()).unwrap_or_default(),
                }
            },
        )
        .collect();
    agents.sort_by_key(|agent| agent.id);

    let tick = world
        .get_resource::<WorldClock>()
        .map_or(0, |clock| clock.tick);
    tracing::debug!(tick, agents = agents.len(), "world saved");
    SaveFile::new(tick, agents)
}

/// Restores the agents of a save file into the world.
///
/// Non-player agents come back waiting for the attach pass, which rebuilds
/// their behaviors from the saved profile. Returns the spawned entities in
/// file order.
pub fn load_world(world: &mut World, save: &SaveFile) -> Vec<Entity> {
    let mut spawned = Vec::with_capacity(save.agents.len());
    let mut by_id = HashMap::with_capacity(save.agents.len());

    for record in &save.agents {
        let descriptor = species_descriptor(world, &record.species).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "loading agent with default dimensions");
            SpeciesConfig {
                key: record.species.clone(),
                ..SpeciesConfig::default()
            }
        });
        let pos = Vec3::from_array(record.body.position);
        let id = AgentId(record.id);
        let entity = if record.player {
            spawn_player_with(world, &descriptor, id, pos)
        } else {
            spawn_with(world, &descriptor, id, pos, record.profile.clone())
        };

        let attributes = if record.base_attributes.is_empty() {
            let base = base_attributes(&descriptor);
            Attributes::new(base.base().clone(), record.modifiers.clone())
        } else {
            Attributes::new(record.base_attributes.clone(), record.modifiers.clone())
        };
        if let Some(mut agent) = world.get_entity_mut(entity) {
            if let Some(mut body) = agent.get_mut::<Body>() {
                body.vel = Vec3::from_array(record.body.velocity);
                body.yaw = record.body.yaw;
            }
            agent.insert((
                Health::new(record.health),
                attributes,
                Equipment::new(record.equipment.clone()),
            ));
        }
        by_id.insert(record.id, entity);
        spawned.push(entity);
    }

    for (record, entity) in save.agents.iter().zip(&spawned) {
        let target = record.target.and_then(|id| by_id.get(&id).copied());
        let riding = record.riding.and_then(|id| by_id.get(&id).copied());
        let Some(mut agent) = world.get_entity_mut(*entity) else {
            continue;
        };
        if target.is_some() && agent.contains::<Target>() {
            agent.insert(Target(target));
        }
        if let Some(vehicle) = riding {
            agent.insert(RidingOn(vehicle));
        }
    }

    if let Some(mut clock) = world.get_resource_mut::<WorldClock>() {
        clock.tick = save.tick;
    }
    tracing::debug!(tick = save.tick, agents = spawned.len(), "world loaded");
    spawned
}
