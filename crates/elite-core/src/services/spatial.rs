//! Spatial Queries
//!
//! Lookups over agent bodies. Results are sorted by entity so repeated
//! runs visit agents in the same order.

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::components::{Aabb, Agent, Body, Health, Player, Species, Target};
use crate::services::terrain::Terrain;

/// True when the entity exists and has health left.
pub fn is_alive(world: &World, entity: Entity) -> bool {
    world
        .get::<Health>(entity)
        .is_some_and(|health| health.is_alive())
}

pub fn position(world: &World, entity: Entity) -> Option<Vec3> {
    world.get::<Body>(entity).map(|body| body.pos)
}

pub fn distance_sq(world: &World, a: Entity, b: Entity) -> Option<f32> {
    Some(position(world, a)?.distance_squared(position(world, b)?))
}

/// The live target of an agent, if any.
pub fn live_target(world: &World, entity: Entity) -> Option<Entity> {
    let target = world.get::<Target>(entity)?.0?;
    is_alive(world, target).then_some(target)
}

pub fn is_player(world: &World, entity: Entity) -> bool {
    world.get::<Player>(entity).is_some()
}

/// Living agents whose feet are within `radius` of `center`.
pub fn agents_within(world: &mut World, center: Vec3, radius: f32) -> Vec<Entity> {
    let radius_sq = radius * radius;
    let mut query = world.query_filtered::<(Entity, &Body, &Health), With<Agent>>();
    let mut found: Vec<Entity> = query
        .iter(world)
        .filter(|(_, body, health)| {
            health.is_alive() && body.pos.distance_squared(center) <= radius_sq
        })
        .map(|(entity, _, _)| entity)
        .collect();
    found.sort();
    found
}

/// Closest living player within `radius`.
pub fn nearest_player(world: &mut World, center: Vec3, radius: f32) -> Option<Entity> {
    let radius_sq = radius * radius;
    let mut query = world.query_filtered::<(Entity, &Body, &Health), With<Player>>();
    query
        .iter(world)
        .filter(|(_, _, health)| health.is_alive())
        .map(|(entity, body, _)| (entity, body.pos.distance_squared(center)))
        .filter(|(_, dist_sq)| *dist_sq <= radius_sq)
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(entity, _)| entity)
}

/// Living agents of one species inside the cube of half-size `radius`.
pub fn count_species_within(world: &mut World, center: Vec3, radius: f32, species: &str) -> usize {
    let area = Aabb::new(center - Vec3::splat(radius), center + Vec3::splat(radius));
    let mut query = world.query::<(&Body, &Health, &Species)>();
    query
        .iter(world)
        .filter(|(body, health, kind)| {
            health.is_alive() && kind.is(species) && area.contains(body.pos)
        })
        .count()
}

/// Eye-to-eye line of sight. Worlds without terrain see everything.
pub fn can_see(world: &World, from: Entity, to: Entity) -> bool {
    let (Some(a), Some(b)) = (world.get::<Body>(from), world.get::<Body>(to)) else {
        return false;
    };
    match world.get_resource::<Terrain>() {
        Some(terrain) => terrain.line_of_sight(a.eye_pos(), b.eye_pos()),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Agent, Health, Player, Species};

    fn spawn(world: &mut World, species: &str, pos: Vec3, health: f32) -> Entity {
        world
            .spawn((
                Agent,
                Species::new(species),
                Body::new(pos, 0.6, 1.8),
                Health::new(health),
            ))
            .id()
    }

    #[test]
    fn test_agents_within_skips_dead_and_distant() {
        let mut world = World::new();
        let near = spawn(&mut world, "zombie", Vec3::new(1.0, 0.0, 0.0), 20.0);
        spawn(&mut world, "zombie", Vec3::new(2.0, 0.0, 0.0), 0.0);
        spawn(&mut world, "zombie", Vec3::new(9.0, 0.0, 0.0), 20.0);

        assert_eq!(agents_within(&mut world, Vec3::ZERO, 5.0), vec![near]);
    }

    #[test]
    fn test_nearest_player() {
        let mut world = World::new();
        let far = spawn(&mut world, "player", Vec3::new(6.0, 0.0, 0.0), 20.0);
        world.entity_mut(far).insert(Player);
        let close = spawn(&mut world, "player", Vec3::new(3.0, 0.0, 0.0), 20.0);
        world.entity_mut(close).insert(Player);
        spawn(&mut world, "zombie", Vec3::new(1.0, 0.0, 0.0), 20.0);

        assert_eq!(nearest_player(&mut world, Vec3::ZERO, 10.0), Some(close));
        assert_eq!(nearest_player(&mut world, Vec3::ZERO, 2.0), None);
    }

    #[test]
    fn test_count_species_within_box() {
        let mut world = World::new();
        spawn(&mut world, "zombie", Vec3::new(3.0, 0.0, 3.0), 20.0);
        spawn(&mut world, "zombie", Vec3::new(-3.0, 1.0, 0.0), 20.0);
        spawn(&mut world, "skeleton", Vec3::new(0.0, 0.0, 1.0), 20.0);
        spawn(&mut world, "zombie", Vec3::new(8.0, 0.0, 0.0), 20.0);

        assert_eq!(count_species_within(&mut world, Vec3::ZERO, 4.0, "zombie"), 2);
    }
}
