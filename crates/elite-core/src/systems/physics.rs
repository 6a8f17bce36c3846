//! Physics Systems
//!
//! A small stand-in for the host engine: straight-line navigation, body
//! integration against block terrain, riders, projectiles, effects and
//! loose items.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;

use elite_save::AttributeKind;

use crate::components::{
    horizontal_direction, Aabb, Attributes, Body, Dispositions, DroppedItem, EffectKind, Health,
    NavGoal, Navigator, Projectile, RidingOn, StatusEffects,
};
use crate::services::combat;
use crate::services::spatial::{is_alive, position};
use crate::services::terrain::Terrain;
use crate::SimRng;

pub const GRAVITY: f32 = 0.08;
const AIR_DRAG: f32 = 0.98;
const GROUND_FRICTION: f32 = 0.6;
const AIR_FRICTION: f32 = 0.91;
const AUTO_JUMP: f32 = 0.42;
/// Point goals closer than this count as reached
const ARRIVE_DISTANCE: f32 = 0.5;
const DEFAULT_SPEED: f32 = 0.2;
const PROJECTILE_GRAVITY: f32 = 0.05;
const PROJECTILE_DRAG: f32 = 0.99;
const PROJECTILE_KNOCKBACK: f32 = 0.3;

fn movement_speed(attributes: Option<&Attributes>, effects: Option<&StatusEffects>) -> f32 {
    let base = attributes
        .and_then(|a| a.value(AttributeKind::MovementSpeed).ok())
        .unwrap_or(DEFAULT_SPEED);
    let mut factor = 1.0;
    if let Some(effects) = effects {
        if let Some(speed) = effects.get(EffectKind::Speed) {
            factor += 0.2 * (speed.amplifier as f32 + 1.0);
        }
        if let Some(slow) = effects.get(EffectKind::Slowness) {
            factor -= 0.15 * (slow.amplifier as f32 + 1.0);
        }
    }
    base * factor.max(0.0)
}

/// Steers navigating agents toward their goal.
pub fn advance_navigation(world: &mut World) {
    let mut query = world.query_filtered::<(
        Entity,
        &Navigator,
        Option<&Attributes>,
        Option<&StatusEffects>,
    ), Without<RidingOn>>();
    let plans: Vec<(Entity, NavGoal, f32)> = query
        .iter(world)
        .filter_map(|(entity, navigator, attributes, effects)| {
            let speed = movement_speed(attributes, effects) * navigator.speed_multiplier();
            navigator.goal().map(|goal| (entity, goal, speed))
        })
        .collect();

    for (entity, goal, speed) in plans {
        let destination = match goal {
            NavGoal::Point(point) => Some(point),
            NavGoal::Entity(other) if is_alive(world, other) => position(world, other),
            NavGoal::Entity(_) => None,
        };
        let Some(mut entity_mut) = world.get_entity_mut(entity) else {
            continue;
        };
        let Some(destination) = destination else {
            if let Some(mut navigator) = entity_mut.get_mut::<Navigator>() {
                navigator.stop();
            }
            continue;
        };

        let mut arrived = false;
        if let Some(mut body) = entity_mut.get_mut::<Body>() {
            let offset = Vec3::new(destination.x - body.pos.x, 0.0, destination.z - body.pos.z);
            let distance = offset.length();
            if matches!(goal, NavGoal::Point(_)) && distance <= ARRIVE_DISTANCE {
                arrived = true;
            } else {
                let step = speed.min(distance);
                let dir = horizontal_direction(body.pos, destination);
                body.vel.x = dir.x * step;
                body.vel.z = dir.z * step;
                body.yaw = (-dir.x).atan2(dir.z).to_degrees();
                if body.horizontal_collision && body.on_ground {
                    body.vel.y = AUTO_JUMP;
                }
            }
        }
        if arrived {
            if let Some(mut navigator) = entity_mut.get_mut::<Navigator>() {
                navigator.stop();
            }
        }
    }
}

/// Moves bodies by their velocity, resolving collisions with terrain.
pub fn integrate_bodies(
    terrain: Option<Res<Terrain>>,
    mut bodies: Query<&mut Body, Without<RidingOn>>,
) {
    for mut body in bodies.iter_mut() {
        let Some(terrain) = terrain.as_deref() else {
            let vel = body.vel;
            body.pos += vel;
            continue;
        };

        body.horizontal_collision = false;
        let horizontal = Vec3::new(body.vel.x, 0.0, body.vel.z);
        if horizontal != Vec3::ZERO {
            let moved = body.pos + horizontal;
            let lifted = moved + Vec3::Y * body.step_height;
            if !terrain.collides(&Aabb::standing(moved, body.width, body.height)) {
                body.pos = moved;
            } else if body.on_ground
                && body.step_height > 0.0
                && !terrain.collides(&Aabb::standing(lifted, body.width, body.height))
            {
                body.pos = lifted;
            } else {
                body.horizontal_collision = true;
                body.vel.x = 0.0;
                body.vel.z = 0.0;
            }
        }

        body.vel.y -= GRAVITY;
        let moved = body.pos + Vec3::new(0.0, body.vel.y, 0.0);
        let blocked = terrain.collides(&Aabb::standing(moved, body.width, body.height));
        if blocked && body.vel.y < 0.0 {
            body.pos.y = moved.y.floor() + 1.0;
            body.vel.y = 0.0;
            body.on_ground = true;
        } else if blocked {
            body.vel.y = 0.0;
            body.on_ground = false;
        } else {
            body.pos = moved;
            body.on_ground = false;
        }

        let friction = if body.on_ground {
            GROUND_FRICTION
        } else {
            AIR_FRICTION
        };
        body.vel.x *= friction;
        body.vel.z *= friction;
        body.vel.y *= AIR_DRAG;
        body.in_liquid = terrain.is_liquid(body.pos.floor().as_ivec3());
    }
}

/// Keeps passengers seated on their vehicles; unseats riders of dead ones.
pub fn sync_riders(world: &mut World) {
    let mut query = world.query::<(Entity, &RidingOn)>();
    let riders: Vec<(Entity, Entity)> = query
        .iter(world)
        .map(|(entity, riding)| (entity, riding.0))
        .collect();

    for (rider, vehicle) in riders {
        let seat = is_alive(world, vehicle)
            .then(|| world.get::<Body>(vehicle))
            .flatten()
            .map(|body| (body.pos + Vec3::new(0.0, body.height, 0.0), body.vel));
        let Some(mut entity) = world.get_entity_mut(rider) else {
            continue;
        };
        match seat {
            Some((pos, vel)) => {
                if let Some(mut body) = entity.get_mut::<Body>() {
                    body.pos = pos;
                    body.vel = vel;
                    body.on_ground = false;
                }
            }
            None => {
                entity.remove::<RidingOn>();
            }
        }
    }
}

/// Flies projectiles, landing hits on the first agent in their path.
pub fn advance_projectiles(world: &mut World) {
    let mut query = world.query::<(Entity, &Projectile)>();
    let mut projectiles: Vec<(Entity, Projectile)> = query
        .iter(world)
        .map(|(entity, projectile)| (entity, projectile.clone()))
        .collect();
    projectiles.sort_by_key(|(entity, _)| *entity);

    let mut targets = world.query::<(Entity, &Body, &Health)>();
    for (entity, mut projectile) in projectiles {
        let steps = (projectile.vel.length() / 0.5).ceil().max(1.0) as i32;
        let step = projectile.vel / steps as f32;
        let mut outcome = None;

        'flight: for _ in 0..steps {
            projectile.pos += step;
            if let Some(terrain) = world.get_resource::<Terrain>() {
                if terrain.is_solid(projectile.pos.floor().as_ivec3()) {
                    outcome = Some(None);
                    break 'flight;
                }
            }
            let mut hits: Vec<Entity> = targets
                .iter(world)
                .filter(|(other, body, health)| {
                    *other != projectile.shooter
                        && health.is_alive()
                        && body.bounds().inflate(0.3).contains(projectile.pos)
                })
                .map(|(other, _, _)| other)
                .collect();
            hits.sort();
            for hit in hits {
                if dodges(world, hit) {
                    tracing::trace!(?hit, "projectile dodged");
                    continue;
                }
                outcome = Some(Some(hit));
                break 'flight;
            }
        }

        match outcome {
            Some(Some(hit)) => {
                combat::apply_damage(world, hit, projectile.damage);
                let push = Vec3::new(projectile.vel.x, 0.0, projectile.vel.z).normalize_or_zero();
                combat::knockback(world, hit, push, PROJECTILE_KNOCKBACK);
                world.despawn(entity);
            }
            Some(None) => {
                world.despawn(entity);
            }
            None => {
                projectile.vel.y -= PROJECTILE_GRAVITY;
                projectile.vel *= PROJECTILE_DRAG;
                projectile.ticks_left = projectile.ticks_left.saturating_sub(1);
                if projectile.ticks_left == 0 {
                    world.despawn(entity);
                } else if let Some(mut live) = world.get_mut::<Projectile>(entity) {
                    *live = projectile;
                }
            }
        }
    }
}

fn dodges(world: &mut World, agent: Entity) -> bool {
    let chance = world
        .get::<Dispositions>(agent)
        .map(|d| d.dodge_arrows)
        .unwrap_or(0.0);
    if chance <= 0.0 {
        return false;
    }
    match world.get_resource_mut::<SimRng>() {
        Some(mut rng) => rng.0.gen::<f32>() < chance,
        None => false,
    }
}

/// Counts effects down and applies per-tick effect outcomes.
pub fn tick_status_effects(
    mut query: Query<(&mut StatusEffects, &mut Health, Option<&Attributes>)>,
) {
    for (mut effects, mut health, attributes) in query.iter_mut() {
        if !health.is_alive() {
            continue;
        }
        let max = attributes
            .and_then(|a| a.value(AttributeKind::MaxHealth).ok())
            .unwrap_or(combat::DEFAULT_MAX_HEALTH);
        if let Some(regen) = effects.get(EffectKind::Regeneration) {
            let amount = 0.05 * (regen.amplifier as f32 + 1.0);
            health.current = (health.current + amount).min(max);
        }
        if let Some(poison) = effects.get(EffectKind::Poison) {
            let amount = 0.05 * (poison.amplifier as f32 + 1.0);
            health.current = (health.current - amount).max(1.0_f32.min(health.current));
        }
        effects.tick();
    }
}

pub fn tick_dropped_items(mut items: Query<&mut DroppedItem>) {
    for mut item in items.iter_mut() {
        item.pickup_delay = item.pickup_delay.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Agent, Health};
    use crate::services::terrain::BlockGrid;
    use glam::IVec3;

    fn world_with_floor() -> World {
        let mut world = World::new();
        world.insert_resource(Terrain::new(BlockGrid::flat(0)));
        world
    }

    fn run<M>(world: &mut World, systems: impl IntoSystemConfigs<M>) {
        let mut schedule = Schedule::default();
        schedule.add_systems(systems);
        schedule.run(world);
    }

    #[test]
    fn test_body_falls_and_lands() {
        let mut world = world_with_floor();
        let body = world.spawn(Body::new(Vec3::new(0.5, 2.0, 0.5), 0.6, 1.8)).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(integrate_bodies);
        for _ in 0..40 {
            schedule.run(&mut world);
        }

        let body = world.get::<Body>(body).unwrap();
        assert!(body.on_ground);
        assert_eq!(body.pos.y, 0.0);
    }

    #[test]
    fn test_wall_sets_horizontal_collision() {
        let mut world = World::new();
        world.insert_resource(Terrain::new(
            BlockGrid::flat(0).with_wall(IVec3::new(2, 0, -2), IVec3::new(2, 2, 2)),
        ));
        let mut body = Body::new(Vec3::new(1.3, 0.0, 0.5), 0.6, 1.8);
        body.on_ground = true;
        body.vel = Vec3::new(0.5, 0.0, 0.0);
        let entity = world.spawn(body).id();

        run(&mut world, integrate_bodies);

        let body = world.get::<Body>(entity).unwrap();
        assert!(body.horizontal_collision);
        assert_eq!(body.pos.x, 1.3);
    }

    #[test]
    fn test_navigation_reaches_point_and_stops() {
        let mut world = world_with_floor();
        let mut navigator = Navigator::default();
        navigator.move_to_point(Vec3::new(3.0, 0.0, 0.5), 1.0);
        let mut body = Body::new(Vec3::new(0.5, 0.0, 0.5), 0.6, 1.8);
        body.on_ground = true;
        let entity = world.spawn((body, navigator)).id();

        let mut schedule = Schedule::default();
        schedule.add_systems((advance_navigation, integrate_bodies).chain());
        for _ in 0..60 {
            schedule.run(&mut world);
        }

        assert!(!world.get::<Navigator>(entity).unwrap().is_in_progress());
        let x = world.get::<Body>(entity).unwrap().pos.x;
        assert!((x - 3.0).abs() <= ARRIVE_DISTANCE + 0.01);
    }

    #[test]
    fn test_projectile_hits_first_agent() {
        let mut world = World::new();
        let shooter = world
            .spawn((Agent, Body::new(Vec3::ZERO, 0.6, 1.8), Health::new(20.0)))
            .id();
        let victim = world
            .spawn((
                Agent,
                Body::new(Vec3::new(2.0, 0.0, 0.0), 0.6, 1.8),
                Health::new(20.0),
            ))
            .id();
        let arrow = combat::spawn_projectile(
            &mut world,
            shooter,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.5, 0.0, 0.0),
            4.0,
        );

        run(&mut world, advance_projectiles);
        run(&mut world, advance_projectiles);

        assert!(world.get_entity(arrow).is_none());
        assert_eq!(world.get::<Health>(victim).unwrap().current, 16.0);
        assert_eq!(world.get::<Health>(shooter).unwrap().current, 20.0);
    }
}
