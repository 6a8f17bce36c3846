//! Spawner
//!
//! Periodic waves of reinforcements while a target is near. The wave
//! settings live in a [`SpawnerState`] that is written back into the
//! agent's profile on every deactivation and every 10 to 30 ticks while
//! running. A saved state takes precedence over configuration, so editing
//! the config does not reach spawners that already exist.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;

use elite_save::{EliteRecord, PatternData, PatternKey, SpawnerState};

use super::{BehaviorCtx, ControlFlags, EliteBehavior, PRIORITY_SUPPORT};
use crate::components::{AgentProfile, Aabb, Target};
use crate::config::{EliteConfig, SpawnerConfig};
use crate::services::terrain::Terrain;
use crate::services::{spatial, spawning};

/// Ticks between saves while running, re-rolled after each save
const SAVE_INTERVAL: std::ops::RangeInclusive<u32> = 10..=30;

/// Fresh state for a newly granted spawner.
pub fn initial_state(config: &SpawnerConfig) -> SpawnerState {
    SpawnerState {
        cooldown: config.min_cooldown,
        min_cooldown: config.min_cooldown,
        max_cooldown: config.max_cooldown,
        spawn_count: config.spawn_count,
        spawn_range: config.spawn_range,
        max_nearby: config.max_nearby,
        activation_range: config.activation_range,
        placement_attempts: config.placement_attempts,
        pool: config.pool.clone(),
        next: None,
    }
}

#[derive(Debug)]
pub struct SpawnerBehavior {
    state: SpawnerState,
    save_timer: u32,
    spawned: u32,
}

pub fn create(config: &EliteConfig, data: Option<&PatternData>) -> Box<dyn EliteBehavior> {
    let state = match data {
        Some(PatternData::Spawner(saved)) => saved.clone(),
        None => initial_state(&config.patterns.spawner),
    };
    Box::new(SpawnerBehavior::new(state))
}

pub fn describe(config: &EliteConfig) -> String {
    let spawner = &config.patterns.spawner;
    let pool: Vec<&str> = spawner
        .pool
        .iter()
        .map(|entry| entry.species.as_str())
        .collect();
    format!(
        "spawner: up to {} of [{}] every {}-{} ticks",
        spawner.spawn_count,
        pool.join(", "),
        spawner.min_cooldown,
        spawner.max_cooldown
    )
}

impl SpawnerBehavior {
    pub fn new(state: SpawnerState) -> Self {
        Self {
            state,
            save_timer: *SAVE_INTERVAL.start(),
            spawned: 0,
        }
    }

    pub fn state(&self) -> &SpawnerState {
        &self.state
    }

    /// Agents placed over this instance's lifetime.
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    fn target_in_range(&self, ctx: &BehaviorCtx) -> Option<Entity> {
        let target = ctx.target()?;
        let range = self.state.activation_range;
        ctx.distance_sq_to(target)
            .is_some_and(|dist_sq| dist_sq <= range * range)
            .then_some(target)
    }

    fn roll_descriptor(&self, ctx: &mut BehaviorCtx) -> Option<String> {
        let total = self.state.total_weight();
        if total == 0 {
            return None;
        }
        let draw = ctx.with_rng(|rng| rng.gen_range(0..total));
        self.state.select(draw).map(|entry| entry.species.clone())
    }

    /// Writes the current state into the agent's profile.
    fn persist(&self, ctx: &mut BehaviorCtx) {
        let data = PatternData::Spawner(self.state.clone());
        if let Some(mut profile) = ctx.profile_mut() {
            if let Some(elite) = profile.0.elite_mut() {
                elite.set_pattern_data(data);
            }
        }
    }

    /// A random clear spot within spawn range, or `None` after the
    /// configured number of attempts.
    fn find_placement(
        &self,
        ctx: &mut BehaviorCtx,
        center: Vec3,
        width: f32,
        height: f32,
    ) -> Option<Vec3> {
        let range = self.state.spawn_range;
        for _ in 0..self.state.placement_attempts.max(1) {
            let (dx, dz) = ctx.with_rng(|rng| {
                (rng.gen_range(-range..=range), rng.gen_range(-range..=range))
            });
            let pos = Vec3::new(center.x + dx, center.y, center.z + dz);
            let bounds = Aabb::standing(pos, width, height);
            let blocked = ctx
                .world
                .get_resource::<Terrain>()
                .is_some_and(|terrain| terrain.collides(&bounds));
            if !blocked {
                return Some(pos);
            }
        }
        None
    }

    /// Places up to `spawn_count` agents. Unknown species are skipped; the
    /// wave ends early at the nearby cap or when no clear spot is found.
    fn spawn_wave(&mut self, ctx: &mut BehaviorCtx, target: Entity) -> u32 {
        let Some(center) = ctx.position() else {
            return 0;
        };
        let mut placed = 0;
        for _ in 0..self.state.spawn_count {
            let species = match self.state.next.take() {
                Some(species) => species,
                None => match self.roll_descriptor(ctx) {
                    Some(species) => species,
                    None => break,
                },
            };
            self.state.next = self.roll_descriptor(ctx);

            let descriptor = match spawning::species_descriptor(ctx.world, &species) {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    tracing::warn!(spawner = ?ctx.entity, error = %e, "skipping spawn pool entry");
                    continue;
                }
            };
            let nearby = spatial::count_species_within(
                ctx.world,
                center,
                self.state.spawn_range,
                &species,
            );
            if nearby >= self.state.max_nearby as usize {
                break;
            }
            let Some(pos) = self.find_placement(ctx, center, descriptor.width, descriptor.height)
            else {
                break;
            };
            match spawning::spawn_agent(ctx.world, &species, pos) {
                Ok(spawned) => {
                    mark_reinforcement(ctx.world, spawned, target);
                    placed += 1;
                }
                Err(e) => tracing::warn!(spawner = ?ctx.entity, error = %e, "spawn failed"),
            }
        }
        self.spawned += placed;
        tracing::debug!(spawner = ?ctx.entity, placed, "spawn wave");
        placed
    }
}

/// Points a fresh reinforcement at the spawner's target and decides its
/// elite grant as empty so it never rolls patterns of its own.
fn mark_reinforcement(world: &mut World, spawned: Entity, target: Entity) {
    if let Some(mut aim) = world.get_mut::<Target>(spawned) {
        aim.0 = Some(target);
    }
    if let Some(mut profile) = world.get_mut::<AgentProfile>(spawned) {
        if let Err(e) = profile.0.set_elite(EliteRecord::new()) {
            tracing::error!(?spawned, error = %e, "reinforcement already had an elite grant");
        }
    }
}

impl EliteBehavior for SpawnerBehavior {
    fn key(&self) -> PatternKey {
        PatternKey::Spawner
    }

    fn controls(&self) -> ControlFlags {
        ControlFlags::empty()
    }

    fn priority(&self) -> i32 {
        PRIORITY_SUPPORT
    }

    fn can_activate(&mut self, ctx: &mut BehaviorCtx) -> bool {
        self.target_in_range(ctx).is_some()
    }

    fn on_activate(&mut self, ctx: &mut BehaviorCtx) {
        self.save_timer = ctx.with_rng(|rng| rng.gen_range(SAVE_INTERVAL));
    }

    fn tick(&mut self, ctx: &mut BehaviorCtx) {
        let Some(target) = self.target_in_range(ctx) else {
            return;
        };

        if self.state.cooldown == 0 {
            self.spawn_wave(ctx, target);
            let (min, max) = (self.state.min_cooldown, self.state.max_cooldown);
            self.state.cooldown = ctx.with_rng(|rng| rng.gen_range(min..=max.max(min)));
        } else {
            self.state.cooldown -= 1;
        }

        if self.save_timer == 0 {
            self.persist(ctx);
            self.save_timer = ctx.with_rng(|rng| rng.gen_range(SAVE_INTERVAL));
        } else {
            self.save_timer -= 1;
        }
    }

    fn can_continue(&mut self, ctx: &mut BehaviorCtx) -> bool {
        self.target_in_range(ctx).is_some()
    }

    fn on_deactivate(&mut self, ctx: &mut BehaviorCtx) {
        self.persist(ctx);
    }

    fn save_data(&self) -> Option<PatternData> {
        Some(PatternData::Spawner(self.state.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::test_support::{aim, arena, arena_with, mob, player, with_ctx};
    use crate::components::{AgentProfile, PendingAttach, Species};
    use crate::services::terrain::BlockGrid;
    use elite_save::WeightedSpawn;
    use glam::IVec3;

    fn ready(pool: Vec<WeightedSpawn>) -> SpawnerState {
        SpawnerState {
            cooldown: 0,
            pool,
            ..initial_state(&SpawnerConfig::default())
        }
    }

    fn spawner_with_grant(world: &mut World, pos: Vec3) -> Entity {
        let spawner = mob(world, "skeleton", pos);
        world
            .get_mut::<AgentProfile>(spawner)
            .unwrap()
            .0
            .set_elite(EliteRecord::with_grants([PatternKey::Spawner]))
            .unwrap();
        spawner
    }

    fn count(world: &mut World, species: &str) -> usize {
        let mut query = world.query::<&Species>();
        query.iter(world).filter(|kind| kind.is(species)).count()
    }

    #[test]
    fn test_wave_spawns_reinforcements_sharing_target() {
        let mut world = arena();
        let target = player(&mut world, Vec3::new(8.5, 0.0, 0.5));
        let spawner = spawner_with_grant(&mut world, Vec3::new(0.5, 0.0, 0.5));
        aim(&mut world, spawner, target);

        let mut behavior = SpawnerBehavior::new(ready(vec![WeightedSpawn::new("zombie", 1)]));
        with_ctx(&mut world, spawner, |ctx| {
            assert!(behavior.can_activate(ctx));
            behavior.on_activate(ctx);
            behavior.tick(ctx);
        });

        assert_eq!(behavior.spawned(), 4);
        assert!((200..=400).contains(&behavior.state().cooldown));
        let mut query = world.query_filtered::<(&Target, &AgentProfile), With<PendingAttach>>();
        let reinforcements: Vec<_> = query.iter(&world).collect();
        assert_eq!(reinforcements.len(), 4);
        for (goal, profile) in reinforcements {
            assert_eq!(goal.0, Some(target));
            assert!(profile.0.elite().unwrap().is_empty());
        }
    }

    #[test]
    fn test_nearby_cap_blocks_wave() {
        let mut world = arena();
        let target = player(&mut world, Vec3::new(8.5, 0.0, 0.5));
        let spawner = spawner_with_grant(&mut world, Vec3::new(0.5, 0.0, 0.5));
        aim(&mut world, spawner, target);
        for i in 0..6 {
            mob(&mut world, "zombie", Vec3::new(1.5, 0.0, -2.5 + i as f32));
        }

        let mut behavior = SpawnerBehavior::new(ready(vec![WeightedSpawn::new("zombie", 1)]));
        with_ctx(&mut world, spawner, |ctx| {
            behavior.on_activate(ctx);
            behavior.tick(ctx);
        });

        assert_eq!(behavior.spawned(), 0);
        assert_eq!(count(&mut world, "zombie"), 6);
    }

    #[test]
    fn test_unknown_species_is_skipped() {
        let mut world = arena();
        let target = player(&mut world, Vec3::new(8.5, 0.0, 0.5));
        let spawner = spawner_with_grant(&mut world, Vec3::new(0.5, 0.0, 0.5));
        aim(&mut world, spawner, target);

        let mut behavior = SpawnerBehavior::new(ready(vec![WeightedSpawn::new("dragon", 1)]));
        with_ctx(&mut world, spawner, |ctx| {
            behavior.on_activate(ctx);
            behavior.tick(ctx);
        });
        assert_eq!(behavior.spawned(), 0);
    }

    #[test]
    fn test_enclosed_spawner_ends_wave_without_placement() {
        let grid = BlockGrid::flat(0).with_wall(IVec3::new(-6, 0, -6), IVec3::new(6, 3, 6));
        let mut world = arena_with(grid);
        let target = player(&mut world, Vec3::new(8.5, 0.0, 0.5));
        let spawner = spawner_with_grant(&mut world, Vec3::new(0.5, 0.0, 0.5));
        aim(&mut world, spawner, target);

        let mut behavior = SpawnerBehavior::new(ready(vec![WeightedSpawn::new("zombie", 1)]));
        with_ctx(&mut world, spawner, |ctx| behavior.tick(ctx));
        assert_eq!(behavior.spawned(), 0);
    }

    #[test]
    fn test_deactivate_persists_state_into_profile() {
        let mut world = arena();
        let spawner = spawner_with_grant(&mut world, Vec3::new(0.5, 0.0, 0.5));
        let mut state = ready(Vec::new());
        state.cooldown = 77;
        let mut behavior = SpawnerBehavior::new(state.clone());

        with_ctx(&mut world, spawner, |ctx| behavior.on_deactivate(ctx));

        let profile = &world.get::<AgentProfile>(spawner).unwrap().0;
        assert_eq!(
            profile.elite().unwrap().pattern_data(PatternKey::Spawner),
            Some(&PatternData::Spawner(state))
        );
    }

    #[test]
    fn test_saved_state_wins_over_config() {
        let config = EliteConfig::default();
        let mut saved = initial_state(&config.patterns.spawner);
        saved.spawn_count = 9;
        let behavior = create(&config, Some(&PatternData::Spawner(saved.clone())));
        assert_eq!(behavior.save_data(), Some(PatternData::Spawner(saved)));

        let fresh = create(&config, None);
        match fresh.save_data() {
            Some(PatternData::Spawner(state)) => assert_eq!(state.spawn_count, 4),
            other => panic!("unexpected data {:?}", other),
        }
    }

    #[test]
    fn test_running_spawner_saves_state_periodically() {
        let mut world = arena();
        let target = player(&mut world, Vec3::new(8.5, 0.0, 0.5));
        let spawner = spawner_with_grant(&mut world, Vec3::new(0.5, 0.0, 0.5));
        aim(&mut world, spawner, target);

        let mut state = ready(vec![WeightedSpawn::new("zombie", 1)]);
        state.cooldown = 300;
        let mut behavior = SpawnerBehavior::new(state);
        with_ctx(&mut world, spawner, |ctx| {
            behavior.on_activate(ctx);
            for _ in 0..31 {
                assert!(behavior.can_continue(ctx));
                behavior.tick(ctx);
            }
        });

        let profile = &world.get::<AgentProfile>(spawner).unwrap().0;
        match profile.elite().unwrap().pattern_data(PatternKey::Spawner) {
            Some(PatternData::Spawner(saved)) => {
                assert!((269..300).contains(&saved.cooldown));
                assert!(saved.cooldown >= behavior.state().cooldown);
            }
            other => panic!("state not saved while running: {:?}", other),
        }
    }
}
