//! Simulation Driver
//!
//! Owns the world and the per-tick schedule. One call to [`EliteSim::step`]
//! runs a full tick: attach, behaviors, host physics, removals, deferred
//! actions, clock.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use elite_save::SaveFile;

use crate::assignment::EliteCatalog;
use crate::behaviors::run_elite_goals;
use crate::components::{Difficulty, Target, WorldClock};
use crate::config::EliteConfig;
use crate::error::EngineError;
use crate::persistence::{load_world, save_world};
use crate::services::spawning;
use crate::services::terrain::{Terrain, TerrainQuery};
use crate::systems::{
    advance_clock, advance_navigation, advance_projectiles, attach_pending_agents,
    flush_deferred, integrate_bodies, remove_dead_agents, sync_riders, tick_dropped_items,
    tick_status_effects, DeferredActions,
};
use crate::SimRng;

pub struct EliteSim {
    world: World,
    schedule: Schedule,
}

impl EliteSim {
    pub fn new(config: EliteConfig, terrain: impl TerrainQuery + 'static, seed: u64) -> Self {
        let mut world = World::new();
        world.insert_resource(EliteCatalog::from_config(&config));
        world.insert_resource(config);
        world.insert_resource(Terrain::new(terrain));
        world.insert_resource(WorldClock::default());
        world.insert_resource(Difficulty::default());
        world.insert_resource(SimRng(SmallRng::seed_from_u64(seed)));
        world.insert_resource(DeferredActions::new());

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                attach_pending_agents,
                run_elite_goals,
                advance_navigation,
                integrate_bodies,
                sync_riders,
                advance_projectiles,
                tick_status_effects,
                tick_dropped_items,
                remove_dead_agents,
                flush_deferred,
                advance_clock,
            )
                .chain(),
        );

        Self { world, schedule }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn tick(&self) -> u64 {
        self.world.resource::<WorldClock>().tick
    }

    pub fn step(&mut self) {
        self.schedule.run(&mut self.world);
    }

    pub fn step_n(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Spawns a non-player agent; it attaches at the start of the next tick.
    pub fn spawn_agent(&mut self, species: &str, pos: Vec3) -> Result<Entity, EngineError> {
        spawning::spawn_agent(&mut self.world, species, pos)
    }

    pub fn spawn_player(&mut self, pos: Vec3) -> Entity {
        spawning::spawn_player(&mut self.world, pos)
    }

    pub fn set_target(&mut self, agent: Entity, target: Option<Entity>) -> Result<(), EngineError> {
        let mut slot = self
            .world
            .get_mut::<Target>(agent)
            .ok_or(EngineError::Despawned(agent))?;
        slot.0 = target;
        Ok(())
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.world.insert_resource(difficulty);
    }

    pub fn save(&mut self) -> SaveFile {
        save_world(&mut self.world)
    }

    /// Loads saved agents into this world. Existing agents are kept.
    pub fn load(&mut self, save: &SaveFile) -> Vec<Entity> {
        load_world(&mut self.world, save)
    }

    /// Swaps in a new configuration and rebuilds the weighted catalog.
    ///
    /// Decisions already stored in profiles are untouched; only agents
    /// deciding from now on see the new chances and weights.
    pub fn reload_config(&mut self, config: EliteConfig) {
        let catalog = EliteCatalog::from_config(&config);
        tracing::info!(total_weight = catalog.total_weight(), "configuration reloaded");
        self.world.insert_resource(catalog);
        self.world.insert_resource(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::EliteGoals;
    use crate::services::terrain::BlockGrid;
    use elite_save::PatternKey;

    fn sim() -> EliteSim {
        EliteSim::new(EliteConfig::default(), BlockGrid::flat(0), 42)
    }

    #[test]
    fn test_step_advances_clock() {
        let mut sim = sim();
        assert_eq!(sim.tick(), 0);
        sim.step_n(3);
        assert_eq!(sim.tick(), 3);
    }

    #[test]
    fn test_first_tick_agents_attach_after_start() {
        let mut sim = sim();
        let zombie = sim.spawn_agent("zombie", Vec3::ZERO).unwrap();
        sim.step();
        assert!(sim.world().get::<EliteGoals>(zombie).is_none());
        sim.step();
        assert!(sim.world().get::<EliteGoals>(zombie).is_some());

        let late = sim.spawn_agent("zombie", Vec3::X).unwrap();
        sim.step();
        assert!(sim.world().get::<EliteGoals>(late).is_some());
    }

    #[test]
    fn test_reload_rebuilds_catalog() {
        let mut sim = sim();
        let mut config = EliteConfig::default();
        config.patterns.charge.weight = 7;
        sim.reload_config(config);
        let catalog = sim.world().resource::<EliteCatalog>();
        assert_eq!(catalog.get(PatternKey::Charge).unwrap().weight, 7);
        assert_eq!(catalog.total_weight(), 16);
    }

    #[test]
    fn test_set_difficulty_replaces_resource() {
        let mut sim = sim();
        sim.set_difficulty(Difficulty::Hard);
        assert_eq!(*sim.world().resource::<Difficulty>(), Difficulty::Hard);
    }

    #[test]
    fn test_set_target_on_missing_entity_fails() {
        let mut sim = sim();
        let zombie = sim.spawn_agent("zombie", Vec3::ZERO).unwrap();
        sim.world_mut().despawn(zombie);
        assert_eq!(sim.set_target(zombie, None), Err(EngineError::Despawned(zombie)));
    }
}
