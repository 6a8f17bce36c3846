//! Elite Behaviors
//!
//! One state machine per granted pattern. Each instance runs under the
//! goal runner in [`selector`], which offers it activation, ticks it while
//! it runs and stops it when it can no longer continue.

use std::fmt;

use elite_save::{PatternData, PatternKey};

pub mod barrage;
pub mod carry;
pub mod charge;
pub mod context;
pub mod jump;
pub mod leap;
pub mod selector;
pub mod shaman;
pub mod spawner;
pub mod sprint;
pub mod thief;
pub mod throttle;
pub mod throw_ally;
pub mod throw_enemy;

pub use context::{BehaviorCtx, ScanBudget};
pub use selector::{run_elite_goals, EliteGoals, GoalSlot};
pub use throttle::PathingThrottle;

bitflags::bitflags! {
    /// Output channels a behavior claims while it runs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlFlags: u8 {
        const MOVE = 1;
        const LOOK = 1 << 1;
        const JUMP = 1 << 2;
    }
}

/// Priority for behaviors that override ordinary pursuit.
pub const PRIORITY_ATTACK: i32 = 3;
/// Priority for movement tricks layered on top of pursuit.
pub const PRIORITY_MANEUVER: i32 = 2;
/// Priority for background behaviors.
pub const PRIORITY_SUPPORT: i32 = 1;

/// A live per-agent pattern instance.
///
/// Implementations must undo every transient mutation in
/// [`on_deactivate`](EliteBehavior::on_deactivate); it is called before the
/// instance leaves the running set, including when the agent is removed.
pub trait EliteBehavior: fmt::Debug + Send + Sync {
    fn key(&self) -> PatternKey;

    fn controls(&self) -> ControlFlags;

    /// Higher values win conflicts over shared control flags.
    fn priority(&self) -> i32;

    /// Polled every tick while idle. Cooldowns count down here.
    fn can_activate(&mut self, ctx: &mut BehaviorCtx) -> bool;

    fn on_activate(&mut self, _ctx: &mut BehaviorCtx) {}

    fn tick(&mut self, ctx: &mut BehaviorCtx);

    fn can_continue(&mut self, ctx: &mut BehaviorCtx) -> bool;

    fn on_deactivate(&mut self, _ctx: &mut BehaviorCtx) {}

    /// False while mid-animation; higher-priority goals must wait.
    fn is_interruptible(&self) -> bool {
        true
    }

    /// State that must survive a reload.
    fn save_data(&self) -> Option<PatternData> {
        None
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Hand-built arenas for behavior unit tests.

    use bevy_ecs::prelude::*;
    use glam::Vec3;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::context::{BehaviorCtx, ScanBudget};
    use crate::components::{Body, Difficulty, PendingAttach, Target, WorldClock};
    use crate::config::EliteConfig;
    use crate::services::spawning::{spawn_agent, spawn_player};
    use crate::services::terrain::{BlockGrid, Terrain};
    use crate::systems::deferred::DeferredActions;
    use crate::SimRng;

    pub fn arena() -> World {
        arena_with(BlockGrid::flat(0))
    }

    pub fn arena_with(grid: BlockGrid) -> World {
        let mut world = World::new();
        world.insert_resource(EliteConfig::default());
        world.insert_resource(Terrain::new(grid));
        world.insert_resource(WorldClock { tick: 1 });
        world.insert_resource(Difficulty::Normal);
        world.insert_resource(SimRng(SmallRng::seed_from_u64(11)));
        world.insert_resource(DeferredActions::new());
        world
    }

    /// A grounded, already attached agent.
    pub fn mob(world: &mut World, species: &str, pos: Vec3) -> Entity {
        let entity = spawn_agent(world, species, pos).unwrap();
        let mut agent = world.entity_mut(entity);
        agent.remove::<PendingAttach>();
        agent.get_mut::<Body>().unwrap().on_ground = true;
        entity
    }

    pub fn player(world: &mut World, pos: Vec3) -> Entity {
        let entity = spawn_player(world, pos);
        world.get_mut::<Body>(entity).unwrap().on_ground = true;
        entity
    }

    pub fn aim(world: &mut World, agent: Entity, target: Entity) {
        world.get_mut::<Target>(agent).unwrap().0 = Some(target);
    }

    pub fn with_ctx<T>(
        world: &mut World,
        entity: Entity,
        f: impl FnOnce(&mut BehaviorCtx) -> T,
    ) -> T {
        let mut budget = ScanBudget::new(64);
        let mut ctx = BehaviorCtx::new(world, entity, &mut budget);
        f(&mut ctx)
    }
}
