//! Behavior context.
//!
//! The world services a behavior may use, bound to the agent being ticked.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::components::{
    AgentId, AgentProfile, AgentRng, Body, Navigator, WorldClock,
};
use crate::services::spatial;
use crate::systems::deferred::{DeferredActions, Flush};
use crate::SimRng;

/// Agent scans left this tick, shared by every behavior.
///
/// The goal runner creates one per tick; a behavior that finds it empty
/// skips its scan instead of queueing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanBudget {
    remaining: u32,
}

impl ScanBudget {
    pub fn new(limit: u32) -> Self {
        Self { remaining: limit }
    }

    /// Spends one scan if any are left.
    pub fn try_spend(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

/// Exclusive world access for one agent's behaviors.
pub struct BehaviorCtx<'a> {
    pub world: &'a mut World,
    pub entity: Entity,
    budget: &'a mut ScanBudget,
}

impl<'a> BehaviorCtx<'a> {
    pub fn new(world: &'a mut World, entity: Entity, budget: &'a mut ScanBudget) -> Self {
        Self {
            world,
            entity,
            budget,
        }
    }

    pub fn tick(&self) -> u64 {
        self.world
            .get_resource::<WorldClock>()
            .map(|clock| clock.tick)
            .unwrap_or(0)
    }

    pub fn try_scan(&mut self) -> bool {
        self.budget.try_spend()
    }

    pub fn agent_id(&self) -> Option<Uuid> {
        self.world.get::<AgentId>(self.entity).map(|id| id.0)
    }

    pub fn body(&self) -> Option<&Body> {
        self.world.get::<Body>(self.entity)
    }

    pub fn body_mut(&mut self) -> Option<Mut<'_, Body>> {
        self.world.get_mut::<Body>(self.entity)
    }

    pub fn position(&self) -> Option<Vec3> {
        spatial::position(self.world, self.entity)
    }

    pub fn body_of(&self, other: Entity) -> Option<&Body> {
        self.world.get::<Body>(other)
    }

    pub fn position_of(&self, other: Entity) -> Option<Vec3> {
        spatial::position(self.world, other)
    }

    pub fn distance_sq_to(&self, other: Entity) -> Option<f32> {
        spatial::distance_sq(self.world, self.entity, other)
    }

    pub fn is_alive(&self, other: Entity) -> bool {
        spatial::is_alive(self.world, other)
    }

    /// The agent's target, if it is still alive.
    pub fn target(&self) -> Option<Entity> {
        spatial::live_target(self.world, self.entity)
    }

    pub fn can_see(&self, other: Entity) -> bool {
        spatial::can_see(self.world, self.entity, other)
    }

    pub fn is_player(&self, other: Entity) -> bool {
        spatial::is_player(self.world, other)
    }

    /// Runs `f` with the agent's own random stream.
    pub fn with_rng<T>(&mut self, f: impl FnOnce(&mut SmallRng) -> T) -> T {
        if let Some(mut rng) = self.world.get_mut::<AgentRng>(self.entity) {
            return f(&mut rng.0);
        }
        if let Some(mut rng) = self.world.get_resource_mut::<SimRng>() {
            return f(&mut rng.0);
        }
        f(&mut SmallRng::seed_from_u64(self.entity.to_bits()))
    }

    pub fn navigate_to_entity(&mut self, other: Entity, speed_multiplier: f32) {
        if let Some(mut navigator) = self.world.get_mut::<Navigator>(self.entity) {
            navigator.move_to_entity(other, speed_multiplier);
        }
    }

    pub fn navigate_to_point(&mut self, point: Vec3, speed_multiplier: f32) {
        if let Some(mut navigator) = self.world.get_mut::<Navigator>(self.entity) {
            navigator.move_to_point(point, speed_multiplier);
        }
    }

    pub fn stop_navigation(&mut self) {
        if let Some(mut navigator) = self.world.get_mut::<Navigator>(self.entity) {
            navigator.stop();
        }
    }

    pub fn is_navigating(&self) -> bool {
        self.world
            .get::<Navigator>(self.entity)
            .is_some_and(|navigator| navigator.is_in_progress())
    }

    pub fn look_at(&mut self, point: Vec3) {
        if let Some(mut body) = self.body_mut() {
            body.look_at(point);
        }
    }

    /// Faces another agent's center.
    pub fn look_at_entity(&mut self, other: Entity) {
        if let Some(center) = self.body_of(other).map(|body| body.center()) {
            self.look_at(center);
        }
    }

    pub fn profile_mut(&mut self) -> Option<Mut<'_, AgentProfile>> {
        self.world.get_mut::<AgentProfile>(self.entity)
    }

    /// Queues a world mutation for the end of the tick.
    pub fn defer(
        &mut self,
        label: &'static str,
        action: impl FnMut(&mut World) -> Flush + Send + Sync + 'static,
    ) {
        self.world
            .get_resource_or_insert_with(DeferredActions::new)
            .push(label, action);
    }
}
