//! Throw Ally
//!
//! Picks up a nearby ally, carries it toward the target and hurls it once
//! a periodic throw check succeeds within throwing range.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use elite_save::{PatternData, PatternKey};

use super::carry::{defer_mount, throw_passenger, CarryState, Throw};
use super::{BehaviorCtx, ControlFlags, EliteBehavior, PathingThrottle, PRIORITY_MANEUVER};
use crate::components::RidingOn;
use crate::config::{EliteConfig, ThrowAllyConfig};
use crate::services::{mounts, spatial};

const REPATH_TICKS: u32 = 5;

#[derive(Debug)]
pub struct ThrowAllyBehavior {
    config: ThrowAllyConfig,
    state: CarryState,
    ally: Option<Entity>,
    target: Option<Entity>,
    cooldown: u32,
    carry_ticks: u32,
    check_timer: u32,
    throttle: PathingThrottle,
    throws: u32,
}

pub fn create(config: &EliteConfig, _data: Option<&PatternData>) -> Box<dyn EliteBehavior> {
    Box::new(ThrowAllyBehavior::new(config.patterns.throw_ally.clone()))
}

pub fn describe(config: &EliteConfig) -> String {
    let throw = &config.patterns.throw_ally;
    format!(
        "throw_ally: carries allies within {:.0} blocks and throws them at the target",
        throw.search_range
    )
}

impl ThrowAllyBehavior {
    pub fn new(config: ThrowAllyConfig) -> Self {
        Self {
            config,
            state: CarryState::Idle,
            ally: None,
            target: None,
            cooldown: 0,
            carry_ticks: 0,
            check_timer: 0,
            throttle: PathingThrottle::new(REPATH_TICKS),
            throws: 0,
        }
    }

    pub fn state(&self) -> CarryState {
        self.state
    }

    pub fn ally(&self) -> Option<Entity> {
        self.ally
    }

    pub fn throws(&self) -> u32 {
        self.throws
    }

    fn throw_settings(&self) -> Throw {
        Throw {
            speed: self.config.throw_speed,
            lift: self.config.throw_lift,
            carrier_velocity_fraction: self.config.carrier_velocity_fraction,
        }
    }

    /// A free, living, non-player agent other than this one and its target.
    fn find_ally(&self, ctx: &mut BehaviorCtx, target: Entity) -> Option<Entity> {
        if !ctx.try_scan() {
            return None;
        }
        let center = ctx.position()?;
        let me = ctx.entity;
        let mut candidates: Vec<Entity> =
            spatial::agents_within(ctx.world, center, self.config.search_range)
                .into_iter()
                .filter(|other| {
                    *other != me
                        && *other != target
                        && !ctx.is_player(*other)
                        && ctx.world.get::<RidingOn>(*other).is_none()
                })
                .collect();
        candidates.retain(|other| !mounts::has_passengers(ctx.world, *other));
        ctx.with_rng(|rng| candidates.shuffle(rng));
        candidates.first().copied()
    }

    fn grab(&mut self, ctx: &mut BehaviorCtx) {
        let Some(ally) = self.ally.filter(|ally| ctx.is_alive(*ally)) else {
            self.state = CarryState::Idle;
            return;
        };
        if mounts::is_riding(ctx.world, ally, ctx.entity) {
            self.state = CarryState::Carry;
            self.carry_ticks = 0;
            self.check_timer = self.config.throw_check_interval;
            self.throttle.reset();
            return;
        }
        let in_reach = ctx
            .distance_sq_to(ally)
            .is_some_and(|dist_sq| dist_sq <= self.config.reach.powi(2));
        if in_reach {
            ctx.stop_navigation();
            defer_mount(ctx, ally);
            return;
        }
        if let Some(goal) = ctx.position_of(ally) {
            if self.throttle.should_repath(goal) || !ctx.is_navigating() {
                ctx.navigate_to_entity(ally, 1.0);
            }
        }
    }

    fn carry(&mut self, ctx: &mut BehaviorCtx) {
        let Some(ally) = self
            .ally
            .filter(|ally| mounts::is_riding(ctx.world, *ally, ctx.entity))
        else {
            self.state = CarryState::Idle;
            return;
        };
        let Some(target) = self.target.filter(|target| ctx.is_alive(*target)) else {
            self.state = CarryState::Idle;
            return;
        };

        self.carry_ticks += 1;
        if self.carry_ticks >= self.config.max_carry_ticks {
            mounts::dismount(ctx.world, ally);
            self.state = CarryState::Idle;
            return;
        }

        ctx.look_at_entity(target);
        if let Some(goal) = ctx.position_of(target) {
            if self.throttle.should_repath(goal) || !ctx.is_navigating() {
                ctx.navigate_to_entity(target, 1.0);
            }
        }

        if self.check_timer > 0 {
            self.check_timer -= 1;
            return;
        }
        self.check_timer = self.config.throw_check_interval;
        let in_range = ctx
            .distance_sq_to(target)
            .is_some_and(|dist_sq| dist_sq <= self.config.throw_range.powi(2));
        let chance = self.config.throw_chance;
        if in_range && ctx.with_rng(|rng| rng.gen::<f32>() < chance) {
            if let Some(destination) = ctx.body_of(target).map(|body| body.center()) {
                throw_passenger(ctx, ally, destination, self.throw_settings());
                self.throws += 1;
            }
            self.state = CarryState::Idle;
        }
    }
}

impl EliteBehavior for ThrowAllyBehavior {
    fn key(&self) -> PatternKey {
        PatternKey::ThrowAlly
    }

    fn controls(&self) -> ControlFlags {
        ControlFlags::MOVE | ControlFlags::LOOK
    }

    fn priority(&self) -> i32 {
        PRIORITY_MANEUVER
    }

    fn can_activate(&mut self, ctx: &mut BehaviorCtx) -> bool {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return false;
        }
        if mounts::riding(ctx.world, ctx.entity).is_some() {
            return false;
        }
        let Some(target) = ctx.target() else {
            return false;
        };
        self.ally = self.find_ally(ctx, target);
        self.ally.is_some()
    }

    fn on_activate(&mut self, ctx: &mut BehaviorCtx) {
        self.target = ctx.target();
        self.state = CarryState::Grab;
        self.throttle.reset();
    }

    fn tick(&mut self, ctx: &mut BehaviorCtx) {
        match self.state {
            CarryState::Idle => {}
            CarryState::Grab => self.grab(ctx),
            CarryState::Carry => self.carry(ctx),
        }
    }

    fn can_continue(&mut self, ctx: &mut BehaviorCtx) -> bool {
        self.state != CarryState::Idle
            && self.target.is_some_and(|target| ctx.is_alive(target))
            && self.ally.is_some_and(|ally| ctx.is_alive(ally))
    }

    fn on_deactivate(&mut self, ctx: &mut BehaviorCtx) {
        mounts::dismount_all(ctx.world, ctx.entity);
        ctx.stop_navigation();
        self.cooldown = self.config.cooldown;
        self.state = CarryState::Idle;
        self.ally = None;
        self.target = None;
    }

    fn is_interruptible(&self) -> bool {
        self.state != CarryState::Carry
    }
}
