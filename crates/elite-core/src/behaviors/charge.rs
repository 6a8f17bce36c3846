//! Charge
//!
//! Winds up facing the target, then rushes along a locked direction.
//! Hitting the target deals damage and knockback; hitting a wall hurts the
//! charger and stuns it.

use bevy_ecs::prelude::*;
use glam::Vec3;

use elite_save::{PatternData, PatternKey};

use super::{BehaviorCtx, ControlFlags, EliteBehavior, PRIORITY_ATTACK};
use crate::components::horizontal_direction;
use crate::config::{ChargeConfig, EliteConfig};
use crate::services::combat;

/// Yaw swing of the stun flail, in degrees
const FLAIL_SWING: f32 = 30.0;
/// Reach added around the charger when checking for impact
const IMPACT_MARGIN: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeState {
    Idle,
    ChargeUp,
    Charging,
    Stunned,
}

#[derive(Debug)]
pub struct ChargeBehavior {
    config: ChargeConfig,
    state: ChargeState,
    timer: u32,
    cooldown: u32,
    target: Option<Entity>,
    last_known: Vec3,
    direction: Vec3,
    saved_step_height: Option<f32>,
    flail: bool,
}

pub fn create(config: &EliteConfig, _data: Option<&PatternData>) -> Box<dyn EliteBehavior> {
    Box::new(ChargeBehavior::new(config.patterns.charge.clone()))
}

pub fn describe(config: &EliteConfig) -> String {
    let charge = &config.patterns.charge;
    format!(
        "charge: winds up for {} ticks, rushes {:.0}-{:.0} blocks for +{} damage",
        charge.charge_up_ticks, charge.min_range, charge.max_range, charge.damage
    )
}

impl ChargeBehavior {
    pub fn new(config: ChargeConfig) -> Self {
        Self {
            config,
            state: ChargeState::Idle,
            timer: 0,
            cooldown: 0,
            target: None,
            last_known: Vec3::ZERO,
            direction: Vec3::ZERO,
            saved_step_height: None,
            flail: false,
        }
    }

    pub fn state(&self) -> ChargeState {
        self.state
    }

    fn live_target(&self, ctx: &BehaviorCtx) -> Option<Entity> {
        self.target.filter(|target| ctx.is_alive(*target))
    }

    fn begin_charge(&mut self, ctx: &mut BehaviorCtx) {
        let Some(pos) = ctx.position() else {
            self.state = ChargeState::Idle;
            return;
        };
        self.direction = horizontal_direction(pos, self.last_known);
        if self.direction == Vec3::ZERO {
            self.state = ChargeState::Idle;
            return;
        }
        self.state = ChargeState::Charging;
        self.timer = self.config.charge_ticks;

        let min_step = self.config.step_height;
        if let Some(mut body) = ctx.body_mut() {
            body.sprinting = true;
            if body.step_height < min_step {
                self.saved_step_height = Some(body.step_height);
                body.step_height = min_step;
            }
        }
    }

    fn tick_charge_up(&mut self, ctx: &mut BehaviorCtx) {
        let Some(target) = self.live_target(ctx) else {
            self.state = ChargeState::Idle;
            return;
        };
        if let Some(pos) = ctx.position_of(target) {
            self.last_known = pos;
        }
        ctx.look_at_entity(target);
        if let Some(mut body) = ctx.body_mut() {
            body.vel.x = 0.0;
            body.vel.z = 0.0;
        }

        if self.timer == 0 {
            self.begin_charge(ctx);
        } else {
            self.timer -= 1;
        }
    }

    fn tick_charging(&mut self, ctx: &mut BehaviorCtx) {
        let in_liquid = ctx.body().map_or(true, |body| body.in_liquid);
        if in_liquid || self.timer == 0 {
            self.state = ChargeState::Idle;
            return;
        }
        self.timer -= 1;

        let entity = ctx.entity;
        let speed = self.config.speed;
        let direction = self.direction;

        let impact = self.live_target(ctx).filter(|target| {
            match (ctx.body(), ctx.body_of(*target)) {
                (Some(own), Some(other)) => {
                    own.bounds().inflate(IMPACT_MARGIN).intersects(&other.bounds())
                }
                _ => false,
            }
        });
        if let Some(target) = impact {
            let damage = combat::attack_damage(ctx.world, entity) + self.config.damage;
            combat::apply_damage(ctx.world, target, damage);
            combat::knockback(ctx.world, target, direction, self.config.knockback);
            if let Some(mut body) = ctx.body_mut() {
                body.vel.x = -direction.x * speed;
                body.vel.z = -direction.z * speed;
            }
            tracing::debug!(?entity, ?target, damage, "charge connected");
            self.state = ChargeState::Idle;
            return;
        }

        let blocked = ctx.body().is_some_and(|body| body.horizontal_collision);
        if blocked {
            combat::apply_damage(ctx.world, entity, self.config.self_damage);
            if let Some(mut body) = ctx.body_mut() {
                body.vel.x = -direction.x * speed * 0.5;
                body.vel.z = -direction.z * speed * 0.5;
                body.sprinting = false;
            }
            self.state = ChargeState::Stunned;
            self.timer = self.config.stun_ticks;
            return;
        }

        if let Some(mut body) = ctx.body_mut() {
            body.vel.x = direction.x * speed;
            body.vel.z = direction.z * speed;
        }
    }

    fn tick_stunned(&mut self, ctx: &mut BehaviorCtx) {
        let swing = if self.flail { FLAIL_SWING } else { -FLAIL_SWING };
        self.flail = !self.flail;
        if let Some(mut body) = ctx.body_mut() {
            body.yaw += swing;
        }
        if self.timer == 0 {
            self.state = ChargeState::Idle;
        } else {
            self.timer -= 1;
        }
    }
}

impl EliteBehavior for ChargeBehavior {
    fn key(&self) -> PatternKey {
        PatternKey::Charge
    }

    fn controls(&self) -> ControlFlags {
        ControlFlags::MOVE | ControlFlags::LOOK | ControlFlags::JUMP
    }

    fn priority(&self) -> i32 {
        PRIORITY_ATTACK
    }

    fn can_activate(&mut self, ctx: &mut BehaviorCtx) -> bool {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return false;
        }
        let Some(target) = ctx.target() else {
            return false;
        };
        let on_ground = ctx.body().is_some_and(|body| body.on_ground);
        let Some(dist_sq) = ctx.distance_sq_to(target) else {
            return false;
        };
        let min = self.config.min_range;
        let max = self.config.max_range;
        on_ground && dist_sq >= min * min && dist_sq <= max * max && ctx.can_see(target)
    }

    fn on_activate(&mut self, ctx: &mut BehaviorCtx) {
        ctx.stop_navigation();
        self.target = ctx.target();
        self.last_known = self
            .target
            .and_then(|target| ctx.position_of(target))
            .unwrap_or(Vec3::ZERO);
        self.state = ChargeState::ChargeUp;
        self.timer = self.config.charge_up_ticks;
        self.flail = false;
    }

    fn tick(&mut self, ctx: &mut BehaviorCtx) {
        match self.state {
            ChargeState::Idle => {}
            ChargeState::ChargeUp => self.tick_charge_up(ctx),
            ChargeState::Charging => self.tick_charging(ctx),
            ChargeState::Stunned => self.tick_stunned(ctx),
        }
    }

    fn can_continue(&mut self, ctx: &mut BehaviorCtx) -> bool {
        match self.state {
            ChargeState::Idle => false,
            ChargeState::ChargeUp => self.live_target(ctx).is_some(),
            ChargeState::Charging | ChargeState::Stunned => true,
        }
    }

    fn on_deactivate(&mut self, ctx: &mut BehaviorCtx) {
        let restore = self.saved_step_height.take();
        if let Some(mut body) = ctx.body_mut() {
            body.sprinting = false;
            if let Some(step_height) = restore {
                body.step_height = step_height;
            }
        }
        self.state = ChargeState::Idle;
        self.target = None;
        self.cooldown = self.config.cooldown;
    }

    fn is_interruptible(&self) -> bool {
        !matches!(self.state, ChargeState::Charging | ChargeState::Stunned)
    }
}
