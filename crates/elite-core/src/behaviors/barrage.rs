//! Barrage
//!
//! Winds up while tracking the target, locks an aim that leads the
//! target's motion, then fires a stream of projectiles along it.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;
use rand_distr::StandardNormal;

use elite_save::{PatternData, PatternKey};

use super::{BehaviorCtx, ControlFlags, EliteBehavior, PRIORITY_ATTACK};
use crate::components::Difficulty;
use crate::config::{BarrageConfig, EliteConfig};
use crate::services::combat;

/// Spawn distance in front of the shooter's eyes
const MUZZLE_OFFSET: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrageState {
    Idle,
    ChargeUp,
    Shooting,
}

#[derive(Debug)]
pub struct BarrageBehavior {
    config: BarrageConfig,
    state: BarrageState,
    timer: u32,
    shot_timer: u32,
    cooldown: u32,
    target: Option<Entity>,
    aim: Vec3,
    shots_fired: u32,
}

pub fn create(config: &EliteConfig, _data: Option<&PatternData>) -> Box<dyn EliteBehavior> {
    Box::new(BarrageBehavior::new(config.patterns.barrage.clone()))
}

pub fn describe(config: &EliteConfig) -> String {
    let barrage = &config.patterns.barrage;
    let shots = barrage.shoot_ticks.div_ceil(barrage.shoot_interval.max(1));
    format!(
        "barrage: {} shots over {} ticks after a {} tick wind-up",
        shots, barrage.shoot_ticks, barrage.charge_up_ticks
    )
}

impl BarrageBehavior {
    pub fn new(config: BarrageConfig) -> Self {
        Self {
            config,
            state: BarrageState::Idle,
            timer: 0,
            shot_timer: 0,
            cooldown: 0,
            target: None,
            aim: Vec3::ZERO,
            shots_fired: 0,
        }
    }

    pub fn state(&self) -> BarrageState {
        self.state
    }

    pub fn shots_fired(&self) -> u32 {
        self.shots_fired
    }

    /// Unit aim from `eye` at where the target will be, raised in
    /// proportion to horizontal distance to counter projectile drop.
    pub fn aim_vector(&self, eye: Vec3, target_center: Vec3, target_vel: Vec3) -> Vec3 {
        let future = target_center + target_vel * self.config.lead_ticks;
        let mut delta = future - eye;
        let horizontal = (delta.x * delta.x + delta.z * delta.z).sqrt();
        delta.y += horizontal * self.config.arc_factor;
        delta.normalize_or_zero()
    }

    fn update_aim(&mut self, ctx: &mut BehaviorCtx, target: Entity) {
        let Some(eye) = ctx.body().map(|body| body.eye_pos()) else {
            return;
        };
        let Some((center, vel)) = ctx.body_of(target).map(|body| (body.center(), body.vel)) else {
            return;
        };
        self.aim = self.aim_vector(eye, center, vel);
        ctx.look_at(center);
    }

    fn fire(&mut self, ctx: &mut BehaviorCtx) {
        let Some(eye) = ctx.body().map(|body| body.eye_pos()) else {
            return;
        };
        let jitter: f32 = ctx.with_rng(|rng| rng.sample(StandardNormal));
        let difficulty = ctx
            .world
            .get_resource::<Difficulty>()
            .copied()
            .unwrap_or_default();
        let damage = (self.config.damage
            + jitter * self.config.damage_jitter
            + self.config.difficulty_bonus * difficulty.level())
        .max(0.0);
        combat::spawn_projectile(
            ctx.world,
            ctx.entity,
            eye + self.aim * MUZZLE_OFFSET,
            self.aim * self.config.projectile_speed,
            damage,
        );
        self.shots_fired += 1;
    }
}

impl EliteBehavior for BarrageBehavior {
    fn key(&self) -> PatternKey {
        PatternKey::Barrage
    }

    fn controls(&self) -> ControlFlags {
        ControlFlags::MOVE | ControlFlags::LOOK
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
        let in_range = ctx.distance_sq_to(target).is_some_and(|dist_sq| {
            dist_sq >= self.config.min_range.powi(2) && dist_sq <= self.config.max_range.powi(2)
        });
        in_range && ctx.can_see(target)
    }

    fn on_activate(&mut self, ctx: &mut BehaviorCtx) {
        ctx.stop_navigation();
        self.target = ctx.target();
        self.state = BarrageState::ChargeUp;
        self.timer = self.config.charge_up_ticks;
        self.shots_fired = 0;
    }

    fn tick(&mut self, ctx: &mut BehaviorCtx) {
        match self.state {
            BarrageState::Idle => {}
            BarrageState::ChargeUp => {
                let Some(target) = self.target.filter(|target| ctx.is_alive(*target)) else {
                    self.state = BarrageState::Idle;
                    return;
                };
                self.update_aim(ctx, target);
                if self.timer == 0 {
                    self.state = BarrageState::Shooting;
                    self.timer = self.config.shoot_ticks;
                    self.shot_timer = 0;
                } else {
                    self.timer -= 1;
                }
            }
            BarrageState::Shooting => {
                if self.timer == 0 {
                    self.state = BarrageState::Idle;
                    return;
                }
                self.timer -= 1;
                if self.shot_timer == 0 {
                    self.fire(ctx);
                    self.shot_timer = self.config.shoot_interval.saturating_sub(1);
                } else {
                    self.shot_timer -= 1;
                }
            }
        }
    }

    fn can_continue(&mut self, ctx: &mut BehaviorCtx) -> bool {
        match self.state {
            BarrageState::Idle => false,
            BarrageState::ChargeUp => self.target.is_some_and(|target| ctx.is_alive(target)),
            BarrageState::Shooting => true,
        }
    }

    fn on_deactivate(&mut self, ctx: &mut BehaviorCtx) {
        let (min, max) = (self.config.cooldown_min, self.config.cooldown_max);
        self.cooldown = ctx.with_rng(|rng| rng.gen_range(min..=max.max(min)));
        self.state = BarrageState::Idle;
        self.target = None;
    }

    fn is_interruptible(&self) -> bool {
        self.state != BarrageState::Shooting
    }
}
