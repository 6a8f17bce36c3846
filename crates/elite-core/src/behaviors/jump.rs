//! Jump
//!
//! A single upward hop with a small forward push toward a close target.

use glam::Vec3;

use elite_save::{PatternData, PatternKey};

use super::{BehaviorCtx, ControlFlags, EliteBehavior, PRIORITY_MANEUVER};
use crate::components::horizontal_direction;
use crate::config::{EliteConfig, JumpConfig};

#[derive(Debug)]
pub struct JumpBehavior {
    config: JumpConfig,
    cooldown: u32,
    jumped: bool,
}

pub fn create(config: &EliteConfig, _data: Option<&PatternData>) -> Box<dyn EliteBehavior> {
    Box::new(JumpBehavior::new(config.patterns.jump.clone()))
}

pub fn describe(config: &EliteConfig) -> String {
    let jump = &config.patterns.jump;
    format!(
        "jump: hops at targets {:.1}-{:.1} blocks away every {} ticks",
        jump.min_range, jump.max_range, jump.cooldown
    )
}

impl JumpBehavior {
    pub fn new(config: JumpConfig) -> Self {
        Self {
            config,
            cooldown: 0,
            jumped: false,
        }
    }
}

impl EliteBehavior for JumpBehavior {
    fn key(&self) -> PatternKey {
        PatternKey::Jump
    }

    fn controls(&self) -> ControlFlags {
        ControlFlags::JUMP
    }

    fn priority(&self) -> i32 {
        PRIORITY_MANEUVER
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
        let in_range = ctx.distance_sq_to(target).is_some_and(|dist_sq| {
            dist_sq >= self.config.min_range.powi(2) && dist_sq <= self.config.max_range.powi(2)
        });
        on_ground && in_range && ctx.can_see(target)
    }

    fn on_activate(&mut self, ctx: &mut BehaviorCtx) {
        self.jumped = false;
        let Some(target) = ctx.target() else {
            return;
        };
        let (Some(pos), Some(goal)) = (ctx.position(), ctx.position_of(target)) else {
            return;
        };
        let push = horizontal_direction(pos, goal) * self.config.forward_power;
        let power = self.config.jump_power;
        ctx.look_at_entity(target);
        if let Some(mut body) = ctx.body_mut() {
            body.vel += Vec3::new(push.x, 0.0, push.z);
            body.vel.y = power;
            body.on_ground = false;
        }
        self.jumped = true;
    }

    fn tick(&mut self, _ctx: &mut BehaviorCtx) {}

    fn can_continue(&mut self, _ctx: &mut BehaviorCtx) -> bool {
        false
    }

    fn on_deactivate(&mut self, _ctx: &mut BehaviorCtx) {
        if self.jumped {
            self.cooldown = self.config.cooldown;
        }
        self.jumped = false;
    }
}
