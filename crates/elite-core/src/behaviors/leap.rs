//! Leap
//!
//! A ballistic pounce: one impulse scaled to land near the target.

use glam::Vec3;

use elite_save::{PatternData, PatternKey};

use super::{BehaviorCtx, ControlFlags, EliteBehavior, PRIORITY_MANEUVER};
use crate::config::{EliteConfig, LeapConfig};

#[derive(Debug)]
pub struct LeapBehavior {
    config: LeapConfig,
    cooldown: u32,
    leapt: bool,
}

pub fn create(config: &EliteConfig, _data: Option<&PatternData>) -> Box<dyn EliteBehavior> {
    Box::new(LeapBehavior::new(config.patterns.leap.clone()))
}

pub fn describe(config: &EliteConfig) -> String {
    let leap = &config.patterns.leap;
    format!(
        "leap: pounces on targets {:.1}-{:.1} blocks away",
        leap.min_range, leap.max_range
    )
}

impl LeapBehavior {
    pub fn new(config: LeapConfig) -> Self {
        Self {
            config,
            cooldown: 0,
            leapt: false,
        }
    }

    /// Launch velocity from `from` toward `to`.
    pub fn impulse(&self, from: Vec3, to: Vec3) -> Vec3 {
        let offset = to - from;
        Vec3::new(
            offset.x * self.config.leap_speed,
            self.config.arc,
            offset.z * self.config.leap_speed,
        )
    }
}

impl EliteBehavior for LeapBehavior {
    fn key(&self) -> PatternKey {
        PatternKey::Leap
    }

    fn controls(&self) -> ControlFlags {
        ControlFlags::JUMP | ControlFlags::MOVE
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
        self.leapt = false;
        let Some(target) = ctx.target() else {
            return;
        };
        let (Some(pos), Some(goal)) = (ctx.position(), ctx.position_of(target)) else {
            return;
        };
        let impulse = self.impulse(pos, goal);
        ctx.stop_navigation();
        ctx.look_at_entity(target);
        if let Some(mut body) = ctx.body_mut() {
            body.vel = impulse;
            body.on_ground = false;
        }
        self.leapt = true;
    }

    fn tick(&mut self, _ctx: &mut BehaviorCtx) {}

    fn can_continue(&mut self, _ctx: &mut BehaviorCtx) -> bool {
        false
    }

    fn on_deactivate(&mut self, _ctx: &mut BehaviorCtx) {
        if self.leapt {
            self.cooldown = self.config.cooldown;
        }
        self.leapt = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::test_support::{aim, arena, mob, player, with_ctx};
    use crate::components::Body;

    #[test]
    fn test_leap_impulse_scales_with_distance() {
        let leap = LeapBehavior::new(LeapConfig::default());
        let near = leap.impulse(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0));
        let far = leap.impulse(Vec3::ZERO, Vec3::new(8.0, 0.0, 0.0));
        assert!((far.x - 2.0 * near.x).abs() < 1e-6);
        assert_eq!(near.y, far.y);
    }

    #[test]
    fn test_leap_launches_toward_target() {
        let mut world = arena();
        let leaper = mob(&mut world, "spider", Vec3::new(0.5, 0.0, 0.5));
        let target = player(&mut world, Vec3::new(0.5, 0.0, 6.5));
        aim(&mut world, leaper, target);

        let mut leap = LeapBehavior::new(LeapConfig::default());
        with_ctx(&mut world, leaper, |ctx| {
            assert!(leap.can_activate(ctx));
            leap.on_activate(ctx);
            leap.on_deactivate(ctx);
            assert!(!leap.can_activate(ctx));
        });

        let body = world.get::<Body>(leaper).unwrap();
        assert!(body.vel.z > 0.0);
        assert_eq!(body.vel.y, 0.45);
        assert!(!body.on_ground);
    }
}
