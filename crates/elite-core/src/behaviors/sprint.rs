//! Sprint
//!
//! Closes long gaps at boosted speed. Engages beyond `range_min` and lets
//! go once inside `end_range`.

use elite_save::{PatternData, PatternKey};

use super::{BehaviorCtx, ControlFlags, EliteBehavior, PathingThrottle, PRIORITY_SUPPORT};
use crate::config::{EliteConfig, SprintConfig};

#[derive(Debug)]
pub struct SprintBehavior {
    config: SprintConfig,
    throttle: PathingThrottle,
}

pub fn create(config: &EliteConfig, _data: Option<&PatternData>) -> Box<dyn EliteBehavior> {
    Box::new(SprintBehavior::new(config.patterns.sprint.clone()))
}

pub fn describe(config: &EliteConfig) -> String {
    let sprint = &config.patterns.sprint;
    format!(
        "sprint: runs at x{:.1} speed toward targets beyond {:.0} blocks",
        sprint.speed_multiplier, sprint.range_min
    )
}

impl SprintBehavior {
    pub fn new(config: SprintConfig) -> Self {
        let throttle = PathingThrottle::new(config.repath_ticks);
        Self { config, throttle }
    }
}

impl EliteBehavior for SprintBehavior {
    fn key(&self) -> PatternKey {
        PatternKey::Sprint
    }

    fn controls(&self) -> ControlFlags {
        ControlFlags::MOVE | ControlFlags::LOOK
    }

    fn priority(&self) -> i32 {
        PRIORITY_SUPPORT
    }

    fn can_activate(&mut self, ctx: &mut BehaviorCtx) -> bool {
        let Some(target) = ctx.target() else {
            return false;
        };
        ctx.distance_sq_to(target)
            .is_some_and(|dist_sq| dist_sq > self.config.range_min.powi(2))
    }

    fn on_activate(&mut self, ctx: &mut BehaviorCtx) {
        self.throttle.reset();
        if let Some(mut body) = ctx.body_mut() {
            body.sprinting = true;
        }
    }

    fn tick(&mut self, ctx: &mut BehaviorCtx) {
        let Some(target) = ctx.target() else {
            return;
        };
        ctx.look_at_entity(target);
        let Some(goal) = ctx.position_of(target) else {
            return;
        };
        if self.throttle.should_repath(goal) || !ctx.is_navigating() {
            ctx.navigate_to_entity(target, self.config.speed_multiplier);
        }
    }

    fn can_continue(&mut self, ctx: &mut BehaviorCtx) -> bool {
        let Some(target) = ctx.target() else {
            return false;
        };
        ctx.distance_sq_to(target)
            .is_some_and(|dist_sq| dist_sq > self.config.end_range.powi(2))
    }

    fn on_deactivate(&mut self, ctx: &mut BehaviorCtx) {
        ctx.stop_navigation();
        if let Some(mut body) = ctx.body_mut() {
            body.sprinting = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::test_support::{aim, arena, mob, player, with_ctx};
    use crate::components::{Body, NavGoal, Navigator};
    use glam::Vec3;

    #[test]
    fn test_two_threshold_engagement() {
        let mut world = arena();
        let runner = mob(&mut world, "zombie", Vec3::new(0.5, 0.0, 0.5));
        let target = player(&mut world, Vec3::new(6.5, 0.0, 0.5));
        aim(&mut world, runner, target);

        let mut sprint = SprintBehavior::new(SprintConfig::default());
        assert!(!with_ctx(&mut world, runner, |ctx| sprint.can_activate(ctx)));

        world.get_mut::<Body>(target).unwrap().pos.x = 12.5;
        with_ctx(&mut world, runner, |ctx| {
            assert!(sprint.can_activate(ctx));
            sprint.on_activate(ctx);
            sprint.tick(ctx);
        });
        assert!(world.get::<Body>(runner).unwrap().sprinting);
        assert_eq!(
            world.get::<Navigator>(runner).unwrap().goal(),
            Some(NavGoal::Entity(target))
        );

        // Still engaged between the two thresholds
        world.get_mut::<Body>(target).unwrap().pos.x = 6.5;
        assert!(with_ctx(&mut world, runner, |ctx| sprint.can_continue(ctx)));

        world.get_mut::<Body>(target).unwrap().pos.x = 3.5;
        with_ctx(&mut world, runner, |ctx| {
            assert!(!sprint.can_continue(ctx));
            sprint.on_deactivate(ctx);
        });
        assert!(!world.get::<Body>(runner).unwrap().sprinting);
        assert!(!world.get::<Navigator>(runner).unwrap().is_in_progress());
    }
}
