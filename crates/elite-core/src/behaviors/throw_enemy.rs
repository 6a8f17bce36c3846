//! Throw Enemy
//!
//! Grabs the target itself, carries it toward a drop point picked at grab
//! time and throws it there. A passenger that wriggles free may be grabbed
//! again a bounded number of times.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;

use elite_save::{PatternData, PatternKey};

use super::carry::{defer_mount, throw_passenger, CarryState, Throw};
use super::{BehaviorCtx, ControlFlags, EliteBehavior, PathingThrottle, PRIORITY_ATTACK};
use crate::config::{EliteConfig, ThrowEnemyConfig};
use crate::services::mounts;

const REPATH_TICKS: u32 = 5;

/// Carrier counts as arrived this close to the drop point
const ARRIVAL_RANGE: f32 = 1.5;

#[derive(Debug)]
pub struct ThrowEnemyBehavior {
    config: ThrowEnemyConfig,
    state: CarryState,
    victim: Option<Entity>,
    destination: Vec3,
    cooldown: u32,
    carry_ticks: u32,
    check_timer: u32,
    regrabs: u32,
    throttle: PathingThrottle,
    throws: u32,
}

pub fn create(config: &EliteConfig, _data: Option<&PatternData>) -> Box<dyn EliteBehavior> {
    Box::new(ThrowEnemyBehavior::new(config.patterns.throw_enemy.clone()))
}

pub fn describe(config: &EliteConfig) -> String {
    let throw = &config.patterns.throw_enemy;
    format!(
        "throw_enemy: carries the target {:.0} blocks away and throws it ({} re-grabs)",
        throw.throw_distance, throw.max_regrabs
    )
}

impl ThrowEnemyBehavior {
    pub fn new(config: ThrowEnemyConfig) -> Self {
        Self {
            config,
            state: CarryState::Idle,
            victim: None,
            destination: Vec3::ZERO,
            cooldown: 0,
            carry_ticks: 0,
            check_timer: 0,
            regrabs: 0,
            throttle: PathingThrottle::new(REPATH_TICKS),
            throws: 0,
        }
    }

    pub fn state(&self) -> CarryState {
        self.state
    }

    pub fn destination(&self) -> Vec3 {
        self.destination
    }

    pub fn regrabs(&self) -> u32 {
        self.regrabs
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

    fn grab(&mut self, ctx: &mut BehaviorCtx) {
        let Some(victim) = self.victim.filter(|victim| ctx.is_alive(*victim)) else {
            self.state = CarryState::Idle;
            return;
        };
        if mounts::is_riding(ctx.world, victim, ctx.entity) {
            self.state = CarryState::Carry;
            self.carry_ticks = 0;
            self.check_timer = self.config.throw_check_interval;
            self.throttle.reset();
            return;
        }
        let in_reach = ctx
            .distance_sq_to(victim)
            .is_some_and(|dist_sq| dist_sq <= self.config.reach.powi(2));
        if in_reach {
            ctx.stop_navigation();
            defer_mount(ctx, victim);
            return;
        }
        ctx.look_at_entity(victim);
        if let Some(goal) = ctx.position_of(victim) {
            if self.throttle.should_repath(goal) || !ctx.is_navigating() {
                ctx.navigate_to_entity(victim, 1.0);
            }
        }
    }

    fn carry(&mut self, ctx: &mut BehaviorCtx) {
        let Some(victim) = self.victim.filter(|victim| ctx.is_alive(*victim)) else {
            self.state = CarryState::Idle;
            return;
        };
        if !mounts::is_riding(ctx.world, victim, ctx.entity) {
            if self.regrabs < self.config.max_regrabs {
                self.regrabs += 1;
                self.state = CarryState::Grab;
                self.throttle.reset();
                tracing::debug!(carrier = ?ctx.entity, regrabs = self.regrabs, "passenger escaped");
            } else {
                self.state = CarryState::Idle;
            }
            return;
        }

        self.carry_ticks += 1;
        if self.carry_ticks >= self.config.max_carry_ticks {
            mounts::dismount(ctx.world, victim);
            self.state = CarryState::Idle;
            return;
        }

        let destination = self.destination;
        if self.throttle.should_repath(destination) || !ctx.is_navigating() {
            ctx.navigate_to_point(destination, 1.0);
        }

        if self.check_timer > 0 {
            self.check_timer -= 1;
            return;
        }
        self.check_timer = self.config.throw_check_interval;
        let arrived = ctx.position().is_some_and(|pos| {
            let offset = destination - pos;
            offset.x * offset.x + offset.z * offset.z <= ARRIVAL_RANGE * ARRIVAL_RANGE
        });
        let chance = self.config.throw_chance;
        if arrived || ctx.with_rng(|rng| rng.gen::<f32>() < chance) {
            throw_passenger(ctx, victim, destination, self.throw_settings());
            self.throws += 1;
            self.state = CarryState::Idle;
        }
    }
}

impl EliteBehavior for ThrowEnemyBehavior {
    fn key(&self) -> PatternKey {
        PatternKey::ThrowEnemy
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
        if mounts::riding(ctx.world, ctx.entity).is_some() {
            return false;
        }
        let Some(target) = ctx.target() else {
            return false;
        };
        if mounts::riding(ctx.world, target).is_some() {
            return false;
        }
        let in_range = ctx
            .distance_sq_to(target)
            .is_some_and(|dist_sq| dist_sq <= self.config.max_range.powi(2));
        in_range && ctx.can_see(target)
    }

    fn on_activate(&mut self, ctx: &mut BehaviorCtx) {
        self.victim = ctx.target();
        self.state = CarryState::Grab;
        self.regrabs = 0;
        self.throttle.reset();
        let origin = self
            .victim
            .and_then(|victim| ctx.position_of(victim))
            .unwrap_or_default();
        let angle = ctx.with_rng(|rng| rng.gen_range(0.0..std::f32::consts::TAU));
        self.destination =
            origin + Vec3::new(angle.cos(), 0.0, angle.sin()) * self.config.throw_distance;
    }

    fn tick(&mut self, ctx: &mut BehaviorCtx) {
        match self.state {
            CarryState::Idle => {}
            CarryState::Grab => self.grab(ctx),
            CarryState::Carry => self.carry(ctx),
        }
    }

    fn can_continue(&mut self, ctx: &mut BehaviorCtx) -> bool {
        self.state != CarryState::Idle && self.victim.is_some_and(|victim| ctx.is_alive(victim))
    }

    fn on_deactivate(&mut self, ctx: &mut BehaviorCtx) {
        mounts::dismount_all(ctx.world, ctx.entity);
        ctx.stop_navigation();
        self.cooldown = self.config.cooldown;
        self.state = CarryState::Idle;
        self.victim = None;
    }

    fn is_interruptible(&self) -> bool {
        self.state != CarryState::Carry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::test_support::{aim, arena, mob, player, with_ctx};
    use crate::components::Body;
    use crate::systems::deferred::flush_deferred;

    fn grab_and_seat(world: &mut World, behavior: &mut ThrowEnemyBehavior, carrier: Entity) {
        with_ctx(world, carrier, |ctx| {
            assert!(behavior.can_activate(ctx));
            behavior.on_activate(ctx);
            behavior.tick(ctx);
        });
        flush_deferred(world);
        with_ctx(world, carrier, |ctx| behavior.tick(ctx));
    }

    #[test]
    fn test_destination_is_throw_distance_from_target() {
        let mut world = arena();
        let victim = player(&mut world, Vec3::new(1.5, 0.0, 0.5));
        let carrier = mob(&mut world, "zombie", Vec3::new(0.5, 0.0, 0.5));
        aim(&mut world, carrier, victim);

        let mut behavior = ThrowEnemyBehavior::new(ThrowEnemyConfig::default());
        with_ctx(&mut world, carrier, |ctx| behavior.on_activate(ctx));

        let offset = behavior.destination() - Vec3::new(1.5, 0.0, 0.5);
        assert!((offset.length() - 8.0).abs() < 1e-4);
        assert_eq!(offset.y, 0.0);
    }

    #[test]
    fn test_throws_victim_toward_destination() {
        let mut world = arena();
        let victim = player(&mut world, Vec3::new(1.5, 0.0, 0.5));
        let carrier = mob(&mut world, "zombie", Vec3::new(0.5, 0.0, 0.5));
        aim(&mut world, carrier, victim);

        let config = ThrowEnemyConfig {
            throw_chance: 1.0,
            throw_check_interval: 0,
            ..ThrowEnemyConfig::default()
        };
        let mut behavior = ThrowEnemyBehavior::new(config);
        grab_and_seat(&mut world, &mut behavior, carrier);
        assert_eq!(behavior.state(), CarryState::Carry);
        assert!(mounts::is_riding(&world, victim, carrier));

        with_ctx(&mut world, carrier, |ctx| behavior.tick(ctx));

        assert_eq!(behavior.throws(), 1);
        assert!(!mounts::is_riding(&world, victim, carrier));
        let body = world.get::<Body>(victim).unwrap();
        let toward = behavior.destination() - body.pos;
        assert!(body.vel.x * toward.x + body.vel.z * toward.z > 0.0);
    }

    #[test]
    fn test_regrabs_escaped_victim_until_limit() {
        let mut world = arena();
        let victim = player(&mut world, Vec3::new(1.5, 0.0, 0.5));
        let carrier = mob(&mut world, "zombie", Vec3::new(0.5, 0.0, 0.5));
        aim(&mut world, carrier, victim);

        let config = ThrowEnemyConfig {
            throw_chance: 0.0,
            throw_check_interval: 100,
            max_regrabs: 1,
            ..ThrowEnemyConfig::default()
        };
        let mut behavior = ThrowEnemyBehavior::new(config);
        grab_and_seat(&mut world, &mut behavior, carrier);

        mounts::dismount(&mut world, victim);
        with_ctx(&mut world, carrier, |ctx| behavior.tick(ctx));
        assert_eq!(behavior.state(), CarryState::Grab);
        assert_eq!(behavior.regrabs(), 1);

        // Second seat, second escape: out of re-grabs.
        world.get_mut::<Body>(victim).unwrap().pos = Vec3::new(1.5, 0.0, 0.5);
        with_ctx(&mut world, carrier, |ctx| behavior.tick(ctx));
        flush_deferred(&mut world);
        with_ctx(&mut world, carrier, |ctx| behavior.tick(ctx));
        assert_eq!(behavior.state(), CarryState::Carry);

        mounts::dismount(&mut world, victim);
        with_ctx(&mut world, carrier, |ctx| {
            behavior.tick(ctx);
            assert!(!behavior.can_continue(ctx));
        });
        assert_eq!(behavior.state(), CarryState::Idle);
    }
}
