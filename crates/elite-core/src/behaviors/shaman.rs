//! Shaman
//!
//! Keeps close to an ally hunting the same target and periodically pulses
//! a support aura: heal, cure harmful effects, strength and resistance.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;

use elite_save::{PatternData, PatternKey};

use super::{BehaviorCtx, ControlFlags, EliteBehavior, PathingThrottle, PRIORITY_SUPPORT};
use crate::components::{EffectKind, StatusEffect, Target};
use crate::config::{EliteConfig, ShamanConfig};
use crate::services::{combat, spatial};

const REPATH_TICKS: u32 = 10;

#[derive(Debug)]
pub struct ShamanBehavior {
    config: ShamanConfig,
    ally: Option<Entity>,
    pulse_timer: u32,
    throttle: PathingThrottle,
    pulses: u32,
}

pub fn create(config: &EliteConfig, _data: Option<&PatternData>) -> Box<dyn EliteBehavior> {
    Box::new(ShamanBehavior::new(config.patterns.shaman.clone()))
}

pub fn describe(config: &EliteConfig) -> String {
    let shaman = &config.patterns.shaman;
    format!(
        "shaman: heals allies within {:.0} blocks for {} every {} ticks",
        shaman.aura_radius, shaman.heal, shaman.pulse_interval
    )
}

impl ShamanBehavior {
    pub fn new(config: ShamanConfig) -> Self {
        Self {
            config,
            ally: None,
            pulse_timer: 0,
            throttle: PathingThrottle::new(REPATH_TICKS),
            pulses: 0,
        }
    }

    pub fn ally(&self) -> Option<Entity> {
        self.ally
    }

    pub fn pulses(&self) -> u32 {
        self.pulses
    }

    /// Non-player agents other than this one that share its target.
    fn allies_within(ctx: &mut BehaviorCtx, radius: f32) -> Vec<Entity> {
        let Some(target) = ctx.target() else {
            return Vec::new();
        };
        let Some(center) = ctx.position() else {
            return Vec::new();
        };
        let me = ctx.entity;
        spatial::agents_within(ctx.world, center, radius)
            .into_iter()
            .filter(|other| {
                *other != me
                    && !ctx.is_player(*other)
                    && ctx.world.get::<Target>(*other).and_then(|t| t.0) == Some(target)
            })
            .collect()
    }

    /// Picks an ally at random from a shuffled scan. Keeps the current one
    /// when the scan budget is spent.
    fn find_ally(&mut self, ctx: &mut BehaviorCtx) {
        if !ctx.try_scan() {
            self.ally = self.ally.filter(|ally| ctx.is_alive(*ally));
            return;
        }
        let mut candidates = Self::allies_within(ctx, self.config.search_range);
        ctx.with_rng(|rng| candidates.shuffle(rng));
        self.ally = candidates.first().copied();
    }

    fn pulse(&mut self, ctx: &mut BehaviorCtx) {
        if !ctx.try_scan() {
            return;
        }
        let allies = Self::allies_within(ctx, self.config.aura_radius);
        for ally in &allies {
            combat::heal(ctx.world, *ally, self.config.heal);
            combat::cure_harmful(ctx.world, *ally);
            for kind in [EffectKind::Strength, EffectKind::Resistance] {
                combat::add_effect(
                    ctx.world,
                    *ally,
                    StatusEffect::new(kind, self.config.buff_ticks, 0),
                );
            }
        }
        self.pulses += 1;
        tracing::debug!(entity = ?ctx.entity, allies = allies.len(), "shaman pulse");
    }
}

impl EliteBehavior for ShamanBehavior {
    fn key(&self) -> PatternKey {
        PatternKey::Shaman
    }

    fn controls(&self) -> ControlFlags {
        ControlFlags::MOVE
    }

    fn priority(&self) -> i32 {
        PRIORITY_SUPPORT
    }

    fn can_activate(&mut self, ctx: &mut BehaviorCtx) -> bool {
        ctx.target().is_some()
    }

    fn on_activate(&mut self, _ctx: &mut BehaviorCtx) {
        self.pulse_timer = self.config.pulse_interval;
        self.throttle.reset();
    }

    fn tick(&mut self, ctx: &mut BehaviorCtx) {
        self.find_ally(ctx);

        if let Some(ally) = self.ally {
            let dist_sq = ctx.distance_sq_to(ally).unwrap_or(f32::MAX);
            if dist_sq > self.config.follow_outer.powi(2) {
                if let Some(goal) = ctx.position_of(ally) {
                    if self.throttle.should_repath(goal) || !ctx.is_navigating() {
                        ctx.navigate_to_entity(ally, self.config.speed_multiplier);
                    }
                }
            } else if dist_sq < self.config.follow_inner.powi(2) {
                ctx.stop_navigation();
            }
            ctx.look_at_entity(ally);
        }

        if self.pulse_timer == 0 {
            self.pulse(ctx);
            self.pulse_timer = self.config.pulse_interval;
        } else {
            self.pulse_timer -= 1;
        }
    }

    fn can_continue(&mut self, ctx: &mut BehaviorCtx) -> bool {
        ctx.target().is_some()
    }

    fn on_deactivate(&mut self, ctx: &mut BehaviorCtx) {
        ctx.stop_navigation();
        self.ally = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::test_support::{aim, arena, mob, player, with_ctx};
    use crate::behaviors::ScanBudget;
    use crate::components::{Health, NavGoal, Navigator, StatusEffects};
    use glam::Vec3;

    #[test]
    fn test_pulse_heals_and_buffs_allies_sharing_target() {
        let mut world = arena();
        let target = player(&mut world, Vec3::new(20.5, 0.0, 0.5));
        let shaman = mob(&mut world, "zombie", Vec3::new(0.5, 0.0, 0.5));
        let ally = mob(&mut world, "zombie", Vec3::new(2.5, 0.0, 0.5));
        let stranger = mob(&mut world, "zombie", Vec3::new(0.5, 0.0, 2.5));
        aim(&mut world, shaman, target);
        aim(&mut world, ally, target);
        world.get_mut::<Health>(ally).unwrap().current = 10.0;
        world.get_mut::<Health>(stranger).unwrap().current = 10.0;
        combat::add_effect(&mut world, ally, StatusEffect::new(EffectKind::Poison, 100, 0));

        let config = ShamanConfig {
            pulse_interval: 0,
            ..ShamanConfig::default()
        };
        let mut behavior = ShamanBehavior::new(config);
        with_ctx(&mut world, shaman, |ctx| {
            assert!(behavior.can_activate(ctx));
            behavior.on_activate(ctx);
            behavior.tick(ctx);
        });

        assert_eq!(behavior.ally(), Some(ally));
        assert_eq!(behavior.pulses(), 1);
        assert_eq!(world.get::<Health>(ally).unwrap().current, 12.0);
        assert_eq!(world.get::<Health>(stranger).unwrap().current, 10.0);
        let effects = world.get::<StatusEffects>(ally).unwrap();
        assert!(!effects.has(EffectKind::Poison));
        assert!(effects.has(EffectKind::Strength));
        assert!(effects.has(EffectKind::Resistance));
    }

    #[test]
    fn test_follows_distant_ally() {
        let mut world = arena();
        let target = player(&mut world, Vec3::new(30.5, 0.0, 0.5));
        let shaman = mob(&mut world, "zombie", Vec3::new(0.5, 0.0, 0.5));
        let ally = mob(&mut world, "zombie", Vec3::new(10.5, 0.0, 0.5));
        aim(&mut world, shaman, target);
        aim(&mut world, ally, target);

        let mut behavior = ShamanBehavior::new(ShamanConfig::default());
        with_ctx(&mut world, shaman, |ctx| {
            behavior.on_activate(ctx);
            behavior.tick(ctx);
        });
        assert_eq!(
            world.get::<Navigator>(shaman).unwrap().goal(),
            Some(NavGoal::Entity(ally))
        );
    }

    #[test]
    fn test_empty_budget_skips_pulse() {
        let mut world = arena();
        let target = player(&mut world, Vec3::new(20.5, 0.0, 0.5));
        let shaman = mob(&mut world, "zombie", Vec3::new(0.5, 0.0, 0.5));
        aim(&mut world, shaman, target);

        let config = ShamanConfig {
            pulse_interval: 0,
            ..ShamanConfig::default()
        };
        let mut behavior = ShamanBehavior::new(config);
        let mut budget = ScanBudget::new(0);
        let mut ctx = BehaviorCtx::new(&mut world, shaman, &mut budget);
        behavior.on_activate(&mut ctx);
        behavior.tick(&mut ctx);
        assert_eq!(behavior.pulses(), 0);
    }
}
