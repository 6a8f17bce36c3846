//! Thief
//!
//! Empty-handed, the thief runs at a player, snatches one stack out of the
//! configured inventory sections and turns invisible. The loot is dropped
//! tagged with the thief's identity and picked back up by a deferred
//! action at the end of the tick. While holding loot the thief keeps away
//! from the nearest player.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;

use elite_save::{EquipmentSlot, PatternData, PatternKey};

use super::{BehaviorCtx, ControlFlags, EliteBehavior, PathingThrottle, PRIORITY_MANEUVER};
use crate::components::{
    horizontal_direction, DroppedItem, EffectKind, Equipment, Inventory, InventorySection,
    StatusEffect,
};
use crate::config::{EliteConfig, TheftSlots, ThiefConfig};
use crate::services::{combat, items, spatial};
use crate::systems::deferred::Flush;

const REPATH_TICKS: u32 = 5;

/// Inventory sections a slot set allows stealing from.
pub fn sections(slots: TheftSlots) -> Vec<InventorySection> {
    let mut sections = Vec::with_capacity(3);
    if slots.hotbar() {
        sections.push(InventorySection::Hotbar);
    }
    if slots.main() {
        sections.push(InventorySection::Main);
    }
    if slots.armor() {
        sections.push(InventorySection::Armor);
    }
    sections
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThiefMode {
    Steal,
    Flee,
}

#[derive(Debug)]
pub struct ThiefBehavior {
    config: ThiefConfig,
    mode: ThiefMode,
    victim: Option<Entity>,
    threat: Option<Entity>,
    throttle: PathingThrottle,
    thefts: u32,
    cooldown: u32,
}

pub fn create(config: &EliteConfig, _data: Option<&PatternData>) -> Box<dyn EliteBehavior> {
    Box::new(ThiefBehavior::new(config.patterns.thief.clone()))
}

pub fn describe(config: &EliteConfig) -> String {
    let thief = &config.patterns.thief;
    format!(
        "thief: steals from {:?} slots, then flees players within {:.0} blocks",
        thief.slots, thief.avoid_range
    )
}

fn holds_loot(ctx: &BehaviorCtx) -> bool {
    ctx.world
        .get::<Equipment>(ctx.entity)
        .is_some_and(|equipment| equipment.holds_stolen())
}

impl ThiefBehavior {
    pub fn new(config: ThiefConfig) -> Self {
        Self {
            config,
            mode: ThiefMode::Steal,
            victim: None,
            threat: None,
            throttle: PathingThrottle::new(REPATH_TICKS),
            thefts: 0,
            cooldown: 0,
        }
    }

    pub fn mode(&self) -> ThiefMode {
        self.mode
    }

    pub fn thefts(&self) -> u32 {
        self.thefts
    }

    /// Nearest player in avoid range. Reuses the last threat when the scan
    /// budget is spent.
    fn find_threat(&mut self, ctx: &mut BehaviorCtx) -> Option<Entity> {
        if !ctx.try_scan() {
            return self.threat.filter(|threat| ctx.is_alive(*threat));
        }
        let center = ctx.position()?;
        self.threat = spatial::nearest_player(ctx.world, center, self.config.avoid_range);
        self.threat
    }

    fn victim_in_reach(&self, ctx: &BehaviorCtx) -> Option<Entity> {
        let victim = self.victim.filter(|victim| ctx.is_alive(*victim))?;
        ctx.distance_sq_to(victim)
            .filter(|dist_sq| *dist_sq <= self.config.reach.powi(2))
            .map(|_| victim)
    }

    /// One contact: damage, then at most one stolen stack. The attempt ends
    /// here whether or not anything was taken.
    fn steal_from(&mut self, ctx: &mut BehaviorCtx, victim: Entity) {
        self.victim = None;
        self.cooldown = self.config.cooldown;
        let Some(thief_id) = ctx.agent_id() else {
            return;
        };
        let Some(drop_at) = ctx.position() else {
            return;
        };
        let allowed = sections(self.config.slots);
        let occupied = ctx
            .world
            .get::<Inventory>(victim)
            .map(|inventory| inventory.occupied(&allowed))
            .unwrap_or_default();

        combat::apply_damage(ctx.world, victim, self.config.damage);
        if occupied.is_empty() {
            return;
        }
        let pick = ctx.with_rng(|rng| rng.gen_range(0..occupied.len()));
        let (section, index) = occupied[pick];
        let Some(stack) = ctx
            .world
            .get_mut::<Inventory>(victim)
            .and_then(|mut inventory| inventory.take(section, index))
        else {
            return;
        };

        tracing::debug!(thief = ?ctx.entity, item = %stack.item, ?section, index, "stole item");
        let loot = items::drop_item(
            ctx.world,
            drop_at,
            stack.with_thief(thief_id),
            self.config.pickup_delay,
        );
        combat::add_effect(
            ctx.world,
            ctx.entity,
            StatusEffect::new(EffectKind::Invisibility, self.config.invisibility_ticks, 0),
        );
        let thief = ctx.entity;
        ctx.defer("thief.equip_loot", move |world| {
            finish_theft(world, thief, loot);
            Flush::Done
        });
        self.thefts += 1;
    }
}

/// Moves dropped loot into the thief's main hand. Loot whose thief is gone
/// stays on the ground.
fn finish_theft(world: &mut World, thief: Entity, loot: Entity) {
    if !spatial::is_alive(world, thief) {
        return;
    }
    let Some(stack) = world.get::<DroppedItem>(loot).map(|item| item.stack.clone()) else {
        return;
    };
    world.despawn(loot);
    items::equip(world, thief, EquipmentSlot::MainHand, stack);
}

impl EliteBehavior for ThiefBehavior {
    fn key(&self) -> PatternKey {
        PatternKey::Thief
    }

    fn controls(&self) -> ControlFlags {
        ControlFlags::MOVE
    }

    fn priority(&self) -> i32 {
        PRIORITY_MANEUVER
    }

    fn can_activate(&mut self, ctx: &mut BehaviorCtx) -> bool {
        if holds_loot(ctx) {
            return self.find_threat(ctx).is_some();
        }
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return false;
        }
        ctx.target().is_some_and(|target| ctx.is_player(target))
    }

    fn on_activate(&mut self, ctx: &mut BehaviorCtx) {
        self.throttle.reset();
        if holds_loot(ctx) {
            self.mode = ThiefMode::Flee;
        } else {
            self.mode = ThiefMode::Steal;
            self.victim = ctx.target();
        }
    }

    fn tick(&mut self, ctx: &mut BehaviorCtx) {
        match self.mode {
            ThiefMode::Steal => {
                if let Some(victim) = self.victim_in_reach(ctx) {
                    self.steal_from(ctx, victim);
                    ctx.stop_navigation();
                    return;
                }
                let Some(victim) = self.victim else {
                    return;
                };
                ctx.look_at_entity(victim);
                if let Some(goal) = ctx.position_of(victim) {
                    if self.throttle.should_repath(goal) || !ctx.is_navigating() {
                        ctx.navigate_to_entity(victim, self.config.speed_multiplier);
                    }
                }
            }
            ThiefMode::Flee => {
                let Some(threat) = self.find_threat(ctx) else {
                    return;
                };
                let (Some(me), Some(them)) = (ctx.position(), ctx.position_of(threat)) else {
                    return;
                };
                let mut away = horizontal_direction(them, me);
                if away == Vec3::ZERO {
                    away = Vec3::X;
                }
                let refuge = me + away * self.config.avoid_range;
                if self.throttle.should_repath(refuge) || !ctx.is_navigating() {
                    ctx.navigate_to_point(refuge, self.config.avoid_speed);
                }
            }
        }
    }

    fn can_continue(&mut self, ctx: &mut BehaviorCtx) -> bool {
        match self.mode {
            ThiefMode::Steal => {
                !holds_loot(ctx) && self.victim.is_some_and(|victim| ctx.is_alive(victim))
            }
            ThiefMode::Flee => holds_loot(ctx) && self.threat.is_some_and(|t| ctx.is_alive(t)),
        }
    }

    fn on_deactivate(&mut self, ctx: &mut BehaviorCtx) {
        ctx.stop_navigation();
        self.victim = None;
        self.threat = None;
    }
}
