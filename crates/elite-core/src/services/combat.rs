//! Combat Services
//!
//! Damage, healing, knockback and status effects.

use bevy_ecs::prelude::*;
use glam::Vec3;

use elite_save::AttributeKind;

use crate::components::{
    Attributes, Body, EffectKind, Health, Projectile, Species, StatusEffect, StatusEffects,
};

/// Health assumed when an agent carries no max health attribute
pub const DEFAULT_MAX_HEALTH: f32 = 20.0;

/// Projectiles expire after this many ticks
pub const PROJECTILE_LIFETIME: u32 = 100;

/// Damage used when an agent has no attack damage attribute.
pub fn fallback_attack_damage(species: &str) -> f32 {
    match species {
        "zombie" | "husk" => 3.0,
        "skeleton" | "spider" => 2.0,
        "silverfish" => 1.0,
        _ => 2.0,
    }
}

/// The agent's attack damage, substituting a species default when the
/// attribute is missing.
pub fn attack_damage(world: &World, entity: Entity) -> f32 {
    let fallback = || {
        let species = world
            .get::<Species>(entity)
            .map(|s| s.0.as_str())
            .unwrap_or_default();
        fallback_attack_damage(species)
    };
    match world.get::<Attributes>(entity) {
        Some(attributes) => attributes
            .value(AttributeKind::AttackDamage)
            .unwrap_or_else(|err| {
                tracing::debug!(?entity, %err, "using fallback attack damage");
                fallback()
            }),
        None => fallback(),
    }
}

pub fn max_health(world: &World, entity: Entity) -> f32 {
    world
        .get::<Attributes>(entity)
        .and_then(|attributes| attributes.value(AttributeKind::MaxHealth).ok())
        .unwrap_or(DEFAULT_MAX_HEALTH)
}

/// Deals damage to a living agent. Resistance removes a fifth per level.
///
/// Returns whether any damage landed.
pub fn apply_damage(world: &mut World, target: Entity, amount: f32) -> bool {
    let resistance = world
        .get::<StatusEffects>(target)
        .and_then(|effects| effects.get(EffectKind::Resistance))
        .map(|effect| (effect.amplifier as f32 + 1.0) * 0.2)
        .unwrap_or(0.0);
    let amount = amount * (1.0 - resistance).max(0.0);

    let Some(mut health) = world.get_mut::<Health>(target) else {
        return false;
    };
    if !health.is_alive() || amount <= 0.0 {
        return false;
    }
    health.current -= amount;
    true
}

/// Heals up to the agent's max health.
pub fn heal(world: &mut World, target: Entity, amount: f32) {
    let max = max_health(world, target);
    if let Some(mut health) = world.get_mut::<Health>(target) {
        if health.is_alive() {
            health.current = (health.current + amount).min(max);
        }
    }
}

/// Pushes an agent along a horizontal direction, reduced by knockback
/// resistance.
pub fn knockback(world: &mut World, target: Entity, direction: Vec3, strength: f32) {
    let resistance = world
        .get::<Attributes>(target)
        .and_then(|attributes| attributes.value(AttributeKind::KnockbackResistance).ok())
        .unwrap_or(0.0);
    let scale = (1.0 - resistance).clamp(0.0, 1.0) * strength;
    if scale <= 0.0 {
        return;
    }
    if let Some(mut body) = world.get_mut::<Body>(target) {
        body.vel.x += direction.x * scale;
        body.vel.z += direction.z * scale;
        if body.on_ground {
            body.vel.y = body.vel.y.max(0.4 * scale.min(1.0));
        }
    }
}

pub fn add_effect(world: &mut World, target: Entity, effect: StatusEffect) {
    let Some(mut entity) = world.get_entity_mut(target) else {
        return;
    };
    match entity.get_mut::<StatusEffects>() {
        Some(mut effects) => effects.add(effect),
        None => {
            let mut effects = StatusEffects::default();
            effects.add(effect);
            entity.insert(effects);
        }
    }
}

/// Clears harmful effects, returning how many were removed.
pub fn cure_harmful(world: &mut World, target: Entity) -> usize {
    world
        .get_mut::<StatusEffects>(target)
        .map(|mut effects| effects.remove_harmful())
        .unwrap_or(0)
}

pub fn spawn_projectile(
    world: &mut World,
    shooter: Entity,
    pos: Vec3,
    vel: Vec3,
    damage: f32,
) -> Entity {
    world
        .spawn(Projectile {
            shooter,
            pos,
            vel,
            damage,
            ticks_left: PROJECTILE_LIFETIME,
        })
        .id()
}
