//! One-time initialization effects.
//!
//! Applied the first time a granted pattern attaches to a live agent.
//! Modifiers are named per pattern and attribute, so applying them again
//! replaces rather than stacks.

use bevy_ecs::prelude::*;

use elite_save::{AttributeKind, AttributeModifier, ItemStack, PatternData, PatternKey};

use crate::behaviors::spawner::initial_state;
use crate::components::{AgentProfile, Attributes, Health};
use crate::config::{EliteConfig, InitEffects};
use crate::services::{combat, items};

/// Modifier name for a pattern's bonus to one attribute.
pub fn modifier_name(key: PatternKey, attribute: AttributeKind) -> String {
    format!("elite.{}.{}", key, attribute.as_str())
}

/// Applies attribute modifiers and equipment. A max health bonus also
/// tops the agent up to its new maximum.
pub fn apply_init_effects(world: &mut World, entity: Entity, key: PatternKey, effects: &InitEffects) {
    let mut raised_max_health = false;
    if let Some(mut attributes) = world.get_mut::<Attributes>(entity) {
        for modifier in &effects.modifiers {
            attributes.apply_modifier(AttributeModifier {
                name: modifier_name(key, modifier.attribute),
                attribute: modifier.attribute,
                amount: modifier.amount,
                operation: modifier.operation,
            });
            raised_max_health |= modifier.attribute == AttributeKind::MaxHealth;
        }
    }
    for (slot, item) in &effects.equipment {
        items::equip(world, entity, *slot, ItemStack::single(item.clone()));
    }
    if raised_max_health {
        let max = combat::max_health(world, entity);
        if let Some(mut health) = world.get_mut::<Health>(entity) {
            health.current = max;
        }
    }
}

/// Default initializer: the pattern's configured effects.
pub fn initialize_pattern(world: &mut World, entity: Entity, key: PatternKey, config: &EliteConfig) {
    apply_init_effects(world, entity, key, config.patterns.init(key));
}

/// Spawner initializer: configured effects, then a fresh wave state unless
/// one was already saved.
pub fn initialize_spawner(world: &mut World, entity: Entity, key: PatternKey, config: &EliteConfig) {
    initialize_pattern(world, entity, key, config);
    let Some(mut profile) = world.get_mut::<AgentProfile>(entity) else {
        return;
    };
    if let Some(elite) = profile.0.elite_mut() {
        if elite.pattern_data(PatternKey::Spawner).is_none() {
            elite.set_pattern_data(PatternData::Spawner(initial_state(&config.patterns.spawner)));
        }
    }
}
