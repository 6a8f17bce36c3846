//! Agent Components
//!
//! Identity, vitals, attributes, equipment and the persisted profile of an
//! agent.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use std::collections::BTreeMap;
use uuid::Uuid;

use elite_save::{
    AttributeKind, AttributeModifier, EquipmentSlot, ItemStack, ModifierOperation, Profile,
    ProfileField,
};

use crate::error::EngineError;

/// Component: Marker for every simulated agent, players included
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Agent;

/// Component: Stable identity that survives save and load
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentId(pub Uuid);

/// Component: Species key, matching a registered species descriptor
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Species(pub String);

impl Species {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn is(&self, key: &str) -> bool {
        self.0 == key
    }
}

/// Component: Marker for player agents. Players never receive a profile
/// decision.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Component: Per-agent random stream
#[derive(Component)]
pub struct AgentRng(pub SmallRng);

/// Component: Current health
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
}

impl Health {
    pub fn new(current: f32) -> Self {
        Self { current }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }
}

/// Component: The agent this one is hostile toward
///
/// Assigned by the host's targeting; behaviors only read it.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Target(pub Option<Entity>);

/// Component: Persisted decisions for this agent
#[derive(Component, Debug, Clone, Default)]
pub struct AgentProfile(pub Profile);

/// Component: Marker for agents whose profile has not been attached yet
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PendingAttach;

/// Component: Applied single-roll dispositions
///
/// Derived from the profile on every attach; never persisted on its own.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Dispositions {
    pub rides: bool,
    pub depacified: bool,
    pub breaks_doors: bool,
    pub griefs: bool,
    pub fiddles: bool,
    /// Chance to sidestep an incoming projectile
    pub dodge_arrows: f32,
}

impl Dispositions {
    /// Reads decided dimensions out of a profile. Undecided ones stay off.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            rides: profile.flag(ProfileField::Ride).unwrap_or(false),
            depacified: profile.flag(ProfileField::Depacify).unwrap_or(false),
            breaks_doors: profile.flag(ProfileField::BreakDoors).unwrap_or(false),
            griefs: profile.flag(ProfileField::Griefing).unwrap_or(false),
            fiddles: profile.flag(ProfileField::Fiddling).unwrap_or(false),
            dodge_arrows: profile.chance(ProfileField::DodgeArrows).unwrap_or(0.0),
        }
    }
}

/// Component: Base attribute values plus named modifiers
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    base: BTreeMap<AttributeKind, f32>,
    modifiers: Vec<AttributeModifier>,
}

impl Attributes {
    pub fn new(base: BTreeMap<AttributeKind, f32>, modifiers: Vec<AttributeModifier>) -> Self {
        Self { base, modifiers }
    }

    pub fn with_base(mut self, kind: AttributeKind, value: f32) -> Self {
        self.base.insert(kind, value);
        self
    }

    pub fn base(&self) -> &BTreeMap<AttributeKind, f32> {
        &self.base
    }

    pub fn modifiers(&self) -> &[AttributeModifier] {
        &self.modifiers
    }

    pub fn has(&self, kind: AttributeKind) -> bool {
        self.base.contains_key(&kind)
    }

    /// Effective value: base, then additions, then multipliers.
    ///
    /// Fails when the agent does not carry the attribute at all; modifiers
    /// on a missing attribute do not create it.
    pub fn value(&self, kind: AttributeKind) -> Result<f32, EngineError> {
        let base = *self
            .base
            .get(&kind)
            .ok_or(EngineError::MissingAttribute(kind))?;

        let mut added = base;
        let mut multiplier = 1.0;
        for modifier in self.modifiers.iter().filter(|m| m.attribute == kind) {
            match modifier.operation {
                ModifierOperation::Add => added += modifier.amount,
                ModifierOperation::MultiplyBase => multiplier += modifier.amount,
            }
        }
        Ok(added * multiplier)
    }

    /// Applies a modifier, replacing any existing one with the same name.
    pub fn apply_modifier(&mut self, modifier: AttributeModifier) {
        self.modifiers.retain(|m| m.name != modifier.name);
        self.modifiers.push(modifier);
    }

    pub fn modifier_count(&self, name: &str) -> usize {
        self.modifiers.iter().filter(|m| m.name == name).count()
    }
}

/// Component: Worn and held items
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Equipment {
    slots: BTreeMap<EquipmentSlot, ItemStack>,
}

impl Equipment {
    pub fn new(slots: BTreeMap<EquipmentSlot, ItemStack>) -> Self {
        Self { slots }
    }

    pub fn get(&self, slot: EquipmentSlot) -> Option<&ItemStack> {
        self.slots.get(&slot)
    }

    /// Puts a stack in a slot, returning whatever it displaced.
    pub fn set(&mut self, slot: EquipmentSlot, stack: ItemStack) -> Option<ItemStack> {
        self.slots.insert(slot, stack)
    }

    pub fn take(&mut self, slot: EquipmentSlot) -> Option<ItemStack> {
        self.slots.remove(&slot)
    }

    pub fn slots(&self) -> &BTreeMap<EquipmentSlot, ItemStack> {
        &self.slots
    }

    /// True when the main hand holds loot taken by a thief.
    pub fn holds_stolen(&self) -> bool {
        self.get(EquipmentSlot::MainHand)
            .is_some_and(|stack| stack.is_stolen())
    }
}

/// Section of a player inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InventorySection {
    Hotbar,
    Main,
    Armor,
}

impl InventorySection {
    pub fn size(&self) -> usize {
        match self {
            InventorySection::Hotbar => 9,
            InventorySection::Main => 27,
            InventorySection::Armor => 4,
        }
    }
}

/// Component: A player's carried items
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Inventory {
    hotbar: Vec<Option<ItemStack>>,
    main: Vec<Option<ItemStack>>,
    armor: Vec<Option<ItemStack>>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            hotbar: vec![None; InventorySection::Hotbar.size()],
            main: vec![None; InventorySection::Main.size()],
            armor: vec![None; InventorySection::Armor.size()],
        }
    }
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    fn section(&self, section: InventorySection) -> &Vec<Option<ItemStack>> {
        match section {
            InventorySection::Hotbar => &self.hotbar,
            InventorySection::Main => &self.main,
            InventorySection::Armor => &self.armor,
        }
    }

    fn section_mut(&mut self, section: InventorySection) -> &mut Vec<Option<ItemStack>> {
        match section {
            InventorySection::Hotbar => &mut self.hotbar,
            InventorySection::Main => &mut self.main,
            InventorySection::Armor => &mut self.armor,
        }
    }

    /// Places a stack, returning the one it displaced. Out-of-range slots
    /// hand the stack back unchanged.
    pub fn set(
        &mut self,
        section: InventorySection,
        index: usize,
        stack: ItemStack,
    ) -> Option<ItemStack> {
        match self.section_mut(section).get_mut(index) {
            Some(slot) => slot.replace(stack),
            None => Some(stack),
        }
    }

    pub fn get(&self, section: InventorySection, index: usize) -> Option<&ItemStack> {
        self.section(section).get(index).and_then(|slot| slot.as_ref())
    }

    pub fn take(&mut self, section: InventorySection, index: usize) -> Option<ItemStack> {
        self.section_mut(section)
            .get_mut(index)
            .and_then(|slot| slot.take())
    }

    /// Non-empty slots within the given sections.
    pub fn occupied(&self, sections: &[InventorySection]) -> Vec<(InventorySection, usize)> {
        sections
            .iter()
            .flat_map(|section| {
                self.section(*section)
                    .iter()
                    .enumerate()
                    .filter(|(_, slot)| slot.is_some())
                    .map(move |(index, _)| (*section, index))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied(&[
            InventorySection::Hotbar,
            InventorySection::Main,
            InventorySection::Armor,
        ])
        .is_empty()
    }
}

/// Kind of timed status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Invisibility,
    Regeneration,
    Resistance,
    Strength,
    Speed,
    Poison,
    Weakness,
    Slowness,
}

impl EffectKind {
    pub fn is_harmful(&self) -> bool {
        matches!(
            self,
            EffectKind::Poison | EffectKind::Weakness | EffectKind::Slowness
        )
    }
}

/// One active effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub ticks_left: u32,
    pub amplifier: u8,
}

impl StatusEffect {
    pub fn new(kind: EffectKind, ticks: u32, amplifier: u8) -> Self {
        Self {
            kind,
            ticks_left: ticks,
            amplifier,
        }
    }
}

/// Component: Active timed effects
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct StatusEffects {
    active: Vec<StatusEffect>,
}

impl StatusEffects {
    /// Adds an effect. A stronger or longer effect of the same kind
    /// replaces a weaker one.
    pub fn add(&mut self, effect: StatusEffect) {
        match self.active.iter_mut().find(|e| e.kind == effect.kind) {
            Some(existing) => {
                if effect.amplifier > existing.amplifier
                    || (effect.amplifier == existing.amplifier
                        && effect.ticks_left > existing.ticks_left)
                {
                    *existing = effect;
                }
            }
            None => self.active.push(effect),
        }
    }

    pub fn get(&self, kind: EffectKind) -> Option<&StatusEffect> {
        self.active.iter().find(|e| e.kind == kind)
    }

    pub fn has(&self, kind: EffectKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn remove_harmful(&mut self) -> usize {
        let before = self.active.len();
        self.active.retain(|e| !e.kind.is_harmful());
        before - self.active.len()
    }

    /// Counts every effect down by one tick and drops expired ones.
    pub fn tick(&mut self) {
        for effect in &mut self.active {
            effect.ticks_left = effect.ticks_left.saturating_sub(1);
        }
        self.active.retain(|e| e.ticks_left > 0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.active.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_value_combines_modifiers() {
        let mut attributes = Attributes::default().with_base(AttributeKind::MaxHealth, 20.0);
        attributes.apply_modifier(AttributeModifier::add("a", AttributeKind::MaxHealth, 10.0));
        attributes.apply_modifier(AttributeModifier::multiply(
            "b",
            AttributeKind::MaxHealth,
            0.5,
        ));
        assert_eq!(attributes.value(AttributeKind::MaxHealth), Ok(45.0));
    }

    #[test]
    fn test_missing_attribute_is_an_error() {
        let mut attributes = Attributes::default();
        attributes.apply_modifier(AttributeModifier::add("a", AttributeKind::AttackDamage, 1.0));
        assert_eq!(
            attributes.value(AttributeKind::AttackDamage),
            Err(EngineError::MissingAttribute(AttributeKind::AttackDamage))
        );
    }

    #[test]
    fn test_modifier_with_same_name_replaces() {
        let mut attributes = Attributes::default().with_base(AttributeKind::MovementSpeed, 0.2);
        attributes.apply_modifier(AttributeModifier::add("s", AttributeKind::MovementSpeed, 0.1));
        attributes.apply_modifier(AttributeModifier::add("s", AttributeKind::MovementSpeed, 0.1));
        assert_eq!(attributes.modifier_count("s"), 1);
        let speed = attributes.value(AttributeKind::MovementSpeed).unwrap();
        assert!((speed - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_inventory_occupied_respects_sections() {
        let mut inventory = Inventory::new();
        inventory.set(InventorySection::Hotbar, 2, ItemStack::single("sword"));
        inventory.set(InventorySection::Armor, 0, ItemStack::single("helmet"));

        assert_eq!(
            inventory.occupied(&[InventorySection::Hotbar]),
            vec![(InventorySection::Hotbar, 2)]
        );
        assert_eq!(
            inventory
                .occupied(&[InventorySection::Main, InventorySection::Armor])
                .len(),
            1
        );
        assert!(inventory.set(InventorySection::Armor, 9, ItemStack::single("x")).is_some());
    }

    #[test]
    fn test_status_effects_expire_and_cure() {
        let mut effects = StatusEffects::default();
        effects.add(StatusEffect::new(EffectKind::Poison, 2, 0));
        effects.add(StatusEffect::new(EffectKind::Strength, 1, 0));
        effects.tick();
        assert!(!effects.has(EffectKind::Strength));
        assert!(effects.has(EffectKind::Poison));
        assert_eq!(effects.remove_harmful(), 1);
        assert!(!effects.has(EffectKind::Poison));
    }
}
