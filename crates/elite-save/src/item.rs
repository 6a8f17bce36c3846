//! Items and Attributes
//!
//! Plain data for equipment and attribute modifiers shared by the save
//! format and the simulation core.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stack of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: String,
    pub count: u32,
    /// Identity of the thief that took this stack, if it was stolen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stolen_by: Option<Uuid>,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
            stolen_by: None,
        }
    }

    pub fn single(item: impl Into<String>) -> Self {
        Self::new(item, 1)
    }

    pub fn with_thief(mut self, thief: Uuid) -> Self {
        self.stolen_by = Some(thief);
        self
    }

    pub fn is_stolen(&self) -> bool {
        self.stolen_by.is_some()
    }
}

/// Equipment slot on an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    MainHand,
    OffHand,
    Head,
    Chest,
    Legs,
    Feet,
}

/// Attribute an agent may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    MaxHealth,
    AttackDamage,
    MovementSpeed,
    KnockbackResistance,
    FollowRange,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::MaxHealth => "max_health",
            AttributeKind::AttackDamage => "attack_damage",
            AttributeKind::MovementSpeed => "movement_speed",
            AttributeKind::KnockbackResistance => "knockback_resistance",
            AttributeKind::FollowRange => "follow_range",
        }
    }
}

/// How a modifier combines with the base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModifierOperation {
    /// base + amount
    #[default]
    Add,
    /// value * (1 + amount), applied after all additions
    MultiplyBase,
}

/// A named modifier applied on top of an attribute's base value.
///
/// Names are unique per agent: applying a modifier with an existing name
/// replaces it instead of stacking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeModifier {
    pub name: String,
    pub attribute: AttributeKind,
    pub amount: f32,
    #[serde(default)]
    pub operation: ModifierOperation,
}

impl AttributeModifier {
    pub fn add(name: impl Into<String>, attribute: AttributeKind, amount: f32) -> Self {
        Self {
            name: name.into(),
            attribute,
            amount,
            operation: ModifierOperation::Add,
        }
    }

    pub fn multiply(name: impl Into<String>, attribute: AttributeKind, amount: f32) -> Self {
        Self {
            name: name.into(),
            attribute,
            amount,
            operation: ModifierOperation::MultiplyBase,
        }
    }
}
