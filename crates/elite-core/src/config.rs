//! Configuration System
//!
//! Loads chances, pattern weights and tuning from a TOML file. Every section
//! falls back to defaults, so a partial file only overrides what it names.
//! Weights are read once into the catalog; editing them takes a reload.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use elite_save::{AttributeKind, EquipmentSlot, ModifierOperation, PatternKey, WeightedSpawn};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "elite.toml";

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete elite behavior configuration.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EliteConfig {
    pub general: GeneralConfig,
    pub dimensions: DimensionsConfig,
    pub patterns: PatternsConfig,
    pub species: Vec<SpeciesConfig>,
}

impl Default for EliteConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            dimensions: DimensionsConfig::default(),
            patterns: PatternsConfig::default(),
            species: default_species(),
        }
    }
}

impl EliteConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: EliteConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from the given path, or uses defaults if it cannot be read.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::from_file(path.as_ref()).unwrap_or_else(|e| {
            tracing::warn!(
                "Could not load {}: {}. Using defaults.",
                path.as_ref().display(),
                e
            );
            Self::default()
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn species(&self, key: &str) -> Option<&SpeciesConfig> {
        self.species.iter().find(|s| s.key == key)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for chance in &self.general.elite_chances {
            check_chance("general.elite_chances", *chance)?;
        }
        for (name, dimension) in self.dimensions.iter() {
            check_chance(name, dimension.chance)?;
        }

        let p = &self.patterns;
        check_band("patterns.charge range", p.charge.min_range, p.charge.max_range)?;
        check_band("patterns.jump range", p.jump.min_range, p.jump.max_range)?;
        check_band("patterns.leap range", p.leap.min_range, p.leap.max_range)?;
        check_band("patterns.barrage range", p.barrage.min_range, p.barrage.max_range)?;
        check_band(
            "patterns.sprint end_range/range_min",
            p.sprint.end_range,
            p.sprint.range_min,
        )?;
        check_band(
            "patterns.shaman follow band",
            p.shaman.follow_inner,
            p.shaman.follow_outer,
        )?;
        if p.barrage.cooldown_min > p.barrage.cooldown_max {
            return Err(ConfigError::Invalid(
                "patterns.barrage cooldown_min exceeds cooldown_max".to_string(),
            ));
        }
        if p.barrage.shoot_interval == 0 {
            return Err(ConfigError::Invalid(
                "patterns.barrage shoot_interval must be positive".to_string(),
            ));
        }
        if p.spawner.min_cooldown > p.spawner.max_cooldown {
            return Err(ConfigError::Invalid(
                "patterns.spawner min_cooldown exceeds max_cooldown".to_string(),
            ));
        }
        check_chance("patterns.throw_ally.throw_chance", p.throw_ally.throw_chance)?;
        check_chance("patterns.throw_enemy.throw_chance", p.throw_enemy.throw_chance)?;
        Ok(())
    }
}

fn check_chance(name: &str, chance: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&chance) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} chance {} is outside [0, 1]",
            name, chance
        )))
    }
}

fn check_band(name: &str, low: f32, high: f32) -> Result<(), ConfigError> {
    if low <= high {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{}: {} is greater than {}",
            name, low, high
        )))
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// One independent roll per entry; every success grants one more pattern
    pub elite_chances: Vec<f32>,
    /// Species that may roll elite patterns (empty = all non-player species)
    pub elite_species: Vec<String>,
    /// Agent scans allowed per tick across all behaviors
    pub scan_budget: u32,
    /// Agents spawned before the first tick finishes are attached through
    /// the deferred queue
    pub defer_until_first_tick: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            elite_chances: vec![0.05, 0.01],
            elite_species: Vec::new(),
            scan_budget: 64,
            defer_until_first_tick: true,
        }
    }
}

impl GeneralConfig {
    pub fn allows_elite(&self, species: &str) -> bool {
        self.elite_species.is_empty() || self.elite_species.iter().any(|s| s == species)
    }
}

/// Chance and species whitelist for one single-roll dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionConfig {
    pub chance: f32,
    /// Species allowed to roll (empty = all non-player species)
    pub species: Vec<String>,
}

impl DimensionConfig {
    pub fn new(chance: f32) -> Self {
        Self {
            chance,
            species: Vec::new(),
        }
    }

    pub fn for_species(chance: f32, species: &[&str]) -> Self {
        Self {
            chance,
            species: species.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn allows(&self, species: &str) -> bool {
        self.species.is_empty() || self.species.iter().any(|s| s == species)
    }
}

impl Default for DimensionConfig {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// All single-roll dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionsConfig {
    pub ride: DimensionConfig,
    pub depacify: DimensionConfig,
    pub break_doors: DimensionConfig,
    pub griefing: DimensionConfig,
    pub fiddling: DimensionConfig,
    pub dodge_arrows: DimensionConfig,
}

impl Default for DimensionsConfig {
    fn default() -> Self {
        Self {
            ride: DimensionConfig::new(0.05),
            depacify: DimensionConfig::for_species(0.01, &["pig", "cow", "sheep", "chicken"]),
            break_doors: DimensionConfig::for_species(0.2, &["zombie", "husk"]),
            griefing: DimensionConfig::new(0.1),
            fiddling: DimensionConfig::new(0.2),
            dodge_arrows: DimensionConfig::new(0.25),
        }
    }
}

impl DimensionsConfig {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &DimensionConfig)> {
        [
            ("dimensions.ride", &self.ride),
            ("dimensions.depacify", &self.depacify),
            ("dimensions.break_doors", &self.break_doors),
            ("dimensions.griefing", &self.griefing),
            ("dimensions.fiddling", &self.fiddling),
            ("dimensions.dodge_arrows", &self.dodge_arrows),
        ]
        .into_iter()
    }
}

/// One attribute modifier granted at initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierConfig {
    pub attribute: AttributeKind,
    pub amount: f32,
    #[serde(default)]
    pub operation: ModifierOperation,
}

impl ModifierConfig {
    pub fn add(attribute: AttributeKind, amount: f32) -> Self {
        Self {
            attribute,
            amount,
            operation: ModifierOperation::Add,
        }
    }
}

/// One-time effects applied the first time a pattern is attached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InitEffects {
    pub modifiers: Vec<ModifierConfig>,
    pub equipment: BTreeMap<EquipmentSlot, String>,
}

impl InitEffects {
    fn modifier(attribute: AttributeKind, amount: f32) -> Self {
        Self {
            modifiers: vec![ModifierConfig::add(attribute, amount)],
            equipment: BTreeMap::new(),
        }
    }

    fn with_modifier(mut self, attribute: AttributeKind, amount: f32) -> Self {
        self.modifiers.push(ModifierConfig::add(attribute, amount));
        self
    }

    fn with_item(mut self, slot: EquipmentSlot, item: &str) -> Self {
        self.equipment.insert(slot, item.to_string());
        self
    }
}

/// Tuning for every pattern, keyed like the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    pub charge: ChargeConfig,
    pub jump: JumpConfig,
    pub leap: LeapConfig,
    pub sprint: SprintConfig,
    pub barrage: BarrageConfig,
    pub shaman: ShamanConfig,
    pub thief: ThiefConfig,
    pub throw_ally: ThrowAllyConfig,
    pub throw_enemy: ThrowEnemyConfig,
    pub spawner: SpawnerConfig,
}

impl PatternsConfig {
    pub fn weight(&self, key: PatternKey) -> u32 {
        match key {
            PatternKey::Charge => self.charge.weight,
            PatternKey::Jump => self.jump.weight,
            PatternKey::Leap => self.leap.weight,
            PatternKey::Sprint => self.sprint.weight,
            PatternKey::Barrage => self.barrage.weight,
            PatternKey::Shaman => self.shaman.weight,
            PatternKey::Thief => self.thief.weight,
            PatternKey::ThrowAlly => self.throw_ally.weight,
            PatternKey::ThrowEnemy => self.throw_enemy.weight,
            PatternKey::Spawner => self.spawner.weight,
        }
    }

    pub fn init(&self, key: PatternKey) -> &InitEffects {
        match key {
            PatternKey::Charge => &self.charge.init,
            PatternKey::Jump => &self.jump.init,
            PatternKey::Leap => &self.leap.init,
            PatternKey::Sprint => &self.sprint.init,
            PatternKey::Barrage => &self.barrage.init,
            PatternKey::Shaman => &self.shaman.init,
            PatternKey::Thief => &self.thief.init,
            PatternKey::ThrowAlly => &self.throw_ally.init,
            PatternKey::ThrowEnemy => &self.throw_enemy.init,
            PatternKey::Spawner => &self.spawner.init,
        }
    }
}

/// Charge: wind up, then rush the target in a straight line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeConfig {
    pub weight: u32,
    pub init: InitEffects,
    pub cooldown: u32,
    pub min_range: f32,
    pub max_range: f32,
    pub charge_up_ticks: u32,
    pub charge_ticks: u32,
    /// Horizontal blocks per tick while charging
    pub speed: f32,
    /// Added to the agent's attack damage on impact
    pub damage: f32,
    pub knockback: f32,
    /// Damage taken when charging into a wall
    pub self_damage: f32,
    pub stun_ticks: u32,
    pub step_height: f32,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            weight: 1,
            init: InitEffects::modifier(AttributeKind::KnockbackResistance, 0.5),
            cooldown: 60,
            min_range: 3.0,
            max_range: 16.0,
            charge_up_ticks: 30,
            charge_ticks: 40,
            speed: 0.6,
            damage: 5.0,
            knockback: 1.5,
            self_damage: 2.0,
            stun_ticks: 50,
            step_height: 1.0,
        }
    }
}

/// Jump: a vertical hop toward a close target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    pub weight: u32,
    pub init: InitEffects,
    pub cooldown: u32,
    pub min_range: f32,
    pub max_range: f32,
    pub jump_power: f32,
    pub forward_power: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            weight: 1,
            init: InitEffects::modifier(AttributeKind::MovementSpeed, 0.02),
            cooldown: 40,
            min_range: 1.5,
            max_range: 6.0,
            jump_power: 0.9,
            forward_power: 0.2,
        }
    }
}

/// Leap: a ballistic pounce onto the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeapConfig {
    pub weight: u32,
    pub init: InitEffects,
    pub cooldown: u32,
    pub min_range: f32,
    pub max_range: f32,
    /// Horizontal impulse per block of distance
    pub leap_speed: f32,
    pub arc: f32,
}

impl Default for LeapConfig {
    fn default() -> Self {
        Self {
            weight: 1,
            init: InitEffects::modifier(AttributeKind::MovementSpeed, 0.02),
            cooldown: 50,
            min_range: 3.0,
            max_range: 8.0,
            leap_speed: 0.15,
            arc: 0.45,
        }
    }
}

/// Sprint: close long distances at boosted speed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SprintConfig {
    pub weight: u32,
    pub init: InitEffects,
    /// Engage when farther than this
    pub range_min: f32,
    /// Disengage when closer than this
    pub end_range: f32,
    pub speed_multiplier: f32,
    pub repath_ticks: u32,
}

impl Default for SprintConfig {
    fn default() -> Self {
        Self {
            weight: 1,
            init: InitEffects::modifier(AttributeKind::MovementSpeed, 0.03),
            range_min: 8.0,
            end_range: 4.0,
            speed_multiplier: 1.6,
            repath_ticks: 10,
        }
    }
}

/// Barrage: wind up, then fire a stream of projectiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrageConfig {
    pub weight: u32,
    pub init: InitEffects,
    pub cooldown_min: u32,
    pub cooldown_max: u32,
    pub min_range: f32,
    pub max_range: f32,
    pub charge_up_ticks: u32,
    pub shoot_ticks: u32,
    pub shoot_interval: u32,
    pub projectile_speed: f32,
    pub damage: f32,
    /// Standard deviation of the damage jitter
    pub damage_jitter: f32,
    /// Extra damage per difficulty level
    pub difficulty_bonus: f32,
    /// Vertical aim per block of horizontal distance
    pub arc_factor: f32,
    /// Ticks of target motion to lead by
    pub lead_ticks: f32,
}

impl Default for BarrageConfig {
    fn default() -> Self {
        Self {
            weight: 1,
            init: InitEffects::default().with_item(EquipmentSlot::MainHand, "bow"),
            cooldown_min: 60,
            cooldown_max: 120,
            min_range: 4.0,
            max_range: 20.0,
            charge_up_ticks: 30,
            shoot_ticks: 40,
            shoot_interval: 4,
            projectile_speed: 1.6,
            damage: 2.0,
            damage_jitter: 0.5,
            difficulty_bonus: 0.5,
            arc_factor: 0.2,
            lead_ticks: 5.0,
        }
    }
}

/// Shaman: follow allies and pulse a healing aura.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShamanConfig {
    pub weight: u32,
    pub init: InitEffects,
    pub search_range: f32,
    /// Stop approaching the ally inside this distance
    pub follow_inner: f32,
    /// Start approaching the ally beyond this distance
    pub follow_outer: f32,
    pub speed_multiplier: f32,
    pub aura_radius: f32,
    pub pulse_interval: u32,
    pub heal: f32,
    pub buff_ticks: u32,
}

impl Default for ShamanConfig {
    fn default() -> Self {
        Self {
            weight: 1,
            init: InitEffects::modifier(AttributeKind::MaxHealth, 10.0)
                .with_item(EquipmentSlot::MainHand, "staff"),
            search_range: 16.0,
            follow_inner: 3.0,
            follow_outer: 6.0,
            speed_multiplier: 1.0,
            aura_radius: 8.0,
            pulse_interval: 40,
            heal: 2.0,
            buff_ticks: 60,
        }
    }
}

/// Inventory slot groups a thief may steal from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TheftSlots {
    #[default]
    Hotbar,
    Main,
    Armor,
    HotbarMain,
    HotbarArmor,
    MainArmor,
    All,
}

impl TheftSlots {
    pub fn hotbar(&self) -> bool {
        matches!(
            self,
            TheftSlots::Hotbar | TheftSlots::HotbarMain | TheftSlots::HotbarArmor | TheftSlots::All
        )
    }

    pub fn main(&self) -> bool {
        matches!(
            self,
            TheftSlots::Main | TheftSlots::HotbarMain | TheftSlots::MainArmor | TheftSlots::All
        )
    }

    pub fn armor(&self) -> bool {
        matches!(
            self,
            TheftSlots::Armor | TheftSlots::HotbarArmor | TheftSlots::MainArmor | TheftSlots::All
        )
    }
}

/// Thief: steal from a player, then run away.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThiefConfig {
    pub weight: u32,
    pub init: InitEffects,
    pub slots: TheftSlots,
    /// Ticks after a contact before the next attempt
    pub cooldown: u32,
    pub damage: f32,
    pub reach: f32,
    pub speed_multiplier: f32,
    pub invisibility_ticks: u32,
    pub pickup_delay: u32,
    pub avoid_range: f32,
    pub avoid_speed: f32,
}

impl Default for ThiefConfig {
    fn default() -> Self {
        Self {
            weight: 1,
            init: InitEffects::modifier(AttributeKind::MovementSpeed, 0.05),
            slots: TheftSlots::Hotbar,
            cooldown: 40,
            damage: 1.0,
            reach: 1.5,
            speed_multiplier: 1.2,
            invisibility_ticks: 60,
            pickup_delay: 10,
            avoid_range: 16.0,
            avoid_speed: 1.4,
        }
    }
}

/// Throw-ally: carry a nearby ally toward the target and hurl it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrowAllyConfig {
    pub weight: u32,
    pub init: InitEffects,
    pub cooldown: u32,
    pub search_range: f32,
    pub reach: f32,
    /// Throw checks only succeed this close to the target
    pub throw_range: f32,
    pub throw_chance: f32,
    pub throw_check_interval: u32,
    pub throw_speed: f32,
    pub throw_lift: f32,
    /// Share of the carrier's velocity added to the throw
    pub carrier_velocity_fraction: f32,
    pub max_carry_ticks: u32,
}

impl Default for ThrowAllyConfig {
    fn default() -> Self {
        Self {
            weight: 1,
            init: InitEffects::modifier(AttributeKind::MaxHealth, 10.0)
                .with_modifier(AttributeKind::AttackDamage, 1.0),
            cooldown: 80,
            search_range: 12.0,
            reach: 2.0,
            throw_range: 10.0,
            throw_chance: 0.2,
            throw_check_interval: 5,
            throw_speed: 1.2,
            throw_lift: 0.4,
            carrier_velocity_fraction: 0.5,
            max_carry_ticks: 200,
        }
    }
}

/// Throw-enemy: pick up the target, carry it off and throw it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrowEnemyConfig {
    pub weight: u32,
    pub init: InitEffects,
    pub cooldown: u32,
    pub max_range: f32,
    pub reach: f32,
    pub throw_distance: f32,
    pub throw_chance: f32,
    pub throw_check_interval: u32,
    pub throw_speed: f32,
    pub throw_lift: f32,
    pub carrier_velocity_fraction: f32,
    /// Re-grab attempts allowed when the passenger escapes
    pub max_regrabs: u32,
    pub max_carry_ticks: u32,
}

impl Default for ThrowEnemyConfig {
    fn default() -> Self {
        Self {
            weight: 1,
            init: InitEffects::modifier(AttributeKind::MaxHealth, 10.0)
                .with_modifier(AttributeKind::AttackDamage, 1.0),
            cooldown: 120,
            max_range: 12.0,
            reach: 2.0,
            throw_distance: 8.0,
            throw_chance: 0.15,
            throw_check_interval: 5,
            throw_speed: 1.3,
            throw_lift: 0.5,
            carrier_velocity_fraction: 0.5,
            max_regrabs: 2,
            max_carry_ticks: 200,
        }
    }
}

/// Spawner: periodic waves of reinforcements.
///
/// These values only seed a newly granted spawner; afterwards the saved
/// state is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub weight: u32,
    pub init: InitEffects,
    pub min_cooldown: u32,
    pub max_cooldown: u32,
    pub spawn_count: u32,
    pub spawn_range: f32,
    pub max_nearby: u32,
    pub activation_range: f32,
    pub placement_attempts: u32,
    pub pool: Vec<WeightedSpawn>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            weight: 1,
            init: InitEffects::modifier(AttributeKind::MaxHealth, 10.0)
                .with_item(EquipmentSlot::Head, "spawner"),
            min_cooldown: 200,
            max_cooldown: 400,
            spawn_count: 4,
            spawn_range: 4.0,
            max_nearby: 6,
            activation_range: 16.0,
            placement_attempts: 4,
            pool: vec![
                WeightedSpawn::new("zombie", 3),
                WeightedSpawn::new("skeleton", 1),
            ],
        }
    }
}

/// A registered species descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesConfig {
    pub key: String,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    #[serde(default = "default_max_health")]
    pub max_health: f32,
    /// Passive species carry no attack damage attribute
    #[serde(default)]
    pub attack_damage: Option<f32>,
    #[serde(default = "default_speed")]
    pub movement_speed: f32,
    #[serde(default)]
    pub hostile: bool,
}

fn default_width() -> f32 {
    0.6
}

fn default_height() -> f32 {
    1.95
}

fn default_max_health() -> f32 {
    20.0
}

fn default_speed() -> f32 {
    0.23
}

impl SpeciesConfig {
    fn new(key: &str, max_health: f32, attack_damage: Option<f32>, speed: f32, hostile: bool) -> Self {
        Self {
            key: key.to_string(),
            width: default_width(),
            height: default_height(),
            max_health,
            attack_damage,
            movement_speed: speed,
            hostile,
        }
    }

    fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self::new("zombie", 20.0, Some(3.0), 0.23, true)
    }
}

/// Species known to the default configuration.
pub fn default_species() -> Vec<SpeciesConfig> {
    vec![
        SpeciesConfig::new("player", 20.0, Some(1.0), 0.1, false).sized(0.6, 1.8),
        SpeciesConfig::new("zombie", 20.0, Some(3.0), 0.23, true),
        SpeciesConfig::new("husk", 20.0, Some(3.0), 0.23, true),
        SpeciesConfig::new("skeleton", 20.0, Some(2.0), 0.25, true).sized(0.6, 1.99),
        SpeciesConfig::new("spider", 16.0, Some(2.0), 0.3, true).sized(1.4, 0.9),
        SpeciesConfig::new("silverfish", 8.0, Some(1.0), 0.25, true).sized(0.4, 0.3),
        SpeciesConfig::new("pig", 10.0, None, 0.25, false).sized(0.9, 0.9),
        SpeciesConfig::new("cow", 10.0, None, 0.2, false).sized(0.9, 1.4),
    ]
}
