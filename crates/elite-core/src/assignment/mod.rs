//! Assignment Engine
//!
//! Turns one-time random rolls into durable profile state, then attaches
//! the granted behaviors to the live agent. Each decision is written to the
//! profile before it is applied; a decided field is never rolled again.

use bevy_ecs::prelude::*;
use rand::Rng;

use elite_save::{EliteRecord, Profile, ProfileField};

pub mod catalog;
pub mod init;

pub use catalog::{EliteCatalog, PatternDef};
pub use init::{apply_init_effects, modifier_name};

use crate::behaviors::EliteGoals;
use crate::components::{AgentProfile, AgentRng, Dispositions, PendingAttach, Player, Species};
use crate::config::{DimensionConfig, DimensionsConfig, EliteConfig, GeneralConfig};

fn dimension(config: &DimensionsConfig, field: ProfileField) -> Option<&DimensionConfig> {
    match field {
        ProfileField::Ride => Some(&config.ride),
        ProfileField::Depacify => Some(&config.depacify),
        ProfileField::BreakDoors => Some(&config.break_doors),
        ProfileField::Griefing => Some(&config.griefing),
        ProfileField::Fiddling => Some(&config.fiddling),
        ProfileField::DodgeArrows => Some(&config.dodge_arrows),
        ProfileField::Elite => None,
    }
}

/// Decides every single-roll dimension still open for this species.
///
/// Dimensions whose whitelist excludes the species stay undecided. The
/// dodge chance stores the configured value on success so later config
/// edits leave existing agents alone. Returns how many fields were written.
pub fn decide_dimensions<R: Rng>(
    profile: &mut Profile,
    species: &str,
    config: &DimensionsConfig,
    rng: &mut R,
) -> usize {
    let mut decided = 0;
    for field in ProfileField::DIMENSIONS {
        if profile.has_field(field) {
            continue;
        }
        let Some(dimension) = dimension(config, field) else {
            continue;
        };
        if !dimension.allows(species) {
            continue;
        }
        let success = rng.gen::<f32>() < dimension.chance;
        let written = match field {
            ProfileField::DodgeArrows => {
                let chance = if success { dimension.chance } else { 0.0 };
                profile.set_chance(field, chance)
            }
            _ => profile.set_flag(field, success),
        };
        match written {
            Ok(()) => decided += 1,
            Err(e) => tracing::error!(error = %e, "dimension write failed"),
        }
    }
    decided
}

/// Decides the elite grant if it is still open.
///
/// Every entry of the chance list is an independent roll; each success
/// adds one weighted draw from the catalog. Repeated keys collapse. An
/// empty outcome is still recorded. Returns whether a decision was made.
pub fn decide_elite<R: Rng>(
    profile: &mut Profile,
    species: &str,
    general: &GeneralConfig,
    catalog: &EliteCatalog,
    rng: &mut R,
) -> bool {
    if profile.has_field(ProfileField::Elite) || !general.allows_elite(species) {
        return false;
    }
    let mut record = EliteRecord::new();
    for chance in &general.elite_chances {
        if rng.gen::<f32>() < *chance {
            if let Some(key) = catalog.roll(rng) {
                record.grant(key);
            }
        }
    }
    let granted: Vec<_> = record.granted().collect();
    match profile.set_elite(record) {
        Ok(()) => {
            tracing::debug!(species, ?granted, "elite decided");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "elite write failed");
            false
        }
    }
}

/// Decides open fields, then builds the agent's behaviors and runs one-time
/// initialization if it is still owed. Players are left alone.
///
/// Reads configuration and catalog from the world; batch callers should
/// take them once and use [`attach_with`].
pub fn attach_agent(world: &mut World, entity: Entity) {
    let config = world
        .get_resource::<EliteConfig>()
        .cloned()
        .unwrap_or_default();
    let catalog = world
        .get_resource::<EliteCatalog>()
        .cloned()
        .unwrap_or_else(|| EliteCatalog::from_config(&config));
    attach_with(world, entity, &config, &catalog);
}

pub fn attach_with(world: &mut World, entity: Entity, config: &EliteConfig, catalog: &EliteCatalog) {
    let Some(mut agent) = world.get_entity_mut(entity) else {
        return;
    };
    agent.remove::<PendingAttach>();
    if agent.contains::<Player>() {
        return;
    }
    let Some(species) = agent.get::<Species>().map(|species| species.0.clone()) else {
        return;
    };

    let owes_init = {
        let mut query = world.query::<(&mut AgentProfile, &mut AgentRng)>();
        let Ok((mut profile, mut rng)) = query.get_mut(world, entity) else {
            return;
        };
        let profile = &mut profile.0;
        decide_dimensions(profile, &species, &config.dimensions, &mut rng.0);
        decide_elite(profile, &species, &config.general, catalog, &mut rng.0);
        profile.take_needs_init()
    };

    let granted: Vec<_> = world
        .get::<AgentProfile>(entity)
        .and_then(|profile| profile.0.elite())
        .map(|elite| elite.granted().collect())
        .unwrap_or_default();

    if owes_init {
        for key in &granted {
            if let Some(def) = catalog.get(*key) {
                (def.initialize)(world, entity, *key, config);
            }
        }
    }

    let mut goals = EliteGoals::new();
    if let Some(profile) = world.get::<AgentProfile>(entity) {
        for key in &granted {
            let Some(def) = catalog.get(*key) else {
                tracing::warn!(pattern = %key, "granted pattern missing from catalog");
                continue;
            };
            let data = profile.0.elite().and_then(|elite| elite.pattern_data(*key));
            goals.add((def.create)(config, data));
        }
    }
    let dispositions = world
        .get::<AgentProfile>(entity)
        .map(|profile| Dispositions::from_profile(&profile.0))
        .unwrap_or_default();

    if !goals.is_empty() {
        tracing::info!(?entity, species = %species, patterns = ?goals.keys(), initialized = owes_init, "elite attached");
    }
    if let Some(mut agent) = world.get_entity_mut(entity) {
        agent.insert((goals, dispositions));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::test_support::arena;
    use crate::components::{Attributes, Equipment};
    use crate::services::spawning::spawn_agent;
    use elite_save::{AttributeKind, EquipmentSlot, PatternKey};
    use glam::Vec3;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn always() -> GeneralConfig {
        GeneralConfig {
            elite_chances: vec![1.0, 1.0],
            ..GeneralConfig::default()
        }
    }

    #[test]
    fn test_decide_elite_only_once() {
        let catalog = EliteCatalog::default();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut profile = Profile::new();

        assert!(decide_elite(&mut profile, "zombie", &always(), &catalog, &mut rng));
        let first: Vec<_> = profile.elite().unwrap().granted().collect();
        assert!(!first.is_empty());

        assert!(!decide_elite(&mut profile, "zombie", &always(), &catalog, &mut rng));
        let second: Vec<_> = profile.elite().unwrap().granted().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_stacked_rolls_of_same_pattern_collapse() {
        let catalog = EliteCatalog::with_weights(&[(PatternKey::Leap, 1)]);
        let mut rng = SmallRng::seed_from_u64(9);
        let mut profile = Profile::new();
        decide_elite(&mut profile, "zombie", &always(), &catalog, &mut rng);
        assert_eq!(profile.elite().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_outcome_is_recorded() {
        let general = GeneralConfig {
            elite_chances: vec![0.0],
            ..GeneralConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let mut profile = Profile::new();
        assert!(decide_elite(&mut profile, "zombie", &general, &EliteCatalog::default(), &mut rng));
        assert!(profile.elite().unwrap().is_empty());
    }

    #[test]
    fn test_whitelist_leaves_dimension_undecided() {
        let config = DimensionsConfig::default();
        let mut rng = SmallRng::seed_from_u64(2);
        let mut profile = Profile::new();
        let decided = decide_dimensions(&mut profile, "skeleton", &config, &mut rng);

        assert_eq!(decided, 4);
        assert!(!profile.has_field(ProfileField::Depacify));
        assert!(!profile.has_field(ProfileField::BreakDoors));
        assert!(profile.has_field(ProfileField::Ride));
        assert_eq!(decide_dimensions(&mut profile, "skeleton", &config, &mut rng), 0);
    }

    #[test]
    fn test_dodge_stores_configured_chance() {
        let mut config = DimensionsConfig::default();
        config.dodge_arrows.chance = 1.0;
        let mut rng = SmallRng::seed_from_u64(4);
        let mut profile = Profile::new();
        decide_dimensions(&mut profile, "zombie", &config, &mut rng);
        assert_eq!(profile.chance(ProfileField::DodgeArrows), Some(1.0));
    }

    #[test]
    fn test_attach_initializes_once_and_builds_goals() {
        let mut world = arena();
        let mut config = EliteConfig::default();
        config.general.elite_chances = vec![1.0];
        world.insert_resource(EliteCatalog::with_weights(&[(PatternKey::Barrage, 1)]));
        world.insert_resource(config);

        let agent = spawn_agent(&mut world, "skeleton", Vec3::ZERO).unwrap();
        attach_agent(&mut world, agent);

        let goals = world.get::<EliteGoals>(agent).unwrap();
        assert_eq!(goals.keys(), vec![PatternKey::Barrage]);
        assert!(world.get::<PendingAttach>(agent).is_none());
        assert!(world.get::<Dispositions>(agent).is_some());
        let profile = &world.get::<AgentProfile>(agent).unwrap().0;
        assert!(!profile.needs_init());
        assert!(profile.has_field(ProfileField::Elite));
        assert_eq!(
            world
                .get::<Equipment>(agent)
                .unwrap()
                .get(EquipmentSlot::MainHand)
                .unwrap()
                .item,
            "bow"
        );

        // Re-attaching (as after a reload) keeps the grant and skips init.
        world
            .get_mut::<Equipment>(agent)
            .unwrap()
            .take(EquipmentSlot::MainHand);
        attach_agent(&mut world, agent);
        assert!(world.get::<Equipment>(agent).unwrap().get(EquipmentSlot::MainHand).is_none());
        assert_eq!(world.get::<EliteGoals>(agent).unwrap().keys(), vec![PatternKey::Barrage]);
        assert!(world
            .get::<Attributes>(agent)
            .unwrap()
            .has(AttributeKind::AttackDamage));
    }
}
