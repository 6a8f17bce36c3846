//! Spawner waves running inside a full simulation.

use bevy_ecs::prelude::*;
use std::collections::BTreeMap;
use uuid::Uuid;

use elite_core::services::spawning::find_by_id;
use elite_core::services::BlockGrid;
use elite_core::{AgentProfile, EliteConfig, EliteSim, Species, Target};
use elite_save::{
    AgentRecord, BodyRecord, EliteRecord, PatternData, PatternKey, Profile, SaveFile,
    SpawnerState, WeightedSpawn,
};

const HERO: Uuid = Uuid::from_u128(1);
const SPAWNER: Uuid = Uuid::from_u128(2);

fn record(id: Uuid, species: &str, player: bool, position: [f32; 3], profile: Profile) -> AgentRecord {
    AgentRecord {
        id,
        species: species.to_string(),
        player,
        body: BodyRecord {
            position,
            velocity: [0.0; 3],
            yaw: 0.0,
        },
        health: 20.0,
        base_attributes: BTreeMap::new(),
        modifiers: Vec::new(),
        equipment: BTreeMap::new(),
        target: (!player).then_some(HERO),
        riding: None,
        profile,
    }
}

fn ready_spawner(pool: Vec<WeightedSpawn>, max_nearby: u32) -> Profile {
    let mut elite = EliteRecord::with_grants([PatternKey::Spawner]);
    elite.set_pattern_data(PatternData::Spawner(SpawnerState {
        cooldown: 0,
        min_cooldown: 200,
        max_cooldown: 400,
        spawn_count: 3,
        spawn_range: 4.0,
        max_nearby,
        activation_range: 16.0,
        placement_attempts: 8,
        pool,
        next: None,
    }));
    let mut profile = Profile::new();
    profile.set_elite(elite).unwrap();
    profile
}

fn arena_sim(grid: BlockGrid, spawner: Profile) -> EliteSim {
    let mut sim = EliteSim::new(EliteConfig::default(), grid, 9);
    sim.load(&SaveFile::new(
        10,
        vec![
            record(HERO, "player", true, [6.0, 0.0, 0.0], Profile::new()),
            record(SPAWNER, "skeleton", false, [0.0, 0.0, 0.0], spawner),
        ],
    ));
    sim
}

fn zombies(sim: &mut EliteSim) -> Vec<Entity> {
    let world = sim.world_mut();
    let mut query = world.query::<(Entity, &Species)>();
    query
        .iter(world)
        .filter(|(_, species)| species.is("zombie"))
        .map(|(entity, _)| entity)
        .collect()
}

#[test]
fn test_wave_reinforcements_share_target_and_never_roll() {
    let mut sim = arena_sim(
        BlockGrid::flat(0),
        ready_spawner(vec![WeightedSpawn::new("zombie", 1)], 10),
    );
    sim.step();
    sim.step();

    let hero = find_by_id(sim.world_mut(), HERO).unwrap();
    let spawned = zombies(&mut sim);
    assert_eq!(spawned.len(), 3);
    for zombie in spawned {
        let world = sim.world();
        assert_eq!(world.get::<Target>(zombie).unwrap().0, Some(hero));
        let profile = &world.get::<AgentProfile>(zombie).unwrap().0;
        assert!(profile.elite().unwrap().is_empty());
        assert!(!profile.needs_init());
    }

    let save = sim.save();
    let data = save
        .agent(SPAWNER)
        .and_then(|agent| agent.profile.elite())
        .and_then(|elite| elite.pattern_data(PatternKey::Spawner));
    match data {
        Some(PatternData::Spawner(state)) => {
            assert!((199..=400).contains(&state.cooldown));
            assert_eq!(state.next.as_deref(), Some("zombie"));
        }
        other => panic!("missing spawner state: {:?}", other),
    }
}

#[test]
fn test_nearby_cap_stops_the_wave() {
    let mut sim = arena_sim(
        BlockGrid::flat(0),
        ready_spawner(vec![WeightedSpawn::new("zombie", 1)], 1),
    );
    sim.step();
    assert_eq!(zombies(&mut sim).len(), 1);
}

#[test]
fn test_unknown_pool_species_spawns_nothing() {
    let mut sim = arena_sim(
        BlockGrid::flat(0),
        ready_spawner(vec![WeightedSpawn::new("wraith", 1)], 10),
    );
    sim.step();
    let world = sim.world_mut();
    let mut query = world.query::<&Species>();
    assert_eq!(query.iter(world).count(), 2);
}

#[test]
fn test_active_spawner_writes_profile_without_a_save() {
    let mut sim = arena_sim(
        BlockGrid::flat(0),
        ready_spawner(vec![WeightedSpawn::new("zombie", 1)], 10),
    );
    sim.step_n(33);

    let spawner = find_by_id(sim.world_mut(), SPAWNER).unwrap();
    let profile = &sim.world().get::<AgentProfile>(spawner).unwrap().0;
    match profile.elite().and_then(|elite| elite.pattern_data(PatternKey::Spawner)) {
        Some(PatternData::Spawner(state)) => {
            assert!(state.cooldown > 0);
            assert_eq!(state.next.as_deref(), Some("zombie"));
        }
        other => panic!("missing spawner state: {:?}", other),
    }
}
