//! Save format tests against the sample fixture.

use elite_save::{PatternData, PatternKey, ProfileField, SaveFile};
use std::fs;

fn load_fixture() -> SaveFile {
    let content =
        fs::read_to_string("tests/fixtures/sample_save.json").expect("Failed to read fixture");
    SaveFile::from_json(&content).expect("Failed to parse fixture")
}

#[test]
fn test_fixture_loads() {
    let save = load_fixture();
    assert_eq!(save.tick, 240);
    assert_eq!(save.agents.len(), 3);
    assert_eq!(save.agents.iter().filter(|a| a.player).count(), 1);
}

#[test]
fn test_undecided_player_profile() {
    let save = load_fixture();
    let player = save.agents.iter().find(|a| a.player).unwrap();
    for field in ProfileField::DIMENSIONS {
        assert!(!player.profile.has_field(field));
    }
    assert!(!player.profile.has_field(ProfileField::Elite));
}

#[test]
fn test_charge_grant_without_data() {
    let save = load_fixture();
    let zombie = save.agents.iter().find(|a| a.species == "zombie").unwrap();
    let elite = zombie.profile.elite().unwrap();
    assert!(elite.is_granted(PatternKey::Charge));
    assert!(elite.pattern_data(PatternKey::Charge).is_none());
    assert!(zombie.profile.is_fully_decided());
    assert!(!zombie.profile.needs_init());
}

#[test]
fn test_spawner_data_is_typed() {
    let save = load_fixture();
    let skeleton = save.agents.iter().find(|a| a.species == "skeleton").unwrap();
    let elite = skeleton.profile.elite().unwrap();
    match elite.pattern_data(PatternKey::Spawner) {
        Some(PatternData::Spawner(state)) => {
            assert_eq!(state.cooldown, 37);
            assert_eq!(state.total_weight(), 4);
            assert_eq!(state.next.as_deref(), Some("zombie"));
        }
        other => panic!("unexpected spawner data: {:?}", other),
    }
}

#[test]
fn test_reserialization_is_stable() {
    let save = load_fixture();
    let json = save.to_json().unwrap();
    let again = SaveFile::from_json(&json).unwrap();
    assert_eq!(again, save);
}
