//! Agent Lifecycle
//!
//! Attaching freshly spawned or loaded agents, removing dead ones and
//! counting ticks.

use bevy_ecs::prelude::*;

use crate::assignment::{attach_agent, attach_with, EliteCatalog};
use crate::behaviors::{BehaviorCtx, EliteGoals, ScanBudget};
use crate::components::{Agent, Health, PendingAttach, WorldClock};
use crate::config::EliteConfig;
use crate::services::mounts;
use crate::systems::deferred::{defer, Flush};

fn world_started(world: &World) -> bool {
    world
        .get_resource::<WorldClock>()
        .is_some_and(|clock| clock.has_started())
}

/// Attaches every agent waiting for it.
///
/// Agents that appear before the first tick has completed are handed to
/// the deferred queue instead, which holds them until the world is running.
pub fn attach_pending_agents(world: &mut World) {
    let mut query = world.query_filtered::<Entity, With<PendingAttach>>();
    let mut pending: Vec<Entity> = query.iter(world).collect();
    if pending.is_empty() {
        return;
    }
    pending.sort();

    let wait_for_start = world
        .get_resource::<EliteConfig>()
        .map_or(true, |config| config.general.defer_until_first_tick);

    if wait_for_start && !world_started(world) {
        for entity in pending {
            if let Some(mut agent) = world.get_entity_mut(entity) {
                agent.remove::<PendingAttach>();
            }
            defer(world, "lifecycle.attach", move |world| {
                if !world_started(world) {
                    return Flush::Pending;
                }
                attach_agent(world, entity);
                Flush::Done
            });
        }
        return;
    }

    let config = world
        .get_resource::<EliteConfig>()
        .cloned()
        .unwrap_or_default();
    let catalog = world
        .get_resource::<EliteCatalog>()
        .cloned()
        .unwrap_or_else(|| EliteCatalog::from_config(&config));
    for entity in pending {
        attach_with(world, entity, &config, &catalog);
    }
}

/// Stops the goals of dead agents, unseats their riders and despawns them.
pub fn remove_dead_agents(world: &mut World) {
    let mut query = world.query_filtered::<(Entity, &Health), With<Agent>>();
    let mut dead: Vec<Entity> = query
        .iter(world)
        .filter(|(_, health)| !health.is_alive())
        .map(|(entity, _)| entity)
        .collect();
    dead.sort();

    for entity in dead {
        let goals = world
            .get_entity_mut(entity)
            .and_then(|mut agent| agent.take::<EliteGoals>());
        if let Some(mut goals) = goals {
            let mut budget = ScanBudget::new(0);
            let mut ctx = BehaviorCtx::new(world, entity, &mut budget);
            goals.stop_all(&mut ctx);
        }
        mounts::dismount_all(world, entity);
        mounts::dismount(world, entity);
        tracing::debug!(?entity, "agent removed");
        world.despawn(entity);
    }
}

pub fn advance_clock(mut clock: ResMut<WorldClock>) {
    clock.tick += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::test_support::{arena, mob};
    use crate::components::RidingOn;
    use crate::services::spawning::spawn_agent;
    use crate::systems::deferred::{flush_deferred, DeferredActions};
    use elite_save::PatternKey;
    use glam::Vec3;

    #[test]
    fn test_attach_waits_for_first_tick() {
        let mut world = arena();
        world.insert_resource(WorldClock { tick: 0 });
        let agent = spawn_agent(&mut world, "zombie", Vec3::ZERO).unwrap();

        attach_pending_agents(&mut world);
        assert!(world.get::<EliteGoals>(agent).is_none());
        assert_eq!(world.resource::<DeferredActions>().labels(), vec!["lifecycle.attach"]);

        flush_deferred(&mut world);
        assert!(world.get::<EliteGoals>(agent).is_none());
        assert_eq!(world.resource::<DeferredActions>().len(), 1);

        world.resource_mut::<WorldClock>().tick = 1;
        flush_deferred(&mut world);
        assert!(world.get::<EliteGoals>(agent).is_some());
        assert!(world.resource::<DeferredActions>().is_empty());
    }

    #[test]
    fn test_attach_immediately_once_running() {
        let mut world = arena();
        let agent = spawn_agent(&mut world, "zombie", Vec3::ZERO).unwrap();
        attach_pending_agents(&mut world);
        assert!(world.get::<EliteGoals>(agent).is_some());
        assert!(world.get::<PendingAttach>(agent).is_none());
    }

    #[test]
    fn test_one_pass_attaches_every_pending_agent_from_shared_tables() {
        let mut world = arena();
        let mut config = EliteConfig::default();
        config.general.elite_chances = vec![1.0];
        world.insert_resource(config);
        world.insert_resource(EliteCatalog::with_weights(&[(PatternKey::Barrage, 1)]));
        let agents: Vec<Entity> = (0..3)
            .map(|i| spawn_agent(&mut world, "skeleton", Vec3::new(i as f32 * 2.0, 0.0, 0.0)).unwrap())
            .collect();

        attach_pending_agents(&mut world);

        for agent in agents {
            assert_eq!(
                world.get::<EliteGoals>(agent).unwrap().keys(),
                vec![PatternKey::Barrage]
            );
        }
        assert_eq!(world.resource::<EliteCatalog>().total_weight(), 1);
        assert_eq!(world.resource::<EliteConfig>().general.elite_chances, vec![1.0]);
    }

    #[test]
    fn test_dead_vehicle_drops_rider_before_despawn() {
        let mut world = arena();
        let vehicle = mob(&mut world, "zombie", Vec3::ZERO);
        let rider = mob(&mut world, "zombie", Vec3::new(1.0, 0.0, 0.0));
        mounts::mount(&mut world, rider, vehicle).unwrap();
        world.get_mut::<Health>(vehicle).unwrap().current = 0.0;

        remove_dead_agents(&mut world);

        assert!(world.get_entity(vehicle).is_none());
        assert!(world.get::<RidingOn>(rider).is_none());
    }
}
