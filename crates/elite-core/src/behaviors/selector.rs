//! Goal Runner
//!
//! Runs each agent's elite behaviors under a priority and control-flag
//! exclusivity contract:
//! 1. Running goals that can no longer continue are stopped.
//! 2. Idle goals are offered activation in descending priority. A goal may
//!    only start when every running goal sharing one of its control flags
//!    has lower priority and is interruptible; those are stopped first.
//! 3. Every running goal ticks.

use bevy_ecs::prelude::*;

use elite_save::PatternKey;

use super::context::{BehaviorCtx, ScanBudget};
use super::EliteBehavior;
use crate::components::Health;
use crate::config::EliteConfig;

/// One registered behavior.
#[derive(Debug)]
pub struct GoalSlot {
    pub priority: i32,
    pub running: bool,
    pub behavior: Box<dyn EliteBehavior>,
}

/// Component: The agent's elite behaviors
#[derive(Component, Debug, Default)]
pub struct EliteGoals {
    slots: Vec<GoalSlot>,
}

impl EliteGoals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a behavior. Slots stay sorted by descending priority;
    /// equal priorities keep registration order.
    pub fn add(&mut self, behavior: Box<dyn EliteBehavior>) {
        let priority = behavior.priority();
        let index = self
            .slots
            .iter()
            .position(|slot| slot.priority < priority)
            .unwrap_or(self.slots.len());
        self.slots.insert(
            index,
            GoalSlot {
                priority,
                running: false,
                behavior,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn keys(&self) -> Vec<PatternKey> {
        self.slots.iter().map(|slot| slot.behavior.key()).collect()
    }

    pub fn contains(&self, key: PatternKey) -> bool {
        self.slots.iter().any(|slot| slot.behavior.key() == key)
    }

    pub fn is_running(&self, key: PatternKey) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.running && slot.behavior.key() == key)
    }

    pub fn running(&self) -> Vec<PatternKey> {
        self.slots
            .iter()
            .filter(|slot| slot.running)
            .map(|slot| slot.behavior.key())
            .collect()
    }

    pub fn behavior(&self, key: PatternKey) -> Option<&dyn EliteBehavior> {
        self.slots
            .iter()
            .find(|slot| slot.behavior.key() == key)
            .map(|slot| slot.behavior.as_ref())
    }

    pub fn slots(&self) -> &[GoalSlot] {
        &self.slots
    }

    /// Runs one tick of the contract described at the top of this module.
    pub fn update(&mut self, ctx: &mut BehaviorCtx) {
        for slot in self.slots.iter_mut().filter(|slot| slot.running) {
            if !slot.behavior.can_continue(ctx) {
                stop(slot, ctx);
            }
        }

        for index in 0..self.slots.len() {
            if self.slots[index].running {
                continue;
            }
            let Some(conflicts) = self.conflicts_for(index) else {
                continue;
            };
            if !self.slots[index].behavior.can_activate(ctx) {
                continue;
            }
            for conflict in conflicts {
                stop(&mut self.slots[conflict], ctx);
            }
            let slot = &mut self.slots[index];
            tracing::debug!(entity = ?ctx.entity, pattern = %slot.behavior.key(), "activating");
            slot.behavior.on_activate(ctx);
            slot.running = true;
        }

        for slot in self.slots.iter_mut().filter(|slot| slot.running) {
            slot.behavior.tick(ctx);
        }
    }

    /// Running goals that would have to stop for `index` to start, or
    /// `None` if one of them outranks it or refuses interruption.
    fn conflicts_for(&self, index: usize) -> Option<Vec<usize>> {
        let candidate = &self.slots[index];
        let flags = candidate.behavior.controls();
        let mut conflicts = Vec::new();
        for (other, slot) in self.slots.iter().enumerate() {
            if other == index || !slot.running || !slot.behavior.controls().intersects(flags) {
                continue;
            }
            if slot.priority >= candidate.priority || !slot.behavior.is_interruptible() {
                return None;
            }
            conflicts.push(other);
        }
        Some(conflicts)
    }

    /// Stops every running goal; used before the agent is removed.
    pub fn stop_all(&mut self, ctx: &mut BehaviorCtx) {
        for slot in self.slots.iter_mut().filter(|slot| slot.running) {
            stop(slot, ctx);
        }
    }
}

fn stop(slot: &mut GoalSlot, ctx: &mut BehaviorCtx) {
    tracing::debug!(entity = ?ctx.entity, pattern = %slot.behavior.key(), "deactivating");
    slot.behavior.on_deactivate(ctx);
    slot.running = false;
}

/// Ticks elite behaviors for every living agent.
///
/// Each agent's goals are taken out of the world for the duration of its
/// update, so behaviors get exclusive world access.
pub fn run_elite_goals(world: &mut World) {
    let limit = world
        .get_resource::<EliteConfig>()
        .map(|config| config.general.scan_budget)
        .unwrap_or(u32::MAX);
    let mut budget = ScanBudget::new(limit);

    let mut query = world.query_filtered::<(Entity, &Health), With<EliteGoals>>();
    let mut agents: Vec<Entity> = query
        .iter(world)
        .filter(|(_, health)| health.is_alive())
        .map(|(entity, _)| entity)
        .collect();
    agents.sort();

    for entity in agents {
        let Some(mut goals) = world
            .get_entity_mut(entity)
            .and_then(|mut agent| agent.take::<EliteGoals>())
        else {
            continue;
        };
        {
            let mut ctx = BehaviorCtx::new(world, entity, &mut budget);
            goals.update(&mut ctx);
        }
        if let Some(mut agent) = world.get_entity_mut(entity) {
            agent.insert(goals);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::{ControlFlags, PRIORITY_ATTACK, PRIORITY_SUPPORT};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    #[derive(Debug)]
    struct Scripted {
        key: PatternKey,
        flags: ControlFlags,
        priority: i32,
        wants: Arc<AtomicBool>,
        interruptible: bool,
        log: Log,
    }

    impl Scripted {
        fn new(key: PatternKey, flags: ControlFlags, priority: i32, log: &Log) -> Self {
            Self {
                key,
                flags,
                priority,
                wants: Arc::new(AtomicBool::new(true)),
                interruptible: true,
                log: log.clone(),
            }
        }

        fn record(&self, event: &str) {
            self.log.lock().unwrap().push(format!("{}:{}", self.key, event));
        }
    }

    impl EliteBehavior for Scripted {
        fn key(&self) -> PatternKey {
            self.key
        }

        fn controls(&self) -> ControlFlags {
            self.flags
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn can_activate(&mut self, _ctx: &mut BehaviorCtx) -> bool {
            self.wants.load(Ordering::SeqCst)
        }

        fn on_activate(&mut self, _ctx: &mut BehaviorCtx) {
            self.record("start");
        }

        fn tick(&mut self, _ctx: &mut BehaviorCtx) {
            self.record("tick");
        }

        fn can_continue(&mut self, _ctx: &mut BehaviorCtx) -> bool {
            self.wants.load(Ordering::SeqCst)
        }

        fn on_deactivate(&mut self, _ctx: &mut BehaviorCtx) {
            self.record("stop");
        }

        fn is_interruptible(&self) -> bool {
            self.interruptible
        }
    }

    fn run(goals: &mut EliteGoals) {
        let mut world = World::new();
        let entity = world.spawn(Health::new(20.0)).id();
        let mut budget = ScanBudget::new(8);
        let mut ctx = BehaviorCtx::new(&mut world, entity, &mut budget);
        goals.update(&mut ctx);
    }

    #[test]
    fn test_slots_sorted_by_priority() {
        let log = Log::default();
        let mut goals = EliteGoals::new();
        goals.add(Box::new(Scripted::new(PatternKey::Sprint, ControlFlags::MOVE, PRIORITY_SUPPORT, &log)));
        goals.add(Box::new(Scripted::new(PatternKey::Charge, ControlFlags::MOVE, PRIORITY_ATTACK, &log)));
        assert_eq!(goals.keys(), vec![PatternKey::Charge, PatternKey::Sprint]);
    }

    #[test]
    fn test_higher_priority_blocks_conflicting_goal() {
        let log = Log::default();
        let mut goals = EliteGoals::new();
        goals.add(Box::new(Scripted::new(PatternKey::Charge, ControlFlags::MOVE, PRIORITY_ATTACK, &log)));
        goals.add(Box::new(Scripted::new(PatternKey::Sprint, ControlFlags::MOVE, PRIORITY_SUPPORT, &log)));
        goals.add(Box::new(Scripted::new(PatternKey::Spawner, ControlFlags::empty(), PRIORITY_SUPPORT, &log)));

        run(&mut goals);

        assert!(goals.is_running(PatternKey::Charge));
        assert!(!goals.is_running(PatternKey::Sprint));
        assert!(goals.is_running(PatternKey::Spawner));
    }

    #[test]
    fn test_higher_priority_interrupts_lower() {
        let log = Log::default();
        let mut goals = EliteGoals::new();
        let charge = Scripted::new(PatternKey::Charge, ControlFlags::MOVE, PRIORITY_ATTACK, &log);
        let charge_gate = charge.wants.clone();
        charge_gate.store(false, Ordering::SeqCst);
        goals.add(Box::new(charge));
        goals.add(Box::new(Scripted::new(PatternKey::Sprint, ControlFlags::MOVE, PRIORITY_SUPPORT, &log)));
        run(&mut goals);
        assert!(goals.is_running(PatternKey::Sprint));

        charge_gate.store(true, Ordering::SeqCst);
        log.lock().unwrap().clear();
        run(&mut goals);

        assert!(goals.is_running(PatternKey::Charge));
        assert!(!goals.is_running(PatternKey::Sprint));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["sprint:stop", "charge:start", "charge:tick"]
        );
    }

    #[test]
    fn test_non_interruptible_goal_is_not_preempted() {
        let log = Log::default();
        let mut goals = EliteGoals::new();
        let mut sprint = Scripted::new(PatternKey::Sprint, ControlFlags::MOVE, PRIORITY_SUPPORT, &log);
        sprint.interruptible = false;
        goals.slots.push(GoalSlot {
            priority: PRIORITY_SUPPORT,
            running: true,
            behavior: Box::new(sprint),
        });
        goals.slots.insert(
            0,
            GoalSlot {
                priority: PRIORITY_ATTACK,
                running: false,
                behavior: Box::new(Scripted::new(PatternKey::Charge, ControlFlags::MOVE, PRIORITY_ATTACK, &log)),
            },
        );

        run(&mut goals);

        assert!(goals.is_running(PatternKey::Sprint));
        assert!(!goals.is_running(PatternKey::Charge));
    }

    #[test]
    fn test_stop_all_deactivates_running_goals() {
        let log = Log::default();
        let mut goals = EliteGoals::new();
        goals.add(Box::new(Scripted::new(PatternKey::Leap, ControlFlags::JUMP, PRIORITY_ATTACK, &log)));
        run(&mut goals);
        assert_eq!(goals.running(), vec![PatternKey::Leap]);

        let mut world = World::new();
        let entity = world.spawn(Health::new(20.0)).id();
        let mut budget = ScanBudget::new(1);
        let mut ctx = BehaviorCtx::new(&mut world, entity, &mut budget);
        goals.stop_all(&mut ctx);

        assert!(goals.running().is_empty());
        assert_eq!(log.lock().unwrap().last().unwrap(), "leap:stop");
    }
}
