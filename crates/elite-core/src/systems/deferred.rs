//! Deferred Actions
//!
//! Work that must run after the current entity iteration finishes:
//! merging riders, finishing thefts, and attaching agents that spawned
//! before the world was ready. The queue drains once at the end of every
//! tick; an action may ask to stay queued for the next one.

use bevy_ecs::prelude::*;

/// Outcome of running a deferred action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flush {
    /// The action finished and leaves the queue
    Done,
    /// The action could not run yet and stays queued
    Pending,
}

type ActionFn = Box<dyn FnMut(&mut World) -> Flush + Send + Sync>;

struct DeferredAction {
    label: &'static str,
    run: ActionFn,
}

/// Resource: Queue of actions waiting for the end of the tick
#[derive(Resource, Default)]
pub struct DeferredActions {
    queue: Vec<DeferredAction>,
}

impl DeferredActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        label: &'static str,
        action: impl FnMut(&mut World) -> Flush + Send + Sync + 'static,
    ) {
        self.queue.push(DeferredAction {
            label,
            run: Box::new(action),
        });
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.queue.iter().map(|action| action.label).collect()
    }
}

/// Queues an action from anywhere that has the world.
pub fn defer(
    world: &mut World,
    label: &'static str,
    action: impl FnMut(&mut World) -> Flush + Send + Sync + 'static,
) {
    world
        .get_resource_or_insert_with(DeferredActions::new)
        .push(label, action);
}

/// Runs every queued action once, keeping the ones still pending.
///
/// Actions queued while flushing wait for the next tick, behind the ones
/// that stayed pending.
pub fn flush_deferred(world: &mut World) {
    let Some(mut actions) = world.get_resource_mut::<DeferredActions>() else {
        return;
    };
    let queued = std::mem::take(&mut actions.queue);
    if queued.is_empty() {
        return;
    }

    let mut pending = Vec::new();
    for mut action in queued {
        match (action.run)(world) {
            Flush::Done => tracing::trace!(label = action.label, "deferred action done"),
            Flush::Pending => pending.push(action),
        }
    }

    let mut actions = world.get_resource_or_insert_with(DeferredActions::new);
    pending.append(&mut actions.queue);
    actions.queue = pending;
}
