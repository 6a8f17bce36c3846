//! Systems
//!
//! Per-tick passes run by the simulation schedule.

pub mod deferred;
pub mod lifecycle;
pub mod physics;

pub use deferred::{defer, flush_deferred, DeferredActions, Flush};
pub use lifecycle::{advance_clock, attach_pending_agents, remove_dead_agents};
pub use physics::{
    advance_navigation, advance_projectiles, integrate_bodies, sync_riders, tick_dropped_items,
    tick_status_effects,
};
