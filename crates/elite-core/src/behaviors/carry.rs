//! Grab-and-carry helpers shared by the throwing patterns.

use bevy_ecs::prelude::*;
use glam::Vec3;

use super::BehaviorCtx;
use crate::components::{horizontal_direction, Body};
use crate::services::{mounts, spatial};
use crate::systems::deferred::Flush;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarryState {
    Idle,
    /// Walking up to the passenger
    Grab,
    /// Passenger seated, heading for the drop point
    Carry,
}

/// Launch settings for a throw.
#[derive(Debug, Clone, Copy)]
pub struct Throw {
    pub speed: f32,
    pub lift: f32,
    pub carrier_velocity_fraction: f32,
}

/// Seats `passenger` on the carrier once the tick's goal pass is over.
pub fn defer_mount(ctx: &mut BehaviorCtx, passenger: Entity) {
    let carrier = ctx.entity;
    ctx.defer("carry.mount", move |world| {
        if spatial::is_alive(world, carrier) && spatial::is_alive(world, passenger) {
            if let Err(e) = mounts::mount(world, passenger, carrier) {
                tracing::debug!(?carrier, ?passenger, error = %e, "grab failed");
            }
        }
        Flush::Done
    });
}

/// Launch velocity toward `destination`, carrying over part of the
/// carrier's own motion.
pub fn launch_velocity(from: Vec3, destination: Vec3, carrier_vel: Vec3, throw: Throw) -> Vec3 {
    let mut direction = horizontal_direction(from, destination);
    if direction == Vec3::ZERO {
        direction = Vec3::X;
    }
    direction * throw.speed
        + Vec3::new(0.0, throw.lift, 0.0)
        + carrier_vel * throw.carrier_velocity_fraction
}

/// Unseats `passenger` and hurls it toward `destination`.
pub fn throw_passenger(ctx: &mut BehaviorCtx, passenger: Entity, destination: Vec3, throw: Throw) {
    let carrier_vel = ctx.body().map(|body| body.vel).unwrap_or(Vec3::ZERO);
    mounts::dismount(ctx.world, passenger);
    let Some(mut body) = ctx.world.get_mut::<Body>(passenger) else {
        return;
    };
    body.vel = launch_velocity(body.pos, destination, carrier_vel, throw);
    body.on_ground = false;
    tracing::debug!(carrier = ?ctx.entity, ?passenger, "thrown");
}
