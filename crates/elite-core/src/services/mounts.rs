//! Mount Services
//!
//! Riding relationships between agents. A passenger rides at most one
//! vehicle; its position follows the vehicle until it dismounts.

use bevy_ecs::prelude::*;

use crate::components::{Body, RidingOn};
use crate::error::EngineError;
use crate::services::spatial::is_alive;

pub fn riding(world: &World, passenger: Entity) -> Option<Entity> {
    world.get::<RidingOn>(passenger).map(|riding| riding.0)
}

pub fn is_riding(world: &World, passenger: Entity, vehicle: Entity) -> bool {
    riding(world, passenger) == Some(vehicle)
}

/// Everything currently riding `vehicle`.
pub fn passengers(world: &mut World, vehicle: Entity) -> Vec<Entity> {
    let mut query = world.query::<(Entity, &RidingOn)>();
    let mut found: Vec<Entity> = query
        .iter(world)
        .filter(|(_, riding)| riding.0 == vehicle)
        .map(|(entity, _)| entity)
        .collect();
    found.sort();
    found
}

pub fn has_passengers(world: &mut World, vehicle: Entity) -> bool {
    !passengers(world, vehicle).is_empty()
}

/// Seats `passenger` on `vehicle`.
pub fn mount(world: &mut World, passenger: Entity, vehicle: Entity) -> Result<(), EngineError> {
    for entity in [passenger, vehicle] {
        if !is_alive(world, entity) {
            return Err(EngineError::Despawned(entity));
        }
    }
    if passenger == vehicle || riding(world, passenger).is_some() {
        return Err(EngineError::AlreadyRiding(passenger));
    }
    if riding(world, vehicle) == Some(passenger) {
        return Err(EngineError::AlreadyRiding(vehicle));
    }

    let seat = world
        .get::<Body>(vehicle)
        .map(|body| body.pos + glam::Vec3::new(0.0, body.height, 0.0));
    let mut entity = world
        .get_entity_mut(passenger)
        .ok_or(EngineError::Despawned(passenger))?;
    entity.insert(RidingOn(vehicle));
    if let (Some(seat), Some(mut body)) = (seat, entity.get_mut::<Body>()) {
        body.pos = seat;
        body.vel = glam::Vec3::ZERO;
    }
    Ok(())
}

/// Removes `passenger` from its vehicle, returning the vehicle.
pub fn dismount(world: &mut World, passenger: Entity) -> Option<Entity> {
    let mut entity = world.get_entity_mut(passenger)?;
    entity.take::<RidingOn>().map(|riding| riding.0)
}

/// Drops every passenger of `vehicle`.
pub fn dismount_all(world: &mut World, vehicle: Entity) -> Vec<Entity> {
    let riders = passengers(world, vehicle);
    for rider in &riders {
        dismount(world, *rider);
    }
    riders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Health;
    use glam::Vec3;

    fn spawn(world: &mut World) -> Entity {
        world
            .spawn((Body::new(Vec3::ZERO, 0.6, 1.8), Health::new(20.0)))
            .id()
    }

    #[test]
    fn test_mount_and_dismount() {
        let mut world = World::new();
        let carrier = spawn(&mut world);
        let rider = spawn(&mut world);

        mount(&mut world, rider, carrier).unwrap();
        assert!(is_riding(&world, rider, carrier));
        assert_eq!(passengers(&mut world, carrier), vec![rider]);
        assert_eq!(world.get::<Body>(rider).unwrap().pos.y, 1.8);

        assert_eq!(dismount(&mut world, rider), Some(carrier));
        assert!(!has_passengers(&mut world, carrier));
    }

    #[test]
    fn test_cannot_double_mount_or_cycle() {
        let mut world = World::new();
        let a = spawn(&mut world);
        let b = spawn(&mut world);
        let c = spawn(&mut world);

        mount(&mut world, a, b).unwrap();
        assert_eq!(mount(&mut world, a, c), Err(EngineError::AlreadyRiding(a)));
        assert_eq!(mount(&mut world, b, a), Err(EngineError::AlreadyRiding(a)));
    }

    #[test]
    fn test_dead_passenger_cannot_mount() {
        let mut world = World::new();
        let a = spawn(&mut world);
        let b = spawn(&mut world);
        world.get_mut::<Health>(a).unwrap().current = 0.0;
        assert_eq!(mount(&mut world, a, b), Err(EngineError::Despawned(a)));
    }
}
