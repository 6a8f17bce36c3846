//! Item Services
//!
//! Dropping stacks into the world and equipping them.

use bevy_ecs::prelude::*;
use glam::Vec3;

use elite_save::{EquipmentSlot, ItemStack};

use crate::components::{Body, DroppedItem, Equipment};

pub fn drop_item(world: &mut World, pos: Vec3, stack: ItemStack, pickup_delay: u32) -> Entity {
    world
        .spawn(DroppedItem {
            stack,
            pos,
            pickup_delay,
        })
        .id()
}

/// Equips a stack, dropping whatever the slot held at the agent's feet.
///
/// Returns false when the agent is gone.
pub fn equip(world: &mut World, agent: Entity, slot: EquipmentSlot, stack: ItemStack) -> bool {
    let pos = world
        .get::<Body>(agent)
        .map(|body| body.pos)
        .unwrap_or(Vec3::ZERO);
    let displaced = {
        let Some(mut entity) = world.get_entity_mut(agent) else {
            return false;
        };
        match entity.get_mut::<Equipment>() {
            Some(mut equipment) => equipment.set(slot, stack),
            None => {
                let mut equipment = Equipment::default();
                equipment.set(slot, stack);
                entity.insert(equipment);
                None
            }
        }
    };
    if let Some(displaced) = displaced {
        drop_item(world, pos, displaced, 0);
    }
    true
}
