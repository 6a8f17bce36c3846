//! Terrain Queries
//!
//! Block geometry consulted by physics, line of sight and spawn placement.
//! The host supplies an implementation; [`BlockGrid`] is the in-memory one
//! used by the simulation binary and tests.

use bevy_ecs::prelude::*;
use glam::{IVec3, Vec3};
use std::collections::HashSet;
use std::ops::Deref;

use crate::components::Aabb;

/// Step used when walking a sight line
const SIGHT_STEP: f32 = 0.25;

/// Read-only view of world geometry.
pub trait TerrainQuery: Send + Sync {
    fn is_solid(&self, block: IVec3) -> bool;

    fn is_liquid(&self, block: IVec3) -> bool;

    /// True when no solid block lies on the segment between two points.
    fn line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let steps = (delta.length() / SIGHT_STEP).ceil() as i32;
        (1..steps).all(|i| {
            let point = from + delta * (i as f32 / steps as f32);
            !self.is_solid(point.floor().as_ivec3())
        })
    }

    /// True when any solid block overlaps the box.
    fn collides(&self, bounds: &Aabb) -> bool {
        let min = bounds.min.floor().as_ivec3();
        let max = (bounds.max - Vec3::splat(1e-4)).floor().as_ivec3();
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    if self.is_solid(IVec3::new(x, y, z)) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// Resource: The active terrain
#[derive(Resource)]
pub struct Terrain(Box<dyn TerrainQuery>);

impl Terrain {
    pub fn new(query: impl TerrainQuery + 'static) -> Self {
        Self(Box::new(query))
    }
}

impl Deref for Terrain {
    type Target = dyn TerrainQuery;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

/// Sparse block world over a solid floor.
#[derive(Debug, Clone, Default)]
pub struct BlockGrid {
    /// Every block with `y < floor` is solid; `None` means bottomless
    floor: Option<i32>,
    solid: HashSet<IVec3>,
    liquid: HashSet<IVec3>,
}

impl BlockGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat ground whose walkable surface is at `y = surface`.
    pub fn flat(surface: i32) -> Self {
        Self {
            floor: Some(surface),
            ..Self::default()
        }
    }

    pub fn set_solid(&mut self, block: IVec3) {
        self.liquid.remove(&block);
        self.solid.insert(block);
    }

    pub fn set_liquid(&mut self, block: IVec3) {
        self.solid.remove(&block);
        self.liquid.insert(block);
    }

    pub fn clear(&mut self, block: IVec3) {
        self.solid.remove(&block);
        self.liquid.remove(&block);
    }

    /// Fills the inclusive box between two corners with solid blocks.
    pub fn fill_solid(&mut self, from: IVec3, to: IVec3) {
        let min = from.min(to);
        let max = from.max(to);
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.set_solid(IVec3::new(x, y, z));
                }
            }
        }
    }

    pub fn with_wall(mut self, from: IVec3, to: IVec3) -> Self {
        self.fill_solid(from, to);
        self
    }
}

impl TerrainQuery for BlockGrid {
    fn is_solid(&self, block: IVec3) -> bool {
        self.floor.is_some_and(|floor| block.y < floor) || self.solid.contains(&block)
    }

    fn is_liquid(&self, block: IVec3) -> bool {
        self.liquid.contains(&block)
    }
}
