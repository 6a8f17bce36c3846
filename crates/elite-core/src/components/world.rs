//! World Components
//!
//! Bodies, navigation, mounts, loose items, projectiles and the world
//! clock.

use bevy_ecs::prelude::*;
use glam::Vec3;

use elite_save::ItemStack;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of the given width and height standing on `feet`.
    pub fn standing(feet: Vec3, width: f32, height: f32) -> Self {
        let half = width / 2.0;
        Self {
            min: Vec3::new(feet.x - half, feet.y, feet.z - half),
            max: Vec3::new(feet.x + half, feet.y + height, feet.z + half),
        }
    }

    pub fn inflate(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Component: Physical body of an agent
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Body {
    /// Feet position
    pub pos: Vec3,
    pub vel: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub width: f32,
    pub height: f32,
    /// Highest ledge walked up without jumping
    pub step_height: f32,
    pub on_ground: bool,
    /// Set by physics when horizontal movement was blocked last tick
    pub horizontal_collision: bool,
    pub in_liquid: bool,
    pub sprinting: bool,
}

impl Body {
    pub fn new(pos: Vec3, width: f32, height: f32) -> Self {
        Self {
            pos,
            vel: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            width,
            height,
            step_height: 0.6,
            on_ground: false,
            horizontal_collision: false,
            in_liquid: false,
            sprinting: false,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::standing(self.pos, self.width, self.height)
    }

    pub fn eye_pos(&self) -> Vec3 {
        self.pos + Vec3::new(0.0, self.height * 0.85, 0.0)
    }

    pub fn center(&self) -> Vec3 {
        self.pos + Vec3::new(0.0, self.height * 0.5, 0.0)
    }

    /// Turns to face a point.
    pub fn look_at(&mut self, point: Vec3) {
        let delta = point - self.eye_pos();
        let horizontal = (delta.x * delta.x + delta.z * delta.z).sqrt();
        if horizontal < f32::EPSILON && delta.y.abs() < f32::EPSILON {
            return;
        }
        self.yaw = (-delta.x).atan2(delta.z).to_degrees();
        self.pitch = (-delta.y).atan2(horizontal).to_degrees();
    }

    pub fn distance_sq(&self, other: &Body) -> f32 {
        self.pos.distance_squared(other.pos)
    }
}

/// Horizontal unit vector from `from` toward `to`, or zero when they share
/// a column.
pub fn horizontal_direction(from: Vec3, to: Vec3) -> Vec3 {
    Vec3::new(to.x - from.x, 0.0, to.z - from.z).normalize_or_zero()
}

/// Component: This agent is riding another
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RidingOn(pub Entity);

/// Where a navigator is headed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavGoal {
    Point(Vec3),
    Entity(Entity),
}

/// Component: Path-following state
///
/// A straight-line stand-in for the host's pathfinder.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Navigator {
    goal: Option<NavGoal>,
    speed_multiplier: f32,
}

impl Navigator {
    pub fn move_to_point(&mut self, point: Vec3, speed_multiplier: f32) {
        self.goal = Some(NavGoal::Point(point));
        self.speed_multiplier = speed_multiplier;
    }

    pub fn move_to_entity(&mut self, entity: Entity, speed_multiplier: f32) {
        self.goal = Some(NavGoal::Entity(entity));
        self.speed_multiplier = speed_multiplier;
    }

    pub fn stop(&mut self) {
        self.goal = None;
    }

    pub fn goal(&self) -> Option<NavGoal> {
        self.goal
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn is_in_progress(&self) -> bool {
        self.goal.is_some()
    }
}

/// Component: An item lying in the world
#[derive(Component, Debug, Clone, PartialEq)]
pub struct DroppedItem {
    pub stack: ItemStack,
    pub pos: Vec3,
    /// Ticks before anything may pick it up
    pub pickup_delay: u32,
}

/// Component: A projectile in flight
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Projectile {
    pub shooter: Entity,
    pub pos: Vec3,
    pub vel: Vec3,
    pub damage: f32,
    pub ticks_left: u32,
}

/// Resource: Count of fully completed ticks
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct WorldClock {
    pub tick: u64,
}

impl WorldClock {
    /// True once the first tick has completed.
    pub fn has_started(&self) -> bool {
        self.tick > 0
    }
}

/// Resource: World difficulty
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Difficulty {
    Peaceful,
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn level(&self) -> f32 {
        match self {
            Difficulty::Peaceful => 0.0,
            Difficulty::Easy => 1.0,
            Difficulty::Normal => 2.0,
            Difficulty::Hard => 3.0,
        }
    }
}
