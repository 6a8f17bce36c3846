//! ECS Components
//!
//! Agent identity and vitals, and the physical world agents live in.

pub mod agent;
pub mod world;

pub use agent::*;
pub use world::*;
