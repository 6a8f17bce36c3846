//! World Services
//!
//! The engine primitives elite behaviors are built on: spatial lookups,
//! damage and healing, riding, items, spawning and terrain.

pub mod combat;
pub mod items;
pub mod mounts;
pub mod spatial;
pub mod spawning;
pub mod terrain;

pub use terrain::{BlockGrid, Terrain, TerrainQuery};
