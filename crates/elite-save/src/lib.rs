//! Persisted data for elite agent behaviors.
//!
//! This crate contains pure data structures with no simulation logic:
//! the per-agent decision profile, pattern keys, per-pattern state that
//! survives reloads, and the save record format. It is a dependency for
//! the simulation core.

pub mod item;
pub mod pattern;
pub mod profile;
pub mod record;
pub mod spawner;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

pub use item::{AttributeKind, AttributeModifier, EquipmentSlot, ItemStack, ModifierOperation};
pub use pattern::{ParsePatternKeyError, PatternData, PatternKey};
pub use profile::{EliteRecord, FieldKind, Profile, ProfileError, ProfileField, PROFILE_VERSION};
pub use record::{AgentRecord, BodyRecord, PersistError, SaveFile, SAVE_VERSION};
pub use spawner::{SpawnerState, WeightedSpawn};
