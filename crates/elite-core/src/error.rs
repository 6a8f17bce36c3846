//! Engine boundary errors.
//!
//! Raised by world-service lookups. Behaviors recover from these locally,
//! usually by substituting a default, so they rarely reach callers.

use bevy_ecs::prelude::*;

use elite_save::AttributeKind;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("agent has no {0:?} attribute")]
    MissingAttribute(AttributeKind),
    #[error("unknown species `{0}`")]
    UnknownSpecies(String),
    #[error("entity {0:?} no longer exists")]
    Despawned(Entity),
    #[error("entity {0:?} is already riding")]
    AlreadyRiding(Entity),
}
