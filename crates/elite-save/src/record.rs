//! Save Records
//!
//! The per-agent save record and the save file that bundles a world's
//! agents. Serialized as JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::item::{AttributeKind, AttributeModifier, EquipmentSlot, ItemStack};
use crate::profile::Profile;

/// Current save file version
pub const SAVE_VERSION: u32 = 1;

/// Errors reading or writing save data.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported save version {found} (expected at most {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Physical state of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub position: [f32; 3],
    #[serde(default)]
    pub velocity: [f32; 3],
    #[serde(default)]
    pub yaw: f32,
}

/// Everything needed to restore one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: Uuid,
    pub species: String,
    #[serde(default)]
    pub player: bool,
    pub body: BodyRecord,
    pub health: f32,
    /// Base attribute values; a missing attack damage stays missing
    #[serde(default)]
    pub base_attributes: BTreeMap<AttributeKind, f32>,
    #[serde(default)]
    pub modifiers: Vec<AttributeModifier>,
    #[serde(default)]
    pub equipment: BTreeMap<EquipmentSlot, ItemStack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub riding: Option<Uuid>,
    #[serde(default)]
    pub profile: Profile,
}

/// A saved world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub tick: u64,
    pub agents: Vec<AgentRecord>,
}

impl SaveFile {
    pub fn new(tick: u64, agents: Vec<AgentRecord>) -> Self {
        Self {
            version: SAVE_VERSION,
            tick,
            agents,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let save: SaveFile = serde_json::from_str(json)?;
        if save.version > SAVE_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: save.version,
                supported: SAVE_VERSION,
            });
        }
        Ok(save)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn agent(&self, id: Uuid) -> Option<&AgentRecord> {
        self.agents.iter().find(|agent| agent.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternKey;
    use crate::profile::{EliteRecord, ProfileField};

    fn sample_agent() -> AgentRecord {
        let mut profile = Profile::new();
        profile.set_flag(ProfileField::Ride, true).unwrap();
        profile
            .set_elite(EliteRecord::with_grants([PatternKey::Charge]))
            .unwrap();

        AgentRecord {
            id: Uuid::new_v4(),
            species: "zombie".to_string(),
            player: false,
            body: BodyRecord {
                position: [1.0, 64.0, -3.5],
                velocity: [0.0; 3],
                yaw: 90.0,
            },
            health: 17.5,
            base_attributes: BTreeMap::from([(AttributeKind::MaxHealth, 20.0)]),
            modifiers: vec![AttributeModifier::add(
                "elite.charge.knockback_resistance",
                AttributeKind::KnockbackResistance,
                0.5,
            )],
            equipment: BTreeMap::new(),
            target: None,
            riding: None,
            profile,
        }
    }

    #[test]
    fn test_save_file_json_round_trip() {
        let save = SaveFile::new(120, vec![sample_agent()]);
        let json = save.to_json().unwrap();
        let restored = SaveFile::from_json(&json).unwrap();
        assert_eq!(restored, save);
    }

    #[test]
    fn test_rejects_future_versions() {
        let mut save = SaveFile::new(0, Vec::new());
        save.version = SAVE_VERSION + 1;
        let json = serde_json::to_string(&save).unwrap();
        assert!(matches!(
            SaveFile::from_json(&json),
            Err(PersistError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        let agent = sample_agent();
        let id = agent.id;

        SaveFile::new(5, vec![agent]).write_to(&path).unwrap();
        let restored = SaveFile::read_from(&path).unwrap();

        assert_eq!(restored.tick, 5);
        assert_eq!(restored.agent(id).unwrap().species, "zombie");
    }
}
