//! Agent Profile
//!
//! The durable record of every irreversible random decision made about an
//! agent. Each decision is an `Option`: `None` means "not decided yet" and
//! `Some` is authoritative forever after. Writers must check presence first;
//! writing a decided field is a logic error.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::pattern::{PatternData, PatternKey};

/// Current profile schema version
pub const PROFILE_VERSION: u32 = 1;

/// Named decision fields of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Ride,
    Depacify,
    BreakDoors,
    Griefing,
    Fiddling,
    DodgeArrows,
    Elite,
}

/// Value type stored under a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Flag,
    Chance,
    Elite,
}

impl ProfileField {
    /// The single-roll dimensions, in decision order. Elite patterns are
    /// decided separately because they stack.
    pub const DIMENSIONS: [ProfileField; 6] = [
        ProfileField::Ride,
        ProfileField::Depacify,
        ProfileField::BreakDoors,
        ProfileField::Griefing,
        ProfileField::Fiddling,
        ProfileField::DodgeArrows,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProfileField::Ride => "ride",
            ProfileField::Depacify => "depacify",
            ProfileField::BreakDoors => "break_doors",
            ProfileField::Griefing => "griefing",
            ProfileField::Fiddling => "fiddling",
            ProfileField::DodgeArrows => "dodge_arrows",
            ProfileField::Elite => "elite",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            ProfileField::DodgeArrows => FieldKind::Chance,
            ProfileField::Elite => FieldKind::Elite,
            _ => FieldKind::Flag,
        }
    }
}

/// Errors raised by profile writes and typed reads.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("profile field `{}` is already decided", .0.name())]
    AlreadyDecided(ProfileField),
    #[error("profile field `{}` does not hold a {expected:?} value", .field.name())]
    WrongKind {
        field: ProfileField,
        expected: FieldKind,
    },
}

/// Granted elite patterns plus any sub-state they persist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EliteRecord {
    #[serde(default)]
    granted: BTreeSet<PatternKey>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    data: BTreeMap<PatternKey, PatternData>,
}

impl EliteRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record granting exactly the given patterns.
    pub fn with_grants(keys: impl IntoIterator<Item = PatternKey>) -> Self {
        let mut record = Self::new();
        for key in keys {
            record.grant(key);
        }
        record
    }

    /// Grants a pattern. Re-granting is a no-op; returns whether the key is new.
    pub fn grant(&mut self, key: PatternKey) -> bool {
        self.granted.insert(key)
    }

    pub fn is_granted(&self, key: PatternKey) -> bool {
        self.granted.contains(&key)
    }

    /// Granted keys in catalog declaration order.
    pub fn granted(&self) -> impl Iterator<Item = PatternKey> + '_ {
        self.granted.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.granted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }

    pub fn pattern_data(&self, key: PatternKey) -> Option<&PatternData> {
        self.data.get(&key)
    }

    /// Stores sub-state for a pattern. This is the one slot of the profile
    /// that is rewritten after the first decision.
    pub fn set_pattern_data(&mut self, data: PatternData) {
        self.data.insert(data.key(), data);
    }
}

fn default_version() -> u32 {
    PROFILE_VERSION
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Durable per-agent decision record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ride: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    depacify: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    break_doors: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    griefing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fiddling: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dodge_arrows: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elite: Option<EliteRecord>,
    /// Transient: one-time initialization is still owed to this agent
    #[serde(default, skip_serializing_if = "is_false")]
    needs_init: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            version: PROFILE_VERSION,
            ride: None,
            depacify: None,
            break_doors: None,
            griefing: None,
            fiddling: None,
            dodge_arrows: None,
            elite: None,
            needs_init: false,
        }
    }
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Presence of a field is the "already decided" flag.
    pub fn has_field(&self, field: ProfileField) -> bool {
        match field {
            ProfileField::Ride => self.ride.is_some(),
            ProfileField::Depacify => self.depacify.is_some(),
            ProfileField::BreakDoors => self.break_doors.is_some(),
            ProfileField::Griefing => self.griefing.is_some(),
            ProfileField::Fiddling => self.fiddling.is_some(),
            ProfileField::DodgeArrows => self.dodge_arrows.is_some(),
            ProfileField::Elite => self.elite.is_some(),
        }
    }

    /// True once every dimension and the elite grant have been decided.
    pub fn is_fully_decided(&self) -> bool {
        ProfileField::DIMENSIONS
            .iter()
            .all(|field| self.has_field(*field))
            && self.has_field(ProfileField::Elite)
    }

    /// Reads a boolean decision.
    ///
    /// Asking a non-flag field is a programmer error: it asserts in debug
    /// builds and reads as undecided in release.
    pub fn flag(&self, field: ProfileField) -> Option<bool> {
        match field {
            ProfileField::Ride => self.ride,
            ProfileField::Depacify => self.depacify,
            ProfileField::BreakDoors => self.break_doors,
            ProfileField::Griefing => self.griefing,
            ProfileField::Fiddling => self.fiddling,
            _ => {
                debug_assert!(false, "profile field `{}` is not a flag", field.name());
                None
            }
        }
    }

    /// Reads a numeric decision. Same wrong-kind policy as [`Profile::flag`].
    pub fn chance(&self, field: ProfileField) -> Option<f32> {
        match field {
            ProfileField::DodgeArrows => self.dodge_arrows,
            _ => {
                debug_assert!(false, "profile field `{}` is not a chance", field.name());
                None
            }
        }
    }

    pub fn elite(&self) -> Option<&EliteRecord> {
        self.elite.as_ref()
    }

    /// Mutable access to an already decided elite record, for pattern data.
    pub fn elite_mut(&mut self) -> Option<&mut EliteRecord> {
        self.elite.as_mut()
    }

    pub fn set_flag(&mut self, field: ProfileField, value: bool) -> Result<(), ProfileError> {
        let slot = match field {
            ProfileField::Ride => &mut self.ride,
            ProfileField::Depacify => &mut self.depacify,
            ProfileField::BreakDoors => &mut self.break_doors,
            ProfileField::Griefing => &mut self.griefing,
            ProfileField::Fiddling => &mut self.fiddling,
            _ => {
                return Err(ProfileError::WrongKind {
                    field,
                    expected: FieldKind::Flag,
                })
            }
        };
        write_once(slot, value, field)
    }

    pub fn set_chance(&mut self, field: ProfileField, value: f32) -> Result<(), ProfileError> {
        match field {
            ProfileField::DodgeArrows => write_once(&mut self.dodge_arrows, value, field),
            _ => Err(ProfileError::WrongKind {
                field,
                expected: FieldKind::Chance,
            }),
        }
    }

    pub fn set_elite(&mut self, record: EliteRecord) -> Result<(), ProfileError> {
        write_once(&mut self.elite, record, ProfileField::Elite)
    }

    pub fn needs_init(&self) -> bool {
        self.needs_init
    }

    /// Flags this profile as owing one-time initialization. Only a brand
    /// new agent (never attached before) should be marked.
    pub fn mark_needs_init(&mut self) {
        self.needs_init = true;
    }

    /// Clears and returns the one-time initialization flag.
    pub fn take_needs_init(&mut self) -> bool {
        std::mem::take(&mut self.needs_init)
    }
}

fn write_once<T>(slot: &mut Option<T>, value: T, field: ProfileField) -> Result<(), ProfileError> {
    if slot.is_some() {
        debug_assert!(false, "profile field `{}` is already decided", field.name());
        return Err(ProfileError::AlreadyDecided(field));
    }
    *slot = Some(value);
    Ok(())
}
