//! Pattern Catalog
//!
//! The fixed table of elite patterns. Each entry carries its weight and the
//! functions that initialize, build and describe it. Weights come from the
//! configuration and only change when the catalog is rebuilt on reload.

use bevy_ecs::prelude::*;
use rand::Rng;
use std::fmt;

use elite_save::{PatternData, PatternKey};

use super::init::{initialize_pattern, initialize_spawner};
use crate::behaviors::{
    barrage, charge, jump, leap, shaman, spawner, sprint, thief, throw_ally, throw_enemy,
    EliteBehavior,
};
use crate::config::EliteConfig;

/// One-time effects applied the first time a pattern attaches.
pub type InitFn = fn(&mut World, Entity, PatternKey, &EliteConfig);
/// Builds a live instance from config and any saved sub-state.
pub type CreateFn = fn(&EliteConfig, Option<&PatternData>) -> Box<dyn EliteBehavior>;
pub type DescribeFn = fn(&EliteConfig) -> String;

/// A catalog entry.
#[derive(Clone, Copy)]
pub struct PatternDef {
    pub key: PatternKey,
    pub weight: u32,
    pub initialize: InitFn,
    pub create: CreateFn,
    pub describe: DescribeFn,
}

impl fmt::Debug for PatternDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternDef")
            .field("key", &self.key)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

fn functions(key: PatternKey) -> (InitFn, CreateFn, DescribeFn) {
    match key {
        PatternKey::Charge => (initialize_pattern, charge::create, charge::describe),
        PatternKey::Jump => (initialize_pattern, jump::create, jump::describe),
        PatternKey::Leap => (initialize_pattern, leap::create, leap::describe),
        PatternKey::Sprint => (initialize_pattern, sprint::create, sprint::describe),
        PatternKey::Barrage => (initialize_pattern, barrage::create, barrage::describe),
        PatternKey::Shaman => (initialize_pattern, shaman::create, shaman::describe),
        PatternKey::Thief => (initialize_pattern, thief::create, thief::describe),
        PatternKey::ThrowAlly => (initialize_pattern, throw_ally::create, throw_ally::describe),
        PatternKey::ThrowEnemy => {
            (initialize_pattern, throw_enemy::create, throw_enemy::describe)
        }
        PatternKey::Spawner => (initialize_spawner, spawner::create, spawner::describe),
    }
}

impl PatternDef {
    pub fn new(key: PatternKey, weight: u32) -> Self {
        let (initialize, create, describe) = functions(key);
        Self {
            key,
            weight,
            initialize,
            create,
            describe,
        }
    }
}

/// Resource: Weighted pattern table in declaration order
#[derive(Resource, Debug, Clone)]
pub struct EliteCatalog {
    entries: Vec<PatternDef>,
}

impl EliteCatalog {
    /// Every pattern, weighted from the configuration.
    pub fn from_config(config: &EliteConfig) -> Self {
        Self {
            entries: PatternKey::ALL
                .into_iter()
                .map(|key| PatternDef::new(key, config.patterns.weight(key)))
                .collect(),
        }
    }

    /// A catalog of just the listed patterns, in the listed order.
    pub fn with_weights(weights: &[(PatternKey, u32)]) -> Self {
        Self {
            entries: weights
                .iter()
                .map(|(key, weight)| PatternDef::new(*key, *weight))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[PatternDef] {
        &self.entries
    }

    pub fn get(&self, key: PatternKey) -> Option<&PatternDef> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn total_weight(&self) -> u32 {
        self.entries.iter().map(|entry| entry.weight).sum()
    }

    /// Picks the entry for a draw in `[0, total_weight)`.
    ///
    /// Walks the table in declaration order subtracting weights; the first
    /// entry that takes the running value below zero wins. Zero-weight
    /// entries can never win.
    pub fn select(&self, draw: u32) -> Option<PatternKey> {
        let mut remaining = i64::from(draw);
        for entry in &self.entries {
            remaining -= i64::from(entry.weight);
            if remaining < 0 {
                return Some(entry.key);
            }
        }
        None
    }

    /// One weighted draw. An all-zero table never selects anything.
    pub fn roll<R: Rng>(&self, rng: &mut R) -> Option<PatternKey> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }
        self.select(rng.gen_range(0..total))
    }
}

impl Default for EliteCatalog {
    fn default() -> Self {
        Self::from_config(&EliteConfig::default())
    }
}
