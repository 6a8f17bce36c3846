//! Elite Behavior Arena
//!
//! Headless demo: a player stands in a walled arena while a population of
//! hostile agents decides its elite patterns and runs them.

use bevy_ecs::prelude::*;
use clap::Parser;
use glam::{IVec3, Vec3};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use elite_core::assignment::EliteCatalog;
use elite_core::behaviors::EliteGoals;
use elite_core::config::{EliteConfig, DEFAULT_CONFIG_PATH};
use elite_core::services::BlockGrid;
use elite_core::{Agent, EliteSim, Health, Player, Species};

/// Command line arguments for the arena
#[derive(Parser, Debug)]
#[command(name = "elite_sim")]
#[command(about = "Runs elite agent behaviors in a headless arena")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Hostile agents to spawn around the player
    #[arg(long, default_value_t = 24)]
    agents: usize,

    /// Write the final world to this save file
    #[arg(long)]
    save: Option<PathBuf>,
}

const ARENA_RADIUS: i32 = 40;
const SUMMARY_INTERVAL: u64 = 100;

fn arena() -> BlockGrid {
    let mut grid = BlockGrid::flat(0);
    let r = ARENA_RADIUS;
    grid.fill_solid(IVec3::new(-r, 0, -r), IVec3::new(r, 3, -r));
    grid.fill_solid(IVec3::new(-r, 0, r), IVec3::new(r, 3, r));
    grid.fill_solid(IVec3::new(-r, 0, -r), IVec3::new(-r, 3, r));
    grid.fill_solid(IVec3::new(r, 0, -r), IVec3::new(r, 3, r));
    grid
}

fn describe_elites(sim: &mut EliteSim) {
    let config = sim.world().resource::<EliteConfig>().clone();
    let catalog = sim.world().resource::<EliteCatalog>().clone();
    let world = sim.world_mut();
    let mut query = world.query::<(Entity, &Species, &EliteGoals)>();
    for (entity, species, goals) in query.iter(world) {
        for key in goals.keys() {
            if let Some(def) = catalog.get(key) {
                tracing::info!(?entity, species = %species.0, "{}", (def.describe)(&config));
            }
        }
    }
}

fn summarize(sim: &mut EliteSim) {
    let tick = sim.tick();
    let world = sim.world_mut();
    let mut query = world.query_filtered::<(&Health, Option<&EliteGoals>), (With<Agent>, Without<Player>)>();
    let mut alive = 0;
    let mut elites = 0;
    let mut running: BTreeMap<String, usize> = BTreeMap::new();
    for (health, goals) in query.iter(world) {
        if !health.is_alive() {
            continue;
        }
        alive += 1;
        let Some(goals) = goals else {
            continue;
        };
        if !goals.is_empty() {
            elites += 1;
        }
        for key in goals.running() {
            *running.entry(key.to_string()).or_default() += 1;
        }
    }
    tracing::info!(tick, alive, elites, ?running, "summary");
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("elite_core=info")),
        )
        .init();

    let args = Args::parse();

    println!("Elite Behavior Arena");
    println!("====================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {}", args.ticks);
    println!("Agents: {}", args.agents);
    println!();

    let config = if args.config.exists() {
        match EliteConfig::from_file(&args.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: could not load {}: {}", args.config.display(), e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        tracing::info!(path = %args.config.display(), "no configuration file, using defaults");
        EliteConfig::default()
    };

    let hostile: Vec<String> = config
        .species
        .iter()
        .filter(|species| species.hostile)
        .map(|species| species.key.clone())
        .collect();
    if hostile.is_empty() {
        eprintln!("Error: configuration registers no hostile species");
        return ExitCode::FAILURE;
    }

    let mut sim = EliteSim::new(config, arena(), args.seed);
    let player = sim.spawn_player(Vec3::new(0.5, 0.0, 0.5));

    let ring = (ARENA_RADIUS - 8) as f32;
    for i in 0..args.agents {
        let angle = i as f32 / args.agents.max(1) as f32 * std::f32::consts::TAU;
        let pos = Vec3::new(angle.cos() * ring, 0.0, angle.sin() * ring);
        let species = &hostile[i % hostile.len()];
        match sim.spawn_agent(species, pos) {
            Ok(agent) => {
                if let Err(e) = sim.set_target(agent, Some(player)) {
                    tracing::warn!(error = %e, "could not assign target");
                }
            }
            Err(e) => tracing::warn!(error = %e, "spawn failed"),
        }
    }

    let mut described = false;
    for _ in 0..args.ticks {
        sim.step();
        if !described && sim.tick() >= 2 {
            describe_elites(&mut sim);
            described = true;
        }
        if sim.tick() % SUMMARY_INTERVAL == 0 {
            summarize(&mut sim);
        }
    }
    summarize(&mut sim);

    if let Some(path) = args.save {
        if let Err(e) = sim.save().write_to(&path) {
            eprintln!("Error: could not write {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        println!("Saved world to {}", path.display());
    }

    ExitCode::SUCCESS
}
