//! # TD Core
//!
//! Deterministic tower-defense simulation core for Bastion TD.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO (configuration arrives as text)
//! - No floating-point math in the simulation (uses fixed-point)
//! - Seeded randomness only
//!
//! This separation enables:
//! - Headless runs and tooling
//! - Determinism testing
//! - Any renderer on top, driven by snapshots and tick events
//!
//! ## Crate Structure
//!
//! - [`simulation`] - The world and its fixed tick order
//! - [`path`] - Enemy path geometry
//! - [`enemy`], [`tower`], [`projectile`] - Entities and damage resolution
//! - [`wave`] - Timed spawn scheduling
//! - [`data`] - RON-loadable configuration and the resolved catalog
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod command;
pub mod data;
pub mod enemy;
pub mod error;
pub mod math;
pub mod path;
pub mod projectile;
pub mod simulation;
pub mod snapshot;
pub mod tower;
pub mod wave;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::command::{CommandOutcome, CommandReceipt, PlayerCommand};
    pub use crate::data::{Catalog, EnemyKind, GameConfig, TowerKind};
    pub use crate::enemy::{Enemy, EnemyId};
    pub use crate::error::{CommandError, ConfigError, GameError, PlacementIssue, Result};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::path::{PathBlockMode, PathModel};
    pub use crate::projectile::{Effect, Projectile, ProjectileId};
    pub use crate::simulation::{GameOutcome, GameStatus, SimulationWorld, TickEvents};
    pub use crate::snapshot::WorldSnapshot;
    pub use crate::tower::{Tower, TowerId, TowerState};
    pub use crate::wave::{WaveScheduler, WaveState};
}
