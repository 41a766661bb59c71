//! Error types for the tower-defense simulation.
//!
//! Two families exist. [`CommandError`] covers player intents the world
//! rejects at runtime; every variant is recoverable and leaves state
//! untouched. [`ConfigError`] covers malformed static data and is only
//! raised while building a world.

use std::fmt;

use thiserror::Error;

use crate::data::{EnemyKind, TowerKind};

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// A player command was rejected.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Static configuration is malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Why a tower could not be placed at the requested position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementIssue {
    /// The footprint touches the enemy path.
    OnPath,
    /// The footprint overlaps an existing tower.
    Overlapping,
    /// The footprint leaves the map.
    OutOfBounds,
}

impl fmt::Display for PlacementIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            PlacementIssue::OnPath => "position is on the enemy path",
            PlacementIssue::Overlapping => "position overlaps another tower",
            PlacementIssue::OutOfBounds => "position is outside the map",
        };
        f.write_str(reason)
    }
}

/// A rejected player intent. No state changes accompany any variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Tower placement failed validation.
    #[error("Invalid placement: {0}")]
    InvalidPlacement(PlacementIssue),

    /// Not enough money for a purchase or upgrade.
    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// Tower is already at its maximum level.
    #[error("Tower {tower} is already at max level {max_level}")]
    InvalidUpgrade {
        /// Tower that was asked to upgrade.
        tower: u32,
        /// Maximum level of its type.
        max_level: u8,
    },

    /// Referenced entity does not exist (or no longer exists).
    #[error("Entity not found: {0}")]
    UnknownEntity(u32),

    /// A wave is still spawning or its enemies are still on the field.
    #[error("Wave {0} is still in progress")]
    WaveAlreadyInProgress(u32),

    /// Every configured wave has already been started.
    #[error("No waves remaining: all {0} waves have been started")]
    NoWavesRemaining(u32),

    /// The game has ended in defeat or victory; only a reset is accepted.
    #[error("The game is over")]
    GameOver,
}

/// Malformed static configuration, surfaced once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Data file could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Config could not be written back out.
    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    /// No definition for a tower type.
    #[error("Missing definition for tower type {0}")]
    MissingTower(TowerKind),

    /// A tower type is defined more than once.
    #[error("Duplicate definition for tower type {0}")]
    DuplicateTower(TowerKind),

    /// No definition for an enemy type.
    #[error("Missing definition for enemy type {0}")]
    MissingEnemy(EnemyKind),

    /// An enemy type is defined more than once.
    #[error("Duplicate definition for enemy type {0}")]
    DuplicateEnemy(EnemyKind),

    /// No definitions for the 1-based wave numbers `first..=last`.
    #[error("Missing definitions for waves {first} to {last}")]
    MissingWaves {
        /// First undefined wave.
        first: u32,
        /// Last undefined wave (`max_waves`).
        last: u32,
    },

    /// Path waypoints cannot form a usable path.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A numeric field holds an unusable value.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Dotted path to the offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
