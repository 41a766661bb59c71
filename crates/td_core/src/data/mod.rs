//! Data structures for game configuration.
//!
//! Pure data: tower, enemy and wave tables plus the global constants of a
//! game, all deserializable from RON. Decimals in data files become
//! fixed-point exactly once, when a [`Catalog`] is resolved.
//!
//! **Note:** This module contains no IO. Callers read the file and hand
//! the text to [`GameConfig::from_ron_str`].

mod catalog;
mod enemy_data;
mod game_data;
mod tower_data;
mod wave_data;

pub use catalog::Catalog;
pub use enemy_data::{EnemyData, EnemyKind};
pub use game_data::{GameConfig, MAX_MONEY, MAX_WAVES};
pub use tower_data::{LevelStats, TowerData, TowerKind};
pub use wave_data::{generate_default_waves, WaveData, WaveGroup, BASE_SPAWN_INTERVAL_SECS};
