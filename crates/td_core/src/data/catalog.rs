//! Validated, immutable lookup tables resolved from a [`GameConfig`].

use super::enemy_data::{EnemyData, EnemyKind};
use super::game_data::GameConfig;
use super::tower_data::{TowerData, TowerKind};
use super::wave_data::WaveData;
use crate::error::ConfigError;

/// Type tables keyed by enum, built once when a world is created.
///
/// Lookups cannot fail: resolution guarantees exactly one definition per
/// tower and enemy kind and one wave per wave number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    towers: Vec<TowerData>,
    enemies: Vec<EnemyData>,
    waves: Vec<WaveData>,
}

impl Catalog {
    /// Validate `config` and build the lookup tables.
    ///
    /// # Errors
    ///
    /// Returns the first problem [`GameConfig::validate`] reports.
    pub fn resolve(config: &GameConfig) -> Result<Self, ConfigError> {
        if let Some(first) = config.validate().into_iter().next() {
            return Err(first);
        }

        let mut towers = Vec::with_capacity(TowerKind::ALL.len());
        for kind in TowerKind::ALL {
            let data = config
                .get_tower(kind)
                .ok_or(ConfigError::MissingTower(kind))?;
            towers.push(data.clone());
        }

        let mut enemies = Vec::with_capacity(EnemyKind::ALL.len());
        for kind in EnemyKind::ALL {
            let data = config
                .get_enemy(kind)
                .ok_or(ConfigError::MissingEnemy(kind))?;
            enemies.push(data.clone());
        }

        Ok(Self {
            towers,
            enemies,
            waves: config.resolved_waves(),
        })
    }

    /// Tower definition for `kind`.
    #[must_use]
    pub fn tower(&self, kind: TowerKind) -> &TowerData {
        &self.towers[kind.index()]
    }

    /// Enemy definition for `kind`.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind) -> &EnemyData {
        &self.enemies[kind.index()]
    }

    /// All waves in play order.
    #[must_use]
    pub fn waves(&self) -> &[WaveData] {
        &self.waves
    }

    /// Wave `number` (1-based).
    #[must_use]
    pub fn wave(&self, number: u32) -> Option<&WaveData> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.waves.get(index)
    }
}
