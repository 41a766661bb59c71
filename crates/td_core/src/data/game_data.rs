//! Top-level game configuration.

use serde::{Deserialize, Serialize};

use super::enemy_data::{EnemyData, EnemyKind};
use super::tower_data::{LevelStats, TowerData, TowerKind};
use super::wave_data::{generate_default_waves, WaveData};
use crate::error::ConfigError;
use crate::math::{decimal_serde, points_decimal_serde, Fixed, Vec2Fixed};
use crate::path::{PathBlockMode, PathModel};

/// Upper bound for starting money, bonuses and every tower price.
pub const MAX_MONEY: u32 = 1_000_000;

/// Upper bound for `max_waves`.
pub const MAX_WAVES: u32 = 1_000;

/// Static configuration for one game.
///
/// Everything the simulation needs that is not runtime state: economy
/// constants, map geometry, the enemy path and the tower, enemy and wave
/// tables. [`GameConfig::default`] reproduces the stock game.
///
/// # Example RON
///
/// ```ron
/// GameConfig(
///     starting_money: 100,
///     starting_lives: 20,
///     max_waves: 10,
///     path: [(0.0, 350.0), (150.0, 350.0), (150.0, 100.0)],
///     towers: [...],
///     enemies: [...],
///     waves: [],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Money at game start.
    #[serde(default = "default_starting_money")]
    pub starting_money: u32,

    /// Lives at game start.
    #[serde(default = "default_starting_lives")]
    pub starting_lives: u32,

    /// Number of waves in a game; clearing the last one is victory.
    #[serde(default = "default_max_waves")]
    pub max_waves: u32,

    /// Money credited when a non-final wave is cleared.
    #[serde(default = "default_wave_clear_bonus")]
    pub wave_clear_bonus: u32,

    /// Map width in world units.
    #[serde(with = "decimal_serde", default = "default_map_width")]
    pub map_width: Fixed,

    /// Map height in world units.
    #[serde(with = "decimal_serde", default = "default_map_height")]
    pub map_height: Fixed,

    /// Placement grid cell size.
    #[serde(with = "decimal_serde", default = "default_grid_size")]
    pub grid_size: Fixed,

    /// Side length of a tower's square footprint.
    #[serde(with = "decimal_serde", default = "default_tower_footprint")]
    pub tower_footprint: Fixed,

    /// Extra clearance between a tower footprint and the path.
    #[serde(with = "decimal_serde", default = "default_placement_buffer")]
    pub placement_buffer: Fixed,

    /// Contact radius of projectiles.
    #[serde(with = "decimal_serde", default = "default_projectile_radius")]
    pub projectile_radius: Fixed,

    /// Seed for the spawn-order shuffle.
    #[serde(default)]
    pub rng_seed: u64,

    /// Path test used by tower placement.
    #[serde(default)]
    pub path_block_mode: PathBlockMode,

    /// Path waypoints as `(x, y)` pairs.
    #[serde(with = "points_decimal_serde", default = "default_path")]
    pub path: Vec<Vec2Fixed>,

    /// One definition per tower type.
    #[serde(default = "default_towers")]
    pub towers: Vec<TowerData>,

    /// One definition per enemy type.
    #[serde(default = "default_enemies")]
    pub enemies: Vec<EnemyData>,

    /// Explicit wave table; empty means "use the default generator".
    #[serde(default)]
    pub waves: Vec<WaveData>,
}

const fn default_starting_money() -> u32 {
    100
}

const fn default_starting_lives() -> u32 {
    20
}

const fn default_max_waves() -> u32 {
    10
}

const fn default_wave_clear_bonus() -> u32 {
    50
}

fn default_map_width() -> Fixed {
    Fixed::from_num(1200)
}

fn default_map_height() -> Fixed {
    Fixed::from_num(700)
}

fn default_grid_size() -> Fixed {
    Fixed::from_num(50)
}

fn default_tower_footprint() -> Fixed {
    // 0.8 of a grid cell.
    Fixed::from_num(40)
}

fn default_placement_buffer() -> Fixed {
    Fixed::from_num(5)
}

fn default_projectile_radius() -> Fixed {
    Fixed::from_num(5)
}

fn default_path() -> Vec<Vec2Fixed> {
    [
        (0, 350),
        (150, 350),
        (150, 100),
        (400, 100),
        (400, 500),
        (600, 500),
        (600, 200),
        (900, 200),
        (900, 600),
        (1100, 600),
        (1100, 350),
        (1250, 350),
    ]
    .into_iter()
    .map(|(x, y)| Vec2Fixed::from_ints(x, y))
    .collect()
}

fn stats(damage: i32, range: i32, fire_interval: u32) -> LevelStats {
    LevelStats::new(Fixed::from_num(damage), Fixed::from_num(range), fire_interval)
}

fn default_towers() -> Vec<TowerData> {
    let tower = |kind, name: &str, cost, base, speed: i32, multiplier: f64, upgrades| TowerData {
        kind,
        name: name.to_string(),
        cost,
        base,
        projectile_speed: Fixed::from_num(speed),
        upgrade_cost_multiplier: Fixed::from_num(multiplier),
        sell_return_multiplier: Fixed::from_num(0.7),
        max_level: 3,
        upgrades,
    };

    vec![
        tower(
            TowerKind::Basic,
            "Basic Tower",
            50,
            stats(10, 150, 60),
            8,
            1.5,
            vec![stats(15, 170, 55), stats(25, 200, 45), stats(40, 220, 35)],
        ),
        tower(
            TowerKind::Fast,
            "Fast Tower",
            80,
            stats(5, 120, 30),
            12,
            1.6,
            vec![stats(8, 140, 25), stats(15, 160, 20), stats(25, 180, 15)],
        ),
        tower(
            TowerKind::Aoe,
            "AOE Tower",
            120,
            stats(15, 100, 90).with_splash(Fixed::from_num(50)),
            6,
            1.7,
            vec![
                stats(20, 120, 80).with_splash(Fixed::from_num(60)),
                stats(30, 140, 70).with_splash(Fixed::from_num(70)),
                stats(45, 160, 60).with_splash(Fixed::from_num(80)),
            ],
        ),
    ]
}

fn default_enemies() -> Vec<EnemyData> {
    let enemy = |kind, name: &str, health: i32, speed: f64, bounty, damage_to_core| EnemyData {
        kind,
        name: name.to_string(),
        health: Fixed::from_num(health),
        speed: Fixed::from_num(speed),
        bounty,
        damage_to_core,
        radius: Fixed::from_num(10),
    };

    vec![
        enemy(EnemyKind::Basic, "Basic Alien", 50, 1.5, 10, 1),
        enemy(EnemyKind::Fast, "Fast Alien", 30, 3.0, 15, 1),
        enemy(EnemyKind::Tank, "Tank Alien", 200, 0.8, 30, 2),
    ]
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_money: default_starting_money(),
            starting_lives: default_starting_lives(),
            max_waves: default_max_waves(),
            wave_clear_bonus: default_wave_clear_bonus(),
            map_width: default_map_width(),
            map_height: default_map_height(),
            grid_size: default_grid_size(),
            tower_footprint: default_tower_footprint(),
            placement_buffer: default_placement_buffer(),
            projectile_radius: default_projectile_radius(),
            rng_seed: 0,
            path_block_mode: PathBlockMode::default(),
            path: default_path(),
            towers: default_towers(),
            enemies: default_enemies(),
            waves: Vec::new(),
        }
    }
}

impl GameConfig {
    /// Parse a configuration from RON text.
    ///
    /// Parsing does not validate; call [`GameConfig::validate`] or build a
    /// [`Catalog`](super::Catalog) for that.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not a valid config.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Render the configuration as pretty-printed RON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Look up a tower definition.
    #[must_use]
    pub fn get_tower(&self, kind: TowerKind) -> Option<&TowerData> {
        self.towers.iter().find(|t| t.kind == kind)
    }

    /// Look up an enemy definition.
    #[must_use]
    pub fn get_enemy(&self, kind: EnemyKind) -> Option<&EnemyData> {
        self.enemies.iter().find(|e| e.kind == kind)
    }

    /// The wave table actually played: the explicit one, or the generated
    /// default when none is given. Truncated to `max_waves`, itself capped
    /// at [`MAX_WAVES`].
    #[must_use]
    pub fn resolved_waves(&self) -> Vec<WaveData> {
        let count = self.max_waves.min(MAX_WAVES);
        if self.waves.is_empty() {
            generate_default_waves(count)
        } else {
            self.waves.iter().take(count as usize).cloned().collect()
        }
    }

    /// Validate the configuration.
    ///
    /// Returns every problem found; an empty list means the config can be
    /// resolved into a catalog.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.starting_lives == 0 {
            errors.push(ConfigError::invalid("starting_lives", "must be positive"));
        }
        if self.max_waves == 0 {
            errors.push(ConfigError::invalid("max_waves", "must be positive"));
        }
        if self.max_waves > MAX_WAVES {
            errors.push(ConfigError::invalid(
                "max_waves",
                format!("must not exceed {MAX_WAVES}"),
            ));
        }
        for (field, value) in [
            ("starting_money", self.starting_money),
            ("wave_clear_bonus", self.wave_clear_bonus),
        ] {
            if value > MAX_MONEY {
                errors.push(ConfigError::invalid(
                    field,
                    format!("must not exceed {MAX_MONEY}"),
                ));
            }
        }
        for (field, value) in [
            ("map_width", self.map_width),
            ("map_height", self.map_height),
            ("grid_size", self.grid_size),
            ("tower_footprint", self.tower_footprint),
        ] {
            if value <= Fixed::ZERO {
                errors.push(ConfigError::invalid(field, "must be positive"));
            }
        }
        for (field, value) in [
            ("placement_buffer", self.placement_buffer),
            ("projectile_radius", self.projectile_radius),
        ] {
            if value < Fixed::ZERO {
                errors.push(ConfigError::invalid(field, "must not be negative"));
            }
        }

        if let Err(e) = PathModel::new(self.path.clone()) {
            errors.push(e);
        }

        for kind in TowerKind::ALL {
            match self.towers.iter().filter(|t| t.kind == kind).count() {
                0 => errors.push(ConfigError::MissingTower(kind)),
                1 => {}
                _ => errors.push(ConfigError::DuplicateTower(kind)),
            }
        }
        for tower in &self.towers {
            errors.extend(tower.validate());
        }

        for kind in EnemyKind::ALL {
            match self.enemies.iter().filter(|e| e.kind == kind).count() {
                0 => errors.push(ConfigError::MissingEnemy(kind)),
                1 => {}
                _ => errors.push(ConfigError::DuplicateEnemy(kind)),
            }
        }
        for enemy in &self.enemies {
            errors.extend(enemy.validate());
        }

        if self.max_waves > MAX_WAVES {
            return errors;
        }
        let waves = self.resolved_waves();
        let defined = waves.len() as u32;
        if defined < self.max_waves {
            errors.push(ConfigError::MissingWaves {
                first: defined + 1,
                last: self.max_waves,
            });
        }
        for (number, wave) in (1..).zip(&waves) {
            errors.extend(wave.validate(number));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Catalog, WaveGroup};

    #[test]
    fn test_default_config_is_valid() {
        let errors = GameConfig::default().validate();
        assert!(errors.is_empty(), "Errors: {errors:?}");
    }

    #[test]
    fn test_default_tables() {
        let config = GameConfig::default();
        let aoe = config.get_tower(TowerKind::Aoe).unwrap();
        assert_eq!(aoe.cost, 120);
        assert_eq!(aoe.base.splash_radius, Some(Fixed::from_num(50)));
        assert_eq!(config.get_enemy(EnemyKind::Tank).unwrap().damage_to_core, 2);
        assert_eq!(config.resolved_waves().len(), 10);
    }

    #[test]
    fn test_missing_tables_reported() {
        let mut config = GameConfig::default();
        config.towers.retain(|t| t.kind != TowerKind::Fast);
        config.enemies.push(config.enemies[0].clone());
        config.waves = vec![WaveData {
            groups: vec![WaveGroup::new(EnemyKind::Basic, 1)],
            spawn_interval: Fixed::ONE,
        }];
        config.max_waves = 2;

        let errors = config.validate();
        assert!(errors.contains(&ConfigError::MissingTower(TowerKind::Fast)));
        assert!(errors.contains(&ConfigError::DuplicateEnemy(EnemyKind::Basic)));
        assert!(errors.contains(&ConfigError::MissingWaves { first: 2, last: 2 }));
    }

    #[test]
    fn test_short_wave_table_is_one_error() {
        let mut config = GameConfig::default();
        config.waves = generate_default_waves(3);
        config.max_waves = MAX_WAVES;

        let errors = config.validate();
        assert_eq!(
            errors,
            vec![ConfigError::MissingWaves {
                first: 4,
                last: MAX_WAVES
            }]
        );
    }

    #[test]
    fn test_huge_wave_count_rejected_without_generating() {
        let config = GameConfig {
            max_waves: u32::MAX,
            ..GameConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1, "Errors: {errors:?}");
        assert!(errors[0].to_string().contains("max_waves"));
        assert_eq!(config.resolved_waves().len(), MAX_WAVES as usize);
    }

    #[test]
    fn test_longest_default_campaign_is_valid() {
        let config = GameConfig {
            max_waves: MAX_WAVES,
            ..GameConfig::default()
        };
        let errors = config.validate();
        assert!(errors.is_empty(), "Errors: {errors:?}");
    }

    #[test]
    fn test_money_bounds() {
        let mut config = GameConfig {
            starting_money: u32::MAX,
            wave_clear_bonus: MAX_MONEY + 1,
            ..GameConfig::default()
        };
        config.towers[0].cost = 2_500_000_000;

        let errors = config.validate();
        for field in ["starting_money", "wave_clear_bonus", "towers.basic.cost"] {
            assert!(
                errors.iter().any(|e| e.to_string().contains(field)),
                "{field} not reported in {errors:?}"
            );
        }
        assert!(Catalog::resolve(&config).is_err());
    }

    #[test]
    fn test_ron_round_trip_preserves_config() {
        let config = GameConfig::default();
        let text = config.to_ron_string().unwrap();
        let parsed = GameConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_sparse_ron_uses_defaults() {
        let config = GameConfig::from_ron_str("(starting_money: 250, rng_seed: 7)").unwrap();
        assert_eq!(config.starting_money, 250);
        assert_eq!(config.rng_seed, 7);
        assert_eq!(config.starting_lives, 20);
        assert_eq!(config.towers.len(), 3);
    }

    #[test]
    fn test_parse_error_surfaces() {
        let err = GameConfig::from_ron_str("(starting_money: \"lots\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
