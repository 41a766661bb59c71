//! Tower type definitions: base stats, upgrade bundles and economics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::game_data::MAX_MONEY;
use crate::error::ConfigError;
use crate::math::{decimal_serde, option_decimal_serde, round_to_u32, Fixed};

/// Tower type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Balanced single-target tower.
    Basic,
    /// Rapid-fire, low-damage tower.
    Fast,
    /// Slow tower whose shots splash nearby enemies.
    Aoe,
}

impl TowerKind {
    /// Every tower kind, in catalog order.
    pub const ALL: [TowerKind; 3] = [TowerKind::Basic, TowerKind::Fast, TowerKind::Aoe];

    /// Position of this kind in [`TowerKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            TowerKind::Basic => 0,
            TowerKind::Fast => 1,
            TowerKind::Aoe => 2,
        }
    }

    /// Lowercase identifier used in data files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TowerKind::Basic => "basic",
            TowerKind::Fast => "fast",
            TowerKind::Aoe => "aoe",
        }
    }
}

impl fmt::Display for TowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TowerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TowerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tower type '{s}'"))
    }
}

/// Combat stats for one tower level.
///
/// # Example RON
///
/// ```ron
/// LevelStats(damage: 20.0, range: 120.0, fire_interval: 80, splash_radius: Some(60.0))
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStats {
    /// Damage per projectile.
    #[serde(with = "decimal_serde")]
    pub damage: Fixed,

    /// Targeting range in world units.
    #[serde(with = "decimal_serde")]
    pub range: Fixed,

    /// Ticks between shots.
    pub fire_interval: u32,

    /// Splash radius; `None` keeps the previous level's radius.
    #[serde(
        default,
        with = "option_decimal_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub splash_radius: Option<Fixed>,
}

impl LevelStats {
    /// Create level stats without splash.
    #[must_use]
    pub fn new(damage: Fixed, range: Fixed, fire_interval: u32) -> Self {
        Self {
            damage,
            range,
            fire_interval,
            splash_radius: None,
        }
    }

    /// Builder method to set the splash radius.
    #[must_use]
    pub fn with_splash(mut self, radius: Fixed) -> Self {
        self.splash_radius = Some(radius);
        self
    }
}

/// Data-driven tower definition.
///
/// # Example RON
///
/// ```ron
/// TowerData(
///     kind: Basic,
///     name: "Basic Tower",
///     cost: 50,
///     base: LevelStats(damage: 10.0, range: 150.0, fire_interval: 60),
///     projectile_speed: 8.0,
///     upgrade_cost_multiplier: 1.5,
///     sell_return_multiplier: 0.7,
///     max_level: 3,
///     upgrades: [
///         LevelStats(damage: 15.0, range: 170.0, fire_interval: 55),
///         LevelStats(damage: 25.0, range: 200.0, fire_interval: 45),
///         LevelStats(damage: 40.0, range: 220.0, fire_interval: 35),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerData {
    /// Tower type this definition describes.
    pub kind: TowerKind,

    /// Display name.
    pub name: String,

    /// Placement cost, also the base of the upgrade cost curve.
    pub cost: u32,

    /// Level 0 stats.
    pub base: LevelStats,

    /// Projectile speed in units per reference frame.
    #[serde(with = "decimal_serde")]
    pub projectile_speed: Fixed,

    /// Upgrade cost at level `L` is `round(cost * multiplier^L)`.
    #[serde(with = "decimal_serde")]
    pub upgrade_cost_multiplier: Fixed,

    /// Fraction of total investment refunded on sale.
    #[serde(with = "decimal_serde", default = "default_sell_return")]
    pub sell_return_multiplier: Fixed,

    /// Highest reachable level.
    pub max_level: u8,

    /// Stats applied when reaching levels `1..=max_level`.
    #[serde(default)]
    pub upgrades: Vec<LevelStats>,
}

fn default_sell_return() -> Fixed {
    Fixed::from_num(0.7)
}

impl TowerData {
    /// Stats bundle for `level`; level 0 is the base bundle.
    #[must_use]
    pub fn level_stats(&self, level: u8) -> Option<&LevelStats> {
        match level {
            0 => Some(&self.base),
            n if n <= self.max_level => self.upgrades.get(usize::from(n) - 1),
            _ => None,
        }
    }

    /// Price of upgrading from `level` to `level + 1`, which is
    /// `round(cost * multiplier^level)`.
    ///
    /// `None` if the price leaves the fixed-point range.
    #[must_use]
    pub fn upgrade_price(&self, level: u8) -> Option<u32> {
        let mut scale = Fixed::ONE;
        for _ in 0..level {
            scale = scale.checked_mul(self.upgrade_cost_multiplier)?;
        }
        let price = Fixed::checked_from_num(self.cost)?.checked_mul(scale)?;
        Some(round_to_u32(price))
    }

    /// Check internal consistency, returning every problem found.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let field = |name: &str| format!("towers.{}.{name}", self.kind);

        if self.cost == 0 {
            errors.push(ConfigError::invalid(field("cost"), "must be positive"));
        }
        if self.cost > MAX_MONEY {
            errors.push(ConfigError::invalid(
                field("cost"),
                format!("must not exceed {MAX_MONEY}"),
            ));
        }
        if self.projectile_speed <= Fixed::ZERO {
            errors.push(ConfigError::invalid(
                field("projectile_speed"),
                "must be positive",
            ));
        }
        if self.upgrade_cost_multiplier <= Fixed::ZERO {
            errors.push(ConfigError::invalid(
                field("upgrade_cost_multiplier"),
                "must be positive",
            ));
        }
        if self.sell_return_multiplier < Fixed::ZERO || self.sell_return_multiplier > Fixed::ONE {
            errors.push(ConfigError::invalid(
                field("sell_return_multiplier"),
                "must be between 0 and 1",
            ));
        }
        let overpriced = (0..self.max_level)
            .find(|&level| !self.upgrade_price(level).is_some_and(|price| price <= MAX_MONEY));
        if let Some(level) = overpriced {
            errors.push(ConfigError::invalid(
                field("upgrade_cost_multiplier"),
                format!("upgrade from level {level} costs more than {MAX_MONEY}"),
            ));
        }
        if self.upgrades.len() < usize::from(self.max_level) {
            errors.push(ConfigError::invalid(
                field("upgrades"),
                format!(
                    "max_level is {} but only {} upgrade bundles are defined",
                    self.max_level,
                    self.upgrades.len()
                ),
            ));
        }

        let levels = std::iter::once(&self.base).chain(self.upgrades.iter());
        let mut previous: Option<(&LevelStats, Fixed)> = None;
        for (level, stats) in levels.enumerate() {
            let splash = stats
                .splash_radius
                .or_else(|| previous.map(|(_, radius)| radius))
                .unwrap_or(Fixed::ZERO);

            if stats.range <= Fixed::ZERO || stats.fire_interval == 0 {
                errors.push(ConfigError::invalid(
                    field(&format!("level{level}")),
                    "range and fire_interval must be positive",
                ));
            }
            if let Some((prev, prev_splash)) = previous {
                let regresses = stats.damage < prev.damage
                    || stats.range < prev.range
                    || stats.fire_interval > prev.fire_interval
                    || splash < prev_splash;
                if regresses {
                    errors.push(ConfigError::invalid(
                        field(&format!("level{level}")),
                        "stats regress from the previous level",
                    ));
                }
            }
            previous = Some((stats, splash));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_tower() -> TowerData {
        TowerData {
            kind: TowerKind::Basic,
            name: "Basic Tower".to_string(),
            cost: 50,
            base: LevelStats::new(Fixed::from_num(10), Fixed::from_num(150), 60),
            projectile_speed: Fixed::from_num(8),
            upgrade_cost_multiplier: Fixed::from_num(1.5),
            sell_return_multiplier: Fixed::from_num(0.7),
            max_level: 2,
            upgrades: vec![
                LevelStats::new(Fixed::from_num(15), Fixed::from_num(170), 55),
                LevelStats::new(Fixed::from_num(25), Fixed::from_num(200), 45),
            ],
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("AOE".parse::<TowerKind>(), Ok(TowerKind::Aoe));
        assert_eq!(" fast ".parse::<TowerKind>(), Ok(TowerKind::Fast));
        assert!("sniper".parse::<TowerKind>().is_err());
    }

    #[test]
    fn test_level_stats_lookup() {
        let tower = basic_tower();
        assert_eq!(tower.level_stats(0), Some(&tower.base));
        assert_eq!(tower.level_stats(2), Some(&tower.upgrades[1]));
        assert_eq!(tower.level_stats(3), None);
    }

    #[test]
    fn test_validate_accepts_consistent_data() {
        let errors = basic_tower().validate();
        assert!(errors.is_empty(), "Errors: {errors:?}");
    }

    #[test]
    fn test_validate_rejects_missing_bundles() {
        let mut tower = basic_tower();
        tower.max_level = 3;
        let errors = tower.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("upgrade bundles"));
    }

    #[test]
    fn test_upgrade_price_curve() {
        let tower = basic_tower();
        assert_eq!(tower.upgrade_price(0), Some(50));
        assert_eq!(tower.upgrade_price(1), Some(75));
        assert_eq!(tower.upgrade_price(2), Some(113));
    }

    #[test]
    fn test_upgrade_price_overflow_is_none() {
        let mut tower = basic_tower();
        tower.cost = 2_500_000_000;
        assert_eq!(tower.upgrade_price(0), None);

        tower.cost = 1_000;
        tower.upgrade_cost_multiplier = Fixed::from_num(1_000_000);
        assert_eq!(tower.upgrade_price(2), None);
    }

    #[test]
    fn test_validate_rejects_unpayable_prices() {
        let mut tower = basic_tower();
        tower.cost = 2_500_000_000;
        let errors = tower.validate();
        assert!(errors.iter().any(|e| e.to_string().contains("towers.basic.cost")));
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("upgrade_cost_multiplier")));

        let mut tower = basic_tower();
        tower.upgrade_cost_multiplier = Fixed::from_num(5_000);
        let errors = tower.validate();
        assert_eq!(errors.len(), 1, "Errors: {errors:?}");
        assert!(errors[0].to_string().contains("upgrade from level 2"));

        let mut tower = basic_tower();
        tower.sell_return_multiplier = Fixed::from_num(1.5);
        assert_eq!(tower.validate().len(), 1);
    }

    #[test]
    fn test_validate_rejects_regression() {
        let mut tower = basic_tower();
        tower.upgrades[1].damage = Fixed::from_num(5);
        let errors = tower.validate();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("regress")));
    }
}
