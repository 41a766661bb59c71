//! Enemy type definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::math::{decimal_serde, Fixed};

/// Enemy type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline walker.
    Basic,
    /// Fragile and quick.
    Fast,
    /// Slow with a large health pool; costs more lives on a leak.
    Tank,
}

impl EnemyKind {
    /// Every enemy kind, in catalog order.
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Tank];

    /// Position of this kind in [`EnemyKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            EnemyKind::Basic => 0,
            EnemyKind::Fast => 1,
            EnemyKind::Tank => 2,
        }
    }

    /// Lowercase identifier used in data files and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Fast => "fast",
            EnemyKind::Tank => "tank",
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnemyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnemyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown enemy type '{s}'"))
    }
}

/// Data-driven enemy definition.
///
/// # Example RON
///
/// ```ron
/// EnemyData(
///     kind: Tank,
///     name: "Tank Alien",
///     health: 200.0,
///     speed: 0.8,
///     bounty: 30,
///     damage_to_core: 2,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyData {
    /// Enemy type this definition describes.
    pub kind: EnemyKind,

    /// Display name.
    pub name: String,

    /// Maximum (and starting) health.
    #[serde(with = "decimal_serde")]
    pub health: Fixed,

    /// Path speed in units per reference frame.
    #[serde(with = "decimal_serde")]
    pub speed: Fixed,

    /// Money credited when killed.
    pub bounty: u32,

    /// Lives debited when the enemy reaches the end of the path.
    pub damage_to_core: u32,

    /// Collision radius.
    #[serde(with = "decimal_serde", default = "default_radius")]
    pub radius: Fixed,
}

fn default_radius() -> Fixed {
    Fixed::from_num(10)
}

impl EnemyData {
    /// Check internal consistency, returning every problem found.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let field = |name: &str| format!("enemies.{}.{name}", self.kind);

        if self.health <= Fixed::ZERO {
            errors.push(ConfigError::invalid(field("health"), "must be positive"));
        }
        if self.speed < Fixed::ZERO {
            errors.push(ConfigError::invalid(field("speed"), "must not be negative"));
        }
        if self.radius < Fixed::ZERO {
            errors.push(ConfigError::invalid(field("radius"), "must not be negative"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip_through_str() {
        for kind in EnemyKind::ALL {
            assert_eq!(kind.to_string().parse::<EnemyKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_validate_rejects_dead_on_arrival() {
        let enemy = EnemyData {
            kind: EnemyKind::Fast,
            name: "Fast Alien".to_string(),
            health: Fixed::ZERO,
            speed: Fixed::from_num(3),
            bounty: 15,
            damage_to_core: 1,
            radius: default_radius(),
        };
        let errors = enemy.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("enemies.fast.health"));
    }
}
