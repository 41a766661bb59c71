//! Wave composition tables and the default wave generator.

use serde::{Deserialize, Serialize};

use super::enemy_data::EnemyKind;
use crate::error::ConfigError;
use crate::math::{decimal_serde, Fixed};

/// Seconds between spawns in the first wave; later waves scale this down.
pub const BASE_SPAWN_INTERVAL_SECS: i32 = 3;

/// Interval scale never drops below this many hundredths.
const MIN_INTERVAL_PERCENT: u32 = 10;

/// A group of identical enemies inside a wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveGroup {
    /// Enemy type.
    pub enemy: EnemyKind,
    /// How many of them to spawn.
    pub count: u32,
}

impl WaveGroup {
    /// Create a new group.
    #[must_use]
    pub const fn new(enemy: EnemyKind, count: u32) -> Self {
        Self { enemy, count }
    }
}

/// One wave: its composition and release cadence.
///
/// # Example RON
///
/// ```ron
/// WaveData(
///     groups: [WaveGroup(enemy: Basic, count: 10), WaveGroup(enemy: Fast, count: 2)],
///     spawn_interval: 3.0,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveData {
    /// Ordered (type, count) pairs.
    pub groups: Vec<WaveGroup>,

    /// Seconds of logical time between releases.
    #[serde(with = "decimal_serde")]
    pub spawn_interval: Fixed,
}

impl WaveData {
    /// Total number of enemies this wave spawns.
    #[must_use]
    pub fn total_enemies(&self) -> u32 {
        self.groups.iter().map(|group| group.count).sum()
    }

    /// Expand the groups into one spawn token per enemy, in declaration order.
    #[must_use]
    pub fn spawn_tokens(&self) -> Vec<EnemyKind> {
        self.groups
            .iter()
            .flat_map(|group| std::iter::repeat(group.enemy).take(group.count as usize))
            .collect()
    }

    /// Check internal consistency for wave `number` (1-based).
    #[must_use]
    pub fn validate(&self, number: u32) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.spawn_interval <= Fixed::ZERO {
            errors.push(ConfigError::invalid(
                format!("waves.{number}.spawn_interval"),
                "must be positive",
            ));
        }
        if self.total_enemies() == 0 {
            errors.push(ConfigError::invalid(
                format!("waves.{number}.groups"),
                "wave spawns no enemies",
            ));
        }
        errors
    }
}

/// Generate the stock wave table for `max_waves` waves.
///
/// Five hand-authored waves, then a linear ramp: every later wave adds
/// basics, fasts and tanks and shortens the spawn interval.
#[must_use]
pub fn generate_default_waves(max_waves: u32) -> Vec<WaveData> {
    use EnemyKind::{Basic, Fast, Tank};

    let authored: [(&[(EnemyKind, u32)], u32); 5] = [
        (&[(Basic, 10), (Fast, 2)], 100),
        (&[(Basic, 15), (Fast, 5)], 90),
        (&[(Basic, 10), (Fast, 8), (Tank, 1)], 80),
        (&[(Fast, 15), (Tank, 2)], 70),
        (&[(Basic, 20), (Fast, 10), (Tank, 3)], 60),
    ];

    (1..=max_waves)
        .map(|number| {
            let (groups, percent) = match authored.get(number as usize - 1) {
                Some((groups, percent)) => (
                    groups
                        .iter()
                        .map(|&(enemy, count)| WaveGroup::new(enemy, count))
                        .collect(),
                    *percent,
                ),
                None => {
                    let step = number - 5;
                    (
                        vec![
                            WaveGroup::new(Basic, 20 + step * 5),
                            WaveGroup::new(Fast, 10 + step * 3),
                            WaveGroup::new(Tank, 3 + step * 7 / 10),
                        ],
                        60u32.saturating_sub(step * 5).max(MIN_INTERVAL_PERCENT),
                    )
                }
            };

            WaveData {
                groups,
                spawn_interval: Fixed::from_num(BASE_SPAWN_INTERVAL_SECS) * Fixed::from_num(percent)
                    / Fixed::from_num(100),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_matches_authored_waves() {
        let waves = generate_default_waves(10);
        assert_eq!(waves.len(), 10);

        assert_eq!(waves[0].total_enemies(), 12);
        assert_eq!(waves[0].spawn_interval, Fixed::from_num(3));
        assert_eq!(waves[2].total_enemies(), 19);
        assert_eq!(waves[4].total_enemies(), 33);
    }

    #[test]
    fn test_generated_waves_ramp() {
        let waves = generate_default_waves(10);
        // Wave 10: basic 45, fast 25, tank 3 + floor(3.5) = 6.
        assert_eq!(
            waves[9].groups,
            vec![
                WaveGroup::new(EnemyKind::Basic, 45),
                WaveGroup::new(EnemyKind::Fast, 25),
                WaveGroup::new(EnemyKind::Tank, 6),
            ]
        );
        assert_eq!(
            waves[9].spawn_interval,
            Fixed::from_num(3) * Fixed::from_num(35) / Fixed::from_num(100)
        );
    }

    #[test]
    fn test_interval_floor_for_long_campaigns() {
        let waves = generate_default_waves(30);
        let floor = Fixed::from_num(3) * Fixed::from_num(10) / Fixed::from_num(100);
        assert!(waves.iter().all(|wave| wave.spawn_interval >= floor));
    }

    #[test]
    fn test_spawn_tokens_expand_counts() {
        let wave = WaveData {
            groups: vec![
                WaveGroup::new(EnemyKind::Basic, 2),
                WaveGroup::new(EnemyKind::Tank, 1),
            ],
            spawn_interval: Fixed::ONE,
        };
        assert_eq!(
            wave.spawn_tokens(),
            vec![EnemyKind::Basic, EnemyKind::Basic, EnemyKind::Tank]
        );
    }
}
