//! Damage application, splash and bounty accounting.

use tracing::trace;

use super::effect::Effect;
use crate::data::EnemyKind;
use crate::enemy::{Enemy, EnemyId, EnemyMap};
use crate::math::{Fixed, Vec2Fixed};

/// Splash victims take this fraction (0.5) of the primary damage.
pub const SPLASH_DAMAGE_FACTOR: Fixed = Fixed::from_bits(1 << 31);

/// Damage actually removed from one enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Enemy that was damaged.
    pub enemy: EnemyId,
    /// Health removed (clamped at the enemy's remaining health).
    pub amount: Fixed,
    /// True for the direct hit, false for splash.
    pub primary: bool,
}

/// An enemy whose health crossed to zero during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kill {
    /// Enemy that died.
    pub enemy: EnemyId,
    /// Its type.
    pub kind: EnemyKind,
    /// Money to credit.
    pub bounty: u32,
    /// Where it died.
    pub position: Vec2Fixed,
}

/// Everything one impact did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DamageReport {
    /// Per-enemy damage, primary first, then splash victims in id order.
    pub hits: Vec<Hit>,
    /// Enemies killed by this impact. Each enemy appears at most once.
    pub kills: Vec<Kill>,
    /// Explosion ring for splash impacts.
    pub effect: Option<Effect>,
}

impl DamageReport {
    /// Total bounty earned by this impact.
    #[must_use]
    pub fn bounty(&self) -> u32 {
        self.kills.iter().map(|kill| kill.bounty).sum()
    }
}

/// Applies impacts to the enemy collection.
///
/// Dead enemies stay in the collection; the world culls them at the start
/// of the next tick. A kill is reported only on the impact that drops an
/// enemy from positive health to zero, so bounty is paid once.
#[derive(Debug, Clone, Copy, Default)]
pub struct DamageResolver;

impl DamageResolver {
    /// Resolve one impact.
    ///
    /// The primary `target` takes `damage`. When `splash_radius` is
    /// positive, every other live enemy within that radius of `impact`
    /// (inclusive) takes half of it and an explosion effect is produced.
    pub fn apply(
        enemies: &mut EnemyMap,
        target: EnemyId,
        damage: Fixed,
        splash_radius: Fixed,
        impact: Vec2Fixed,
    ) -> DamageReport {
        let mut report = DamageReport::default();

        if let Some(enemy) = enemies.get_mut(&target) {
            Self::strike(enemy, damage, true, &mut report);
        }

        if splash_radius > Fixed::ZERO {
            let splash_damage = damage.saturating_mul(SPLASH_DAMAGE_FACTOR);
            let reach = splash_radius.saturating_mul(splash_radius);

            for (&id, enemy) in enemies.iter_mut() {
                if id == target || enemy.position().distance_squared(impact) > reach {
                    continue;
                }
                Self::strike(enemy, splash_damage, false, &mut report);
            }

            report.effect = Some(Effect::explosion(impact, splash_radius));
        }

        trace!(
            target,
            hits = report.hits.len(),
            kills = report.kills.len(),
            "Impact resolved"
        );
        report
    }

    fn strike(enemy: &mut Enemy, amount: Fixed, primary: bool, report: &mut DamageReport) {
        if !enemy.is_alive() {
            return;
        }

        let applied = enemy.take_damage(amount);
        report.hits.push(Hit {
            enemy: enemy.id(),
            amount: applied,
            primary,
        });

        if !enemy.is_alive() {
            report.kills.push(Kill {
                enemy: enemy.id(),
                kind: enemy.kind(),
                bounty: enemy.bounty(),
                position: enemy.position(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EnemyData;
    use crate::path::PathModel;

    fn enemies_at(points: &[(i32, i32)], health: i32) -> EnemyMap {
        let data = EnemyData {
            kind: EnemyKind::Basic,
            name: "Dummy".to_string(),
            health: Fixed::from_num(health),
            speed: Fixed::ONE,
            bounty: 10,
            damage_to_core: 1,
            radius: Fixed::from_num(10),
        };
        (1..)
            .zip(points)
            .map(|(id, &(x, y))| {
                let path = PathModel::new(vec![
                    Vec2Fixed::from_ints(x, y),
                    Vec2Fixed::from_ints(x + 100, y),
                ])
                .unwrap();
                (id, Enemy::spawn(id, &data, &path))
            })
            .collect()
    }

    #[test]
    fn test_splash_factor_is_half() {
        assert_eq!(SPLASH_DAMAGE_FACTOR, Fixed::from_num(0.5));
    }

    #[test]
    fn test_single_target_damage() {
        let mut enemies = enemies_at(&[(0, 0), (5, 0)], 50);
        let report = DamageResolver::apply(
            &mut enemies,
            1,
            Fixed::from_num(10),
            Fixed::ZERO,
            Vec2Fixed::ZERO,
        );
        assert_eq!(enemies[&1].health(), Fixed::from_num(40));
        assert_eq!(enemies[&2].health(), Fixed::from_num(50));
        assert!(report.effect.is_none());
        assert!(report.kills.is_empty());
    }

    #[test]
    fn test_splash_hits_radius_inclusive() {
        // Primary at origin, one victim on the radius, one just outside.
        let mut enemies = enemies_at(&[(0, 0), (30, 40), (51, 0)], 100);
        let report = DamageResolver::apply(
            &mut enemies,
            1,
            Fixed::from_num(20),
            Fixed::from_num(50),
            Vec2Fixed::ZERO,
        );

        assert_eq!(enemies[&1].health(), Fixed::from_num(80));
        assert_eq!(enemies[&2].health(), Fixed::from_num(90));
        assert_eq!(enemies[&3].health(), Fixed::from_num(100));
        assert_eq!(report.hits.len(), 2);
        assert!(report.hits[0].primary);
        assert!(report.effect.is_some());
    }

    #[test]
    fn test_bounty_granted_once_including_splash_kills() {
        let mut enemies = enemies_at(&[(0, 0), (10, 0)], 10);
        let first = DamageResolver::apply(
            &mut enemies,
            1,
            Fixed::from_num(20),
            Fixed::from_num(50),
            Vec2Fixed::ZERO,
        );
        assert_eq!(first.kills.len(), 2);
        assert_eq!(first.bounty(), 20);

        let second = DamageResolver::apply(
            &mut enemies,
            1,
            Fixed::from_num(20),
            Fixed::from_num(50),
            Vec2Fixed::ZERO,
        );
        assert!(second.kills.is_empty());
        assert!(second.hits.is_empty());
    }
}
