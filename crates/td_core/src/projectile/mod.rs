//! Projectiles in flight and what happens when they land.
//!
//! A projectile homes on its target's current position every tick. It
//! resolves in the tick it reaches the target, touches it, or finds the
//! target gone; resolution always removes it.

mod damage;
mod effect;

pub use damage::{DamageReport, DamageResolver, Hit, Kill, SPLASH_DAMAGE_FACTOR};
pub use effect::{Effect, EXPLOSION_DURATION_SECS, EXPLOSION_START_RADIUS};

use crate::enemy::{EnemyId, EnemyMap};
use crate::math::{Fixed, Vec2Fixed, REFERENCE_FRAME_RATE};
use crate::tower::{FireRequest, TowerId};

/// Unique projectile identifier.
pub type ProjectileId = u32;

/// Result of advancing a projectile by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOutcome {
    /// Still travelling.
    InFlight,
    /// Reached a live target; damage should be applied.
    Impact {
        /// Enemy that was hit.
        target: EnemyId,
        /// Impact point, the centre of any splash.
        position: Vec2Fixed,
    },
    /// Target died or vanished before contact.
    Dissipated,
}

/// A homing projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projectile {
    id: ProjectileId,
    source: TowerId,
    target: EnemyId,
    position: Vec2Fixed,
    damage: Fixed,
    speed: Fixed,
    splash_radius: Fixed,
    radius: Fixed,
}

impl Projectile {
    /// Launch a projectile for a tower's fire request.
    #[must_use]
    pub fn from_request(id: ProjectileId, request: &FireRequest, radius: Fixed) -> Self {
        Self {
            id,
            source: request.tower,
            target: request.target,
            position: request.origin,
            damage: request.damage,
            speed: request.speed,
            splash_radius: request.splash_radius,
            radius,
        }
    }

    /// Move toward the target and report whether the projectile resolved.
    pub fn advance(&mut self, elapsed: Fixed, enemies: &EnemyMap) -> ProjectileOutcome {
        let Some(target) = enemies.get(&self.target).filter(|e| e.is_alive()) else {
            return ProjectileOutcome::Dissipated;
        };

        let destination = target.position();
        let step = self.speed * elapsed * Fixed::from_num(REFERENCE_FRAME_RATE);
        let contact = target.radius() + self.radius;

        self.position = self.position.move_towards(destination, step);
        if self.position == destination || self.position.distance(destination) < contact {
            ProjectileOutcome::Impact {
                target: self.target,
                position: self.position,
            }
        } else {
            ProjectileOutcome::InFlight
        }
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Tower that fired this projectile.
    #[must_use]
    pub const fn source(&self) -> TowerId {
        self.source
    }

    /// Enemy being tracked.
    #[must_use]
    pub const fn target(&self) -> EnemyId {
        self.target
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2Fixed {
        self.position
    }

    /// Damage on impact.
    #[must_use]
    pub const fn damage(&self) -> Fixed {
        self.damage
    }

    /// Speed in units per reference frame.
    #[must_use]
    pub const fn speed(&self) -> Fixed {
        self.speed
    }

    /// Splash radius; zero for single-target shots.
    #[must_use]
    pub const fn splash_radius(&self) -> Fixed {
        self.splash_radius
    }

    /// Contact radius.
    #[must_use]
    pub const fn radius(&self) -> Fixed {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{EnemyData, EnemyKind};
    use crate::enemy::Enemy;
    use crate::path::PathModel;

    fn target_at(x: i32) -> EnemyMap {
        let path =
            PathModel::new(vec![Vec2Fixed::from_ints(x, 0), Vec2Fixed::from_ints(x, 100)]).unwrap();
        let data = EnemyData {
            kind: EnemyKind::Basic,
            name: "Dummy".to_string(),
            health: Fixed::from_num(50),
            speed: Fixed::ONE,
            bounty: 10,
            damage_to_core: 1,
            radius: Fixed::from_num(10),
        };
        EnemyMap::from([(7, Enemy::spawn(7, &data, &path))])
    }

    fn shot(speed: i32) -> Projectile {
        let request = FireRequest {
            tower: 1,
            origin: Vec2Fixed::ZERO,
            target: 7,
            damage: Fixed::from_num(10),
            speed: Fixed::from_num(speed),
            splash_radius: Fixed::ZERO,
        };
        Projectile::from_request(1, &request, Fixed::from_num(5))
    }

    #[test]
    fn test_travels_until_target_reached() {
        let enemies = target_at(480);
        // 2 units/frame = 120 units per second.
        let mut projectile = shot(2);

        assert_eq!(projectile.advance(Fixed::ONE, &enemies), ProjectileOutcome::InFlight);
        assert_eq!(projectile.position(), Vec2Fixed::from_ints(120, 0));

        // A step covering the remaining 360 units snaps onto the target.
        let outcome = projectile.advance(Fixed::from_num(3), &enemies);
        assert_eq!(
            outcome,
            ProjectileOutcome::Impact {
                target: 7,
                position: Vec2Fixed::from_ints(480, 0),
            }
        );
    }

    #[test]
    fn test_contact_radius_resolves_early() {
        let enemies = target_at(128);
        let mut projectile = shot(2);
        // Lands at x = 120: 8 short, inside the 10 + 5 contact radius.
        let outcome = projectile.advance(Fixed::ONE, &enemies);
        assert_eq!(
            outcome,
            ProjectileOutcome::Impact {
                target: 7,
                position: Vec2Fixed::from_ints(120, 0),
            }
        );
    }

    #[test]
    fn test_dissipates_when_target_gone() {
        let mut enemies = target_at(300);
        let mut projectile = shot(2);
        enemies.get_mut(&7).unwrap().take_damage(Fixed::from_num(50));
        assert_eq!(projectile.advance(Fixed::ONE, &enemies), ProjectileOutcome::Dissipated);
        assert_eq!(projectile.advance(Fixed::ONE, &EnemyMap::new()), ProjectileOutcome::Dissipated);
    }
}
