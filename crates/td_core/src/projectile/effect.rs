//! Short-lived visual records. They never influence the simulation.

use crate::math::{Fixed, Vec2Fixed};

/// Radius an explosion ring starts at.
pub const EXPLOSION_START_RADIUS: i32 = 10;

/// Explosion lifetime in seconds (0.2).
pub const EXPLOSION_DURATION_SECS: Fixed = Fixed::from_bits(0x3333_3333);

/// An expanding ring drawn where a splash projectile landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    position: Vec2Fixed,
    start_radius: Fixed,
    end_radius: Fixed,
    duration: Fixed,
    elapsed: Fixed,
}

impl Effect {
    /// Explosion ring growing to `radius` over the standard lifetime.
    #[must_use]
    pub fn explosion(position: Vec2Fixed, radius: Fixed) -> Self {
        Self {
            position,
            start_radius: Fixed::from_num(EXPLOSION_START_RADIUS),
            end_radius: radius,
            duration: EXPLOSION_DURATION_SECS,
            elapsed: Fixed::ZERO,
        }
    }

    /// Age the effect.
    pub fn advance(&mut self, elapsed: Fixed) {
        self.elapsed = self.elapsed.saturating_add(elapsed);
    }

    /// True once the lifetime has run out.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Fraction of the lifetime used, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> Fixed {
        if self.duration <= Fixed::ZERO {
            return Fixed::ONE;
        }
        (self.elapsed / self.duration).min(Fixed::ONE)
    }

    /// Ring radius at the current age.
    #[must_use]
    pub fn current_radius(&self) -> Fixed {
        self.start_radius + (self.end_radius - self.start_radius) * self.progress()
    }

    /// Opacity fading from 1 to 0.
    #[must_use]
    pub fn opacity(&self) -> Fixed {
        Fixed::ONE - self.progress()
    }

    /// Centre of the ring.
    #[must_use]
    pub const fn position(&self) -> Vec2Fixed {
        self.position
    }

    /// Final ring radius.
    #[must_use]
    pub const fn end_radius(&self) -> Fixed {
        self.end_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_is_a_fifth_of_a_second() {
        assert_eq!(EXPLOSION_DURATION_SECS, Fixed::ONE / Fixed::from_num(5));
    }

    #[test]
    fn test_explosion_grows_and_fades() {
        let mut effect = Effect::explosion(Vec2Fixed::ZERO, Fixed::from_num(50));
        assert_eq!(effect.current_radius(), Fixed::from_num(10));
        assert_eq!(effect.opacity(), Fixed::ONE);

        effect.advance(Fixed::from_num(0.1));
        let radius = effect.current_radius();
        assert!(radius > Fixed::from_num(29) && radius < Fixed::from_num(31));
        assert!(!effect.is_finished());

        effect.advance(Fixed::from_num(0.2));
        assert!(effect.is_finished());
        assert_eq!(effect.current_radius(), Fixed::from_num(50));
        assert_eq!(effect.opacity(), Fixed::ZERO);
    }
}
