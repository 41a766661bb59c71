//! Path-following enemies.

use std::collections::BTreeMap;

use crate::data::{EnemyData, EnemyKind};
use crate::math::{Fixed, Vec2Fixed, REFERENCE_FRAME_RATE};
use crate::path::PathModel;

/// Unique enemy identifier, allocated in spawn order.
pub type EnemyId = u32;

/// Live enemies keyed by id. Iteration order is ascending id, which is
/// the canonical order for targeting tie-breaks.
pub type EnemyMap = BTreeMap<EnemyId, Enemy>;

/// A single enemy walking the path.
///
/// Health only ever goes down and stays in `[0, max_health]`; progress
/// only ever goes up and stays in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    health: Fixed,
    max_health: Fixed,
    speed: Fixed,
    progress: Fixed,
    bounty: u32,
    damage_to_core: u32,
    radius: Fixed,
    position: Vec2Fixed,
}

impl Enemy {
    /// Spawn an enemy at the start of `path` with full health.
    #[must_use]
    pub fn spawn(id: EnemyId, data: &EnemyData, path: &PathModel) -> Self {
        Self {
            id,
            kind: data.kind,
            health: data.health,
            max_health: data.health,
            speed: data.speed,
            progress: Fixed::ZERO,
            bounty: data.bounty,
            damage_to_core: data.damage_to_core,
            radius: data.radius,
            position: path.start(),
        }
    }

    /// Move along the path by `elapsed` seconds of travel.
    ///
    /// Dead enemies stay where they fell.
    pub fn advance(&mut self, elapsed: Fixed, path: &PathModel) {
        if !self.is_alive() || self.is_at_end() {
            return;
        }

        let travelled = self.speed * elapsed * Fixed::from_num(REFERENCE_FRAME_RATE);
        self.progress = (self.progress + travelled / path.total_length()).min(Fixed::ONE);
        self.position = path.position_at(self.progress);
    }

    /// Deduct up to `amount` health and return how much was actually
    /// removed. A dead enemy absorbs nothing.
    pub fn take_damage(&mut self, amount: Fixed) -> Fixed {
        let applied = amount.max(Fixed::ZERO).min(self.health);
        self.health -= applied;
        applied
    }

    /// True while health is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > Fixed::ZERO
    }

    /// True once the enemy has walked the whole path.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.progress >= Fixed::ONE
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Enemy type.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> Fixed {
        self.health
    }

    /// Health at spawn.
    #[must_use]
    pub const fn max_health(&self) -> Fixed {
        self.max_health
    }

    /// Path speed in units per reference frame.
    #[must_use]
    pub const fn speed(&self) -> Fixed {
        self.speed
    }

    /// Normalized path progress.
    #[must_use]
    pub const fn progress(&self) -> Fixed {
        self.progress
    }

    /// Money granted on death.
    #[must_use]
    pub const fn bounty(&self) -> u32 {
        self.bounty
    }

    /// Lives lost when this enemy leaks.
    #[must_use]
    pub const fn damage_to_core(&self) -> u32 {
        self.damage_to_core
    }

    /// Collision radius.
    #[must_use]
    pub const fn radius(&self) -> Fixed {
        self.radius
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Vec2Fixed {
        self.position
    }
}
