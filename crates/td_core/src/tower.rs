//! Stationary towers: targeting, firing and upgrade economics.
//!
//! A tower never creates projectiles itself. [`Tower::update`] returns a
//! [`FireRequest`] and the world decides what to do with it.
//!
//! # Targeting
//!
//! ```text
//!            target acquired               cooldown == 0
//!   Idle ───────────────────▶ Engaged ────────────────────▶ Firing
//!    ▲                          │  ▲                          │
//!    └──── target lost ─────────┘  └──── cooldown reset ──────┘
//! ```
//!
//! The cooldown is counted in ticks, not seconds: it drops by one per
//! update regardless of the elapsed time of that tick.

use serde::{Deserialize, Serialize};

use crate::data::{LevelStats, TowerData, TowerKind};
use crate::enemy::{EnemyId, EnemyMap};
use crate::math::{round_to_u32, Fixed, Vec2Fixed};

/// Unique tower identifier, allocated in placement order.
pub type TowerId = u32;

/// Targeting state, observable for renderers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TowerState {
    /// No enemy in range.
    #[default]
    Idle,
    /// Tracking a target while the cooldown runs.
    Engaged,
    /// Fired during the last update.
    Firing,
}

/// A tower's request to launch a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireRequest {
    /// Tower that fired.
    pub tower: TowerId,
    /// Launch position.
    pub origin: Vec2Fixed,
    /// Enemy the projectile seeks.
    pub target: EnemyId,
    /// Damage on impact.
    pub damage: Fixed,
    /// Projectile speed in units per reference frame.
    pub speed: Fixed,
    /// Splash radius; zero for single-target shots.
    pub splash_radius: Fixed,
}

/// A placed tower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tower {
    id: TowerId,
    kind: TowerKind,
    position: Vec2Fixed,
    footprint: Fixed,
    level: u8,
    damage: Fixed,
    range: Fixed,
    fire_interval: u32,
    splash_radius: Fixed,
    projectile_speed: Fixed,
    cooldown: u32,
    target: Option<EnemyId>,
    state: TowerState,
    total_invested: u32,
}

impl Tower {
    /// Create a level 0 tower. The placement cost counts as invested.
    #[must_use]
    pub fn new(id: TowerId, position: Vec2Fixed, data: &TowerData, footprint: Fixed) -> Self {
        let mut tower = Self {
            id,
            kind: data.kind,
            position,
            footprint,
            level: 0,
            damage: Fixed::ZERO,
            range: Fixed::ZERO,
            fire_interval: 0,
            splash_radius: Fixed::ZERO,
            projectile_speed: data.projectile_speed,
            cooldown: 0,
            target: None,
            state: TowerState::Idle,
            total_invested: data.cost,
        };
        tower.apply_stats(&data.base);
        tower
    }

    fn apply_stats(&mut self, stats: &LevelStats) {
        self.damage = stats.damage;
        self.range = stats.range;
        self.fire_interval = stats.fire_interval;
        if let Some(radius) = stats.splash_radius {
            self.splash_radius = radius;
        }
    }

    fn in_range(&self, position: Vec2Fixed) -> bool {
        self.position.distance_squared(position) <= self.range.saturating_mul(self.range)
    }

    /// Closest live enemy in range; the first one in id order wins ties.
    fn acquire(&self, enemies: &EnemyMap) -> Option<EnemyId> {
        let mut best: Option<(EnemyId, Fixed)> = None;
        for (&id, enemy) in enemies {
            if !enemy.is_alive() || !self.in_range(enemy.position()) {
                continue;
            }
            let distance = self.position.distance_squared(enemy.position());
            if best.map_or(true, |(_, closest)| distance < closest) {
                best = Some((id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Run one targeting step.
    ///
    /// Counts the cooldown down, drops a target that died, vanished or
    /// walked out of range, rescans if needed and fires when ready.
    pub fn update(&mut self, enemies: &EnemyMap) -> Option<FireRequest> {
        self.cooldown = self.cooldown.saturating_sub(1);

        let keep = self.target.and_then(|id| enemies.get(&id)).is_some_and(|enemy| {
            enemy.is_alive() && self.in_range(enemy.position())
        });
        if !keep {
            self.target = self.acquire(enemies);
        }

        let Some(target) = self.target else {
            self.state = TowerState::Idle;
            return None;
        };

        if self.cooldown > 0 {
            self.state = TowerState::Engaged;
            return None;
        }

        self.cooldown = self.fire_interval;
        self.state = TowerState::Firing;
        Some(FireRequest {
            tower: self.id,
            origin: self.position,
            target,
            damage: self.damage,
            speed: self.projectile_speed,
            splash_radius: self.splash_radius,
        })
    }

    /// Cost of the next upgrade, or `None` at max level.
    ///
    /// Upgrading from level `L` costs `round(cost * multiplier^L)`. A price
    /// outside the fixed-point range also yields `None`; validated data
    /// never produces one.
    #[must_use]
    pub fn upgrade_cost(&self, data: &TowerData) -> Option<u32> {
        if self.level >= data.max_level {
            return None;
        }
        data.upgrade_price(self.level)
    }

    /// Raise the level by one and apply the next stat bundle. The caller
    /// has already charged `cost`.
    pub(crate) fn apply_upgrade(&mut self, data: &TowerData, cost: u32) {
        let Some(stats) = data.level_stats(self.level + 1) else {
            return;
        };
        self.level += 1;
        self.apply_stats(stats);
        self.total_invested = self.total_invested.saturating_add(cost);
    }

    /// Refund for selling this tower.
    #[must_use]
    pub fn sell_value(&self, data: &TowerData) -> u32 {
        round_to_u32(
            Fixed::saturating_from_num(self.total_invested)
                .saturating_mul(data.sell_return_multiplier),
        )
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Tower type.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// World position (footprint centre).
    #[must_use]
    pub const fn position(&self) -> Vec2Fixed {
        self.position
    }

    /// Side length of the square footprint.
    #[must_use]
    pub const fn footprint(&self) -> Fixed {
        self.footprint
    }

    /// Current level, starting at 0.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Damage per shot.
    #[must_use]
    pub const fn damage(&self) -> Fixed {
        self.damage
    }

    /// Targeting range.
    #[must_use]
    pub const fn range(&self) -> Fixed {
        self.range
    }

    /// Ticks between shots.
    #[must_use]
    pub const fn fire_interval(&self) -> u32 {
        self.fire_interval
    }

    /// Splash radius; zero when the tower has none.
    #[must_use]
    pub const fn splash_radius(&self) -> Fixed {
        self.splash_radius
    }

    /// Projectile speed.
    #[must_use]
    pub const fn projectile_speed(&self) -> Fixed {
        self.projectile_speed
    }

    /// Ticks until the tower may fire again.
    #[must_use]
    pub const fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Current target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<EnemyId> {
        self.target
    }

    /// Targeting state after the last update.
    #[must_use]
    pub const fn state(&self) -> TowerState {
        self.state
    }

    /// Placement cost plus every upgrade paid.
    #[must_use]
    pub const fn total_invested(&self) -> u32 {
        self.total_invested
    }
}
