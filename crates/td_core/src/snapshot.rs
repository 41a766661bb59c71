//! Read-only views of the world for renderers, tools and logs.
//!
//! Snapshots carry `f32` coordinates. They are an output format only and
//! are never fed back into the simulation.

use serde::{Deserialize, Serialize};

use crate::data::{EnemyKind, TowerKind};
use crate::enemy::{Enemy, EnemyId};
use crate::math::Fixed;
use crate::projectile::{Effect, Projectile, ProjectileId};
use crate::simulation::{GameStatus, SimulationWorld};
use crate::tower::{Tower, TowerId, TowerState};
use crate::wave::WaveState;

/// One enemy as seen by a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    /// Identifier.
    pub id: EnemyId,
    /// Enemy type.
    pub kind: EnemyKind,
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Current health.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Path progress in `[0, 1]`.
    pub progress: f32,
}

impl From<&Enemy> for EnemyView {
    fn from(enemy: &Enemy) -> Self {
        let (x, y) = enemy.position().to_f32();
        Self {
            id: enemy.id(),
            kind: enemy.kind(),
            x,
            y,
            health: enemy.health().to_num(),
            max_health: enemy.max_health().to_num(),
            progress: enemy.progress().to_num(),
        }
    }
}

/// One tower as seen by a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerView {
    /// Identifier.
    pub id: TowerId,
    /// Tower type.
    pub kind: TowerKind,
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Current level.
    pub level: u8,
    /// Targeting range, for range circles.
    pub range: f32,
    /// Targeting state.
    pub state: TowerState,
    /// Current target.
    pub target: Option<EnemyId>,
}

impl From<&Tower> for TowerView {
    fn from(tower: &Tower) -> Self {
        let (x, y) = tower.position().to_f32();
        Self {
            id: tower.id(),
            kind: tower.kind(),
            x,
            y,
            level: tower.level(),
            range: tower.range().to_num(),
            state: tower.state(),
            target: tower.target(),
        }
    }
}

/// One projectile as seen by a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    /// Identifier.
    pub id: ProjectileId,
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Enemy being tracked.
    pub target: EnemyId,
    /// Whether the shot splashes.
    pub splash: bool,
}

impl From<&Projectile> for ProjectileView {
    fn from(projectile: &Projectile) -> Self {
        let (x, y) = projectile.position().to_f32();
        Self {
            id: projectile.id(),
            x,
            y,
            target: projectile.target(),
            splash: projectile.splash_radius() > Fixed::ZERO,
        }
    }
}

/// One effect as seen by a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectView {
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Current ring radius.
    pub radius: f32,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

impl From<&Effect> for EffectView {
    fn from(effect: &Effect) -> Self {
        let (x, y) = effect.position().to_f32();
        Self {
            x,
            y,
            radius: effect.current_radius().to_num(),
            opacity: effect.opacity().to_num(),
        }
    }
}

/// Complete read-only picture of a world at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Ticks simulated so far.
    pub tick: u64,
    /// Money.
    pub money: u32,
    /// Lives.
    pub lives: u32,
    /// Last started wave, 0 before the first.
    pub current_wave: u32,
    /// Number of waves in the game.
    pub max_waves: u32,
    /// Playing, won or lost.
    pub status: GameStatus,
    /// Spawn scheduler state.
    pub wave_state: WaveState,
    /// Enemies still waiting to spawn.
    pub pending_spawns: usize,
    /// Enemies in id order.
    pub enemies: Vec<EnemyView>,
    /// Towers in id order.
    pub towers: Vec<TowerView>,
    /// Projectiles in id order.
    pub projectiles: Vec<ProjectileView>,
    /// Visual effects.
    pub effects: Vec<EffectView>,
}

impl WorldSnapshot {
    /// Capture the current state of `world`.
    #[must_use]
    pub fn capture(world: &SimulationWorld) -> Self {
        Self {
            tick: world.get_tick(),
            money: world.money(),
            lives: world.lives(),
            current_wave: world.current_wave(),
            max_waves: world.max_waves(),
            status: world.status(),
            wave_state: world.wave_state(),
            pending_spawns: world.pending_spawns(),
            enemies: world.enemies().values().map(EnemyView::from).collect(),
            towers: world.towers().values().map(TowerView::from).collect(),
            projectiles: world.projectiles().values().map(ProjectileView::from).collect(),
            effects: world.effects().iter().map(EffectView::from).collect(),
        }
    }
}
