//! Test fixtures and helpers.
//!
//! Pre-built configurations and worlds for consistent testing.

use fixed::types::I32F32;
use td_core::command::PlayerCommand;
use td_core::data::{EnemyKind, GameConfig, TowerKind, WaveData, WaveGroup};
use td_core::math::Vec2Fixed;
use td_core::simulation::SimulationWorld;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Integer point shorthand.
#[must_use]
pub fn point(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// One tick at 60 frames per second.
#[must_use]
pub fn frame() -> I32F32 {
    fixed(1) / fixed(60)
}

/// Build spots on the default map that are clear of the path and of
/// each other, in a fixed order.
pub const DEFAULT_BUILD_SPOTS: [(i32, i32); 6] = [
    (275, 225),
    (275, 300),
    (500, 300),
    (750, 350),
    (1000, 450),
    (525, 400),
];

/// A single-wave game on a straight horizontal path from `(0, 100)` to
/// `(length, 100)`, releasing one enemy per second.
#[must_use]
pub fn straight_path_config(length: i32, groups: Vec<WaveGroup>) -> GameConfig {
    GameConfig {
        max_waves: 1,
        path: vec![point(0, 100), point(length, 100)],
        waves: vec![WaveData {
            groups,
            spawn_interval: fixed(1),
        }],
        ..GameConfig::default()
    }
}

/// A straight-path game with a single enemy of `kind`.
#[must_use]
pub fn single_enemy_config(kind: EnemyKind) -> GameConfig {
    straight_path_config(240, vec![WaveGroup::new(kind, 1)])
}

/// The stock game.
///
/// # Panics
///
/// Panics if the default configuration fails validation.
#[must_use]
pub fn default_world() -> SimulationWorld {
    SimulationWorld::new(GameConfig::default()).expect("default config is valid")
}

/// The stock game with `money`, a tower on each of the first
/// `towers` build spots and wave 1 started.
///
/// # Panics
///
/// Panics if a tower cannot be placed.
#[must_use]
pub fn battle_world(seed: u64, money: u32, towers: usize) -> SimulationWorld {
    let config = GameConfig {
        rng_seed: seed,
        starting_money: money,
        ..GameConfig::default()
    };
    let mut world = SimulationWorld::new(config).expect("default config is valid");

    let kinds = TowerKind::ALL.iter().cycle();
    for (&(x, y), &kind) in DEFAULT_BUILD_SPOTS.iter().zip(kinds).take(towers) {
        world
            .place_tower(kind, point(x, y))
            .expect("build spot is valid");
    }
    world.start_wave().expect("first wave starts");
    world
}

/// Commands to submit at given ticks, used to drive scripted runs.
#[derive(Debug, Clone, Default)]
pub struct CommandScript {
    entries: Vec<(u64, PlayerCommand)>,
}

impl CommandScript {
    /// Create an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit `command` before tick `tick` runs.
    #[must_use]
    pub fn at(mut self, tick: u64, command: PlayerCommand) -> Self {
        self.entries.push((tick, command));
        self
    }

    /// Queue every command scheduled for the world's current tick.
    pub fn feed(&self, world: &mut SimulationWorld) {
        let now = world.get_tick();
        for (_, command) in self.entries.iter().filter(|(tick, _)| *tick == now) {
            world.queue_command(*command);
        }
    }
}
