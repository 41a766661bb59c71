//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A run is reproducible when the same config, seed, commands and tick
//! deltas give the same state hash. Sources of non-determinism include:
//!
//! - **Floating-point math**: all simulation state is fixed-point
//!   ([`td_core::math::Fixed`]).
//!
//! - **Map iteration order**: entities live in `BTreeMap`s keyed by id.
//!
//! - **Randomness**: only the wave shuffle draws random numbers, from a
//!   generator seeded by the config.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual operations (movement, targeting, damage)
//! 2. **Property tests**: random inputs must still produce deterministic outputs
//! 3. **Integration tests**: full games are reproducible
//! 4. **Parallel tests**: N worlds run on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use td_core::math::Fixed;
use td_core::simulation::SimulationWorld;

use crate::fixtures::CommandScript;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance by one step
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use td_test_utils::determinism::verify_determinism;
/// use td_test_utils::fixtures::{battle_world, frame};
///
/// let result = verify_determinism(
///     5,
///     600,
///     || battle_world(7, 500, 3),
///     |world| { world.tick(frame()); },
///     |world| world.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a world twice with fixed `elapsed` ticks and compare final hashes.
pub fn verify_world_determinism<F>(setup_fn: F, num_ticks: u64, elapsed: Fixed) -> bool
where
    F: Fn() -> SimulationWorld,
{
    verify_scripted_determinism(setup_fn, &CommandScript::new(), num_ticks, elapsed)
}

/// Like [`verify_world_determinism`], feeding `script` before every tick.
pub fn verify_scripted_determinism<F>(
    setup_fn: F,
    script: &CommandScript,
    num_ticks: u64,
    elapsed: Fixed,
) -> bool
where
    F: Fn() -> SimulationWorld,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |world| {
            script.feed(world);
            world.tick(elapsed);
        },
        SimulationWorld::state_hash,
    )
    .is_deterministic
}

/// Run N worlds on scoped threads and collect final hashes.
///
/// Catches state that leaks between worlds through globals or depends
/// on thread scheduling.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_worlds<F>(
    setup_fn: F,
    num_sims: usize,
    num_ticks: u64,
    elapsed: Fixed,
) -> DeterminismResult
where
    F: Fn() -> SimulationWorld + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut world = setup_fn();
                    for _ in 0..num_ticks {
                        world.tick(elapsed);
                    }
                    world.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two runs tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match throughout, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64, elapsed: Fixed) -> Option<u64>
where
    F: Fn() -> SimulationWorld,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        first.tick(elapsed);
        second.tick(elapsed);

        if first.state_hash() != second.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for simulation inputs.
pub mod strategies {
    use proptest::prelude::*;
    use td_core::command::PlayerCommand;
    use td_core::data::{EnemyKind, TowerKind};
    use td_core::math::{Fixed, Vec2Fixed};

    /// Any tower kind.
    pub fn arb_tower_kind() -> impl Strategy<Value = TowerKind> {
        prop::sample::select(TowerKind::ALL.to_vec())
    }

    /// Any enemy kind.
    pub fn arb_enemy_kind() -> impl Strategy<Value = EnemyKind> {
        prop::sample::select(EnemyKind::ALL.to_vec())
    }

    /// A point on the default 1200 x 700 map, in whole units.
    pub fn arb_map_position() -> impl Strategy<Value = Vec2Fixed> {
        (0i32..1200, 0i32..700).prop_map(|(x, y)| Vec2Fixed::from_ints(x, y))
    }

    /// A tick delta between 1/240 s and 1/10 s.
    pub fn arb_elapsed() -> impl Strategy<Value = Fixed> {
        (1i32..=24).prop_map(|n| Fixed::from_num(n) / Fixed::from_num(240))
    }

    /// Damage values (1-100).
    pub fn arb_damage() -> impl Strategy<Value = Fixed> {
        (1i32..100).prop_map(Fixed::from_num)
    }

    /// Health values (1-1000).
    pub fn arb_health() -> impl Strategy<Value = Fixed> {
        (1i32..1000).prop_map(Fixed::from_num)
    }

    /// Polylines of 2 to 8 whole-unit waypoints with no repeated
    /// consecutive point.
    pub fn arb_waypoints() -> impl Strategy<Value = Vec<Vec2Fixed>> {
        proptest::collection::vec((0i32..1000, 0i32..1000), 2..8).prop_map(|points| {
            let mut path: Vec<Vec2Fixed> = Vec::with_capacity(points.len());
            for (x, y) in points {
                let point = Vec2Fixed::from_ints(x, y);
                if path.last() != Some(&point) {
                    path.push(point);
                }
            }
            if path.len() < 2 {
                path = vec![Vec2Fixed::from_ints(0, 0), Vec2Fixed::from_ints(100, 0)];
            }
            path
        })
    }

    /// Any player command. Tower ids are drawn from a small range so
    /// that some refer to real towers.
    pub fn arb_command() -> impl Strategy<Value = PlayerCommand> {
        prop_oneof![
            (arb_tower_kind(), arb_map_position())
                .prop_map(|(kind, position)| PlayerCommand::PlaceTower { kind, position }),
            (1u32..6).prop_map(PlayerCommand::UpgradeTower),
            (1u32..6).prop_map(PlayerCommand::SellTower),
            Just(PlayerCommand::StartWave),
        ]
    }

    /// Generate a sequence of commands.
    pub fn arb_command_sequence(max_len: usize) -> impl Strategy<Value = Vec<PlayerCommand>> {
        proptest::collection::vec(arb_command(), 0..max_len)
    }
}
