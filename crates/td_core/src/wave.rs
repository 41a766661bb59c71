//! Wave scheduling: turns a wave definition into timed spawn releases.
//!
//! ```text
//!          start_wave              queue empty and field clear
//!   Idle ─────────────▶ Spawning ──────────────────────────────▶ Drained
//!                          ▲                                        │
//!                          └──────────────── start_wave ────────────┘
//! ```
//!
//! Release timing runs on logical time: an accumulator fed by the same
//! elapsed value as the world tick, drained in whole spawn intervals.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{EnemyKind, WaveData};
use crate::error::CommandError;
use crate::math::Fixed;

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WaveState {
    /// No wave started yet.
    #[default]
    Idle,
    /// A wave is releasing enemies or its enemies are still alive.
    Spawning,
    /// The last wave finished and the field is clear.
    Drained,
}

/// Releases each wave's enemies one interval apart in shuffled order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveScheduler {
    waves: Vec<WaveData>,
    seed: u64,
    rng: ChaCha8Rng,
    state: WaveState,
    current_wave: u32,
    queue: VecDeque<EnemyKind>,
    interval: Fixed,
    accumulator: Fixed,
}

impl WaveScheduler {
    /// Create a scheduler for `waves`, shuffling with a generator seeded
    /// from `seed`.
    #[must_use]
    pub fn new(waves: Vec<WaveData>, seed: u64) -> Self {
        Self {
            waves,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            state: WaveState::Idle,
            current_wave: 0,
            queue: VecDeque::new(),
            interval: Fixed::ONE,
            accumulator: Fixed::ZERO,
        }
    }

    /// Start wave `number` (1-based) and return how many enemies it queues.
    ///
    /// # Errors
    ///
    /// [`CommandError::WaveAlreadyInProgress`] while a wave is still
    /// spawning or on the field, [`CommandError::NoWavesRemaining`] if no
    /// such wave exists.
    pub fn start_wave(&mut self, number: u32) -> Result<usize, CommandError> {
        if self.state == WaveState::Spawning {
            return Err(CommandError::WaveAlreadyInProgress(self.current_wave));
        }

        let wave = usize::try_from(number)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| self.waves.get(index))
            .ok_or(CommandError::NoWavesRemaining(self.wave_count()))?;

        let mut tokens = wave.spawn_tokens();
        tokens.shuffle(&mut self.rng);

        self.interval = wave.spawn_interval;
        self.queue = tokens.into();
        self.accumulator = Fixed::ZERO;
        self.current_wave = number;
        self.state = WaveState::Spawning;

        debug!(
            wave = number,
            enemies = self.queue.len(),
            interval = %self.interval,
            "Wave started"
        );
        Ok(self.queue.len())
    }

    /// Feed `elapsed` logical seconds and return the tokens now due.
    ///
    /// Several tokens come out at once when `elapsed` spans several
    /// intervals.
    pub fn advance(&mut self, elapsed: Fixed) -> Vec<EnemyKind> {
        let mut released = Vec::new();
        if self.state != WaveState::Spawning || self.queue.is_empty() {
            return released;
        }

        self.accumulator = self.accumulator.saturating_add(elapsed);
        while self.accumulator >= self.interval {
            let Some(kind) = self.queue.pop_front() else {
                break;
            };
            self.accumulator -= self.interval;
            released.push(kind);
        }

        if self.queue.is_empty() {
            self.accumulator = Fixed::ZERO;
        }
        if !released.is_empty() {
            debug!(
                wave = self.current_wave,
                released = released.len(),
                pending = self.queue.len(),
                "Spawn tokens released"
            );
        }
        released
    }

    /// Move to [`WaveState::Drained`] if the queue is empty and
    /// `enemies_remaining` is zero. True only on the transition.
    pub fn try_drain(&mut self, enemies_remaining: usize) -> bool {
        if self.state == WaveState::Spawning && self.queue.is_empty() && enemies_remaining == 0 {
            self.state = WaveState::Drained;
            return true;
        }
        false
    }

    /// Abort any wave in progress and rewind to before wave 1.
    ///
    /// The shuffle generator is reseeded, so a reset game replays the
    /// same spawn orders.
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.state = WaveState::Idle;
        self.current_wave = 0;
        self.queue.clear();
        self.interval = Fixed::ONE;
        self.accumulator = Fixed::ZERO;
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> WaveState {
        self.state
    }

    /// Number of the last started wave, 0 before the first.
    #[must_use]
    pub const fn current_wave(&self) -> u32 {
        self.current_wave
    }

    /// Tokens still waiting to be released.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of configured waves.
    #[must_use]
    pub fn wave_count(&self) -> u32 {
        u32::try_from(self.waves.len()).unwrap_or(u32::MAX)
    }

    /// Logical time banked toward the next release.
    #[must_use]
    pub const fn accumulator(&self) -> Fixed {
        self.accumulator
    }
}
