//! Headless game runs.
//!
//! Builds a world from a config, places scripted towers, then plays waves
//! back to back with a fixed step until the game ends, the requested
//! number of waves is cleared or the tick limit is hit.
//!
//! All loops are bounded by `max_ticks`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info, warn};

use td_core::data::{GameConfig, TowerKind};
use td_core::math::{Fixed, Vec2Fixed};
use td_core::simulation::{GameStatus, SimulationWorld};
use td_core::snapshot::WorldSnapshot;
use td_core::wave::WaveState;

use crate::error::ToolError;

/// Progress logging interval (ticks).
const PROGRESS_LOG_INTERVAL: u64 = 3_600;

/// Largest accepted step, in seconds.
const MAX_STEP_SECS: f64 = 1.0;

/// A tower to build before the first wave, written `KIND@X,Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TowerPlacement {
    /// Tower type.
    pub kind: TowerKind,
    /// Requested centre.
    pub position: Vec2Fixed,
}

impl FromStr for TowerPlacement {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, coords) = s
            .split_once('@')
            .ok_or_else(|| ToolError::argument(s, "expected KIND@X,Y"))?;
        let kind = kind
            .parse::<TowerKind>()
            .map_err(|reason| ToolError::argument(s, reason))?;
        let (x, y) = coords
            .split_once(',')
            .ok_or_else(|| ToolError::argument(s, "expected X,Y after '@'"))?;

        let coordinate = |text: &str| {
            text.trim()
                .parse::<i32>()
                .map_err(|err| ToolError::argument(s, format!("bad coordinate '{text}': {err}")))
        };

        Ok(Self {
            kind,
            position: Vec2Fixed::from_ints(coordinate(x)?, coordinate(y)?),
        })
    }
}

impl fmt::Display for TowerPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{},{}", self.kind, self.position.x, self.position.y)
    }
}

/// Options for one headless run.
#[derive(Debug, Clone)]
pub struct SimulateOptions {
    /// Stop after clearing this many waves; `None` plays the whole game.
    pub waves: Option<u32>,
    /// Seconds per tick.
    pub step: Fixed,
    /// Hard tick limit.
    pub max_ticks: u64,
    /// Overrides the config's shuffle seed.
    pub seed: Option<u64>,
    /// Towers to build before the first wave, in order.
    pub towers: Vec<TowerPlacement>,
    /// Snap tower positions to the placement grid.
    pub snap: bool,
    /// Attach a final snapshot to the summary.
    pub snapshot: bool,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            waves: None,
            step: Fixed::ONE / Fixed::from_num(60),
            max_ticks: 216_000,
            seed: None,
            towers: Vec::new(),
            snap: false,
            snapshot: false,
        }
    }
}

impl SimulateOptions {
    /// Convert a step given in seconds on the command line.
    ///
    /// # Errors
    ///
    /// [`ToolError::Argument`] unless `0 < secs <= 1`.
    pub fn step_from_secs(secs: f64) -> Result<Fixed, ToolError> {
        if !(secs > 0.0 && secs <= MAX_STEP_SECS) {
            return Err(ToolError::argument(
                secs.to_string(),
                format!("step must be in (0, {MAX_STEP_SECS}] seconds"),
            ));
        }
        Fixed::checked_from_num(secs)
            .filter(|step| *step > Fixed::ZERO)
            .ok_or_else(|| ToolError::argument(secs.to_string(), "step is too small"))
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The final wave was cleared.
    Victory,
    /// Lives ran out.
    Defeat,
    /// The requested number of waves was cleared.
    WavesCompleted,
    /// `max_ticks` elapsed first.
    TickLimit,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RunOutcome::Victory => "victory",
            RunOutcome::Defeat => "defeat",
            RunOutcome::WavesCompleted => "waves completed",
            RunOutcome::TickLimit => "tick limit reached",
        };
        f.write_str(text)
    }
}

/// What happened during a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Why the run stopped.
    pub outcome: RunOutcome,
    /// Ticks simulated.
    pub ticks: u64,
    /// Logical seconds simulated.
    pub seconds: f64,
    /// Shuffle seed used.
    pub seed: u64,
    /// Towers built.
    pub towers_built: usize,
    /// Waves started.
    pub waves_started: u32,
    /// Waves cleared.
    pub waves_cleared: u32,
    /// Enemies spawned.
    pub enemies_spawned: usize,
    /// Enemies killed.
    pub kills: usize,
    /// Enemies that reached the core.
    pub leaks: usize,
    /// Projectiles launched.
    pub projectiles_fired: usize,
    /// Money at the end.
    pub money: u32,
    /// Lives at the end.
    pub lives: u32,
    /// Final state hash, for replay comparison.
    pub state_hash: u64,
    /// Final world state, if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<WorldSnapshot>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Outcome:      {}", self.outcome)?;
        writeln!(f, "Ticks:        {} ({:.1}s)", self.ticks, self.seconds)?;
        writeln!(f, "Seed:         {}", self.seed)?;
        writeln!(f, "Towers:       {}", self.towers_built)?;
        writeln!(
            f,
            "Waves:        {} started, {} cleared",
            self.waves_started, self.waves_cleared
        )?;
        writeln!(
            f,
            "Enemies:      {} spawned, {} killed, {} leaked",
            self.enemies_spawned, self.kills, self.leaks
        )?;
        writeln!(f, "Shots:        {}", self.projectiles_fired)?;
        writeln!(f, "Money:        {}", self.money)?;
        writeln!(f, "Lives:        {}", self.lives)?;
        write!(f, "State hash:   {:016x}", self.state_hash)
    }
}

#[derive(Debug, Default)]
struct Counters {
    waves_cleared: u32,
    enemies_spawned: usize,
    kills: usize,
    leaks: usize,
    projectiles_fired: usize,
}

/// Play a game headlessly.
///
/// # Errors
///
/// [`ToolError::Config`] for an invalid config, [`ToolError::Command`] if a
/// scripted tower cannot be placed.
pub fn run_game(mut config: GameConfig, options: &SimulateOptions) -> Result<RunSummary, ToolError> {
    if let Some(seed) = options.seed {
        config.rng_seed = seed;
    }
    let seed = config.rng_seed;
    let mut world = SimulationWorld::new(config)?;

    for placement in &options.towers {
        let position = if options.snap {
            world.snap_to_grid(placement.position)
        } else {
            placement.position
        };
        let id = world.place_tower(placement.kind, position)?;
        debug!(tower = id, placement = %placement, "Scripted tower built");
    }

    let wave_limit = options
        .waves
        .map_or(world.max_waves(), |waves| waves.min(world.max_waves()));
    let mut counters = Counters::default();
    let mut outcome = RunOutcome::TickLimit;

    info!(
        seed,
        waves = wave_limit,
        towers = world.towers().len(),
        "Headless run started"
    );

    while world.get_tick() < options.max_ticks {
        if world.wave_state() != WaveState::Spawning {
            if world.current_wave() >= wave_limit {
                outcome = RunOutcome::WavesCompleted;
                break;
            }
            world.start_wave()?;
        }

        let events = world.tick(options.step);
        counters.enemies_spawned += events.enemies_spawned.len();
        counters.kills += events.enemies_killed.len();
        counters.leaks += events.core_leaks.len();
        counters.projectiles_fired += events.projectiles_fired.len();
        if events.wave_cleared.is_some() {
            counters.waves_cleared += 1;
        }

        match world.status() {
            GameStatus::Playing => {}
            GameStatus::Victory => {
                outcome = RunOutcome::Victory;
                break;
            }
            GameStatus::Defeat => {
                outcome = RunOutcome::Defeat;
                break;
            }
        }

        if world.get_tick() % PROGRESS_LOG_INTERVAL == 0 {
            info!(
                tick = world.get_tick(),
                wave = world.current_wave(),
                enemies = world.enemies().len(),
                lives = world.lives(),
                money = world.money(),
                "Progress"
            );
        }
    }

    if outcome == RunOutcome::TickLimit {
        warn!(max_ticks = options.max_ticks, "Tick limit reached before the run finished");
    }

    let ticks = world.get_tick();
    let seconds = (options.step * Fixed::from_num(ticks)).to_num::<f64>();
    let summary = RunSummary {
        outcome,
        ticks,
        seconds,
        seed,
        towers_built: options.towers.len(),
        waves_started: world.current_wave(),
        waves_cleared: counters.waves_cleared,
        enemies_spawned: counters.enemies_spawned,
        kills: counters.kills,
        leaks: counters.leaks,
        projectiles_fired: counters.projectiles_fired,
        money: world.money(),
        lives: world.lives(),
        state_hash: world.state_hash(),
        snapshot: options.snapshot.then(|| world.snapshot()),
    };

    info!(outcome = %summary.outcome, ticks, hash = summary.state_hash, "Headless run finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_core::error::{CommandError, PlacementIssue};

    fn placement(s: &str) -> TowerPlacement {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_placement() {
        let parsed = placement("aoe@500, 300");
        assert_eq!(parsed.kind, TowerKind::Aoe);
        assert_eq!(parsed.position, Vec2Fixed::from_ints(500, 300));
        assert_eq!(placement("BASIC@1,2").kind, TowerKind::Basic);
    }

    #[test]
    fn test_parse_placement_errors() {
        for bad in ["basic", "laser@1,2", "basic@1", "basic@x,2"] {
            assert!(
                matches!(bad.parse::<TowerPlacement>(), Err(ToolError::Argument { .. })),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_step_bounds() {
        assert!(SimulateOptions::step_from_secs(0.0).is_err());
        assert!(SimulateOptions::step_from_secs(-1.0).is_err());
        assert!(SimulateOptions::step_from_secs(f64::NAN).is_err());
        assert!(SimulateOptions::step_from_secs(2.0).is_err());
        assert_eq!(SimulateOptions::step_from_secs(0.5).unwrap(), Fixed::from_num(0.5));
    }

    #[test]
    fn test_undefended_first_wave_survives() {
        let options = SimulateOptions {
            waves: Some(1),
            ..SimulateOptions::default()
        };
        let summary = run_game(GameConfig::default(), &options).unwrap();

        assert_eq!(summary.outcome, RunOutcome::WavesCompleted);
        assert_eq!(summary.waves_started, 1);
        assert_eq!(summary.waves_cleared, 1);
        assert_eq!(summary.enemies_spawned, 12);
        assert_eq!(summary.leaks, 12);
        assert_eq!(summary.kills, 0);
        assert_eq!(summary.lives, 8);
        assert_eq!(summary.money, 150);
    }

    #[test]
    fn test_undefended_game_is_lost() {
        let summary = run_game(GameConfig::default(), &SimulateOptions::default()).unwrap();
        assert_eq!(summary.outcome, RunOutcome::Defeat);
        assert_eq!(summary.lives, 0);
    }

    #[test]
    fn test_tick_limit() {
        let options = SimulateOptions {
            max_ticks: 100,
            ..SimulateOptions::default()
        };
        let summary = run_game(GameConfig::default(), &options).unwrap();
        assert_eq!(summary.outcome, RunOutcome::TickLimit);
        assert_eq!(summary.ticks, 100);
    }

    #[test]
    fn test_bad_placement_aborts() {
        let options = SimulateOptions {
            towers: vec![placement("basic@275,100")],
            ..SimulateOptions::default()
        };
        let result = run_game(GameConfig::default(), &options);
        assert!(matches!(
            result,
            Err(ToolError::Command(CommandError::InvalidPlacement(
                PlacementIssue::OnPath
            )))
        ));
    }

    #[test]
    fn test_snapped_placement() {
        // Snaps to the centre of the (250..300, 200..250) cell.
        let options = SimulateOptions {
            towers: vec![placement("basic@260,210")],
            snap: true,
            max_ticks: 1,
            snapshot: true,
            ..SimulateOptions::default()
        };
        let summary = run_game(GameConfig::default(), &options).unwrap();
        let snapshot = summary.snapshot.unwrap();
        assert_eq!((snapshot.towers[0].x, snapshot.towers[0].y), (275.0, 225.0));
    }

    #[test]
    fn test_runs_are_reproducible() {
        let options = SimulateOptions {
            waves: Some(2),
            seed: Some(99),
            towers: vec![
                placement("basic@275,225"),
                placement("basic@275,300"),
                placement("fast@500,300"),
            ],
            ..SimulateOptions::default()
        };
        let config = GameConfig {
            starting_money: 180,
            ..GameConfig::default()
        };
        let first = run_game(config.clone(), &options).unwrap();
        let second = run_game(config, &options).unwrap();
        assert_eq!(first.state_hash, second.state_hash);
        assert_eq!(first.seed, 99);
        assert!(first.kills > 0);
    }

    #[test]
    fn test_summary_serializes() {
        let options = SimulateOptions {
            max_ticks: 10,
            ..SimulateOptions::default()
        };
        let summary = run_game(GameConfig::default(), &options).unwrap();
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"outcome\":\"tick_limit\""));
        assert!(!json.contains("snapshot"));
    }
}
