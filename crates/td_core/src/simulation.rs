//! The simulation world: owns every entity and runs the fixed tick order.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, VecDeque};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::command::{CommandOutcome, CommandReceipt, PlayerCommand};
use crate::data::{Catalog, EnemyKind, GameConfig, TowerKind};
use crate::enemy::{Enemy, EnemyId, EnemyMap};
use crate::error::{CommandError, ConfigError, PlacementIssue};
use crate::math::{Fixed, Vec2Fixed};
use crate::path::PathModel;
use crate::projectile::{DamageResolver, Effect, Kill, Projectile, ProjectileId, ProjectileOutcome};
use crate::snapshot::WorldSnapshot;
use crate::tower::{FireRequest, Tower, TowerId};
use crate::wave::{WaveScheduler, WaveState};

/// Overall game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// The game is running.
    #[default]
    Playing,
    /// Lives ran out.
    Defeat,
    /// The final wave was cleared.
    Victory,
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Lives ran out.
    Defeat,
    /// The final wave was cleared.
    Victory,
}

/// An enemy reached the end of the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeakEvent {
    /// Enemy that leaked.
    pub enemy: EnemyId,
    /// Its type.
    pub kind: EnemyKind,
    /// Lives it cost.
    pub damage: u32,
}

/// A wave finished: nothing left to spawn and the field is clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveClearedEvent {
    /// Wave number.
    pub wave: u32,
    /// Money credited for clearing it.
    pub bonus: u32,
}

/// Events generated during a tick.
///
/// These are the world's notifications: a UI layer reacts to them
/// instead of polling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Results of queued commands applied at the start of the tick.
    pub command_results: Vec<CommandReceipt>,
    /// Enemies that reached the core.
    pub core_leaks: Vec<LeakEvent>,
    /// Projectiles launched.
    pub projectiles_fired: Vec<ProjectileId>,
    /// Enemies killed, with the bounty credited for each.
    pub enemies_killed: Vec<Kill>,
    /// Enemies released by the wave scheduler.
    pub enemies_spawned: Vec<EnemyId>,
    /// Set when the current wave was cleared.
    pub wave_cleared: Option<WaveClearedEvent>,
    /// Set on the tick the game ends.
    pub outcome: Option<GameOutcome>,
}

impl TickEvents {
    /// True if nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The tower-defense simulation.
///
/// Owns all game state and advances it deterministically. Player intents
/// arrive either as direct method calls between ticks or through
/// [`queue_command`](Self::queue_command), which applies them at the next
/// tick boundary.
///
/// # Tick Order
///
/// 0. **Commands** - apply queued player commands in submission order
/// 1. **Enemies** - cull the dead, advance the living, leak those at the end
/// 2. **Towers** - retarget and collect fire requests, in tower id order
/// 3. **Projectiles** - launch requested shots, advance all, resolve impacts
/// 4. **Effects** - age and cull visual effects
/// 5. **Waves** - release due spawn tokens as new enemies
/// 6. **End conditions** - defeat first, then wave clear and victory
///
/// Once the game is won or lost the world is frozen until [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct SimulationWorld {
    config: GameConfig,
    catalog: Catalog,
    path: PathModel,
    tick: u64,
    money: u32,
    lives: u32,
    status: GameStatus,
    enemies: EnemyMap,
    towers: BTreeMap<TowerId, Tower>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    effects: Vec<Effect>,
    waves: WaveScheduler,
    command_queue: VecDeque<PlayerCommand>,
    next_enemy_id: EnemyId,
    next_tower_id: TowerId,
    next_projectile_id: ProjectileId,
}

impl SimulationWorld {
    /// Validate `config` and build a world at its starting state.
    ///
    /// # Errors
    ///
    /// Returns the first configuration problem found.
    ///
    /// # Example
    ///
    /// ```
    /// use td_core::data::GameConfig;
    /// use td_core::simulation::SimulationWorld;
    ///
    /// let world = SimulationWorld::new(GameConfig::default()).unwrap();
    /// assert_eq!(world.money(), 100);
    /// assert_eq!(world.lives(), 20);
    /// ```
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let catalog = Catalog::resolve(&config)?;
        let path = PathModel::new(config.path.clone())?;
        let waves = WaveScheduler::new(catalog.waves().to_vec(), config.rng_seed);

        info!(
            waves = config.max_waves,
            path_length = %path.total_length(),
            seed = config.rng_seed,
            "Simulation world created"
        );

        Ok(Self {
            money: config.starting_money,
            lives: config.starting_lives,
            config,
            catalog,
            path,
            tick: 0,
            status: GameStatus::Playing,
            enemies: EnemyMap::new(),
            towers: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            effects: Vec::new(),
            waves,
            command_queue: VecDeque::new(),
            next_enemy_id: 1,
            next_tower_id: 1,
            next_projectile_id: 1,
        })
    }

    /// Advance the simulation by `elapsed` seconds.
    ///
    /// Negative values are treated as zero. A finished game ignores ticks
    /// and returns no events.
    pub fn tick(&mut self, elapsed: Fixed) -> TickEvents {
        let mut events = TickEvents::default();
        if self.status != GameStatus::Playing {
            return events;
        }
        let elapsed = elapsed.max(Fixed::ZERO);

        // 0. Commands
        events.command_results = self.run_command_queue();

        // 1. Enemies
        events.core_leaks = self.run_enemy_system(elapsed);

        // 2. Towers
        let requests = self.run_tower_system();

        // 3. Projectiles
        events.projectiles_fired = self.launch_projectiles(&requests);
        events.enemies_killed = self.run_projectile_system(elapsed);

        // 4. Effects
        self.run_effect_system(elapsed);

        // 5. Waves
        events.enemies_spawned = self.run_spawn_system(elapsed);

        // 6. End conditions
        self.evaluate_end_conditions(&mut events);

        self.tick += 1;

        #[cfg(feature = "debug-validation")]
        self.check_invariants();

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        events
    }

    fn run_command_queue(&mut self) -> Vec<CommandReceipt> {
        let mut receipts = Vec::with_capacity(self.command_queue.len());
        while let Some(command) = self.command_queue.pop_front() {
            let result = self.apply_command(command);
            receipts.push(CommandReceipt { command, result });
        }
        receipts
    }

    fn run_enemy_system(&mut self, elapsed: Fixed) -> Vec<LeakEvent> {
        let mut leaks = Vec::new();
        let mut culled = Vec::new();

        for (&id, enemy) in &mut self.enemies {
            if !enemy.is_alive() {
                culled.push(id);
                continue;
            }

            enemy.advance(elapsed, &self.path);
            if enemy.is_at_end() {
                let damage = enemy.damage_to_core();
                self.lives = self.lives.saturating_sub(damage);
                leaks.push(LeakEvent {
                    enemy: id,
                    kind: enemy.kind(),
                    damage,
                });
                culled.push(id);
                debug!(enemy = id, kind = %enemy.kind(), lives = self.lives, "Enemy reached the core");
            }
        }

        for id in culled {
            self.enemies.remove(&id);
        }
        leaks
    }

    fn run_tower_system(&mut self) -> Vec<FireRequest> {
        let enemies = &self.enemies;
        self.towers
            .values_mut()
            .filter_map(|tower| tower.update(enemies))
            .collect()
    }

    fn launch_projectiles(&mut self, requests: &[FireRequest]) -> Vec<ProjectileId> {
        requests
            .iter()
            .map(|request| {
                let id = self.next_projectile_id;
                self.next_projectile_id += 1;
                self.projectiles.insert(
                    id,
                    Projectile::from_request(id, request, self.config.projectile_radius),
                );
                id
            })
            .collect()
    }

    fn run_projectile_system(&mut self, elapsed: Fixed) -> Vec<Kill> {
        let mut kills = Vec::new();
        let ids: Vec<ProjectileId> = self.projectiles.keys().copied().collect();

        for id in ids {
            let Some(projectile) = self.projectiles.get_mut(&id) else {
                continue;
            };

            match projectile.advance(elapsed, &self.enemies) {
                ProjectileOutcome::InFlight => {}
                ProjectileOutcome::Dissipated => {
                    self.projectiles.remove(&id);
                }
                ProjectileOutcome::Impact { target, position } => {
                    let damage = projectile.damage();
                    let splash = projectile.splash_radius();
                    self.projectiles.remove(&id);

                    let report =
                        DamageResolver::apply(&mut self.enemies, target, damage, splash, position);
                    self.money = self.money.saturating_add(report.bounty());
                    for kill in &report.kills {
                        debug!(enemy = kill.enemy, kind = %kill.kind, bounty = kill.bounty, "Enemy killed");
                    }
                    kills.extend(report.kills);
                    self.effects.extend(report.effect);
                }
            }
        }
        kills
    }

    fn run_effect_system(&mut self, elapsed: Fixed) {
        for effect in &mut self.effects {
            effect.advance(elapsed);
        }
        self.effects.retain(|effect| !effect.is_finished());
    }

    fn run_spawn_system(&mut self, elapsed: Fixed) -> Vec<EnemyId> {
        let released = self.waves.advance(elapsed);
        let mut spawned = Vec::with_capacity(released.len());
        for kind in released {
            let id = self.next_enemy_id;
            self.next_enemy_id += 1;
            self.enemies
                .insert(id, Enemy::spawn(id, self.catalog.enemy(kind), &self.path));
            spawned.push(id);
        }
        spawned
    }

    fn evaluate_end_conditions(&mut self, events: &mut TickEvents) {
        if self.lives == 0 {
            self.status = GameStatus::Defeat;
            events.outcome = Some(GameOutcome::Defeat);
            info!(tick = self.tick, wave = self.waves.current_wave(), "Game over");
            return;
        }

        if !self.waves.try_drain(self.enemies.len()) {
            return;
        }

        let wave = self.waves.current_wave();
        let final_wave = wave >= self.waves.wave_count();
        let bonus = if final_wave {
            0
        } else {
            self.config.wave_clear_bonus
        };
        self.money = self.money.saturating_add(bonus);
        events.wave_cleared = Some(WaveClearedEvent { wave, bonus });
        info!(wave, bonus, money = self.money, "Wave cleared");

        if final_wave {
            self.status = GameStatus::Victory;
            events.outcome = Some(GameOutcome::Victory);
            info!(tick = self.tick, lives = self.lives, "Victory");
        }
    }

    #[cfg(feature = "debug-validation")]
    fn check_invariants(&self) {
        for enemy in self.enemies.values() {
            assert!(enemy.health() >= Fixed::ZERO && enemy.health() <= enemy.max_health());
            assert!(enemy.progress() >= Fixed::ZERO && enemy.progress() <= Fixed::ONE);
        }
        for tower in self.towers.values() {
            assert!(tower.level() <= self.catalog.tower(tower.kind()).max_level);
        }
        assert!(self.status != GameStatus::Playing || self.lives > 0);
    }

    fn ensure_playing(&self) -> Result<(), CommandError> {
        match self.status {
            GameStatus::Playing => Ok(()),
            GameStatus::Defeat | GameStatus::Victory => Err(CommandError::GameOver),
        }
    }

    /// Apply a command immediately.
    ///
    /// # Errors
    ///
    /// Whatever the matching direct method returns.
    pub fn apply_command(&mut self, command: PlayerCommand) -> Result<CommandOutcome, CommandError> {
        match command {
            PlayerCommand::PlaceTower { kind, position } => self
                .place_tower(kind, position)
                .map(CommandOutcome::TowerPlaced),
            PlayerCommand::UpgradeTower(tower) => self
                .upgrade_tower(tower)
                .map(|cost| CommandOutcome::TowerUpgraded { tower, cost }),
            PlayerCommand::SellTower(tower) => self
                .sell_tower(tower)
                .map(|refund| CommandOutcome::TowerSold { tower, refund }),
            PlayerCommand::StartWave => self.start_wave().map(CommandOutcome::WaveStarted),
        }
    }

    /// Queue a command for the next tick boundary.
    ///
    /// Its result is reported in that tick's
    /// [`TickEvents::command_results`].
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Check whether a tower of `kind` could be placed at `position`,
    /// without changing anything.
    ///
    /// # Errors
    ///
    /// [`CommandError::InvalidPlacement`] if the footprint leaves the map,
    /// touches the path or overlaps a tower; [`CommandError::InsufficientFunds`]
    /// if the tower is unaffordable; [`CommandError::GameOver`] after the
    /// game has ended.
    pub fn placement_check(&self, kind: TowerKind, position: Vec2Fixed) -> Result<(), CommandError> {
        self.ensure_playing()?;

        let half = self.config.tower_footprint / Fixed::from_num(2);
        let outside = position.x - half < Fixed::ZERO
            || position.y - half < Fixed::ZERO
            || position.x + half > self.config.map_width
            || position.y + half > self.config.map_height;
        if outside {
            return Err(CommandError::InvalidPlacement(PlacementIssue::OutOfBounds));
        }

        let tolerance = half + self.config.placement_buffer;
        if self
            .path
            .blocks(position, tolerance, self.config.path_block_mode)
        {
            return Err(CommandError::InvalidPlacement(PlacementIssue::OnPath));
        }

        let overlapping = self.towers.values().any(|tower| {
            let clearance = half + tower.footprint() / Fixed::from_num(2);
            tower.position().distance_squared(position) < clearance.saturating_mul(clearance)
        });
        if overlapping {
            return Err(CommandError::InvalidPlacement(PlacementIssue::Overlapping));
        }

        let cost = self.catalog.tower(kind).cost;
        if cost > self.money {
            return Err(CommandError::InsufficientFunds {
                required: cost,
                available: self.money,
            });
        }
        Ok(())
    }

    /// Build a tower and charge its cost.
    ///
    /// # Errors
    ///
    /// See [`placement_check`](Self::placement_check). Nothing changes on
    /// failure.
    pub fn place_tower(&mut self, kind: TowerKind, position: Vec2Fixed) -> Result<TowerId, CommandError> {
        self.placement_check(kind, position)?;

        let data = self.catalog.tower(kind);
        let id = self.next_tower_id;
        self.next_tower_id += 1;
        self.money -= data.cost;
        self.towers
            .insert(id, Tower::new(id, position, data, self.config.tower_footprint));

        info!(tower = id, kind = %kind, cost = data.cost, money = self.money, "Tower placed");
        Ok(id)
    }

    /// Upgrade a tower by one level and return the cost paid.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownEntity`] for a missing tower,
    /// [`CommandError::InvalidUpgrade`] at max level,
    /// [`CommandError::InsufficientFunds`] if unaffordable. Nothing changes
    /// on failure.
    pub fn upgrade_tower(&mut self, id: TowerId) -> Result<u32, CommandError> {
        self.ensure_playing()?;

        let tower = self.towers.get_mut(&id).ok_or(CommandError::UnknownEntity(id))?;
        let data = self.catalog.tower(tower.kind());
        let cost = tower.upgrade_cost(data).ok_or(CommandError::InvalidUpgrade {
            tower: id,
            max_level: data.max_level,
        })?;
        if cost > self.money {
            return Err(CommandError::InsufficientFunds {
                required: cost,
                available: self.money,
            });
        }

        self.money -= cost;
        tower.apply_upgrade(data, cost);
        info!(tower = id, level = tower.level(), cost, money = self.money, "Tower upgraded");
        Ok(cost)
    }

    /// Sell a tower and return the refund credited.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownEntity`] for a missing tower.
    pub fn sell_tower(&mut self, id: TowerId) -> Result<u32, CommandError> {
        self.ensure_playing()?;

        let tower = self.towers.get(&id).ok_or(CommandError::UnknownEntity(id))?;
        let refund = tower.sell_value(self.catalog.tower(tower.kind()));
        self.towers.remove(&id);
        self.money = self.money.saturating_add(refund);

        info!(tower = id, refund, money = self.money, "Tower sold");
        Ok(refund)
    }

    /// Start the next wave and return its number.
    ///
    /// # Errors
    ///
    /// [`CommandError::WaveAlreadyInProgress`] while a wave is spawning or
    /// its enemies are alive, [`CommandError::NoWavesRemaining`] after the
    /// last wave, [`CommandError::GameOver`] once the game has ended.
    pub fn start_wave(&mut self) -> Result<u32, CommandError> {
        self.ensure_playing()?;

        let current = self.waves.current_wave();
        if self.waves.state() == WaveState::Spawning {
            return Err(CommandError::WaveAlreadyInProgress(current));
        }
        if current >= self.waves.wave_count() {
            return Err(CommandError::NoWavesRemaining(self.waves.wave_count()));
        }

        let number = current + 1;
        let enemies = self.waves.start_wave(number)?;
        info!(wave = number, enemies, "Wave started");
        Ok(number)
    }

    /// Return to the starting state of the configured game.
    ///
    /// Clears every entity, the command queue and any wave in progress.
    pub fn reset(&mut self) {
        self.tick = 0;
        self.money = self.config.starting_money;
        self.lives = self.config.starting_lives;
        self.status = GameStatus::Playing;
        self.enemies.clear();
        self.towers.clear();
        self.projectiles.clear();
        self.effects.clear();
        self.waves.reset();
        self.command_queue.clear();
        self.next_enemy_id = 1;
        self.next_tower_id = 1;
        self.next_projectile_id = 1;
        info!("Simulation world reset");
    }

    /// Cost of upgrading tower `id`, or `None` if it is missing or maxed.
    #[must_use]
    pub fn upgrade_cost(&self, id: TowerId) -> Option<u32> {
        let tower = self.towers.get(&id)?;
        tower.upgrade_cost(self.catalog.tower(tower.kind()))
    }

    /// Refund for selling tower `id`, or `None` if it is missing.
    #[must_use]
    pub fn sell_value(&self, id: TowerId) -> Option<u32> {
        let tower = self.towers.get(&id)?;
        Some(tower.sell_value(self.catalog.tower(tower.kind())))
    }

    /// Snap a cursor position to the centre of its placement grid cell.
    #[must_use]
    pub fn snap_to_grid(&self, point: Vec2Fixed) -> Vec2Fixed {
        crate::math::snap_to_grid(point, self.config.grid_size)
    }

    /// Read-only picture of the current state.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self)
    }

    /// Ticks simulated since creation or the last reset.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Current money.
    #[must_use]
    pub const fn money(&self) -> u32 {
        self.money
    }

    /// Current lives.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Last started wave, 0 before the first.
    #[must_use]
    pub const fn current_wave(&self) -> u32 {
        self.waves.current_wave()
    }

    /// Number of waves in the game.
    #[must_use]
    pub fn max_waves(&self) -> u32 {
        self.waves.wave_count()
    }

    /// Playing, won or lost.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Spawn scheduler state.
    #[must_use]
    pub const fn wave_state(&self) -> WaveState {
        self.waves.state()
    }

    /// Enemies of the current wave not yet released.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.waves.pending()
    }

    /// Commands waiting for the next tick.
    #[must_use]
    pub fn queued_commands(&self) -> usize {
        self.command_queue.len()
    }

    /// Enemies on the field, including ones killed this tick.
    #[must_use]
    pub fn enemies(&self) -> &EnemyMap {
        &self.enemies
    }

    /// Enemy by id.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.get(&id)
    }

    /// Towers in id order.
    #[must_use]
    pub fn towers(&self) -> &BTreeMap<TowerId, Tower> {
        &self.towers
    }

    /// Tower by id.
    #[must_use]
    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.towers.get(&id)
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &BTreeMap<ProjectileId, Projectile> {
        &self.projectiles
    }

    /// Active visual effects.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// The enemy path.
    #[must_use]
    pub fn path(&self) -> &PathModel {
        &self.path
    }

    /// Resolved type tables.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Configuration the world was built from.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Calculate a hash of the current simulation state.
    ///
    /// Two worlds with identical state produce identical hashes; used to
    /// detect divergence in determinism tests.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.money.hash(&mut hasher);
        self.lives.hash(&mut hasher);
        self.status.hash(&mut hasher);

        self.waves.state().hash(&mut hasher);
        self.waves.current_wave().hash(&mut hasher);
        self.waves.pending().hash(&mut hasher);
        self.waves.accumulator().to_bits().hash(&mut hasher);

        self.enemies.len().hash(&mut hasher);
        for (id, enemy) in &self.enemies {
            id.hash(&mut hasher);
            enemy.kind().hash(&mut hasher);
            enemy.health().to_bits().hash(&mut hasher);
            enemy.progress().to_bits().hash(&mut hasher);
            enemy.position().hash(&mut hasher);
        }

        self.towers.len().hash(&mut hasher);
        for (id, tower) in &self.towers {
            id.hash(&mut hasher);
            tower.kind().hash(&mut hasher);
            tower.position().hash(&mut hasher);
            tower.level().hash(&mut hasher);
            tower.cooldown().hash(&mut hasher);
            tower.target().hash(&mut hasher);
            tower.total_invested().hash(&mut hasher);
        }

        self.projectiles.len().hash(&mut hasher);
        for (id, projectile) in &self.projectiles {
            id.hash(&mut hasher);
            projectile.target().hash(&mut hasher);
            projectile.position().hash(&mut hasher);
        }

        self.next_enemy_id.hash(&mut hasher);
        self.next_tower_id.hash(&mut hasher);
        self.next_projectile_id.hash(&mut hasher);

        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{WaveData, WaveGroup};

    fn default_world() -> SimulationWorld {
        SimulationWorld::new(GameConfig::default()).unwrap()
    }

    /// One-wave game on a short horizontal path.
    fn short_config(groups: Vec<WaveGroup>, lives: u32) -> GameConfig {
        GameConfig {
            starting_lives: lives,
            max_waves: 1,
            path: vec![Vec2Fixed::from_ints(0, 100), Vec2Fixed::from_ints(240, 100)],
            waves: vec![WaveData {
                groups,
                spawn_interval: Fixed::ONE,
            }],
            ..GameConfig::default()
        }
    }

    fn short_world(groups: Vec<WaveGroup>, lives: u32) -> SimulationWorld {
        SimulationWorld::new(short_config(groups, lives)).unwrap()
    }

    fn run_until<F>(world: &mut SimulationWorld, dt: Fixed, max_ticks: usize, mut done: F) -> Vec<TickEvents>
    where
        F: FnMut(&SimulationWorld, &TickEvents) -> bool,
    {
        let mut history = Vec::new();
        for _ in 0..max_ticks {
            let events = world.tick(dt);
            let stop = done(world, &events);
            history.push(events);
            if stop {
                break;
            }
        }
        history
    }

    /// Clear of every default path segment.
    fn open_ground() -> Vec2Fixed {
        Vec2Fixed::from_ints(275, 225)
    }

    #[test]
    fn test_new_world_starting_state() {
        let world = default_world();
        assert_eq!(world.money(), 100);
        assert_eq!(world.lives(), 20);
        assert_eq!(world.current_wave(), 0);
        assert_eq!(world.max_waves(), 10);
        assert_eq!(world.status(), GameStatus::Playing);
        assert_eq!(world.wave_state(), WaveState::Idle);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            path: vec![Vec2Fixed::ZERO],
            ..GameConfig::default()
        };
        assert!(matches!(
            SimulationWorld::new(config),
            Err(ConfigError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_placement_charges_then_rejects_unaffordable() {
        let mut world = default_world();
        world.place_tower(TowerKind::Basic, open_ground()).unwrap();
        assert_eq!(world.money(), 50);

        let err = world
            .place_tower(TowerKind::Fast, Vec2Fixed::from_ints(275, 300))
            .unwrap_err();
        assert_eq!(
            err,
            CommandError::InsufficientFunds {
                required: 80,
                available: 50
            }
        );
        assert_eq!(world.money(), 50);
        assert_eq!(world.towers().len(), 1);
    }

    #[test]
    fn test_placement_rules() {
        let mut world = default_world();
        let on_path = Vec2Fixed::from_ints(275, 100);
        let off_map = Vec2Fixed::from_ints(10, 300);

        assert_eq!(
            world.placement_check(TowerKind::Basic, on_path),
            Err(CommandError::InvalidPlacement(PlacementIssue::OnPath))
        );
        assert_eq!(
            world.placement_check(TowerKind::Basic, off_map),
            Err(CommandError::InvalidPlacement(PlacementIssue::OutOfBounds))
        );

        world.place_tower(TowerKind::Basic, open_ground()).unwrap();
        assert_eq!(
            world.placement_check(TowerKind::Basic, Vec2Fixed::from_ints(300, 225)),
            Err(CommandError::InvalidPlacement(PlacementIssue::Overlapping))
        );
        assert_eq!(
            world.placement_check(TowerKind::Basic, Vec2Fixed::from_ints(315, 225)),
            Ok(())
        );
    }

    #[test]
    fn test_upgrade_rules() {
        let config = GameConfig {
            starting_money: 240,
            ..GameConfig::default()
        };
        let mut world = SimulationWorld::new(config).unwrap();
        let id = world.place_tower(TowerKind::Basic, open_ground()).unwrap();
        assert_eq!(world.money(), 190);

        assert_eq!(world.upgrade_tower(id), Ok(50));
        assert_eq!(world.upgrade_tower(id), Ok(75));
        assert_eq!(world.money(), 65);

        let err = world.upgrade_tower(id).unwrap_err();
        assert_eq!(
            err,
            CommandError::InsufficientFunds {
                required: 113,
                available: 65
            }
        );
        assert_eq!(world.tower(id).unwrap().level(), 2);
        assert_eq!(world.money(), 65);

        assert_eq!(world.upgrade_tower(99), Err(CommandError::UnknownEntity(99)));
    }

    #[test]
    fn test_upgrade_rejected_at_max_level() {
        let config = GameConfig {
            starting_money: 1000,
            ..GameConfig::default()
        };
        let mut world = SimulationWorld::new(config).unwrap();
        let id = world.place_tower(TowerKind::Fast, open_ground()).unwrap();
        for _ in 0..3 {
            world.upgrade_tower(id).unwrap();
        }
        let money = world.money();
        assert_eq!(
            world.upgrade_tower(id),
            Err(CommandError::InvalidUpgrade {
                tower: id,
                max_level: 3
            })
        );
        assert_eq!(world.money(), money);
        assert_eq!(world.upgrade_cost(id), None);
    }

    #[test]
    fn test_sell_refunds_investment() {
        let mut world = default_world();
        let id = world.place_tower(TowerKind::Basic, open_ground()).unwrap();
        assert_eq!(world.sell_value(id), Some(35));
        assert_eq!(world.sell_tower(id), Ok(35));
        assert_eq!(world.money(), 85);
        assert!(world.towers().is_empty());
        assert_eq!(world.sell_tower(id), Err(CommandError::UnknownEntity(id)));
    }

    #[test]
    fn test_start_wave_rules() {
        let mut world = default_world();
        assert_eq!(world.start_wave(), Ok(1));
        assert_eq!(world.pending_spawns(), 12);
        assert_eq!(world.start_wave(), Err(CommandError::WaveAlreadyInProgress(1)));
    }

    #[test]
    fn test_leak_costs_lives_once() {
        let mut world = short_world(vec![WaveGroup::new(EnemyKind::Tank, 1)], 20);
        world.start_wave().unwrap();

        let history = run_until(&mut world, Fixed::from_num(0.5), 100, |w, _| {
            w.status() != GameStatus::Playing
        });
        let leaks: Vec<_> = history.iter().flat_map(|e| e.core_leaks.iter()).collect();
        assert_eq!(leaks.len(), 1);
        assert_eq!(leaks[0].damage, 2);
        assert_eq!(world.lives(), 18);
        assert_eq!(world.status(), GameStatus::Victory);
    }

    #[test]
    fn test_wave_clear_pays_bonus_before_final_wave() {
        let mut world = default_world();
        world.start_wave().unwrap();

        // Twelve intervals release the whole first wave.
        for _ in 0..12 {
            world.tick(Fixed::from_num(3));
        }
        assert_eq!(world.pending_spawns(), 0);
        assert_eq!(world.wave_state(), WaveState::Spawning);

        let history = run_until(&mut world, Fixed::from_num(0.5), 1000, |_, events| {
            events.wave_cleared.is_some()
        });
        let cleared = history.last().and_then(|e| e.wave_cleared).unwrap();
        assert_eq!(cleared, WaveClearedEvent { wave: 1, bonus: 50 });
        assert_eq!(world.wave_state(), WaveState::Drained);
        assert_eq!(world.lives(), 8);
        assert_eq!(world.money(), 150);
        assert_eq!(world.start_wave(), Ok(2));
    }

    #[test]
    fn test_defeat_wins_over_victory_and_freezes_world() {
        let mut world = short_world(vec![WaveGroup::new(EnemyKind::Basic, 1)], 1);
        world.start_wave().unwrap();

        let history = run_until(&mut world, Fixed::from_num(0.5), 100, |_, events| {
            events.outcome.is_some()
        });
        assert_eq!(history.last().unwrap().outcome, Some(GameOutcome::Defeat));
        assert_eq!(world.status(), GameStatus::Defeat);

        let tick = world.get_tick();
        assert!(world.tick(Fixed::ONE).is_empty());
        assert_eq!(world.get_tick(), tick);
        assert_eq!(world.start_wave(), Err(CommandError::GameOver));
        assert_eq!(
            world.place_tower(TowerKind::Basic, open_ground()),
            Err(CommandError::GameOver)
        );
    }

    #[test]
    fn test_towers_kill_enemy_and_earn_bounty() {
        let config = GameConfig {
            starting_money: 1000,
            ..short_config(vec![WaveGroup::new(EnemyKind::Fast, 1)], 20)
        };
        let mut world = SimulationWorld::new(config).unwrap();

        for x in [60, 120, 180] {
            world
                .place_tower(TowerKind::Basic, Vec2Fixed::from_ints(x, 160))
                .unwrap();
        }
        world.start_wave().unwrap();

        let dt = Fixed::ONE / Fixed::from_num(60);
        let history = run_until(&mut world, dt, 2000, |w, _| w.status() != GameStatus::Playing);
        let kills: Vec<_> = history.iter().flat_map(|e| e.enemies_killed.iter()).collect();
        let fired: usize = history.iter().map(|e| e.projectiles_fired.len()).sum();

        // 30 health, one 10-damage shot from each tower.
        assert_eq!(fired, 3);
        assert_eq!(kills.len(), 1);
        assert_eq!(kills[0].bounty, 15);
        assert_eq!(world.lives(), 20);
        assert_eq!(world.money(), 1000 - 150 + 15);
        assert_eq!(world.status(), GameStatus::Victory);
    }

    #[test]
    fn test_queued_commands_apply_at_tick_boundary() {
        let mut world = default_world();
        world.queue_command(PlayerCommand::PlaceTower {
            kind: TowerKind::Basic,
            position: open_ground(),
        });
        world.queue_command(PlayerCommand::PlaceTower {
            kind: TowerKind::Aoe,
            position: Vec2Fixed::from_ints(275, 300),
        });
        world.queue_command(PlayerCommand::StartWave);
        assert_eq!(world.money(), 100);
        assert_eq!(world.queued_commands(), 3);

        let events = world.tick(Fixed::ZERO);
        assert_eq!(events.command_results.len(), 3);
        assert_eq!(events.command_results[0].result, Ok(CommandOutcome::TowerPlaced(1)));
        assert!(matches!(
            events.command_results[1].result,
            Err(CommandError::InsufficientFunds { .. })
        ));
        assert_eq!(events.command_results[2].result, Ok(CommandOutcome::WaveStarted(1)));
        assert_eq!(world.money(), 50);
        assert_eq!(world.queued_commands(), 0);
    }

    #[test]
    fn test_reset_restores_starting_state() {
        let mut world = default_world();
        let fresh_hash = world.state_hash();

        world.place_tower(TowerKind::Basic, open_ground()).unwrap();
        world.start_wave().unwrap();
        for _ in 0..20 {
            world.tick(Fixed::from_num(0.5));
        }
        assert_ne!(world.state_hash(), fresh_hash);

        world.reset();
        assert_eq!(world.state_hash(), fresh_hash);
        assert_eq!(world.money(), 100);
        assert!(world.enemies().is_empty());
        assert_eq!(world.current_wave(), 0);
    }

    #[test]
    fn test_same_inputs_same_hash() {
        let mut a = default_world();
        let mut b = default_world();
        for world in [&mut a, &mut b] {
            world.place_tower(TowerKind::Aoe, open_ground()).unwrap_err();
            world.place_tower(TowerKind::Basic, open_ground()).unwrap();
            world.start_wave().unwrap();
        }
        for _ in 0..300 {
            a.tick(Fixed::from_num(0.1));
            b.tick(Fixed::from_num(0.1));
            assert_eq!(a.state_hash(), b.state_hash());
        }
    }

    #[test]
    fn test_snapshot_reflects_world() {
        let mut world = default_world();
        world.place_tower(TowerKind::Basic, open_ground()).unwrap();
        world.start_wave().unwrap();
        for _ in 0..10 {
            world.tick(Fixed::ONE);
        }

        let snapshot = world.snapshot();
        assert_eq!(snapshot.tick, 10);
        assert_eq!(snapshot.money, world.money());
        assert_eq!(snapshot.towers.len(), 1);
        assert_eq!(snapshot.towers[0].x, 275.0);
        assert_eq!(snapshot.enemies.len(), world.enemies().len());
        assert_eq!(snapshot.wave_state, WaveState::Spawning);
    }
}
