//! Player intents that can be queued for the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::data::TowerKind;
use crate::error::CommandError;
use crate::math::Vec2Fixed;
use crate::tower::TowerId;

/// A player intent.
///
/// Each variant mirrors one direct method on
/// [`SimulationWorld`](crate::simulation::SimulationWorld).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerCommand {
    /// Build a tower.
    PlaceTower {
        /// Tower type.
        kind: TowerKind,
        /// Footprint centre.
        position: Vec2Fixed,
    },
    /// Upgrade a tower by one level.
    UpgradeTower(TowerId),
    /// Sell a tower.
    SellTower(TowerId),
    /// Start the next wave.
    StartWave,
}

/// What an accepted command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandOutcome {
    /// A tower was built.
    TowerPlaced(TowerId),
    /// A tower was upgraded.
    TowerUpgraded {
        /// Tower upgraded.
        tower: TowerId,
        /// Money charged.
        cost: u32,
    },
    /// A tower was sold.
    TowerSold {
        /// Tower removed.
        tower: TowerId,
        /// Money refunded.
        refund: u32,
    },
    /// A wave started.
    WaveStarted(u32),
}

/// A queued command together with its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReceipt {
    /// The command as submitted.
    pub command: PlayerCommand,
    /// Outcome, or why it was rejected.
    pub result: Result<CommandOutcome, CommandError>,
}

impl CommandReceipt {
    /// True if the command was applied.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}
