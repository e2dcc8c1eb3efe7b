//! Game records and the loaded game aggregate
//!
//! `GameContext` is the unit every engine call reads, mutates and hands back
//! to the store. Anything that needs obstacles or positions takes a context,
//! never a bare id.

use std::time::SystemTime;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::grid::{Field, Grid, Obstacle};
use crate::battle::units::BattleUnit;
use crate::core::types::{GameId, PlayerId, UnitId};
use crate::economy::rewards::BattleReward;

/// Game lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    #[default]
    Waiting, // Created, opponent not yet confirmed
    InProgress, // Battle underway
    Completed,  // Terminal
}

/// One game between two players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    /// Creator; always moves first
    pub player1: PlayerId,
    /// Invited opponent
    pub player2: PlayerId,
    pub field: Field,
    pub status: GameStatus,
    pub current_player_id: Option<PlayerId>,
    pub winner_id: Option<PlayerId>,
    /// Starts at 1 when the battle begins; advances when control returns to player1
    pub round: u32,
    pub seed: u64,
    pub actions_taken: u64,
    pub created_at: SystemTime,
    pub started_at: Option<SystemTime>,
    pub completed_at: Option<SystemTime>,
    pub reward: Option<BattleReward>,
}

impl Game {
    pub fn new(player1: PlayerId, player2: PlayerId, field: Field, seed: u64) -> Self {
        Self {
            id: GameId::new(),
            player1,
            player2,
            field,
            status: GameStatus::Waiting,
            current_player_id: None,
            winner_id: None,
            round: 0,
            seed,
            actions_taken: 0,
            created_at: SystemTime::now(),
            started_at: None,
            completed_at: None,
            reward: None,
        }
    }

    pub fn is_participant(&self, player: PlayerId) -> bool {
        player == self.player1 || player == self.player2
    }

    /// The other participant
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        if player == self.player1 {
            Some(self.player2)
        } else if player == self.player2 {
            Some(self.player1)
        } else {
            None
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.status, GameStatus::InProgress)
    }
}

/// Kind of audit trail entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEventType {
    GameCreated,
    GameAccepted,
    GameDeclined,
    UnitMoved,
    UnitAttacked,
    UnitSkipped,
    UnitDeferred,
    TurnSwitched,
    GameForfeited,
    GameCompleted,
    RewardGranted,
}

/// Append-only audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLogEntry {
    pub sequence: u64,
    pub event_type: LogEventType,
    pub message: String,
    pub timestamp: SystemTime,
}

/// A fully loaded game: record, obstacles, stacks and log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameContext {
    pub game: Game,
    pub obstacles: Vec<Obstacle>,
    pub units: Vec<BattleUnit>,
    pub log: Vec<GameLogEntry>,
}

impl GameContext {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            obstacles: Vec::new(),
            units: Vec::new(),
            log: Vec::new(),
        }
    }

    pub fn field(&self) -> &Field {
        &self.game.field
    }

    /// Occupancy view
    pub fn grid(&self) -> Grid<'_> {
        Grid::new(self)
    }

    /// Append to the audit trail
    pub fn log_event(&mut self, event_type: LogEventType, message: impl Into<String>) {
        let sequence = self.log.len() as u64;
        self.log.push(GameLogEntry {
            sequence,
            event_type,
            message: message.into(),
            timestamp: SystemTime::now(),
        });
    }

    /// RNG for the next action, derived from the game seed and action count
    pub fn action_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.game.seed.wrapping_add(self.game.actions_taken))
    }

    pub fn unit(&self, unit_id: UnitId) -> Option<&BattleUnit> {
        self.units.iter().find(|u| u.id == unit_id)
    }

    pub fn unit_index(&self, unit_id: UnitId) -> Option<usize> {
        self.units.iter().position(|u| u.id == unit_id)
    }

    /// Live stacks of one player
    pub fn live_units_of(&self, player: PlayerId) -> impl Iterator<Item = &BattleUnit> {
        self.units
            .iter()
            .filter(move |u| u.owner == player && u.is_alive())
    }

    pub fn has_live_units(&self, player: PlayerId) -> bool {
        self.live_units_of(player).next().is_some()
    }
}
