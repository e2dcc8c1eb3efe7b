//! Read model front ends render

use serde::{Deserialize, Serialize};

use crate::battle::game::{GameContext, GameStatus};
use crate::battle::units::UnitState;
use crate::core::types::{Cell, GameId, PlayerId, UnitId};
use crate::economy::rewards::BattleReward;

/// One stack as a front end shows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub owner: PlayerId,
    pub name: String,
    pub position: Cell,
    pub total_count: u32,
    pub initial_count: u32,
    pub remaining_hp: u32,
    pub morale: u8,
    pub fatigue: u8,
    pub state: UnitState,
    pub alive: bool,
    pub is_flying: bool,
    pub range: u32,
    pub speed: u32,
}

/// Everything needed to draw a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub status: GameStatus,
    pub round: u32,
    pub player1: PlayerId,
    pub player2: PlayerId,
    pub current_player_id: Option<PlayerId>,
    pub winner_id: Option<PlayerId>,
    pub field: String,
    pub width: u32,
    pub height: u32,
    pub obstacles: Vec<Cell>,
    pub units: Vec<UnitView>,
    pub reward: Option<BattleReward>,
}

impl GameSnapshot {
    pub fn from_context(context: &GameContext) -> Self {
        let game = &context.game;
        Self {
            game_id: game.id,
            status: game.status,
            round: game.round,
            player1: game.player1,
            player2: game.player2,
            current_player_id: game.current_player_id,
            winner_id: game.winner_id,
            field: game.field.label.clone(),
            width: game.field.width,
            height: game.field.height,
            obstacles: context.obstacles.iter().map(|o| o.cell).collect(),
            units: context
                .units
                .iter()
                .map(|u| UnitView {
                    id: u.id,
                    owner: u.owner,
                    name: u.unit_type.name.clone(),
                    position: u.position,
                    total_count: u.total_count,
                    initial_count: u.initial_count,
                    remaining_hp: u.remaining_hp,
                    morale: u.morale,
                    fatigue: u.fatigue,
                    state: u.state,
                    alive: u.is_alive(),
                    is_flying: u.unit_type.is_flying,
                    range: u.unit_type.range,
                    speed: u.unit_type.speed,
                })
                .collect(),
            reward: game.reward,
        }
    }

    /// Units of one player still on the field
    pub fn live_units_of(&self, player: PlayerId) -> impl Iterator<Item = &UnitView> {
        self.units
            .iter()
            .filter(move |u| u.owner == player && u.alive)
    }

    /// ASCII map: `#` obstacle, `A`/`B` stacks of player1/player2, `.` empty
    pub fn render_ascii(&self) -> String {
        let mut rows = vec![vec!['.'; self.width as usize]; self.height as usize];
        for cell in &self.obstacles {
            rows[cell.y as usize][cell.x as usize] = '#';
        }
        for unit in self.units.iter().filter(|u| u.alive) {
            let mark = if unit.owner == self.player1 { 'A' } else { 'B' };
            rows[unit.position.y as usize][unit.position.x as usize] = mark;
        }
        rows.into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
