//! Game storage seam
//!
//! Every engine call is one unit of work: load the aggregate, validate,
//! mutate, commit. `update_game` gives the closure a working copy and only
//! writes it back when the closure succeeds, so a rejected action leaves no
//! trace.

use std::sync::Mutex;

use ahash::AHashMap;
use serde::Serialize;

use crate::battle::game::{Game, GameContext, GameLogEntry};
use crate::battle::grid::{Field, Obstacle};
use crate::battle::units::BattleUnit;
use crate::core::error::{EngineError, EngineResult};
use crate::core::types::{GameId, PlayerId};

/// Transactional access to persisted games
pub trait GameStore: Send + Sync {
    /// Shared field template for a size, created on first use
    fn field_for_size(&self, width: u32, height: u32) -> Field;

    /// Persist a new aggregate
    fn insert_game(&self, context: GameContext) -> EngineResult<()>;

    /// Fully loaded aggregate
    fn load_game(&self, game_id: GameId) -> EngineResult<GameContext>;

    /// Run `f` against a working copy and commit it only on `Ok`
    fn update_game<T, F>(&self, game_id: GameId, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut GameContext) -> EngineResult<T>;

    /// Games a player takes part in, oldest first
    fn games_for_player(&self, player: PlayerId) -> Vec<Game>;
}

/// Persisted rows, one table per record kind
#[derive(Debug, Default, Serialize)]
struct Tables {
    fields: AHashMap<String, Field>,
    games: AHashMap<GameId, Game>,
    obstacles: AHashMap<GameId, Vec<Obstacle>>,
    units: AHashMap<GameId, Vec<BattleUnit>>,
    logs: AHashMap<GameId, Vec<GameLogEntry>>,
}

impl Tables {
    fn context(&self, game_id: GameId) -> EngineResult<GameContext> {
        let game = self
            .games
            .get(&game_id)
            .cloned()
            .ok_or(EngineError::GameNotFound(game_id))?;

        Ok(GameContext {
            game,
            obstacles: self.obstacles.get(&game_id).cloned().unwrap_or_default(),
            units: self.units.get(&game_id).cloned().unwrap_or_default(),
            log: self.logs.get(&game_id).cloned().unwrap_or_default(),
        })
    }

    fn commit(&mut self, context: GameContext) {
        let game_id = context.game.id;

        // Obstacles are fixed once generated
        let obstacles = self.obstacles.entry(game_id).or_default();
        if obstacles.is_empty() {
            *obstacles = context.obstacles;
        }

        // The log only ever grows
        let log = self.logs.entry(game_id).or_default();
        let stored = log.len();
        if context.log.len() > stored {
            log.extend(context.log.into_iter().skip(stored));
        }

        self.units.insert(game_id, context.units);
        self.games.insert(game_id, context.game);
    }
}

/// Process-local store behind one mutex
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn game_count(&self) -> usize {
        self.tables().games.len()
    }

    /// Dump every table as JSON for reporting tools
    pub fn export_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(&*self.tables())?)
    }
}

impl GameStore for InMemoryStore {
    fn field_for_size(&self, width: u32, height: u32) -> Field {
        let label = format!("{}x{}", width, height);
        self.tables()
            .fields
            .entry(label)
            .or_insert_with(|| Field::new(width, height))
            .clone()
    }

    fn insert_game(&self, context: GameContext) -> EngineResult<()> {
        let mut tables = self.tables();
        tables.commit(context);
        Ok(())
    }

    fn load_game(&self, game_id: GameId) -> EngineResult<GameContext> {
        self.tables().context(game_id)
    }

    fn update_game<T, F>(&self, game_id: GameId, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut GameContext) -> EngineResult<T>,
    {
        let mut tables = self.tables();
        let mut working = tables.context(game_id)?;
        let value = f(&mut working)?;
        tables.commit(working);
        Ok(value)
    }

    fn games_for_player(&self, player: PlayerId) -> Vec<Game> {
        let mut games: Vec<Game> = self
            .tables()
            .games
            .values()
            .filter(|g| g.is_participant(player))
            .cloned()
            .collect();
        games.sort_by_key(|g| g.created_at);
        games
    }
}
