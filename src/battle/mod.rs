//! Battle core - two players, one grid, alternating rounds
//!
//! Stacks of identical creatures move and fight on a square grid dotted with
//! obstacles. Each player acts once with every live stack per round; the
//! game ends when one side has nothing left on the field.
//!
//! Layering, bottom-up:
//! - `grid`, `game`: field, obstacles, the loaded game aggregate
//! - `visibility`, `movement`: pure queries over a loaded game
//! - `resolution`, `morale`: combat math
//! - `turns`: round bookkeeping and turn authority
//! - `deployment`: placing rosters when a game is accepted
//! - `engine`: the transactional facade front ends call

pub mod deployment;
pub mod engine;
pub mod game;
pub mod grid;
pub mod morale;
pub mod movement;
pub mod resolution;
pub mod snapshot;
pub mod turns;
pub mod unit_type;
pub mod units;
pub mod visibility;

// Re-exports for convenient access
pub use deployment::{deploy_side, deployment_cells, generate_obstacles, DeployableStack, Side};
pub use engine::{ActionOutcome, ActionReply, BattleEngine, Collaborators, CreateReply, GameOver};
pub use game::{Game, GameContext, GameLogEntry, GameStatus, LogEventType};
pub use grid::{Field, Grid, Obstacle};
pub use movement::{can_reach, reachable_cells};
pub use resolution::{
    attackable_targets, kamikaze_rule, resolve_attack, roll_strike, validate_attack, AttackReport,
    KamikazeRule, SingleCreatureLoss, StrikeKind, StrikeReport, WholeStackLoss,
};
pub use snapshot::{GameSnapshot, UnitView};
pub use turns::{end_turn_if_complete, ensure_can_act, pending_units, round_complete};
pub use unit_type::UnitType;
pub use units::{BattleUnit, UnitState};
pub use visibility::has_line_of_sight;
