use thiserror::Error;

use crate::core::types::{Cell, GameId, PlayerId, RosterEntryId, UnitId};

/// Validation failures surfaced to front ends as `(false, reason)`.
///
/// Contract violations (e.g. resolving line of sight without a loaded game)
/// are not represented here; they panic.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("You cannot challenge yourself")]
    SelfChallenge,

    #[error("Player {0} has no units to deploy")]
    NoDeployableUnits(PlayerId),

    #[error("Unknown unit type for roster entry {0}")]
    UnknownUnitType(RosterEntryId),

    #[error("Roster of {stacks} stacks does not fit a {width}x{height} field")]
    RosterTooLarge { stacks: usize, width: u32, height: u32 },

    #[error("Invalid field size: {0}")]
    InvalidFieldSize(String),

    #[error("Game is not waiting for an opponent")]
    GameNotWaiting,

    #[error("Game is not in progress")]
    GameNotInProgress,

    #[error("This invitation is not addressed to you")]
    NotInvitedOpponent,

    #[error("You are not a participant in this game")]
    NotParticipant,

    #[error("It is not your turn")]
    NotYourTurn,

    #[error("This unit does not belong to you")]
    NotYourUnit,

    #[error("This unit has already acted this round")]
    UnitAlreadyActed,

    #[error("This unit has been destroyed")]
    UnitDestroyed,

    #[error("You cannot attack your own unit")]
    TargetNotEnemy,

    #[error("The target has already been destroyed")]
    TargetDestroyed,

    #[error("Target is out of range (distance {distance}, range {range})")]
    OutOfRange { distance: u32, range: u32 },

    #[error("No line of sight to the target")]
    NoLineOfSight,

    #[error("Cell {0} is outside the field")]
    OutOfBounds(Cell),

    #[error("Cell {0} is not reachable")]
    CellUnreachable(Cell),

    #[error("No battle report: the game did not end in a victory")]
    NoBattleReport,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
