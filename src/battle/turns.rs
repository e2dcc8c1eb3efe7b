//! Turn scheduling
//!
//! The active player acts once with every live stack, in any order, deferring
//! stacks as they like. When no live stack of theirs is left un-acted, control
//! passes to the opponent and the opponent's stacks are reset to idle.

use crate::battle::game::{GameContext, LogEventType};
use crate::battle::units::UnitState;
use crate::core::error::{EngineError, EngineResult};
use crate::core::types::{PlayerId, UnitId};

/// Check that `player` may act with `unit_id` now. Returns the unit's index.
pub fn ensure_can_act(
    context: &GameContext,
    player: PlayerId,
    unit_id: UnitId,
) -> EngineResult<usize> {
    let game = &context.game;
    if !game.is_in_progress() {
        return Err(EngineError::GameNotInProgress);
    }
    if !game.is_participant(player) {
        return Err(EngineError::NotParticipant);
    }
    if game.current_player_id != Some(player) {
        return Err(EngineError::NotYourTurn);
    }

    let index = context
        .unit_index(unit_id)
        .ok_or(EngineError::UnitNotFound(unit_id))?;
    let unit = &context.units[index];

    if unit.owner != player {
        return Err(EngineError::NotYourUnit);
    }
    if !unit.is_alive() {
        return Err(EngineError::UnitDestroyed);
    }
    if unit.has_moved() {
        return Err(EngineError::UnitAlreadyActed);
    }

    Ok(index)
}

/// Mark a stack as done for this round
pub fn mark_acted(context: &mut GameContext, index: usize) {
    context.units[index].state = UnitState::Acted;
}

/// Postpone a stack within the round; it still owes an action
pub fn defer(context: &mut GameContext, index: usize) {
    context.units[index].state = UnitState::Deferred;
}

/// Has every live stack of this player acted?
pub fn round_complete(context: &GameContext, player: PlayerId) -> bool {
    context.live_units_of(player).all(|u| u.has_moved())
}

/// Stacks of the active player still owing an action, deferred ones last
pub fn pending_units(context: &GameContext) -> Vec<UnitId> {
    let Some(player) = context.game.current_player_id else {
        return Vec::new();
    };
    let mut pending: Vec<_> = context.live_units_of(player).filter(|u| u.can_act()).collect();
    pending.sort_by_key(|u| u.is_deferred());
    pending.into_iter().map(|u| u.id).collect()
}

/// Pass control to the opponent if the active player's round is exhausted.
///
/// Returns whether the turn switched.
pub fn end_turn_if_complete(context: &mut GameContext) -> bool {
    let Some(active) = context.game.current_player_id else {
        return false;
    };
    if !round_complete(context, active) {
        return false;
    }
    let Some(next) = context.game.opponent_of(active) else {
        return false;
    };

    for unit in context.units.iter_mut().filter(|u| u.owner == next) {
        unit.state = UnitState::Idle;
    }

    context.game.current_player_id = Some(next);
    if next == context.game.player1 {
        context.game.round += 1;
    }

    let round = context.game.round;
    context.log_event(
        LogEventType::TurnSwitched,
        format!("Turn passes to {} (round {})", next, round),
    );
    tracing::debug!(game = %context.game.id, player = %next, round, "turn switched");

    true
}
