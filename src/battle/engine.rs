//! Battle engine facade
//!
//! Every public operation is one unit of work against the store. Front ends
//! call it concurrently; the store serializes commits and the turn authority
//! check rejects out-of-turn callers immediately.

use std::sync::Arc;
use std::time::SystemTime;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::battle::deployment::{deploy_side, deployment_cells, generate_obstacles, DeployableStack, Side};
use crate::battle::game::{Game, GameContext, GameLogEntry, GameStatus, LogEventType};
use crate::battle::grid::Field;
use crate::battle::movement::{can_reach, reachable_cells};
use crate::battle::resolution::{
    attackable_targets, kamikaze_rule, resolve_attack, validate_attack, AttackReport, KamikazeRule,
};
use crate::battle::snapshot::GameSnapshot;
use crate::battle::turns::{defer, end_turn_if_complete, ensure_can_act, mark_acted};
use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, EngineResult};
use crate::core::types::{Cell, GameId, PlayerId, UnitId};
use crate::economy::rewards::{compute_reward, BattleReward};
use crate::persistence::collaborators::{PlayerDirectory, RosterSource, UnitCatalog};
use crate::persistence::store::GameStore;

/// Lookups owned by other subsystems
#[derive(Clone)]
pub struct Collaborators {
    pub players: Arc<dyn PlayerDirectory>,
    pub rosters: Arc<dyn RosterSource>,
    pub catalog: Arc<dyn UnitCatalog>,
}

impl Collaborators {
    /// Use one object for all three lookups
    pub fn from_shared<T>(shared: Arc<T>) -> Self
    where
        T: PlayerDirectory + RosterSource + UnitCatalog + 'static,
    {
        Self {
            players: shared.clone(),
            rosters: shared.clone(),
            catalog: shared,
        }
    }
}

/// How a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub winner: PlayerId,
    pub reward: BattleReward,
}

/// Result of an accepted move, attack, skip or forfeit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub message: String,
    /// Control passed to the opponent; the caller may notify them
    pub turn_switched: bool,
    pub completed: Option<GameOver>,
    pub attack: Option<AttackReport>,
}

/// `(ok, message, turn_switched)` as front ends consume it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReply {
    pub ok: bool,
    pub message: String,
    pub turn_switched: bool,
}

impl From<EngineResult<ActionOutcome>> for ActionReply {
    fn from(result: EngineResult<ActionOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                ok: true,
                message: outcome.message,
                turn_switched: outcome.turn_switched,
            },
            Err(e) => Self {
                ok: false,
                message: e.to_string(),
                turn_switched: false,
            },
        }
    }
}

impl From<EngineResult<String>> for ActionReply {
    fn from(result: EngineResult<String>) -> Self {
        match result {
            Ok(message) => Self {
                ok: true,
                message,
                turn_switched: false,
            },
            Err(e) => Self {
                ok: false,
                message: e.to_string(),
                turn_switched: false,
            },
        }
    }
}

/// Reply to `create_game`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReply {
    pub ok: bool,
    pub game_id: Option<GameId>,
    pub message: String,
}

impl From<EngineResult<(Game, String)>> for CreateReply {
    fn from(result: EngineResult<(Game, String)>) -> Self {
        match result {
            Ok((game, message)) => Self {
                ok: true,
                game_id: Some(game.id),
                message,
            },
            Err(e) => Self {
                ok: false,
                game_id: None,
                message: e.to_string(),
            },
        }
    }
}

pub struct BattleEngine<S: GameStore> {
    config: EngineConfig,
    store: S,
    collaborators: Collaborators,
    kamikaze: Box<dyn KamikazeRule>,
}

impl<S: GameStore> BattleEngine<S> {
    pub fn new(config: EngineConfig, store: S, collaborators: Collaborators) -> EngineResult<Self> {
        config.validate().map_err(EngineError::Config)?;
        let kamikaze = kamikaze_rule(config.kamikaze_loss);
        Ok(Self {
            config,
            store,
            collaborators,
            kamikaze,
        })
    }

    /// Swap the kamikaze policy
    pub fn with_kamikaze_rule(mut self, rule: Box<dyn KamikazeRule>) -> Self {
        self.kamikaze = rule;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn name_of(&self, player: PlayerId) -> String {
        self.collaborators
            .players
            .display_name(player)
            .unwrap_or_else(|| player.to_string())
    }

    /// Roster stacks with their catalog stats
    fn resolve_roster(&self, player: PlayerId) -> EngineResult<Vec<DeployableStack>> {
        let stacks: Vec<_> = self
            .collaborators
            .rosters
            .deployable_stacks(player)
            .into_iter()
            .filter(|stack| stack.count > 0)
            .collect();
        if stacks.is_empty() {
            return Err(EngineError::NoDeployableUnits(player));
        }
        stacks
            .into_iter()
            .map(|stack| {
                let unit_type = self
                    .collaborators
                    .catalog
                    .unit_type(stack.entry_id)
                    .ok_or(EngineError::UnknownUnitType(stack.entry_id))?;
                Ok(DeployableStack {
                    roster_entry: stack.entry_id,
                    unit_type,
                    count: stack.count,
                })
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Invite an opponent to a battle on a field of the given size
    pub fn create_game(
        &self,
        creator: PlayerId,
        opponent_identifier: &str,
        field_size: &str,
    ) -> EngineResult<(Game, String)> {
        let result = self.try_create_game(creator, opponent_identifier, field_size);
        if let Err(e) = &result {
            tracing::warn!(player = %creator, opponent = opponent_identifier, reason = %e, "create_game rejected");
        }
        result
    }

    fn try_create_game(
        &self,
        creator: PlayerId,
        opponent_identifier: &str,
        field_size: &str,
    ) -> EngineResult<(Game, String)> {
        let (width, height) = Field::parse_size(field_size, &self.config)?;

        if self.collaborators.players.display_name(creator).is_none() {
            return Err(EngineError::PlayerNotFound(creator.to_string()));
        }
        let opponent = self
            .collaborators
            .players
            .resolve(opponent_identifier)
            .ok_or_else(|| EngineError::PlayerNotFound(opponent_identifier.to_string()))?;
        if opponent == creator {
            return Err(EngineError::SelfChallenge);
        }

        let field = self.store.field_for_size(width, height);
        for (player, side) in [(creator, Side::West), (opponent, Side::East)] {
            let stacks = self.resolve_roster(player)?;
            deployment_cells(&field, side, stacks.len())?;
        }

        let seed = self.config.seed.unwrap_or_else(rand::random);
        let game = Game::new(creator, opponent, field, seed);
        let message = format!(
            "{} challenged {} on a {} field",
            self.name_of(creator),
            self.name_of(opponent),
            game.field.label
        );

        let mut context = GameContext::new(game.clone());
        context.log_event(LogEventType::GameCreated, message.clone());
        self.store.insert_game(context)?;

        tracing::info!(game = %game.id, creator = %creator, opponent = %opponent, field = %game.field.label, "game created");
        Ok((game, message))
    }

    /// The invited opponent accepts; both rosters deploy and the creator moves first
    pub fn accept_game(&self, game_id: GameId, player: PlayerId) -> EngineResult<String> {
        let result = self.store.update_game(game_id, |ctx| {
            if ctx.game.status != GameStatus::Waiting {
                return Err(EngineError::GameNotWaiting);
            }
            if player != ctx.game.player2 {
                return Err(EngineError::NotInvitedOpponent);
            }

            let creator = ctx.game.player1;
            let mut units = deploy_side(
                game_id,
                creator,
                ctx.field(),
                Side::West,
                self.resolve_roster(creator)?,
                &self.config,
            )?;
            units.extend(deploy_side(
                game_id,
                player,
                ctx.field(),
                Side::East,
                self.resolve_roster(player)?,
                &self.config,
            )?);

            let occupied: AHashSet<Cell> = units.iter().map(|u| u.position).collect();
            let mut rng = ctx.action_rng();
            ctx.obstacles = generate_obstacles(
                game_id,
                ctx.field(),
                &occupied,
                self.config.obstacle_density,
                &mut rng,
            );
            ctx.units = units;

            ctx.game.status = GameStatus::InProgress;
            ctx.game.current_player_id = Some(creator);
            ctx.game.round = 1;
            ctx.game.started_at = Some(SystemTime::now());
            ctx.game.actions_taken += 1;

            let message = format!(
                "{} accepted the challenge; {} moves first",
                self.name_of(player),
                self.name_of(creator)
            );
            ctx.log_event(LogEventType::GameAccepted, message.clone());
            tracing::info!(
                game = %game_id,
                units = ctx.units.len(),
                obstacles = ctx.obstacles.len(),
                "game accepted"
            );
            Ok(message)
        });

        if let Err(e) = &result {
            tracing::warn!(game = %game_id, player = %player, reason = %e, "accept_game rejected");
        }
        result
    }

    /// Withdraw a waiting invitation, either side
    pub fn decline_game(&self, game_id: GameId, player: PlayerId) -> EngineResult<String> {
        let result = self.store.update_game(game_id, |ctx| {
            if ctx.game.status != GameStatus::Waiting {
                return Err(EngineError::GameNotWaiting);
            }
            if !ctx.game.is_participant(player) {
                return Err(EngineError::NotParticipant);
            }

            ctx.game.status = GameStatus::Completed;
            ctx.game.completed_at = Some(SystemTime::now());

            let message = if player == ctx.game.player2 {
                format!("{} declined the challenge", self.name_of(player))
            } else {
                format!("{} withdrew the challenge", self.name_of(player))
            };
            ctx.log_event(LogEventType::GameDeclined, message.clone());
            tracing::info!(game = %game_id, player = %player, "game declined");
            Ok(message)
        });

        if let Err(e) = &result {
            tracing::warn!(game = %game_id, player = %player, reason = %e, "decline_game rejected");
        }
        result
    }

    /// Concede an ongoing battle; the opponent wins
    pub fn forfeit_game(&self, game_id: GameId, player: PlayerId) -> EngineResult<ActionOutcome> {
        self.perform(game_id, player, "forfeit", |ctx| {
            if !ctx.game.is_in_progress() {
                return Err(EngineError::GameNotInProgress);
            }
            let winner = ctx
                .game
                .opponent_of(player)
                .ok_or(EngineError::NotParticipant)?;

            let message = format!("{} forfeited", self.name_of(player));
            ctx.log_event(LogEventType::GameForfeited, message.clone());
            ctx.game.actions_taken += 1;

            let over = self.complete_game(ctx, winner)?;
            Ok(ActionOutcome {
                message,
                turn_switched: false,
                completed: Some(over),
                attack: None,
            })
        })
    }

    fn complete_game(&self, ctx: &mut GameContext, winner: PlayerId) -> EngineResult<GameOver> {
        let reward = compute_reward(ctx, winner, self.config.reward_share_percent)
            .ok_or(EngineError::NotParticipant)?;

        ctx.game.status = GameStatus::Completed;
        ctx.game.winner_id = Some(winner);
        ctx.game.current_player_id = None;
        ctx.game.completed_at = Some(SystemTime::now());
        ctx.game.reward = Some(reward);

        ctx.log_event(
            LogEventType::GameCompleted,
            format!("{} won after {} rounds", self.name_of(winner), ctx.game.round),
        );
        ctx.log_event(
            LogEventType::RewardGranted,
            format!(
                "{} earned {} (enemy losses {}, own losses {}, net {})",
                self.name_of(winner),
                reward.reward,
                reward.enemy_losses_value,
                reward.own_losses_value,
                reward.net_profit
            ),
        );
        tracing::info!(
            game = %ctx.game.id,
            winner = %winner,
            reward = %reward.reward,
            net_profit = %reward.net_profit,
            "game completed"
        );

        Ok(GameOver { winner, reward })
    }

    /// Victory check: a side without live stacks loses.
    ///
    /// If both sides are wiped out by the same action, the acting player wins.
    fn check_victory(&self, ctx: &mut GameContext, actor: PlayerId) -> EngineResult<Option<GameOver>> {
        let (p1, p2) = (ctx.game.player1, ctx.game.player2);
        let winner = match (ctx.has_live_units(p1), ctx.has_live_units(p2)) {
            (true, true) => return Ok(None),
            (true, false) => p1,
            (false, true) => p2,
            (false, false) => actor,
        };
        self.complete_game(ctx, winner).map(Some)
    }

    // ------------------------------------------------------------------
    // Turn actions
    // ------------------------------------------------------------------

    /// Run one action as a unit of work and log rejections
    fn perform<F>(
        &self,
        game_id: GameId,
        player: PlayerId,
        action: &str,
        f: F,
    ) -> EngineResult<ActionOutcome>
    where
        F: FnOnce(&mut GameContext) -> EngineResult<ActionOutcome>,
    {
        let result = self.store.update_game(game_id, f);
        if let Err(e) = &result {
            tracing::warn!(game = %game_id, player = %player, action, reason = %e, "action rejected");
        }
        result
    }

    /// Bookkeeping after a move, attack or skip
    fn finish_action(
        &self,
        ctx: &mut GameContext,
        player: PlayerId,
        message: String,
        attack: Option<AttackReport>,
    ) -> EngineResult<ActionOutcome> {
        ctx.game.actions_taken += 1;

        if let Some(over) = self.check_victory(ctx, player)? {
            return Ok(ActionOutcome {
                message,
                turn_switched: false,
                completed: Some(over),
                attack,
            });
        }

        let turn_switched = end_turn_if_complete(ctx);
        Ok(ActionOutcome {
            message,
            turn_switched,
            completed: None,
            attack,
        })
    }

    /// Move a stack to a reachable cell
    pub fn move_unit(
        &self,
        game_id: GameId,
        player: PlayerId,
        unit_id: UnitId,
        target: Cell,
    ) -> EngineResult<ActionOutcome> {
        self.perform(game_id, player, "move", |ctx| {
            let index = ensure_can_act(ctx, player, unit_id)?;
            if !ctx.field().in_bounds(target) {
                return Err(EngineError::OutOfBounds(target));
            }
            if !can_reach(ctx, unit_id, target) {
                return Err(EngineError::CellUnreachable(target));
            }

            let from = ctx.units[index].position;
            ctx.units[index].position = target;
            mark_acted(ctx, index);

            let message = format!("{} moved from {} to {}", ctx.units[index].unit_type.name, from, target);
            ctx.log_event(LogEventType::UnitMoved, message.clone());
            tracing::debug!(game = %game_id, unit = %unit_id, %from, to = %target, "unit moved");

            self.finish_action(ctx, player, message, None)
        })
    }

    /// Attack an enemy stack
    pub fn attack(
        &self,
        game_id: GameId,
        player: PlayerId,
        attacker_id: UnitId,
        target_id: UnitId,
    ) -> EngineResult<ActionOutcome> {
        self.perform(game_id, player, "attack", |ctx| {
            let index = ensure_can_act(ctx, player, attacker_id)?;
            validate_attack(ctx, attacker_id, target_id)?;

            let mut rng = ctx.action_rng();
            let report = resolve_attack(
                ctx,
                attacker_id,
                target_id,
                &self.config,
                self.kamikaze.as_ref(),
                &mut rng,
            )?;
            mark_acted(ctx, index);

            let target_name = ctx
                .unit(target_id)
                .map(|u| u.unit_type.name.clone())
                .unwrap_or_default();
            let message = report.summary(&ctx.units[index].unit_type.name, &target_name);
            ctx.log_event(LogEventType::UnitAttacked, message.clone());
            tracing::debug!(
                game = %game_id,
                attacker = %attacker_id,
                target = %target_id,
                dodged = report.strike.dodged,
                damage = report.strike.final_damage,
                killed = report.strike.killed,
                critical = report.strike.critical,
                lucky = report.strike.lucky,
                countered = report.counterattack.is_some(),
                "unit attacked"
            );

            self.finish_action(ctx, player, message, Some(report))
        })
    }

    /// End a stack's round without acting
    pub fn skip_unit_turn(
        &self,
        game_id: GameId,
        player: PlayerId,
        unit_id: UnitId,
    ) -> EngineResult<ActionOutcome> {
        self.perform(game_id, player, "skip", |ctx| {
            let index = ensure_can_act(ctx, player, unit_id)?;
            mark_acted(ctx, index);

            let message = format!("{} held position", ctx.units[index].unit_type.name);
            ctx.log_event(LogEventType::UnitSkipped, message.clone());
            tracing::debug!(game = %game_id, unit = %unit_id, "unit skipped");

            self.finish_action(ctx, player, message, None)
        })
    }

    /// Postpone a stack to later in the same round
    pub fn defer_unit(&self, game_id: GameId, player: PlayerId, unit_id: UnitId) -> EngineResult<String> {
        let result = self.store.update_game(game_id, |ctx| {
            let index = ensure_can_act(ctx, player, unit_id)?;
            defer(ctx, index);

            let message = format!("{} will act later this round", ctx.units[index].unit_type.name);
            ctx.log_event(LogEventType::UnitDeferred, message.clone());
            tracing::debug!(game = %game_id, unit = %unit_id, "unit deferred");
            Ok(message)
        });

        if let Err(e) = &result {
            tracing::warn!(game = %game_id, player = %player, action = "defer", reason = %e, "action rejected");
        }
        result
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Cells a stack may move to now. Empty rather than an error for "no moves".
    pub fn get_available_movement_cells(&self, game_id: GameId, unit_id: UnitId) -> Vec<Cell> {
        match self.store.load_game(game_id) {
            Ok(ctx) if ctx.game.is_in_progress() => reachable_cells(&ctx, unit_id),
            _ => Vec::new(),
        }
    }

    /// Enemy stacks a unit could attack now
    pub fn get_attack_targets(&self, game_id: GameId, unit_id: UnitId) -> Vec<UnitId> {
        match self.store.load_game(game_id) {
            Ok(ctx) if ctx.game.is_in_progress() => match ctx.unit(unit_id) {
                Some(unit) if unit.can_act() => attackable_targets(&ctx, unit_id),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    pub fn game_snapshot(&self, game_id: GameId) -> EngineResult<GameSnapshot> {
        let ctx = self.store.load_game(game_id)?;
        Ok(GameSnapshot::from_context(&ctx))
    }

    pub fn game_log(&self, game_id: GameId) -> EngineResult<Vec<GameLogEntry>> {
        Ok(self.store.load_game(game_id)?.log)
    }

    pub fn games_for_player(&self, player: PlayerId) -> Vec<Game> {
        self.store.games_for_player(player)
    }

    /// Payout of a game that ended in victory
    pub fn battle_report(&self, game_id: GameId) -> EngineResult<BattleReward> {
        self.store
            .load_game(game_id)?
            .game
            .reward
            .ok_or(EngineError::NoBattleReport)
    }
}
