//! Post-victory payout
//!
//! The winner is paid a share of the catalog value of every enemy creature
//! destroyed during the battle. Net profit subtracts what the winner lost.

use serde::{Deserialize, Serialize};

use crate::battle::game::GameContext;
use crate::core::types::PlayerId;
use crate::economy::pricing::Price;

/// Outcome of reward accounting for one completed game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReward {
    pub winner: PlayerId,
    pub loser: PlayerId,
    /// Catalog value of all creatures the loser lost
    pub enemy_losses_value: Price,
    /// Share of `enemy_losses_value` paid to the winner
    pub reward: Price,
    /// Catalog value of all creatures the winner lost
    pub own_losses_value: Price,
    pub net_profit: Price,
}

/// Catalog value of everything a player has lost so far
pub fn losses_value(context: &GameContext, player: PlayerId) -> Price {
    context
        .units
        .iter()
        .filter(|u| u.owner == player)
        .map(|u| u.unit_type.price * u.losses())
        .sum()
}

/// Compute the payout for `winner`. Returns `None` if `winner` did not play.
pub fn compute_reward(
    context: &GameContext,
    winner: PlayerId,
    share_percent: u32,
) -> Option<BattleReward> {
    let loser = context.game.opponent_of(winner)?;

    let enemy_losses_value = losses_value(context, loser);
    let own_losses_value = losses_value(context, winner);
    let reward = enemy_losses_value.percent(share_percent);

    Some(BattleReward {
        winner,
        loser,
        enemy_losses_value,
        reward,
        own_losses_value,
        net_profit: reward - own_losses_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::game::Game;
    use crate::battle::grid::Field;
    use crate::battle::unit_type::UnitType;
    use crate::battle::units::BattleUnit;
    use crate::core::types::{Cell, RosterEntryId};

    fn context() -> GameContext {
        let game = Game::new(PlayerId::new(), PlayerId::new(), Field::new(5, 5), 9);
        GameContext::new(game)
    }

    fn add_stack(ctx: &mut GameContext, owner: PlayerId, kind: UnitType, count: u32, lost: u32) {
        let mut unit = BattleUnit::new(ctx.game.id, owner, RosterEntryId::new(), kind, count, Cell::new(0, 0));
        unit.remove_creatures(lost);
        ctx.units.push(unit);
    }

    #[test]
    fn test_reward_is_share_of_enemy_losses() {
        let mut ctx = context();
        let (winner, loser) = (ctx.game.player1, ctx.game.player2);
        // 10 + 0 + 10 + 2*1*10 + 1*10 = 50.00 each
        let grunt = UnitType::new("Grunt", 10, 0, 10);
        assert_eq!(grunt.price.to_string(), "50.00");

        add_stack(&mut ctx, loser, grunt.clone(), 4, 4);
        add_stack(&mut ctx, winner, grunt, 4, 1);

        let reward = compute_reward(&ctx, winner, 90).unwrap();
        assert_eq!(reward.loser, loser);
        assert_eq!(reward.enemy_losses_value.to_string(), "200.00");
        assert_eq!(reward.reward.to_string(), "180.00");
        assert_eq!(reward.own_losses_value.to_string(), "50.00");
        assert_eq!(reward.net_profit.to_string(), "130.00");
    }

    #[test]
    fn test_net_profit_can_be_negative() {
        let mut ctx = context();
        let (winner, loser) = (ctx.game.player1, ctx.game.player2);
        add_stack(&mut ctx, loser, UnitType::new("Rat", 1, 0, 1), 1, 1);
        add_stack(&mut ctx, winner, UnitType::new("Knight", 50, 20, 100), 5, 4);

        let reward = compute_reward(&ctx, winner, 90).unwrap();
        assert!(reward.net_profit < Price::ZERO);
    }

    #[test]
    fn test_no_losses_no_reward() {
        let mut ctx = context();
        let player2 = ctx.game.player2;
        add_stack(&mut ctx, player2, UnitType::new("Rat", 1, 0, 1), 3, 0);
        let reward = compute_reward(&ctx, ctx.game.player1, 90).unwrap();
        assert_eq!(reward.reward, Price::ZERO);
        assert_eq!(reward.net_profit, Price::ZERO);
    }

    #[test]
    fn test_outsider_gets_nothing() {
        let ctx = context();
        assert!(compute_reward(&ctx, PlayerId::new(), 90).is_none());
    }
}
