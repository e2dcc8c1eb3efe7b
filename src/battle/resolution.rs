//! Attack resolution
//!
//! One attack is a strike from attacker to defender, an optional weaker
//! counter-strike back, and kamikaze self-destruction. Strikes go through the
//! same pipeline: dodge, spread roll, condition modifiers, crit, luck, stack
//! size, then a defense reduction scaled by how many defenders were reached.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::game::GameContext;
use crate::battle::morale::{
    apply_attacker_outcome, apply_defender_outcome, crit_probability, fatigue_factor,
    morale_factor,
};
use crate::battle::units::BattleUnit;
use crate::battle::visibility::has_line_of_sight;
use crate::core::config::{EngineConfig, KamikazeLoss};
use crate::core::error::{EngineError, EngineResult};
use crate::core::types::UnitId;

/// Decides how many creatures a kamikaze stack sacrifices per attack
pub trait KamikazeRule: Send + Sync {
    fn creatures_lost(&self, attacker: &BattleUnit) -> u32;
}

/// One creature per attack
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleCreatureLoss;

impl KamikazeRule for SingleCreatureLoss {
    fn creatures_lost(&self, attacker: &BattleUnit) -> u32 {
        attacker.total_count.min(1)
    }
}

/// The whole stack goes down with its attack
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeStackLoss;

impl KamikazeRule for WholeStackLoss {
    fn creatures_lost(&self, attacker: &BattleUnit) -> u32 {
        attacker.total_count
    }
}

/// Rule selected by configuration
pub fn kamikaze_rule(loss: KamikazeLoss) -> Box<dyn KamikazeRule> {
    match loss {
        KamikazeLoss::SingleCreature => Box::new(SingleCreatureLoss),
        KamikazeLoss::WholeStack => Box::new(WholeStackLoss),
    }
}

/// Whether a strike may crit and roll luck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeKind {
    Attack,
    Counter,
}

/// Breakdown of one strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeReport {
    pub dodged: bool,
    /// Per-creature damage after the spread roll
    pub base_damage: f64,
    /// Per-creature damage after condition, crit and luck
    pub modified_damage: f64,
    pub critical: bool,
    pub lucky: bool,
    pub total_damage: f64,
    pub affected: u32,
    pub defense_reduction: f64,
    pub final_damage: u64,
    pub killed: u32,
    pub target_destroyed: bool,
}

impl StrikeReport {
    fn dodged() -> Self {
        Self {
            dodged: true,
            base_damage: 0.0,
            modified_damage: 0.0,
            critical: false,
            lucky: false,
            total_damage: 0.0,
            affected: 0,
            defense_reduction: 0.0,
            final_damage: 0,
            killed: 0,
            target_destroyed: false,
        }
    }

    /// Did the strike hurt anyone?
    pub fn is_effective(&self) -> bool {
        self.final_damage > 0
    }
}

/// Result of one attack action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackReport {
    pub attacker: UnitId,
    pub target: UnitId,
    pub strike: StrikeReport,
    pub counterattack: Option<StrikeReport>,
    pub kamikaze_losses: u32,
    pub attacker_destroyed: bool,
}

impl AttackReport {
    /// One-line summary for the game log
    pub fn summary(&self, attacker_name: &str, target_name: &str) -> String {
        let mut text = if self.strike.dodged {
            format!("{} attacked {}, but the blow was dodged", attacker_name, target_name)
        } else {
            let mut s = format!(
                "{} hit {} for {} damage, killing {}",
                attacker_name, target_name, self.strike.final_damage, self.strike.killed
            );
            if self.strike.critical {
                s.push_str(" (critical)");
            }
            if self.strike.lucky {
                s.push_str(" (lucky)");
            }
            if self.strike.target_destroyed {
                s.push_str(&format!("; {} destroyed", target_name));
            }
            s
        };

        if let Some(counter) = &self.counterattack {
            if counter.dodged {
                text.push_str(&format!("; {} dodged the counterattack", attacker_name));
            } else {
                text.push_str(&format!(
                    "; {} countered for {} damage, killing {}",
                    target_name, counter.final_damage, counter.killed
                ));
            }
        }
        if self.kamikaze_losses > 0 {
            text.push_str(&format!(
                "; {} sacrificed {}",
                attacker_name, self.kamikaze_losses
            ));
        }
        if self.attacker_destroyed {
            text.push_str(&format!("; {} destroyed", attacker_name));
        }
        text
    }
}

/// Check attack preconditions that depend on the two stacks.
///
/// Turn authority and attacker ownership are checked by the scheduler.
pub fn validate_attack(
    context: &GameContext,
    attacker_id: UnitId,
    target_id: UnitId,
) -> EngineResult<()> {
    let attacker = context
        .unit(attacker_id)
        .ok_or(EngineError::UnitNotFound(attacker_id))?;
    let target = context
        .unit(target_id)
        .ok_or(EngineError::UnitNotFound(target_id))?;

    if target.owner == attacker.owner {
        return Err(EngineError::TargetNotEnemy);
    }
    if !target.is_alive() {
        return Err(EngineError::TargetDestroyed);
    }

    let distance = attacker.position.distance(&target.position);
    if distance > attacker.unit_type.range {
        return Err(EngineError::OutOfRange {
            distance,
            range: attacker.unit_type.range,
        });
    }

    if !has_line_of_sight(attacker.position, target.position, context) {
        return Err(EngineError::NoLineOfSight);
    }

    Ok(())
}

/// Live enemy stacks this unit could attack right now
pub fn attackable_targets(context: &GameContext, attacker_id: UnitId) -> Vec<UnitId> {
    context
        .units
        .iter()
        .filter(|t| validate_attack(context, attacker_id, t.id).is_ok())
        .map(|t| t.id)
        .collect()
}

/// Roll one strike without applying it
pub fn roll_strike<R: Rng>(
    attacker: &BattleUnit,
    defender: &BattleUnit,
    kind: StrikeKind,
    config: &EngineConfig,
    rng: &mut R,
) -> StrikeReport {
    if rng.gen_bool(defender.unit_type.dodge_chance.clamp(0.0, 1.0)) {
        return StrikeReport::dodged();
    }

    // 1. Spread roll
    let spread = config.damage_spread;
    let base_damage = attacker.unit_type.damage as f64 * rng.gen_range(1.0 - spread..=1.0 + spread);

    // 2. Condition
    let mut damage = base_damage
        * fatigue_factor(attacker.fatigue, config)
        * morale_factor(attacker.morale, config);

    // 3-4. Crit and luck, attacks only
    let mut critical = false;
    let mut lucky = false;
    match kind {
        StrikeKind::Attack => {
            if rng.gen_bool(crit_probability(attacker, config)) {
                critical = true;
                damage *= config.crit_multiplier;
            }
            if rng.gen_bool(attacker.unit_type.luck.clamp(0.0, 1.0)) {
                lucky = true;
                damage *= config.luck_multiplier;
            }
        }
        StrikeKind::Counter => damage *= config.counterattack_factor,
    }
    let modified_damage = damage.max(0.0);

    // 5. Whole stack
    let total_damage = modified_damage * attacker.total_count as f64;

    // 6. Splash count and defense
    let health = defender.creature_health() as f64;
    let affected = ((total_damage / health).ceil() as u32).clamp(1, defender.total_count.max(1));
    let defense_reduction = defender.unit_type.defense as f64 * affected as f64;
    let final_damage = (total_damage - defense_reduction).max(0.0).round() as u64;

    StrikeReport {
        dodged: false,
        base_damage,
        modified_damage,
        critical,
        lucky,
        total_damage,
        affected,
        defense_reduction,
        final_damage,
        killed: 0,
        target_destroyed: false,
    }
}

fn strike<R: Rng>(
    context: &mut GameContext,
    from: usize,
    to: usize,
    kind: StrikeKind,
    config: &EngineConfig,
    rng: &mut R,
) -> StrikeReport {
    let mut report = roll_strike(&context.units[from], &context.units[to], kind, config, rng);

    // 7. Apply
    let defender = &mut context.units[to];
    report.killed = defender.apply_damage(report.final_damage);
    report.target_destroyed = !defender.is_alive();
    report
}

/// Resolve an attack whose preconditions already hold
pub fn resolve_attack<R: Rng>(
    context: &mut GameContext,
    attacker_id: UnitId,
    target_id: UnitId,
    config: &EngineConfig,
    kamikaze: &dyn KamikazeRule,
    rng: &mut R,
) -> EngineResult<AttackReport> {
    let a = context
        .unit_index(attacker_id)
        .ok_or(EngineError::UnitNotFound(attacker_id))?;
    let d = context
        .unit_index(target_id)
        .ok_or(EngineError::UnitNotFound(target_id))?;

    let main = strike(context, a, d, StrikeKind::Attack, config, rng);

    // 8. Counterattack, only from a surviving defender that can reach back
    let mut counterattack = None;
    let defender = &context.units[d];
    let attacker = &context.units[a];
    if defender.is_alive()
        && attacker.position.distance(&defender.position) <= defender.unit_type.range
        && has_line_of_sight(defender.position, attacker.position, context)
        && rng.gen_bool(defender.unit_type.counterattack_chance.clamp(0.0, 1.0))
    {
        counterattack = Some(strike(context, d, a, StrikeKind::Counter, config, rng));
    }

    // 9. Kamikaze
    let mut kamikaze_losses = 0;
    if context.units[a].unit_type.is_kamikaze && context.units[a].is_alive() {
        let lost = kamikaze.creatures_lost(&context.units[a]);
        kamikaze_losses = context.units[a].remove_creatures(lost);
    }

    // 10. Condition
    apply_attacker_outcome(&mut context.units[a], main.is_effective(), config);
    apply_defender_outcome(&mut context.units[d], main.is_effective(), config);
    if let Some(counter) = &counterattack {
        apply_defender_outcome(&mut context.units[a], counter.is_effective(), config);
    }

    Ok(AttackReport {
        attacker: attacker_id,
        target: target_id,
        strike: main,
        counterattack,
        kamikaze_losses,
        attacker_destroyed: !context.units[a].is_alive(),
    })
}
