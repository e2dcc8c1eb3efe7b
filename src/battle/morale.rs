//! Morale and fatigue
//!
//! Both live on a 0 - 100 scale. Morale above neutral boosts damage and crit
//! chance; fatigue drags both down.

use crate::battle::units::BattleUnit;
use crate::core::config::EngineConfig;

/// Add a signed delta to a 0 - 100 value
pub fn shift(value: u8, delta: i32) -> u8 {
    (value as i32 + delta).clamp(0, 100) as u8
}

/// Damage multiplier from fatigue (1.0 when fresh)
pub fn fatigue_factor(fatigue: u8, config: &EngineConfig) -> f64 {
    1.0 - fatigue as f64 / 100.0 * config.fatigue_damage_weight
}

/// Damage multiplier from morale (1.0 at neutral morale)
pub fn morale_factor(morale: u8, config: &EngineConfig) -> f64 {
    let offset = morale as f64 - config.neutral_morale as f64;
    1.0 + offset / 100.0 * config.morale_damage_weight
}

/// Crit probability after condition adjustments, clamped to [0, 1]
pub fn crit_probability(unit: &BattleUnit, config: &EngineConfig) -> f64 {
    let morale_offset = (unit.morale as f64 - config.neutral_morale as f64) / 100.0;
    let fatigue = unit.fatigue as f64 / 100.0;
    let chance = unit.unit_type.crit_chance + morale_offset * config.crit_morale_weight
        - fatigue * config.crit_fatigue_weight;
    chance.clamp(0.0, 1.0)
}

/// Attacker condition after its blow
pub fn apply_attacker_outcome(attacker: &mut BattleUnit, success: bool, config: &EngineConfig) {
    if success {
        attacker.adjust_morale(config.morale_gain_on_success as i32);
        attacker.adjust_fatigue(-(config.fatigue_relief_on_success as i32));
    } else {
        attacker.adjust_fatigue(config.fatigue_gain_on_failure as i32);
    }
}

/// Defender condition after taking a blow
pub fn apply_defender_outcome(defender: &mut BattleUnit, damaged: bool, config: &EngineConfig) {
    if damaged {
        defender.adjust_morale(-(config.defender_morale_loss as i32));
        defender.adjust_fatigue(config.defender_fatigue_gain as i32);
    }
}
