//! Engine configuration with documented constants
//!
//! All combat, morale and reward tuning lives here. Values can be overridden
//! from a TOML file; missing keys keep their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, EngineResult};

/// How many creatures a kamikaze stack loses after attacking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KamikazeLoss {
    #[default]
    SingleCreature,
    WholeStack,
}

/// Configuration for the battle engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === DAMAGE ROLL ===
    /// Half-width of the uniform damage multiplier around 1.0
    ///
    /// At 0.1 the multiplier is drawn from [0.9, 1.1].
    pub damage_spread: f64,

    /// Damage lost at full fatigue (100)
    ///
    /// At 0.3 an exhausted stack deals 70% damage.
    pub fatigue_damage_weight: f64,

    /// Damage gained (or lost) per morale point away from neutral, scaled to 100
    ///
    /// At 0.2, morale 100 gives +10% and morale 0 gives -10%.
    pub morale_damage_weight: f64,

    /// Morale value that neither helps nor hurts
    pub neutral_morale: u8,

    // === CRITS AND LUCK ===
    /// Crit chance gained per morale point above neutral, scaled to 100
    pub crit_morale_weight: f64,
    /// Crit chance lost at full fatigue
    pub crit_fatigue_weight: f64,
    pub crit_multiplier: f64,
    pub luck_multiplier: f64,

    // === COUNTERATTACK ===
    /// Fraction of a normal blow a defender returns
    pub counterattack_factor: f64,

    // === MORALE / FATIGUE DELTAS ===
    pub initial_morale: u8,
    pub initial_fatigue: u8,
    pub morale_gain_on_success: u8,
    pub fatigue_relief_on_success: u8,
    pub fatigue_gain_on_failure: u8,
    pub defender_morale_loss: u8,
    pub defender_fatigue_gain: u8,

    // === BATTLEFIELD ===
    /// Fraction of the field covered by obstacles
    pub obstacle_density: f64,
    pub min_field_dimension: u32,
    pub max_field_dimension: u32,

    // === REWARDS ===
    /// Share of destroyed enemy value paid to the winner
    pub reward_share_percent: u32,

    pub kamikaze_loss: KamikazeLoss,

    /// Fixed seed for every new game. `None` draws a fresh seed per game.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            damage_spread: 0.1,
            fatigue_damage_weight: 0.3,
            morale_damage_weight: 0.2,
            neutral_morale: 50,

            crit_morale_weight: 0.1,
            crit_fatigue_weight: 0.1,
            crit_multiplier: 1.5,
            luck_multiplier: 1.25,

            counterattack_factor: 0.5,

            initial_morale: 50,
            initial_fatigue: 0,
            morale_gain_on_success: 5,
            fatigue_relief_on_success: 5,
            fatigue_gain_on_failure: 10,
            defender_morale_loss: 5,
            defender_fatigue_gain: 5,

            obstacle_density: 0.1,
            min_field_dimension: 3,
            max_field_dimension: 20,

            reward_share_percent: 90,

            kamikaze_loss: KamikazeLoss::SingleCreature,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Same config with a pinned seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..1.0).contains(&self.damage_spread) {
            return Err(format!(
                "damage_spread ({}) must be in [0, 1)",
                self.damage_spread
            ));
        }

        if !(0.0..0.9).contains(&self.obstacle_density) {
            return Err(format!(
                "obstacle_density ({}) must be in [0, 0.9)",
                self.obstacle_density
            ));
        }

        if self.min_field_dimension < 2 || self.min_field_dimension > self.max_field_dimension {
            return Err(format!(
                "field dimension bounds ({}..={}) are inconsistent",
                self.min_field_dimension, self.max_field_dimension
            ));
        }

        if self.initial_morale > 100 || self.initial_fatigue > 100 || self.neutral_morale > 100 {
            return Err("morale and fatigue values must be within 0..=100".into());
        }

        if self.reward_share_percent > 100 {
            return Err(format!(
                "reward_share_percent ({}) must not exceed 100",
                self.reward_share_percent
            ));
        }

        if self.crit_multiplier < 1.0 || self.luck_multiplier < 1.0 {
            return Err("crit and luck multipliers must be at least 1.0".into());
        }

        Ok(())
    }
}

/// Parse and validate a config from TOML text
pub fn parse_config(content: &str) -> EngineResult<EngineConfig> {
    let config: EngineConfig = toml::from_str(content)?;
    config.validate().map_err(EngineError::Config)?;
    Ok(config)
}

/// Load and validate a config file
pub fn load_config(path: &Path) -> EngineResult<EngineConfig> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = parse_config("crit_multiplier = 2.0\nkamikaze_loss = \"whole_stack\"").unwrap();
        assert_eq!(config.crit_multiplier, 2.0);
        assert_eq!(config.kamikaze_loss, KamikazeLoss::WholeStack);
        assert_eq!(config.reward_share_percent, 90);
    }

    #[test]
    fn test_invalid_density_rejected() {
        let result = parse_config("obstacle_density = 0.95");
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = parse_config("crit_multiplier = ");
        assert!(matches!(result, Err(EngineError::Toml(_))));
    }

    #[test]
    fn test_with_seed() {
        let config = EngineConfig::new().with_seed(7);
        assert_eq!(config.seed, Some(7));
    }
}
