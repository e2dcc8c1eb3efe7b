//! Economy: catalog pricing and battle payouts

pub mod pricing;
pub mod rewards;

pub use pricing::{unit_price, Price};
pub use rewards::{compute_reward, losses_value, BattleReward};
