//! Unit valuation
//!
//! Catalog prices are a closed-form function of stats. The result is kept as
//! integer cents so it compares and sums exactly across sessions.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::battle::unit_type::UnitType;

/// Kamikaze damage counts for a fifth in valuation
const KAMIKAZE_DAMAGE_DIVISOR: f64 = 5.0;
/// Kamikaze dodge counts for a fiftieth in valuation
const KAMIKAZE_DODGE_DIVISOR: f64 = 50.0;

/// Fixed-precision money value with two fractional digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Round a raw value to the nearest cent (half away from zero)
    pub fn from_f64(value: f64) -> Self {
        Self((value * 100.0).round() as i64)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// `percent`% of this value, rounded half up to the cent
    pub fn percent(&self, percent: u32) -> Self {
        let scaled = self.0 * percent as i64;
        let rounded = if scaled >= 0 {
            (scaled + 50) / 100
        } else {
            (scaled - 50) / 100
        };
        Self(rounded)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Price {
    type Output = Price;
    fn add(self, rhs: Price) -> Price {
        Price(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Price) {
        self.0 += rhs.0;
    }
}

impl Sub for Price {
    type Output = Price;
    fn sub(self, rhs: Price) -> Price {
        Price(self.0 - rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Price;
    fn mul(self, rhs: u32) -> Price {
        Price(self.0 * rhs as i64)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

/// Catalog value of one creature
pub fn unit_price(unit: &UnitType) -> Price {
    let damage = unit.damage as f64;
    let defense = unit.defense as f64;

    let (damage_value, dodge_value) = if unit.is_kamikaze {
        (
            damage / KAMIKAZE_DAMAGE_DIVISOR,
            unit.dodge_chance / KAMIKAZE_DODGE_DIVISOR,
        )
    } else {
        (damage, unit.dodge_chance)
    };

    let offense_defense = damage_value + defense;
    let flying_bonus = if unit.is_flying {
        2.0 * offense_defense
    } else {
        0.0
    };

    let raw = damage_value
        + defense
        + unit.health as f64
        + 2.0 * unit.range as f64 * offense_defense
        + unit.speed as f64 * offense_defense
        + flying_bonus
        + 2.0 * unit.luck * damage_value
        + 2.0 * unit.crit_chance * damage_value
        + 10.0 * dodge_value * offense_defense
        + 10.0 * unit.counterattack_chance * damage_value;

    Price::from_f64(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_unit() -> UnitType {
        UnitType::new("Reference", 100, 20, 150)
            .with_speed(2)
            .with_chances(0.1, 0.15, 0.2, 0.0)
    }

    #[test]
    fn test_reference_price() {
        assert_eq!(unit_price(&reference_unit()), Price::from_cents(104_000));
        assert_eq!(unit_price(&reference_unit()).to_string(), "1040.00");
    }

    #[test]
    fn test_kamikaze_reference_price() {
        let unit = reference_unit().kamikaze();
        assert_eq!(unit_price(&unit).to_string(), "361.60");
        assert_eq!(
            (unit_price(&reference_unit()) - unit_price(&unit)).to_string(),
            "678.40"
        );
    }

    #[test]
    fn test_zero_stats_price() {
        let unit = UnitType::new("Nothing", 0, 0, 0);
        assert_eq!(unit_price(&unit), Price::ZERO);
        assert_eq!(unit_price(&unit).to_string(), "0.00");
    }

    #[test]
    fn test_maximal_stats_price() {
        let unit = UnitType::new("Titan", 200, 50, 300)
            .with_range(5)
            .with_speed(5)
            .with_chances(1.0, 1.0, 0.9, 1.0);
        assert_eq!(unit_price(&unit).to_string(), "9350.00");
    }

    #[test]
    fn test_flying_bonus() {
        let walker = UnitType::new("Walker", 10, 10, 10);
        let flier = walker.clone().flying();
        // flying adds 2 * (damage + defense)
        assert_eq!(unit_price(&flier) - unit_price(&walker), Price::from_cents(4_000));
    }

    #[test]
    fn test_price_percent_rounds_half_up() {
        assert_eq!(Price::from_cents(1_005).percent(90), Price::from_cents(905));
        assert_eq!(Price::from_cents(-1_005).percent(90), Price::from_cents(-905));
    }

    #[test]
    fn test_negative_display() {
        assert_eq!(Price::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Price::from_cents(-12_345).to_string(), "-123.45");
    }

    #[test]
    fn test_price_sum() {
        let total: Price = [Price::from_cents(150), Price::from_cents(250)].into_iter().sum();
        assert_eq!(total, Price::from_cents(400));
    }
}
