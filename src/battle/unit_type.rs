//! Catalog unit types
//!
//! Owned by the catalog subsystem. The engine copies the stats into each
//! deployed stack at acceptance and never mutates them.

use serde::{Deserialize, Serialize};

use crate::economy::pricing::{unit_price, Price};

/// Immutable stats for one catalog creature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitType {
    pub name: String,
    pub damage: u32,
    pub defense: u32,
    pub health: u32,
    pub range: u32,
    pub speed: u32,
    pub luck: f64,          // probability, 0.0 - 1.0
    pub crit_chance: f64,   // probability, 0.0 - 1.0
    pub dodge_chance: f64,  // probability, 0.0 - 1.0
    pub counterattack_chance: f64,
    pub is_kamikaze: bool,
    pub is_flying: bool,
    /// Catalog price per creature
    pub price: Price,
}

impl UnitType {
    /// Unit with the given combat core and every chance at zero.
    ///
    /// The catalog price is filled from the valuation formula.
    pub fn new(name: impl Into<String>, damage: u32, defense: u32, health: u32) -> Self {
        let mut unit = Self {
            name: name.into(),
            damage,
            defense,
            health,
            range: 1,
            speed: 1,
            luck: 0.0,
            crit_chance: 0.0,
            dodge_chance: 0.0,
            counterattack_chance: 0.0,
            is_kamikaze: false,
            is_flying: false,
            price: Price::ZERO,
        };
        unit.price = unit.valuation();
        unit
    }

    pub fn with_range(mut self, range: u32) -> Self {
        self.range = range;
        self.reprice()
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self.reprice()
    }

    pub fn with_chances(mut self, luck: f64, crit: f64, dodge: f64, counterattack: f64) -> Self {
        self.luck = luck;
        self.crit_chance = crit;
        self.dodge_chance = dodge;
        self.counterattack_chance = counterattack;
        self.reprice()
    }

    pub fn flying(mut self) -> Self {
        self.is_flying = true;
        self.reprice()
    }

    pub fn kamikaze(mut self) -> Self {
        self.is_kamikaze = true;
        self.reprice()
    }

    /// Deterministic catalog value from stats
    pub fn valuation(&self) -> Price {
        unit_price(self)
    }

    fn reprice(mut self) -> Self {
        self.price = self.valuation();
        self
    }
}
