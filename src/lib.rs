//! Stackfield - turn-based tactical battles for a creature-collection game

pub mod battle;
pub mod core;
pub mod economy;
pub mod persistence;
