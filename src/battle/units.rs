//! Deployed stacks
//!
//! A stack is a group of identical creatures on one cell. Its health is the
//! pool `(total_count - 1) * health + remaining_hp`: every creature behind the
//! lead one is at full health.

use serde::{Deserialize, Serialize};

use crate::battle::morale::shift;
use crate::battle::unit_type::UnitType;
use crate::core::types::{Cell, GameId, PlayerId, RosterEntryId, UnitId};

/// Per-round scheduling state of a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    #[default]
    Idle, // Not yet acted this round
    Acted,    // Moved, attacked or skipped
    Deferred, // Postponed, still owes an action this round
}

/// A deployed stack of one creature type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleUnit {
    pub id: UnitId,
    pub game_id: GameId,
    pub owner: PlayerId,
    pub roster_entry: RosterEntryId,
    pub unit_type: UnitType,

    // Position
    pub position: Cell,

    // Strength
    pub total_count: u32,
    pub initial_count: u32,
    pub remaining_hp: u32,

    // Condition, both 0 - 100
    pub morale: u8,
    pub fatigue: u8,

    pub state: UnitState,
}

impl BattleUnit {
    pub fn new(
        game_id: GameId,
        owner: PlayerId,
        roster_entry: RosterEntryId,
        unit_type: UnitType,
        count: u32,
        position: Cell,
    ) -> Self {
        let remaining_hp = if count > 0 { unit_type.health.max(1) } else { 0 };
        Self {
            id: UnitId::new(),
            game_id,
            owner,
            roster_entry,
            unit_type,
            position,
            total_count: count,
            initial_count: count,
            remaining_hp,
            morale: 50,
            fatigue: 0,
            state: UnitState::Idle,
        }
    }

    /// Set starting morale and fatigue
    pub fn with_condition(mut self, morale: u8, fatigue: u8) -> Self {
        self.morale = morale.min(100);
        self.fatigue = fatigue.min(100);
        self
    }

    /// Still on the field?
    pub fn is_alive(&self) -> bool {
        self.total_count > 0
    }

    /// Has this stack acted this round?
    pub fn has_moved(&self) -> bool {
        matches!(self.state, UnitState::Acted)
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.state, UnitState::Deferred)
    }

    /// Can this stack still take an action this round?
    pub fn can_act(&self) -> bool {
        self.is_alive() && !self.has_moved()
    }

    /// Health of a single fresh creature (never zero)
    pub fn creature_health(&self) -> u32 {
        self.unit_type.health.max(1)
    }

    /// Total hit points left in the stack
    pub fn total_hp(&self) -> u64 {
        if self.total_count == 0 {
            return 0;
        }
        (self.total_count as u64 - 1) * self.creature_health() as u64 + self.remaining_hp as u64
    }

    /// Creatures lost since deployment
    pub fn losses(&self) -> u32 {
        self.initial_count.saturating_sub(self.total_count)
    }

    /// Apply damage to the health pool. Returns creatures killed.
    pub fn apply_damage(&mut self, damage: u64) -> u32 {
        if damage == 0 {
            return 0;
        }
        let before = self.total_count;
        let remaining = self.total_hp().saturating_sub(damage);
        let health = self.creature_health() as u64;

        if remaining == 0 {
            self.total_count = 0;
            self.remaining_hp = 0;
        } else {
            let count = remaining.div_ceil(health);
            self.total_count = count as u32;
            self.remaining_hp = (remaining - (count - 1) * health) as u32;
        }

        before - self.total_count
    }

    /// Remove whole creatures without touching the lead creature's wounds.
    /// Returns creatures removed.
    pub fn remove_creatures(&mut self, count: u32) -> u32 {
        let removed = count.min(self.total_count);
        self.total_count -= removed;
        if self.total_count == 0 {
            self.remaining_hp = 0;
        }
        removed
    }

    pub fn adjust_morale(&mut self, delta: i32) {
        self.morale = shift(self.morale, delta);
    }

    pub fn adjust_fatigue(&mut self, delta: i32) {
        self.fatigue = shift(self.fatigue, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(count: u32) -> BattleUnit {
        BattleUnit::new(
            GameId::new(),
            PlayerId::new(),
            RosterEntryId::new(),
            UnitType::new("Goblin", 5, 1, 10),
            count,
            Cell::new(0, 0),
        )
    }

    #[test]
    fn test_new_stack_is_idle_and_full() {
        let unit = stack(5);
        assert_eq!(unit.state, UnitState::Idle);
        assert_eq!(unit.remaining_hp, 10);
        assert_eq!(unit.total_hp(), 50);
        assert!(unit.can_act());
    }

    #[test]
    fn test_damage_wounds_lead_creature() {
        let mut unit = stack(5);
        let killed = unit.apply_damage(4);
        assert_eq!(killed, 0);
        assert_eq!(unit.total_count, 5);
        assert_eq!(unit.remaining_hp, 6);
    }

    #[test]
    fn test_damage_kills_creatures() {
        let mut unit = stack(5);
        let killed = unit.apply_damage(25);
        assert_eq!(killed, 2);
        assert_eq!(unit.total_count, 3);
        assert_eq!(unit.remaining_hp, 5);
        assert_eq!(unit.losses(), 2);
    }

    #[test]
    fn test_overkill_eliminates_stack() {
        let mut unit = stack(3);
        let killed = unit.apply_damage(1_000);
        assert_eq!(killed, 3);
        assert!(!unit.is_alive());
        assert_eq!(unit.remaining_hp, 0);
        assert!(!unit.can_act());
    }

    #[test]
    fn test_zero_health_creatures_count_as_one_hp() {
        let mut unit = BattleUnit::new(
            GameId::new(),
            PlayerId::new(),
            RosterEntryId::new(),
            UnitType::new("Wisp", 5, 0, 0),
            3,
            Cell::new(0, 0),
        );
        assert_eq!(unit.remaining_hp, 1);
        assert_eq!(unit.total_hp(), 3);

        assert_eq!(unit.apply_damage(0), 0);
        assert_eq!(unit.total_count, 3);

        assert_eq!(unit.apply_damage(2), 2);
        assert_eq!(unit.total_count, 1);
    }

    #[test]
    fn test_zero_damage_changes_nothing() {
        let mut unit = stack(4);
        unit.apply_damage(3);
        assert_eq!(unit.apply_damage(0), 0);
        assert_eq!(unit.total_count, 4);
        assert_eq!(unit.remaining_hp, 7);
    }

    #[test]
    fn test_remove_creatures_saturates() {
        let mut unit = stack(2);
        assert_eq!(unit.remove_creatures(1), 1);
        assert_eq!(unit.total_count, 1);
        assert_eq!(unit.remove_creatures(5), 1);
        assert!(!unit.is_alive());
    }

    #[test]
    fn test_condition_is_clamped() {
        let mut unit = stack(1);
        unit.adjust_morale(200);
        unit.adjust_fatigue(-50);
        assert_eq!(unit.morale, 100);
        assert_eq!(unit.fatigue, 0);
    }

    #[test]
    fn test_acted_unit_cannot_act() {
        let mut unit = stack(1);
        unit.state = UnitState::Acted;
        assert!(unit.has_moved());
        assert!(!unit.can_act());

        unit.state = UnitState::Deferred;
        assert!(unit.is_deferred());
        assert!(unit.can_act());
    }
}
