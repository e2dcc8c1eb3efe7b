//! External collaborators the engine reads from
//!
//! Accounts, rosters and the unit catalog belong to other subsystems. The
//! engine only needs lookups, so each is a small trait.

use std::sync::RwLock;

use ahash::AHashMap;
use uuid::Uuid;

use crate::battle::unit_type::UnitType;
use crate::core::types::{PlayerId, RosterEntryId};

/// One stack a player can bring to battle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterStack {
    pub entry_id: RosterEntryId,
    pub count: u32,
}

/// Resolves an opponent from whatever the front end received
pub trait PlayerDirectory: Send + Sync {
    /// Look a player up by id string or display name
    fn resolve(&self, identifier: &str) -> Option<PlayerId>;

    fn display_name(&self, player: PlayerId) -> Option<String>;
}

/// Deployable stacks per player
pub trait RosterSource: Send + Sync {
    fn deployable_stacks(&self, player: PlayerId) -> Vec<RosterStack>;
}

/// Immutable unit stats per roster entry
pub trait UnitCatalog: Send + Sync {
    fn unit_type(&self, entry_id: RosterEntryId) -> Option<UnitType>;
}

#[derive(Debug, Default)]
struct Directory {
    names: AHashMap<PlayerId, String>,
    rosters: AHashMap<PlayerId, Vec<RosterStack>>,
    catalog: AHashMap<RosterEntryId, UnitType>,
}

/// In-memory accounts, rosters and catalog
#[derive(Debug, Default)]
pub struct StaticDirectory {
    inner: RwLock<Directory>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player and return their id
    pub fn add_player(&self, name: impl Into<String>) -> PlayerId {
        let id = PlayerId::new();
        self.write().names.insert(id, name.into());
        id
    }

    /// Give a player a stack of `count` creatures of `unit_type`
    pub fn add_stack(&self, player: PlayerId, unit_type: UnitType, count: u32) -> RosterEntryId {
        let entry_id = RosterEntryId::new();
        let mut inner = self.write();
        inner.catalog.insert(entry_id, unit_type);
        inner
            .rosters
            .entry(player)
            .or_default()
            .push(RosterStack { entry_id, count });
        entry_id
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Directory> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Directory> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl PlayerDirectory for StaticDirectory {
    fn resolve(&self, identifier: &str) -> Option<PlayerId> {
        let identifier = identifier.trim();
        let inner = self.read();

        if let Ok(uuid) = Uuid::parse_str(identifier) {
            let id = PlayerId(uuid);
            if inner.names.contains_key(&id) {
                return Some(id);
            }
        }

        inner
            .names
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(identifier))
            .map(|(id, _)| *id)
    }

    fn display_name(&self, player: PlayerId) -> Option<String> {
        self.read().names.get(&player).cloned()
    }
}

impl RosterSource for StaticDirectory {
    fn deployable_stacks(&self, player: PlayerId) -> Vec<RosterStack> {
        self.read()
            .rosters
            .get(&player)
            .map(|stacks| stacks.iter().filter(|s| s.count > 0).copied().collect())
            .unwrap_or_default()
    }
}

impl UnitCatalog for StaticDirectory {
    fn unit_type(&self, entry_id: RosterEntryId) -> Option<UnitType> {
        self.read().catalog.get(&entry_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_name_and_id() {
        let dir = StaticDirectory::new();
        let alice = dir.add_player("Alice");

        assert_eq!(dir.resolve("alice"), Some(alice));
        assert_eq!(dir.resolve(" Alice "), Some(alice));
        assert_eq!(dir.resolve(&alice.to_string()), Some(alice));
        assert_eq!(dir.resolve("bob"), None);
        assert_eq!(dir.resolve(&PlayerId::new().to_string()), None);
    }

    #[test]
    fn test_roster_skips_empty_stacks() {
        let dir = StaticDirectory::new();
        let alice = dir.add_player("Alice");
        let kept = dir.add_stack(alice, UnitType::new("Imp", 3, 1, 5), 4);
        dir.add_stack(alice, UnitType::new("Ghost", 3, 1, 5), 0);

        let stacks = dir.deployable_stacks(alice);
        assert_eq!(stacks, vec![RosterStack { entry_id: kept, count: 4 }]);
        assert!(dir.deployable_stacks(PlayerId::new()).is_empty());
    }

    #[test]
    fn test_catalog_lookup() {
        let dir = StaticDirectory::new();
        let alice = dir.add_player("Alice");
        let entry = dir.add_stack(alice, UnitType::new("Imp", 3, 1, 5), 1);

        assert_eq!(dir.unit_type(entry).map(|u| u.name), Some("Imp".to_string()));
        assert!(dir.unit_type(RosterEntryId::new()).is_none());
        assert_eq!(dir.display_name(alice).as_deref(), Some("Alice"));
    }
}
