//! Storage seam and external collaborators

pub mod collaborators;
pub mod store;

pub use collaborators::{PlayerDirectory, RosterSource, RosterStack, StaticDirectory, UnitCatalog};
pub use store::{GameStore, InMemoryStore};
