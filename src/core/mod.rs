pub mod config;
pub mod error;
pub mod types;

pub use config::{load_config, parse_config, EngineConfig, KamikazeLoss};
pub use error::{EngineError, EngineResult};
pub use types::{Cell, FieldId, GameId, PlayerId, RosterEntryId, UnitId};
