pub mod config;
pub mod error;
pub mod models;
pub mod prefs;
pub mod storage;

pub use config::AppConfig;
pub use error::{ExitCode, GardenError, Result};
pub use models::*;

pub use prefs::{DEFAULT_YEARLY_GOAL, PreferenceStore, Preferences, TomlPreferences};
pub use storage::database::{ConnectionPool, open_database, open_in_memory};
pub use storage::garden::Garden;
pub use storage::queries::GardenStatsQuery;
pub use storage::repositories::{PlantRepository, Repository, SqlitePlantRepository};
