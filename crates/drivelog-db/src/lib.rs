pub mod error;
pub mod models;
pub mod repository;

// Re-exports
pub use error::{Error, Result};
pub use models::{
    DistanceByLabel, DrivesByLabel, ExperienceRecord, LookupRow, MonthlyDistance, Overview,
};
pub use repository::Database;
