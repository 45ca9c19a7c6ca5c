pub mod codec;
pub mod error;
pub mod experience;
pub mod lookup;

// Re-exports
pub use codec::{IdCodec, TokenCache};
pub use error::{Error, Result};
pub use experience::{DateRange, DrivingExperience, NewExperience};
pub use lookup::LookupKind;
