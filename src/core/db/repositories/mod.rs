//! Database repositories for CosmoVerse
//!
//! One repository per aggregate, each exposing named query methods and a
//! typed error enum. Data access stays behind these modules; business logic
//! never touches SQL directly.

pub mod planet;
pub mod reset;
pub mod satellite;
pub mod system;
pub mod user;
pub mod verification;

pub use planet::{PlanetRepository, PlanetRepositoryError};
pub use reset::{ResetRepositoryError, ResetTokenRepository};
pub use satellite::{SatelliteRepository, SatelliteRepositoryError};
pub use system::{SystemRepository, SystemRepositoryError};
pub use user::{UserRepository, UserRepositoryError};
pub use verification::{VerificationRepositoryError, VerificationTokenRepository};
