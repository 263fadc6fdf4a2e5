//! Domain records shared by every crate of the AnimeHeaven backend.
//!
//! Records that carry credential material (`UserRecord`, `Credential`) are
//! deliberately not `Serialize`. The only user shape that can leave the
//! service is `UserProfile`.

pub mod anime;
pub mod enums;
pub mod episode;
pub mod error;
pub mod health;
pub mod query;
pub mod user;

// Re-export the core types to provide a clean public API.
pub use anime::{Anime, AnimeChanges, NewAnime};
pub use enums::DependencyState;
pub use episode::{Episode, EpisodeSource};
pub use error::CoreError;
pub use health::{HealthSnapshot, format_uptime};
pub use query::{AnimeFilter, Page};
pub use user::{
    Credential, NewUser, NewUserRecord, UserChanges, UserProfile, UserRecord, UserUpdate,
    ValidatedNewUser,
};
