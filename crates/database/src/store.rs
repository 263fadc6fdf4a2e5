use crate::DbError;
use async_trait::async_trait;
use core_types::{
    Anime, AnimeChanges, AnimeFilter, Episode, NewAnime, NewUserRecord, Page, UserChanges,
    UserRecord,
};

/// The narrow data access interface the web layer depends on.
///
/// `DbRepository` implements it against PostgreSQL. Lookups of a single
/// record return `Ok(None)` when it does not exist; deletes report whether a
/// row was removed.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// A lightweight "are you there" round-trip with no side effects.
    async fn ping(&self) -> Result<(), DbError>;

    async fn list_users(&self, page: Page) -> Result<Vec<UserRecord>, DbError>;
    async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, DbError>;
    async fn create_user(&self, user: NewUserRecord) -> Result<UserRecord, DbError>;
    async fn update_user(&self, id: i32, changes: UserChanges)
    -> Result<Option<UserRecord>, DbError>;
    async fn delete_user(&self, id: i32) -> Result<bool, DbError>;

    async fn list_animes(&self, filter: &AnimeFilter) -> Result<Vec<Anime>, DbError>;
    async fn find_anime(&self, id: i32) -> Result<Option<Anime>, DbError>;
    /// `anime.title` must already be validated.
    async fn create_anime(&self, anime: NewAnime) -> Result<Anime, DbError>;
    async fn update_anime(&self, id: i32, changes: AnimeChanges) -> Result<Option<Anime>, DbError>;
    async fn delete_anime(&self, id: i32) -> Result<bool, DbError>;

    /// Episodes of an anime ordered by position, each with its sources.
    async fn episodes_for_anime(&self, anime_id: i32) -> Result<Vec<Episode>, DbError>;
}
