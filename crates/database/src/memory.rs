//! An in-memory `CatalogStore` for tests.

use crate::store::CatalogStore;
use crate::DbError;
use async_trait::async_trait;
use chrono::Utc;
use core_types::{
    Anime, AnimeChanges, AnimeFilter, Episode, NewAnime, NewUserRecord, Page, UserChanges,
    UserRecord,
};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<i32, UserRecord>,
    animes: BTreeMap<i32, Anime>,
    episodes: Vec<Episode>,
    next_user_id: i32,
    next_anime_id: i32,
    unreachable: bool,
    writes: usize,
}

/// Keeps every table in a mutex-guarded map. Can be switched offline to
/// simulate an outage, in which case every call fails with `DbError::Unavailable`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.lock_unchecked().unreachable = !reachable;
    }

    /// Number of successful create/update/delete calls so far.
    pub fn write_count(&self) -> usize {
        self.lock_unchecked().writes
    }

    /// Seeds an episode. Ids are taken as given.
    pub fn insert_episode(&self, episode: Episode) {
        self.lock_unchecked().episodes.push(episode);
    }

    fn lock_unchecked(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DbError> {
        let state = self.lock_unchecked();
        if state.unreachable {
            return Err(DbError::Unavailable("connection refused".to_string()));
        }
        Ok(state)
    }
}

fn paginate<T: Clone>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    let page = page.normalized();
    items
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn ping(&self) -> Result<(), DbError> {
        self.lock().map(|_| ())
    }

    async fn list_users(&self, page: Page) -> Result<Vec<UserRecord>, DbError> {
        let state = self.lock()?;
        Ok(paginate(state.users.values().cloned(), page))
    }

    async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, DbError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn create_user(&self, user: NewUserRecord) -> Result<UserRecord, DbError> {
        let mut state = self.lock()?;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(DbError::Duplicate("email".to_string()));
        }
        state.next_user_id += 1;
        let now = Utc::now();
        let record = UserRecord {
            id: state.next_user_id,
            email: user.email,
            display_name: user.display_name,
            credential: user.credential,
            avatar_url: user.avatar_url,
            permission_level: user.permission_level,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(record.id, record.clone());
        state.writes += 1;
        Ok(record)
    }

    async fn update_user(
        &self,
        id: i32,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, DbError> {
        let mut state = self.lock()?;
        if let Some(email) = &changes.email {
            if state.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(DbError::Duplicate("email".to_string()));
            }
        }
        let Some(record) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(record, Utc::now());
        let updated = record.clone();
        state.writes += 1;
        Ok(Some(updated))
    }

    async fn delete_user(&self, id: i32) -> Result<bool, DbError> {
        let mut state = self.lock()?;
        let removed = state.users.remove(&id).is_some();
        if removed {
            state.writes += 1;
        }
        Ok(removed)
    }

    async fn list_animes(&self, filter: &AnimeFilter) -> Result<Vec<Anime>, DbError> {
        let state = self.lock()?;
        let matching = state.animes.values().filter(|a| filter.matches(a)).cloned();
        Ok(paginate(matching, filter.page()))
    }

    async fn find_anime(&self, id: i32) -> Result<Option<Anime>, DbError> {
        Ok(self.lock()?.animes.get(&id).cloned())
    }

    async fn create_anime(&self, anime: NewAnime) -> Result<Anime, DbError> {
        let mut state = self.lock()?;
        state.next_anime_id += 1;
        let now = Utc::now();
        let record = Anime {
            id: state.next_anime_id,
            title: anime.title.unwrap_or_default(),
            description: anime.description,
            genre: anime.genre,
            status: anime.status,
            release_year: anime.release_year,
            episode_count: anime.episode_count,
            cover_url: anime.cover_url,
            created_at: now,
            updated_at: now,
        };
        state.animes.insert(record.id, record.clone());
        state.writes += 1;
        Ok(record)
    }

    async fn update_anime(&self, id: i32, changes: AnimeChanges) -> Result<Option<Anime>, DbError> {
        let mut state = self.lock()?;
        let Some(anime) = state.animes.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(anime, Utc::now());
        let updated = anime.clone();
        state.writes += 1;
        Ok(Some(updated))
    }

    async fn delete_anime(&self, id: i32) -> Result<bool, DbError> {
        let mut state = self.lock()?;
        let removed = state.animes.remove(&id).is_some();
        if removed {
            state.episodes.retain(|e| e.anime_id != id);
            state.writes += 1;
        }
        Ok(removed)
    }

    async fn episodes_for_anime(&self, anime_id: i32) -> Result<Vec<Episode>, DbError> {
        let state = self.lock()?;
        let mut episodes: Vec<Episode> = state
            .episodes
            .iter()
            .filter(|e| e.anime_id == anime_id)
            .cloned()
            .collect();
        episodes.sort_by_key(|e| e.position);
        Ok(episodes)
    }
}
