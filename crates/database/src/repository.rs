use crate::connection;
use crate::store::CatalogStore;
use crate::DbError;
use async_trait::async_trait;
use core_types::{
    Anime, AnimeChanges, AnimeFilter, Episode, EpisodeSource, NewAnime, NewUserRecord, Page,
    UserChanges, UserRecord,
};
use sqlx::postgres::PgPool;
use std::collections::HashMap;
use std::time::Duration;

const USER_COLUMNS: &str =
    "id, email, display_name, password_hash, salt, avatar_url, permission_level, created_at, updated_at";

const ANIME_COLUMNS: &str =
    "id, title, description, genre, status, release_year, episode_count, cover_url, created_at, updated_at";

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
    ping_timeout: Duration,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool, ping_timeout: Duration) -> Self {
        Self { pool, ping_timeout }
    }
}

/// Turns a search term into an `ILIKE ... ESCAPE '\'` pattern that matches it
/// as a literal substring.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl CatalogStore for DbRepository {
    async fn ping(&self) -> Result<(), DbError> {
        connection::ping(&self.pool, self.ping_timeout).await
    }

    /// Fetches a page of users ordered by id.
    async fn list_users(&self, page: Page) -> Result<Vec<UserRecord>, DbError> {
        let page = page.normalized();
        let users = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, DbError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUserRecord) -> Result<UserRecord, DbError> {
        let created = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (email, display_name, password_hash, salt, avatar_url, permission_level)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.credential.password_hash)
        .bind(&user.credential.salt)
        .bind(&user.avatar_url)
        .bind(user.permission_level)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, "email"))?;
        Ok(created)
    }

    /// Applies a partial update. `None` fields keep their stored value,
    /// including the credential columns.
    async fn update_user(
        &self,
        id: i32,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, DbError> {
        let updated = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                display_name = COALESCE($3, display_name),
                password_hash = COALESCE($4, password_hash),
                salt = COALESCE($5, salt),
                avatar_url = COALESCE($6, avatar_url),
                permission_level = COALESCE($7, permission_level),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.email)
        .bind(&changes.display_name)
        .bind(changes.credential.as_ref().map(|c| c.password_hash.as_str()))
        .bind(changes.credential.as_ref().map(|c| c.salt.as_str()))
        .bind(&changes.avatar_url)
        .bind(changes.permission_level)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, "email"))?;
        Ok(updated)
    }

    async fn delete_user(&self, id: i32) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_animes(&self, filter: &AnimeFilter) -> Result<Vec<Anime>, DbError> {
        let page = filter.page();
        let animes = sqlx::query_as::<_, Anime>(&format!(
            r#"
            SELECT {ANIME_COLUMNS}
            FROM animes
            WHERE ($1::TEXT IS NULL OR genre = $1)
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::TEXT IS NULL OR title ILIKE $3 ESCAPE '\')
            ORDER BY id ASC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.genre())
        .bind(filter.status())
        .bind(filter.search().map(contains_pattern))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(animes)
    }

    async fn find_anime(&self, id: i32) -> Result<Option<Anime>, DbError> {
        let anime = sqlx::query_as::<_, Anime>(&format!(
            "SELECT {ANIME_COLUMNS} FROM animes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(anime)
    }

    async fn create_anime(&self, anime: NewAnime) -> Result<Anime, DbError> {
        let created = sqlx::query_as::<_, Anime>(&format!(
            r#"
            INSERT INTO animes (title, description, genre, status, release_year, episode_count, cover_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ANIME_COLUMNS}
            "#
        ))
        .bind(&anime.title)
        .bind(&anime.description)
        .bind(&anime.genre)
        .bind(&anime.status)
        .bind(anime.release_year)
        .bind(anime.episode_count)
        .bind(&anime.cover_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_anime(&self, id: i32, changes: AnimeChanges) -> Result<Option<Anime>, DbError> {
        let updated = sqlx::query_as::<_, Anime>(&format!(
            r#"
            UPDATE animes SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                genre = COALESCE($4, genre),
                status = COALESCE($5, status),
                release_year = COALESCE($6, release_year),
                episode_count = COALESCE($7, episode_count),
                cover_url = COALESCE($8, cover_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ANIME_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.genre)
        .bind(&changes.status)
        .bind(changes.release_year)
        .bind(changes.episode_count)
        .bind(&changes.cover_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_anime(&self, id: i32) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM animes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetches the episodes first, then all of their sources in one query.
    async fn episodes_for_anime(&self, anime_id: i32) -> Result<Vec<Episode>, DbError> {
        let mut episodes = sqlx::query_as::<_, Episode>(
            "SELECT id, anime_id, title, position FROM episodes WHERE anime_id = $1 ORDER BY position ASC",
        )
        .bind(anime_id)
        .fetch_all(&self.pool)
        .await?;

        if episodes.is_empty() {
            return Ok(episodes);
        }

        let episode_ids: Vec<i32> = episodes.iter().map(|e| e.id).collect();
        let sources = sqlx::query_as::<_, EpisodeSource>(
            r#"
            SELECT es.id, es.episode_id, es.url, st.name AS source_type
            FROM episode_sources AS es
            LEFT JOIN source_types AS st ON st.id = es.source_type_id
            WHERE es.episode_id = ANY($1)
            ORDER BY es.id ASC
            "#,
        )
        .bind(&episode_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_episode: HashMap<i32, Vec<EpisodeSource>> = HashMap::new();
        for source in sources {
            by_episode.entry(source.episode_id).or_default().push(source);
        }
        for episode in &mut episodes {
            episode.sources = by_episode.remove(&episode.id).unwrap_or_default();
        }

        Ok(episodes)
    }
}
