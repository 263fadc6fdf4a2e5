use crate::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `animes` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anime {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub status: Option<String>,
    pub release_year: Option<i32>,
    pub episode_count: Option<i32>,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/animes`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnime {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub status: Option<String>,
    pub release_year: Option<i32>,
    pub episode_count: Option<i32>,
    pub cover_url: Option<String>,
}

impl NewAnime {
    /// Returns the trimmed title, which is the only mandatory field.
    pub fn validated_title(&self) -> Result<String, CoreError> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| CoreError::MissingFields("A cím megadása kötelező!".to_string()))
    }
}

/// Body of `PUT /api/animes/:id`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub status: Option<String>,
    pub release_year: Option<i32>,
    pub episode_count: Option<i32>,
    pub cover_url: Option<String>,
}

impl AnimeChanges {
    /// Rejects a blank title and trims a supplied one.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        if let Some(title) = self.title.take() {
            let title = title.trim();
            if title.is_empty() {
                return Err(CoreError::InvalidInput(
                    "title".to_string(),
                    "must not be empty".to_string(),
                ));
            }
            self.title = Some(title.to_string());
        }
        Ok(self)
    }

    pub fn apply_to(self, anime: &mut Anime, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            anime.title = title;
        }
        if self.description.is_some() {
            anime.description = self.description;
        }
        if self.genre.is_some() {
            anime.genre = self.genre;
        }
        if self.status.is_some() {
            anime.status = self.status;
        }
        if self.release_year.is_some() {
            anime.release_year = self.release_year;
        }
        if self.episode_count.is_some() {
            anime.episode_count = self.episode_count;
        }
        if self.cover_url.is_some() {
            anime.cover_url = self.cover_url;
        }
        anime.updated_at = now;
    }
}
