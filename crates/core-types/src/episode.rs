use serde::Serialize;
use sqlx::FromRow;

/// One episode of an anime together with the places it can be watched.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: i32,
    pub anime_id: i32,
    pub title: Option<String>,
    /// Ordering key inside the anime.
    pub position: i32,
    #[sqlx(skip)]
    pub sources: Vec<EpisodeSource>,
}

/// A playback source of an episode, joined with the name of its source type.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSource {
    pub id: i32,
    pub episode_id: i32,
    pub url: String,
    pub source_type: Option<String>,
}
