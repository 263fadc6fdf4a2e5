use serde::Deserialize;

/// Limit/offset pagination as accepted on every list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: default_limit(), offset: 0 }
    }
}

impl Page {
    /// Clamps negative values coming from the query string.
    pub fn normalized(self) -> Self {
        Self {
            limit: self.limit.max(0),
            offset: self.offset.max(0),
        }
    }
}

/// Filters for `GET /api/animes`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnimeFilter {
    pub genre: Option<String>,
    pub status: Option<String>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl Default for AnimeFilter {
    fn default() -> Self {
        Self {
            genre: None,
            status: None,
            search: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl AnimeFilter {
    pub fn page(&self) -> Page {
        Page { limit: self.limit, offset: self.offset }.normalized()
    }

    pub fn genre(&self) -> Option<&str> {
        non_blank(&self.genre)
    }

    pub fn status(&self) -> Option<&str> {
        non_blank(&self.status)
    }

    pub fn search(&self) -> Option<&str> {
        non_blank(&self.search)
    }

    /// Returns `true` when the anime passes the genre, status and search filters.
    /// Pagination is not considered.
    pub fn matches(&self, anime: &crate::Anime) -> bool {
        if let Some(genre) = self.genre() {
            if anime.genre.as_deref() != Some(genre) {
                return false;
            }
        }
        if let Some(status) = self.status() {
            if anime.status.as_deref() != Some(status) {
                return false;
            }
        }
        if let Some(search) = self.search() {
            if !anime.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
