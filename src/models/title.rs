use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::{AppError, AppResult};

/// Kind of title as understood by the upstream catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            _ => Err(AppError::InvalidInput(
                "invalid type; must be movie or tv".to_string(),
            )),
        }
    }
}

/// Positive upstream (TMDb) title identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleId(u64);

impl TitleId {
    pub fn new(id: i64) -> AppResult<Self> {
        if id <= 0 {
            return Err(AppError::InvalidInput("invalid id".to_string()));
        }
        Ok(Self(id as u64))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Display for TitleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TitleId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: i64 = s
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidInput("invalid id".to_string()))?;
        Self::new(id)
    }
}

/// A validated (id, media type) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TitleRef {
    pub id: TitleId,
    pub media_type: MediaType,
}

impl TitleRef {
    pub fn new(id: TitleId, media_type: MediaType) -> Self {
        Self { id, media_type }
    }

    /// Validates raw request values
    pub fn parse(id: i64, media_type: &str) -> AppResult<Self> {
        let media_type = media_type.parse()?;
        Ok(Self::new(TitleId::new(id)?, media_type))
    }

    /// Key used in batch responses, e.g. `movie_123` or `tv_456`
    pub fn result_key(&self) -> String {
        format!("{}_{}", self.media_type, self.id)
    }
}

impl Display for TitleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.media_type, self.id)
    }
}

/// Parameters of an upstream title search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub page: u32,
    pub include_adult: bool,
    pub language: Option<String>,
    pub region: Option<String>,
    pub media_type: MediaType,
}

/// One title returned by search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleSummary {
    pub tmdb_id: u64,
    pub title: String,
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
}

/// A page of search results; also the cached value for search keys
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchPage {
    pub results: Vec<TitleSummary>,
    pub page: u32,
    pub total_pages: u32,
}
