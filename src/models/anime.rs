use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// MyAnimeList identifier, the sole identity key of a catalog record
pub type AnimeId = u64;

/// One cataloged anime as the engine and the HTTP layer see it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Anime {
    pub id: AnimeId,
    pub title: String,
    pub title_english: Option<String>,
    pub images: AnimeImages,
    pub year: Option<i32>,
    pub season: Option<Season>,
    pub anime_type: Option<AnimeType>,
    pub episodes: Option<u32>,
    /// Community score, 0-10
    pub score: Option<f64>,
    /// Popularity rank; lower is more popular
    pub popularity: Option<u32>,
    pub genres: Vec<String>,
    pub studios: Vec<String>,
    pub demographics: Vec<String>,
    pub synopsis: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    /// Content rating label, e.g. "PG-13 - Teens 13 or older"
    pub rating: Option<String>,
    /// When this record was last written to the metadata store
    pub cached_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnimeImages {
    pub image_url: Option<String>,
    pub large_image_url: Option<String>,
}

impl Anime {
    /// Minimal record with every optional field empty
    pub fn new(id: AnimeId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            title_english: None,
            images: AnimeImages::default(),
            year: None,
            season: None,
            anime_type: None,
            episodes: None,
            score: None,
            popularity: None,
            genres: Vec::new(),
            studios: Vec::new(),
            demographics: Vec::new(),
            synopsis: None,
            status: None,
            source: None,
            rating: None,
            cached_at: None,
        }
    }
}

/// Broadcast format of a title
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnimeType {
    Tv,
    Movie,
    Ova,
    Ona,
    Special,
    TvSpecial,
    Music,
    Other(String),
}

impl AnimeType {
    pub fn as_str(&self) -> &str {
        match self {
            AnimeType::Tv => "TV",
            AnimeType::Movie => "Movie",
            AnimeType::Ova => "OVA",
            AnimeType::Ona => "ONA",
            AnimeType::Special => "Special",
            AnimeType::TvSpecial => "TV Special",
            AnimeType::Music => "Music",
            AnimeType::Other(label) => label,
        }
    }
}

impl From<&str> for AnimeType {
    fn from(label: &str) -> Self {
        match label {
            "TV" => AnimeType::Tv,
            "Movie" => AnimeType::Movie,
            "OVA" => AnimeType::Ova,
            "ONA" => AnimeType::Ona,
            "Special" => AnimeType::Special,
            "TV Special" => AnimeType::TvSpecial,
            "Music" => AnimeType::Music,
            other => AnimeType::Other(other.to_string()),
        }
    }
}

impl From<String> for AnimeType {
    fn from(label: String) -> Self {
        AnimeType::from(label.as_str())
    }
}

impl From<AnimeType> for String {
    fn from(anime_type: AnimeType) -> Self {
        anime_type.as_str().to_string()
    }
}

impl Display for AnimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Broadcast season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        }
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            other => Err(format!("Unknown season '{}'", other)),
        }
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Jikan API Types
// ============================================================================

/// Envelope shared by every Jikan v4 response
#[derive(Debug, Clone, Deserialize)]
pub struct JikanResponse<T> {
    pub data: T,
    #[serde(default)]
    pub pagination: Option<JikanPagination>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanPagination {
    #[serde(default)]
    pub last_visible_page: Option<u32>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Raw anime entry from Jikan
#[derive(Debug, Clone, Deserialize)]
pub struct JikanAnime {
    pub mal_id: u64,
    pub title: String,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub images: JikanImages,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(rename = "type", default)]
    pub anime_type: Option<String>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub genres: Vec<JikanEntity>,
    #[serde(default)]
    pub studios: Vec<JikanEntity>,
    #[serde(default)]
    pub demographics: Vec<JikanEntity>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JikanImages {
    #[serde(default)]
    pub jpg: Option<JikanImageSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JikanImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

/// Genre, studio or demographic reference
#[derive(Debug, Clone, Deserialize)]
pub struct JikanEntity {
    pub name: String,
}

fn entity_names(entities: Vec<JikanEntity>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(entities.len());
    for entity in entities {
        if !names.contains(&entity.name) {
            names.push(entity.name);
        }
    }
    names
}

impl From<JikanAnime> for Anime {
    fn from(raw: JikanAnime) -> Self {
        let images = raw
            .images
            .jpg
            .map(|jpg| AnimeImages {
                image_url: jpg.image_url,
                large_image_url: jpg.large_image_url,
            })
            .unwrap_or_default();

        Anime {
            id: raw.mal_id,
            title: raw.title,
            title_english: raw.title_english,
            images,
            year: raw.year,
            season: raw.season.and_then(|s| s.parse().ok()),
            anime_type: raw.anime_type.map(AnimeType::from),
            episodes: raw.episodes,
            score: raw.score,
            popularity: raw.popularity,
            genres: entity_names(raw.genres),
            studios: entity_names(raw.studios),
            demographics: entity_names(raw.demographics),
            synopsis: raw.synopsis,
            status: raw.status,
            source: raw.source,
            rating: raw.rating,
            cached_at: None,
        }
    }
}
