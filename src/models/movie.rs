use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Content-maturity tag attached to every movie in the catalog
///
/// Variants are declared in ascending order of maturity so the derived `Ord`
/// gives `all < 10+ < 13+ < 17+`. Records without a tag default to the most
/// restrictive one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AgeRating {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "10+")]
    TenPlus,
    #[serde(rename = "13+")]
    ThirteenPlus,
    #[serde(rename = "17+")]
    #[default]
    SeventeenPlus,
}

impl AgeRating {
    /// Highest tag a viewer of the given age is allowed to see
    pub fn ceiling_for_age(age: u32) -> Self {
        match age {
            0..=9 => AgeRating::All,
            10..=12 => AgeRating::TenPlus,
            13..=16 => AgeRating::ThirteenPlus,
            _ => AgeRating::SeventeenPlus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRating::All => "all",
            AgeRating::TenPlus => "10+",
            AgeRating::ThirteenPlus => "13+",
            AgeRating::SeventeenPlus => "17+",
        }
    }
}

impl Display for AgeRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Genres as they appear on the wire: either a JSON array or a single
/// comma-separated string such as `"Crime, Drama"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GenreInput {
    List(Vec<String>),
    Csv(String),
}

impl GenreInput {
    /// Flattens the input into trimmed, non-empty genre names (original casing kept)
    pub fn into_names(self) -> Vec<String> {
        let raw = match self {
            GenreInput::List(names) => names,
            GenreInput::Csv(joined) => joined.split(',').map(str::to_string).collect(),
        };

        raw.into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

fn deserialize_genres<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let input = Option::<GenreInput>::deserialize(deserializer)?;
    Ok(input.map(GenreInput::into_names).unwrap_or_default())
}

/// A single movie in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_genres")]
    pub genres: Vec<String>,
    pub rating: f64,
    /// Runtime in minutes
    pub runtime: u32,
    #[serde(default)]
    pub age_rating: AgeRating,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl MovieRecord {
    /// Case-insensitive genre intersection.
    ///
    /// `wanted` must already be lowercased; an empty slice matches everything.
    pub fn matches_any_genre(&self, wanted: &[String]) -> bool {
        wanted.is_empty()
            || self
                .genres
                .iter()
                .any(|genre| wanted.contains(&genre.trim().to_lowercase()))
    }
}

/// Public-facing view of a movie returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub rating: f64,
    pub runtime: u32,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub poster_path: Option<String>,
}

impl From<&MovieRecord> for Recommendation {
    fn from(movie: &MovieRecord) -> Self {
        Self {
            title: movie.title.clone(),
            year: movie.year,
            genres: movie.genres.clone(),
            rating: movie.rating,
            runtime: movie.runtime,
            tagline: movie.tagline.clone(),
            description: movie.description.clone(),
            poster_path: movie.poster_path.clone(),
        }
    }
}
