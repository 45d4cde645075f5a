use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;

use crate::error::{AppError, AppResult};

use super::{AgeRating, GenreInput, Recommendation};

/// Age assumed when a request does not carry one
pub const DEFAULT_AGE: u32 = 25;

/// Coarse runtime category requested by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeBucket {
    Short,
    #[default]
    Medium,
    Long,
}

impl RuntimeBucket {
    /// Parses a bucket name, falling back to `Medium` for anything unrecognised
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "short" => RuntimeBucket::Short,
            "medium" => RuntimeBucket::Medium,
            "long" => RuntimeBucket::Long,
            other => {
                tracing::debug!(runtime = %other, "Unknown runtime bucket, using medium");
                RuntimeBucket::Medium
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeBucket::Short => "short",
            RuntimeBucket::Medium => "medium",
            RuntimeBucket::Long => "long",
        }
    }
}

impl Display for RuntimeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minute boundaries for the runtime buckets.
///
/// `short` = [0, 90), `medium` = [90, medium_max], `long` = (medium_max, ∞)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeTable {
    pub medium_max_minutes: u32,
}

impl RuntimeTable {
    pub const SHORT_MAX_MINUTES: u32 = 90;
    pub const DEFAULT_MEDIUM_MAX_MINUTES: u32 = 150;

    pub fn new(medium_max_minutes: u32) -> Self {
        Self { medium_max_minutes }
    }

    /// Bucket a runtime (in minutes) falls into
    pub fn bucket_for(&self, minutes: u32) -> RuntimeBucket {
        if minutes < Self::SHORT_MAX_MINUTES {
            RuntimeBucket::Short
        } else if minutes <= self.medium_max_minutes {
            RuntimeBucket::Medium
        } else {
            RuntimeBucket::Long
        }
    }

    pub fn contains(&self, bucket: RuntimeBucket, minutes: u32) -> bool {
        self.bucket_for(minutes) == bucket
    }
}

impl Default for RuntimeTable {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MEDIUM_MAX_MINUTES)
    }
}

/// Normalised user preferences used by the scorer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceQuery {
    /// Trimmed, lowercased and de-duplicated genre names
    pub genres: Vec<String>,
    pub runtime: RuntimeBucket,
    pub age: u32,
    age_ceiling: AgeRating,
}

impl PreferenceQuery {
    pub fn new<S: AsRef<str>>(genres: &[S], runtime: RuntimeBucket, age: u32) -> Self {
        let mut normalized: Vec<String> = Vec::with_capacity(genres.len());
        for genre in genres {
            let genre = genre.as_ref().trim().to_lowercase();
            if !genre.is_empty() && !normalized.contains(&genre) {
                normalized.push(genre);
            }
        }

        Self {
            genres: normalized,
            runtime,
            age,
            age_ceiling: AgeRating::ceiling_for_age(age),
        }
    }

    /// Maximum age rating this query permits
    pub fn age_ceiling(&self) -> AgeRating {
        self.age_ceiling
    }
}

/// Body of `POST /api/recommend`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub genres: Option<GenreInput>,
    #[serde(default)]
    pub runtime: Option<String>,
    /// Integer or numeric string; validated in [`RecommendationRequest::to_query`]
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub min_rating: Option<f64>,
}

impl RecommendationRequest {
    /// Builds the scorer query, applying defaults for absent fields
    pub fn to_query(&self) -> AppResult<PreferenceQuery> {
        let genres = self
            .genres
            .clone()
            .map(GenreInput::into_names)
            .unwrap_or_default();

        let runtime = self
            .runtime
            .as_deref()
            .map(RuntimeBucket::parse_lenient)
            .unwrap_or_default();

        let age = match &self.age {
            None | Some(Value::Null) => DEFAULT_AGE,
            Some(value) => parse_age(value)?,
        };

        Ok(PreferenceQuery::new(&genres, runtime, age))
    }
}

/// Non-negative integers (or integral floats / numeric strings). Ages past
/// `u32::MAX` saturate, they all share the `17+` ceiling anyway.
fn parse_age(value: &Value) -> AppResult<u32> {
    let invalid =
        || AppError::InvalidQuery(format!("age must be a non-negative integer, got {}", value));

    let age: u64 = match value {
        Value::Number(number) => match (number.as_u64(), number.as_f64()) {
            (Some(age), _) => age,
            (None, Some(age)) if age >= 0.0 && age.fract() == 0.0 => age as u64,
            _ => return Err(invalid()),
        },
        Value::String(text) => text.trim().parse::<u64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    Ok(u32::try_from(age).unwrap_or(u32::MAX))
}

/// Successful response body
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub recommendations: Vec<Recommendation>,
}

impl RecommendationResponse {
    pub fn new(recommendations: Vec<Recommendation>) -> Self {
        Self {
            success: true,
            recommendations,
        }
    }
}
