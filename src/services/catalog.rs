//! Movie catalog and the sources it can be loaded from.
//!
//! The catalog is loaded once at startup and never mutated afterwards. A source
//! that is missing, malformed or empty is a hard error: the process refuses to
//! start rather than serving a substitute list.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
};

/// Immutable, cheaply cloneable collection of movies
#[derive(Debug, Clone)]
pub struct Catalog {
    movies: Arc<[MovieRecord]>,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Validates `movies` and wraps them into a catalog
    pub fn new(movies: Vec<MovieRecord>) -> AppResult<Self> {
        for (position, movie) in movies.iter().enumerate() {
            if movie.title.trim().is_empty() {
                return Err(AppError::CatalogUnavailable(format!(
                    "record {} has an empty title",
                    position
                )));
            }
            if !movie.rating.is_finite() || !(0.0..=10.0).contains(&movie.rating) {
                return Err(AppError::CatalogUnavailable(format!(
                    "record {} ({}) has rating {} outside 0-10",
                    position, movie.title, movie.rating
                )));
            }
        }

        Ok(Self {
            movies: movies.into(),
            loaded_at: Utc::now(),
        })
    }

    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Distinct genre names across the catalog, sorted case-insensitively.
    ///
    /// The first spelling seen for a genre wins.
    pub fn genres(&self) -> Vec<String> {
        let mut genres: Vec<String> = Vec::new();
        for genre in self.movies.iter().flat_map(|m| m.genres.iter()) {
            let genre = genre.trim();
            let key = genre.to_lowercase();
            if !genres.iter().any(|g| g.to_lowercase() == key) {
                genres.push(genre.to_string());
            }
        }
        genres.sort_by_key(|g| g.to_lowercase());
        genres
    }
}

/// Where a catalog comes from
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Reads and parses the whole catalog
    async fn load(&self) -> AppResult<Catalog>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// Catalog stored as a JSON array of movie records
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl CatalogSource for JsonFileSource {
    async fn load(&self) -> AppResult<Catalog> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::CatalogUnavailable(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let movies: Vec<MovieRecord> = serde_json::from_str(&raw).map_err(|e| {
            AppError::CatalogUnavailable(format!("failed to parse {}: {}", self.path.display(), e))
        })?;

        Catalog::new(movies)
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

/// Loads the catalog from `source`, refusing empty results.
///
/// Every failure is reported as [`AppError::CatalogUnavailable`].
pub async fn load_catalog(source: &dyn CatalogSource) -> AppResult<Catalog> {
    let description = source.describe();
    tracing::info!(source = %description, "Loading catalog");

    let catalog = match source.load().await {
        Ok(catalog) => catalog,
        Err(AppError::CatalogUnavailable(reason)) => {
            tracing::error!(source = %description, error = %reason, "Catalog load failed");
            return Err(AppError::CatalogUnavailable(reason));
        }
        Err(other) => {
            tracing::error!(source = %description, error = %other, "Catalog load failed");
            return Err(AppError::CatalogUnavailable(other.to_string()));
        }
    };

    if catalog.is_empty() {
        tracing::error!(source = %description, "Catalog is empty");
        return Err(AppError::CatalogUnavailable(format!(
            "{} contains no movies",
            description
        )));
    }

    tracing::info!(
        source = %description,
        movie_count = catalog.len(),
        genre_count = catalog.genres().len(),
        "Catalog loaded"
    );

    Ok(catalog)
}
