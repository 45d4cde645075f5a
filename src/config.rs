use serde::Deserialize;

use crate::models::RuntimeTable;
use crate::services::recommender::Ranking;

/// Log output style
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the bundled JSON catalog
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Number of recommendations returned when the request does not ask for a count
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Upper bound on a per-request `top_n`
    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,

    /// Minimum rating applied when the request does not override it
    #[serde(default)]
    pub min_rating: f64,

    /// Upper (inclusive) bound of the medium runtime bucket, in minutes
    #[serde(default = "default_medium_max_minutes")]
    pub medium_max_minutes: u32,

    #[serde(default)]
    pub ranking: Ranking,

    /// Reject requests with an empty genre list
    #[serde(default)]
    pub require_genres: bool,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_catalog_path() -> String {
    "data/movies.json".to_string()
}

fn default_top_n() -> usize {
    5
}

fn default_max_top_n() -> usize {
    20
}

fn default_medium_max_minutes() -> u32 {
    RuntimeTable::DEFAULT_MEDIUM_MAX_MINUTES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            catalog_path: default_catalog_path(),
            top_n: default_top_n(),
            max_top_n: default_max_top_n(),
            min_rating: 0.0,
            medium_max_minutes: default_medium_max_minutes(),
            ranking: Ranking::default(),
            require_genres: false,
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints that serde cannot express
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.top_n == 0 {
            anyhow::bail!("TOP_N must be at least 1");
        }
        if self.top_n > self.max_top_n {
            anyhow::bail!(
                "TOP_N ({}) must not exceed MAX_TOP_N ({})",
                self.top_n,
                self.max_top_n
            );
        }
        if !(0.0..=10.0).contains(&self.min_rating) {
            anyhow::bail!("MIN_RATING must be between 0 and 10, got {}", self.min_rating);
        }
        if self.medium_max_minutes < RuntimeTable::SHORT_MAX_MINUTES {
            anyhow::bail!(
                "MEDIUM_MAX_MINUTES must be at least {}, got {}",
                RuntimeTable::SHORT_MAX_MINUTES,
                self.medium_max_minutes
            );
        }
        Ok(())
    }

    pub fn runtime_table(&self) -> RuntimeTable {
        RuntimeTable::new(self.medium_max_minutes)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, envy::Error> {
        envy::from_iter(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.catalog_path, "data/movies.json");
        assert_eq!(config.top_n, 5);
        assert_eq!(config.medium_max_minutes, 150);
        assert_eq!(config.ranking, Ranking::Similarity);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(!config.require_genres);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("PORT", "8080"),
            ("RANKING", "rating"),
            ("MEDIUM_MAX_MINUTES", "120"),
            ("REQUIRE_GENRES", "true"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.ranking, Ranking::Rating);
        assert_eq!(config.runtime_table().medium_max_minutes, 120);
        assert!(config.require_genres);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_validate_rejects_inconsistent_limits() {
        let config = Config {
            top_n: 30,
            max_top_n: 20,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            top_n: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            medium_max_minutes: 60,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            min_rating: 11.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
