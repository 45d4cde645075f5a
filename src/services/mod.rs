pub mod catalog;
pub mod recommender;
pub mod similarity;

pub use catalog::{load_catalog, Catalog, CatalogSource, JsonFileSource};
pub use recommender::{score, Ranking, Recommender, ScoreOptions};
pub use similarity::SimilarityIndex;
