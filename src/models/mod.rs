pub mod movie;
pub mod preference;

pub use movie::{AgeRating, GenreInput, MovieRecord, Recommendation};
pub use preference::{
    PreferenceQuery, RecommendationRequest, RecommendationResponse, RuntimeBucket, RuntimeTable,
    DEFAULT_AGE,
};
