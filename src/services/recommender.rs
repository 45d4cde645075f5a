use serde::Deserialize;

use crate::models::{MovieRecord, PreferenceQuery, RuntimeTable};

use super::catalog::Catalog;
use super::similarity::{feature_text, SimilarityIndex};

/// How matching movies are ordered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ranking {
    /// TF-IDF similarity first, rating as tie-break
    #[default]
    Similarity,
    /// Rating only
    Rating,
}

/// Tunables for a single scoring pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreOptions {
    pub top_n: usize,
    pub min_rating: f64,
    pub runtime_table: RuntimeTable,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            min_rating: 0.0,
            runtime_table: RuntimeTable::default(),
        }
    }
}

/// Filters `catalog` by `query` and returns at most `options.top_n` movies, best first.
///
/// A record passes when it shares a genre with the query (or the query has no
/// genres), its runtime falls in the requested bucket, its rating is at least
/// `min_rating` and its age tag does not exceed the query's ceiling.
///
/// With a `similarity` index fitted on the same catalog (same order), matches
/// are ranked by similarity then rating; otherwise by rating alone. The sort is
/// stable, so exact ties keep catalog order.
pub fn score<'a>(
    catalog: &'a [MovieRecord],
    query: &PreferenceQuery,
    similarity: Option<&SimilarityIndex>,
    options: &ScoreOptions,
) -> Vec<&'a MovieRecord> {
    let ceiling = query.age_ceiling();

    let similarity_scores = similarity.and_then(|index| {
        if index.len() != catalog.len() {
            tracing::warn!(
                index_len = index.len(),
                catalog_len = catalog.len(),
                "Similarity index does not match catalog, ranking by rating"
            );
            return None;
        }
        let query_text = feature_text(&query.genres, query.runtime, ceiling);
        Some(index.similarities(&query_text))
    });

    let mut matches: Vec<(f64, &MovieRecord)> = catalog
        .iter()
        .enumerate()
        .filter(|(_, movie)| {
            movie.matches_any_genre(&query.genres)
                && options.runtime_table.contains(query.runtime, movie.runtime)
                && movie.rating >= options.min_rating
                && movie.age_rating <= ceiling
        })
        .map(|(position, movie)| {
            let similarity = similarity_scores
                .as_ref()
                .map(|scores| scores[position])
                .unwrap_or(0.0);
            (similarity, movie)
        })
        .collect();

    matches.sort_by(|(sim_a, a), (sim_b, b)| {
        sim_b
            .total_cmp(sim_a)
            .then_with(|| b.rating.total_cmp(&a.rating))
    });

    matches
        .into_iter()
        .take(options.top_n)
        .map(|(_, movie)| movie)
        .collect()
}

/// Catalog plus the ranking machinery built for it at startup
#[derive(Debug)]
pub struct Recommender {
    catalog: Catalog,
    similarity: Option<SimilarityIndex>,
    runtime_table: RuntimeTable,
}

impl Recommender {
    pub fn new(catalog: Catalog, ranking: Ranking, runtime_table: RuntimeTable) -> Self {
        let similarity = match ranking {
            Ranking::Similarity => {
                let features: Vec<String> = catalog
                    .movies()
                    .iter()
                    .map(|movie| {
                        feature_text(
                            &movie.genres,
                            runtime_table.bucket_for(movie.runtime),
                            movie.age_rating,
                        )
                    })
                    .collect();
                let index = SimilarityIndex::fit(&features);
                tracing::info!(
                    documents = index.len(),
                    vocabulary = index.vocabulary_size(),
                    "Similarity index built"
                );
                Some(index)
            }
            Ranking::Rating => None,
        };

        Self {
            catalog,
            similarity,
            runtime_table,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ranking(&self) -> Ranking {
        match self.similarity {
            Some(_) => Ranking::Similarity,
            None => Ranking::Rating,
        }
    }

    /// Runs [`score`] against the owned catalog
    pub fn recommend(
        &self,
        query: &PreferenceQuery,
        top_n: usize,
        min_rating: f64,
    ) -> Vec<&MovieRecord> {
        let options = ScoreOptions {
            top_n,
            min_rating,
            runtime_table: self.runtime_table,
        };
        score(self.catalog.movies(), query, self.similarity.as_ref(), &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgeRating, RuntimeBucket};

    fn movie(
        title: &str,
        genres: &[&str],
        rating: f64,
        runtime: u32,
        age: AgeRating,
    ) -> MovieRecord {
        MovieRecord {
            title: title.to_string(),
            year: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            rating,
            runtime,
            age_rating: age,
            tagline: None,
            description: None,
            poster_path: None,
        }
    }

    fn example_catalog() -> Vec<MovieRecord> {
        vec![
            movie("A", &["Drama"], 9.3, 142, AgeRating::SeventeenPlus),
            movie("B", &["Action"], 8.8, 148, AgeRating::ThirteenPlus),
        ]
    }

    fn titles(movies: &[&MovieRecord]) -> Vec<String> {
        movies.iter().map(|m| m.title.clone()).collect()
    }

    #[test]
    fn test_genre_filter_excludes_other_genres() {
        let catalog = example_catalog();
        let query = PreferenceQuery::new(&["drama"], RuntimeBucket::Medium, 25);

        let result = score(&catalog, &query, None, &ScoreOptions::default());
        assert_eq!(titles(&result), vec!["A"]);
    }

    #[test]
    fn test_age_ceiling_excludes_everything_for_young_viewer() {
        let catalog = example_catalog();
        let query = PreferenceQuery::new::<&str>(&[], RuntimeBucket::Long, 5);

        let result = score(&catalog, &query, None, &ScoreOptions::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_catalog_yields_empty_result() {
        let query = PreferenceQuery::new(&["drama"], RuntimeBucket::Medium, 25);
        let result = score(&[], &query, None, &ScoreOptions::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_genres_pass_every_record() {
        let catalog = example_catalog();
        let query = PreferenceQuery::new::<&str>(&[], RuntimeBucket::Medium, 25);

        let result = score(&catalog, &query, None, &ScoreOptions::default());
        assert_eq!(titles(&result), vec!["A", "B"]);
    }

    #[test]
    fn test_min_rating_and_top_n() {
        let catalog = vec![
            movie("Low", &["Drama"], 6.0, 100, AgeRating::All),
            movie("Mid", &["Drama"], 7.5, 100, AgeRating::All),
            movie("High", &["Drama"], 9.0, 100, AgeRating::All),
            movie("Top", &["Drama"], 9.5, 100, AgeRating::All),
        ];
        let query = PreferenceQuery::new(&["Drama"], RuntimeBucket::Medium, 8);
        let options = ScoreOptions {
            top_n: 2,
            min_rating: 7.0,
            ..ScoreOptions::default()
        };

        let result = score(&catalog, &query, None, &options);
        assert_eq!(titles(&result), vec!["Top", "High"]);
        assert!(result.iter().all(|m| m.rating >= 7.0));
    }

    #[test]
    fn test_runtime_bucket_respected() {
        let catalog = vec![
            movie("Short", &["Comedy"], 7.0, 85, AgeRating::All),
            movie("Medium", &["Comedy"], 7.0, 120, AgeRating::All),
            movie("Long", &["Comedy"], 7.0, 170, AgeRating::All),
        ];
        let table = RuntimeTable::default();

        for (bucket, expected) in [
            (RuntimeBucket::Short, "Short"),
            (RuntimeBucket::Medium, "Medium"),
            (RuntimeBucket::Long, "Long"),
        ] {
            let query = PreferenceQuery::new(&["comedy"], bucket, 30);
            let result = score(&catalog, &query, None, &ScoreOptions::default());
            assert_eq!(titles(&result), vec![expected]);
            assert!(result.iter().all(|m| table.contains(bucket, m.runtime)));
        }
    }

    #[test]
    fn test_equal_similarity_ties_broken_by_rating() {
        let catalog = vec![
            movie("Lower", &["Drama"], 8.9, 120, AgeRating::ThirteenPlus),
            movie("Higher", &["Drama"], 9.1, 120, AgeRating::ThirteenPlus),
        ];
        let recommender = Recommender::new(
            Catalog::new(catalog).unwrap(),
            Ranking::Similarity,
            RuntimeTable::default(),
        );
        let query = PreferenceQuery::new(&["drama"], RuntimeBucket::Medium, 14);

        let result = recommender.recommend(&query, 5, 0.0);
        assert_eq!(titles(&result), vec!["Higher", "Lower"]);
    }

    #[test]
    fn test_similarity_outranks_rating() {
        let catalog = vec![
            movie("Broad", &["Drama", "Romance", "War"], 9.5, 120, AgeRating::ThirteenPlus),
            movie("Focused", &["Drama"], 8.0, 120, AgeRating::ThirteenPlus),
        ];
        let recommender = Recommender::new(
            Catalog::new(catalog).unwrap(),
            Ranking::Similarity,
            RuntimeTable::default(),
        );
        let query = PreferenceQuery::new(&["drama"], RuntimeBucket::Medium, 14);

        let result = recommender.recommend(&query, 5, 0.0);
        assert_eq!(titles(&result), vec!["Focused", "Broad"]);
        assert_eq!(recommender.ranking(), Ranking::Similarity);
    }

    #[test]
    fn test_rating_ranking_ignores_similarity() {
        let catalog = vec![
            movie("Broad", &["Drama", "Romance", "War"], 9.5, 120, AgeRating::ThirteenPlus),
            movie("Focused", &["Drama"], 8.0, 120, AgeRating::ThirteenPlus),
        ];
        let recommender = Recommender::new(
            Catalog::new(catalog).unwrap(),
            Ranking::Rating,
            RuntimeTable::default(),
        );
        let query = PreferenceQuery::new(&["drama"], RuntimeBucket::Medium, 14);

        let result = recommender.recommend(&query, 5, 0.0);
        assert_eq!(titles(&result), vec!["Broad", "Focused"]);
        assert_eq!(recommender.ranking(), Ranking::Rating);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let catalog = vec![
            movie("One", &["Action"], 8.0, 100, AgeRating::TenPlus),
            movie("Two", &["Action"], 8.0, 100, AgeRating::TenPlus),
            movie("Three", &["Action", "Comedy"], 8.0, 100, AgeRating::All),
        ];
        let recommender = Recommender::new(
            Catalog::new(catalog).unwrap(),
            Ranking::Similarity,
            RuntimeTable::default(),
        );
        let query = PreferenceQuery::new(&["action"], RuntimeBucket::Medium, 11);

        let first = titles(&recommender.recommend(&query, 5, 0.0));
        let second = titles(&recommender.recommend(&query, 5, 0.0));
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_older_viewer_never_loses_results() {
        let catalog = vec![
            movie("Kids", &["Animation"], 8.0, 100, AgeRating::All),
            movie("Tween", &["Animation"], 8.1, 100, AgeRating::TenPlus),
            movie("Teen", &["Animation"], 8.2, 100, AgeRating::ThirteenPlus),
            movie("Adult", &["Animation"], 8.3, 100, AgeRating::SeventeenPlus),
        ];
        let options = ScoreOptions {
            top_n: 10,
            ..ScoreOptions::default()
        };

        let mut previous: Vec<String> = Vec::new();
        for age in [0, 9, 10, 12, 13, 16, 17, 40] {
            let query = PreferenceQuery::new::<&str>(&[], RuntimeBucket::Medium, age);
            let current = titles(&score(&catalog, &query, None, &options));
            assert!(previous.iter().all(|t| current.contains(t)), "age {}", age);
            previous = current;
        }
        assert_eq!(previous.len(), 4);
    }

    #[test]
    fn test_mismatched_index_falls_back_to_rating() {
        let catalog = example_catalog();
        let index = SimilarityIndex::fit(&["drama medium 17+"]);
        let query = PreferenceQuery::new::<&str>(&[], RuntimeBucket::Medium, 30);

        let result = score(&catalog, &query, Some(&index), &ScoreOptions::default());
        assert_eq!(titles(&result), vec!["A", "B"]);
    }
}
