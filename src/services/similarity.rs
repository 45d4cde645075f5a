//! TF-IDF bag-of-words similarity over short feature strings.
//!
//! Each catalog record is described by a feature string built from its genres,
//! runtime bucket and age tag. Queries are described the same way and compared
//! against every record with cosine similarity.

use std::collections::{BTreeMap, HashMap, HashSet};

use stop_words::LANGUAGE;

use crate::models::{AgeRating, RuntimeBucket};

const RUNTIME_TOKENS: [RuntimeBucket; 3] =
    [RuntimeBucket::Short, RuntimeBucket::Medium, RuntimeBucket::Long];

/// Sparse, L2-normalised term vector keyed by vocabulary index
type SparseVector = BTreeMap<usize, f64>;

/// Builds the feature string for a set of genres, a runtime bucket and an age tag
pub fn feature_text<S: AsRef<str>>(
    genres: &[S],
    runtime: RuntimeBucket,
    age: AgeRating,
) -> String {
    let mut parts: Vec<String> = genres.iter().map(|g| g.as_ref().to_lowercase()).collect();
    parts.push(runtime.as_str().to_string());
    parts.push(age.as_str().to_string());
    parts.join(" ")
}

/// English stop words, minus the runtime bucket names which carry signal here
fn english_stop_words() -> HashSet<String> {
    stop_words::get(LANGUAGE::English)
        .iter()
        .map(|word| word.to_string().to_lowercase())
        .filter(|word| !RUNTIME_TOKENS.iter().any(|bucket| bucket.as_str() == word))
        .collect()
}

/// Splits text into lowercase tokens of at least two alphanumeric characters
fn tokenize(text: &str, stop_words: &HashSet<String>) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_lowercase)
        .filter(|token| !stop_words.contains(token))
        .collect()
}

/// Fitted TF-IDF model plus the vectors of the documents it was fitted on
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    documents: Vec<SparseVector>,
    stop_words: HashSet<String>,
}

impl SimilarityIndex {
    /// Fits the vocabulary and smoothed idf weights on `documents`
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let stop_words = english_stop_words();
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|d| tokenize(d.as_ref(), &stop_words))
            .collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        for tokens in &tokenized {
            let mut seen: Vec<usize> = Vec::new();
            for token in tokens {
                let next_index = vocabulary.len();
                let index = *vocabulary.entry(token.clone()).or_insert(next_index);
                if index == document_frequency.len() {
                    document_frequency.push(0);
                }
                if !seen.contains(&index) {
                    seen.push(index);
                    document_frequency[index] += 1;
                }
            }
        }

        // Smoothed idf: ln((1 + n) / (1 + df)) + 1
        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let mut index = Self {
            vocabulary,
            idf,
            documents: Vec::with_capacity(tokenized.len()),
            stop_words,
        };
        let documents: Vec<SparseVector> = tokenized
            .iter()
            .map(|tokens| index.vectorize(tokens))
            .collect();
        index.documents = documents;
        index
    }

    /// Number of documents the index was fitted on
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Cosine similarity of `query` against every fitted document, in fit order
    pub fn similarities(&self, query: &str) -> Vec<f64> {
        let query_vector = self.vectorize(&tokenize(query, &self.stop_words));
        self.documents
            .iter()
            .map(|document| cosine(&query_vector, document))
            .collect()
    }

    /// Term counts weighted by idf and L2-normalised. Out-of-vocabulary tokens are dropped.
    fn vectorize(&self, tokens: &[String]) -> SparseVector {
        let mut vector = SparseVector::new();
        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                *vector.entry(index).or_insert(0.0) += self.idf[index];
            }
        }

        let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in vector.values_mut() {
                *weight /= norm;
            }
        }
        vector
    }
}

/// Dot product of two normalised vectors
fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(index, weight)| large.get(index).map(|other| weight * other))
        .sum()
}
