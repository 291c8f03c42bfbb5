// count_vectorizer.rs

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalizer::{normalize, tokenize};
use crate::machine_learning::data_error::{DataError, DataResult};

pub type Normalizer = fn(&str) -> String;

/// Bag-of-words encoder: a ranked vocabulary and per-document word counts.
///
/// Only the vocabulary is serialized. A deserialized vectorizer uses [`normalize`].
#[derive(Serialize, Deserialize, Clone)]
#[serde(from = "SavedVectorizer", into = "SavedVectorizer")]
pub struct CountVectorizer {
    max_vocabulary_size: usize,
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    normalizer: Normalizer,
}

#[derive(Serialize, Deserialize)]
struct SavedVectorizer {
    max_vocabulary_size: usize,
    vocabulary: Vec<String>,
}

impl From<SavedVectorizer> for CountVectorizer {
    fn from(value: SavedVectorizer) -> Self {
        let mut vectorizer = CountVectorizer::new(value.max_vocabulary_size, normalize);
        vectorizer.set_vocabulary(value.vocabulary);
        vectorizer
    }
}

impl From<CountVectorizer> for SavedVectorizer {
    fn from(value: CountVectorizer) -> Self {
        SavedVectorizer {
            max_vocabulary_size: value.max_vocabulary_size,
            vocabulary: value.vocabulary,
        }
    }
}

impl std::fmt::Debug for CountVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountVectorizer")
            .field("max_vocabulary_size", &self.max_vocabulary_size)
            .field("vocabulary", &self.vocabulary)
            .finish_non_exhaustive()
    }
}

impl CountVectorizer {
    pub fn new(max_vocabulary_size: usize, normalizer: Normalizer) -> Self {
        CountVectorizer {
            max_vocabulary_size,
            vocabulary: Vec::new(),
            index: HashMap::new(),
            normalizer,
        }
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    fn set_vocabulary(&mut self, vocabulary: Vec<String>) {
        self.index = vocabulary
            .iter()
            .enumerate()
            .map(|(i, word)| (word.clone(), i))
            .collect();
        self.vocabulary = vocabulary;
    }

    /// Builds the vocabulary from `documents` and returns their count rows.
    ///
    /// The vocabulary holds the most frequent tokens over the whole corpus, ties going
    /// to the token seen first. Column `j` of every row counts `vocabulary()[j]`.
    pub fn fit_vectorize<S: AsRef<str>>(
        &mut self,
        documents: &[S],
    ) -> DataResult<Vec<Vec<f64>>> {
        if self.max_vocabulary_size == 0 {
            return Err(DataError::InvalidConfig {
                name: "max_vocabulary_size",
                value: self.max_vocabulary_size.to_string(),
                reason: "must be at least 1",
            });
        }
        let normalized: Vec<String> = documents
            .iter()
            .map(|document| (self.normalizer)(document.as_ref()))
            .collect();

        // token -> (count, first position)
        let mut word_counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (position, token) in normalized.iter().flat_map(|doc| tokenize(doc)).enumerate() {
            word_counts.entry(token).or_insert((0, position)).0 += 1;
        }
        let distinct_words = word_counts.len();
        if distinct_words == 0 {
            return Err(DataError::EmptyVocabulary {
                documents: documents.len(),
            });
        }
        let vocabulary = word_counts
            .into_iter()
            .sorted_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
                count_b.cmp(count_a).then(first_a.cmp(first_b))
            })
            .take(self.max_vocabulary_size)
            .map(|(word, _)| word.to_string())
            .collect();
        self.set_vocabulary(vocabulary);
        debug!(
            "Fitted vocabulary of {} words out of {distinct_words} distinct words in {} documents.",
            self.vocabulary.len(),
            documents.len()
        );

        Ok(normalized
            .iter()
            .map(|document| self.count_normalized(document))
            .collect())
    }

    /// Count row of one new document. Words outside the vocabulary are ignored.
    pub fn transform(&self, document: &str) -> DataResult<Vec<f64>> {
        if !self.is_fitted() {
            return Err(DataError::NotFitted);
        }
        Ok(self.count_normalized(&(self.normalizer)(document)))
    }

    pub fn transform_all<S: AsRef<str>>(&self, documents: &[S]) -> DataResult<Vec<Vec<f64>>> {
        documents
            .iter()
            .map(|document| self.transform(document.as_ref()))
            .collect()
    }

    fn count_normalized(&self, normalized: &str) -> Vec<f64> {
        let mut counts = vec![0.0; self.vocabulary.len()];
        for token in tokenize(normalized) {
            if let Some(&j) = self.index.get(token) {
                counts[j] += 1.0;
            }
        }
        counts
    }
}

/// Fits a fresh vectorizer and returns the count matrix and the ordered vocabulary.
pub fn fit_vectorize<S: AsRef<str>>(
    documents: &[S],
    max_vocabulary_size: usize,
    normalizer: Normalizer,
) -> DataResult<(Vec<Vec<f64>>, Vec<String>)> {
    let mut vectorizer = CountVectorizer::new(max_vocabulary_size, normalizer);
    let counts = vectorizer.fit_vectorize(documents)?;
    Ok((counts, vectorizer.vocabulary))
}
