use serde_json::Error as SerdeError;
use std::io::Error as IOError;

use super::linear_classifier::classifier_error::ClassifierError;

#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("Couldn't parse line {line}: {message}")]
    ParseError { line: usize, message: String },
    #[error("Unknown label `{label}` on line {line}. Expected `ham` or `spam`.")]
    UnknownLabel { line: usize, label: String },
    #[error("Requested {requested} examples for {purpose} but only {available} are available.")]
    InsufficientData {
        purpose: &'static str,
        requested: usize,
        available: usize,
    },
    #[error("Invalid configuration `{name}` with value {value}: {reason}.")]
    InvalidConfig {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("The vectorizer has no vocabulary. Call `fit_vectorize` first.")]
    NotFitted,
    #[error("None of the {documents} training documents contains a token, the vocabulary would be empty.")]
    EmptyVocabulary { documents: usize },
    #[error(transparent)]
    ClassifierError(#[from] ClassifierError),
    #[error("Couldn't serialize the model: {0}")]
    ModelSerializationError(#[from] SerdeError),
    #[error("IO error: {0}")]
    IOError(#[from] IOError),
}

pub type DataResult<T> = std::result::Result<T, DataError>;
