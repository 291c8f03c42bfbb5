// text.rs
pub mod count_vectorizer;
pub mod normalizer;
