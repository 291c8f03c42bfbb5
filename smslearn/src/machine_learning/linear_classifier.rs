// linear_classifier.rs
pub mod classifier_error;
pub mod cost;
pub mod gradient_descent;
pub mod hypothesis;
pub mod logistic_regression;

/// Label of a negative (ham) prediction.
pub const HAM: u8 = 0;
/// Label of a positive (spam) prediction.
pub const SPAM: u8 = 1;
