pub mod rules;
pub mod validator;

pub use rules::{ArtifactUnderReview, ValidationRule};
pub use validator::Validator;
