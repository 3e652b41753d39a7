pub mod extractor;
pub mod validation;
