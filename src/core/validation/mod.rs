//! Input validation and filtering
//!
//! Form structs declare their rules with `validator`; uploads go through the
//! closure validators in [`validators`] after their names pass [`filters`].

pub mod extractor;
pub mod filters;
pub mod validators;

pub use extractor::Validated;
pub use validators::{QuoteRejection, validate_quote, validate_quote_batch};
