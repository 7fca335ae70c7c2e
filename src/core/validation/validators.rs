//! Reusable upload validators and the quote submission rules
//!
//! Upload validators are closures over the file name and bytes, built once
//! per route and applied in order.

use crate::core::error::UploadError;
use crate::core::validation::filters::extension_of;
use crate::models::rfq::QuoteSubmission;

/// One mebibyte
pub const MIB: usize = 1024 * 1024;

/// Limit for tender and requisition documents
pub const DOCUMENT_LIMIT: usize = 10 * MIB;

/// Limit for profile pictures
pub const PICTURE_LIMIT: usize = 5 * MIB;

/// Limit for job application resumes
pub const RESUME_LIMIT: usize = 5 * MIB;

/// Extensions accepted for resumes
pub const RESUME_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];

/// Validator: file must not exceed `limit` bytes
pub fn max_file_size(
    limit: usize,
    message: &'static str,
) -> impl Fn(&str, &[u8]) -> Result<(), UploadError> + Send + Sync + Clone {
    move |_: &str, bytes: &[u8]| {
        if bytes.len() > limit {
            Err(UploadError::TooLarge {
                size: bytes.len(),
                limit,
                message: message.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Validator: file name must end in one of `allowed` (case-insensitive)
pub fn allowed_extensions(
    allowed: &'static [&'static str],
) -> impl Fn(&str, &[u8]) -> Result<(), UploadError> + Send + Sync + Clone {
    move |file_name: &str, _: &[u8]| {
        let extension = extension_of(file_name).to_ascii_lowercase();
        if allowed.iter().any(|a| a.eq_ignore_ascii_case(&extension)) {
            Ok(())
        } else {
            Err(UploadError::Extension {
                allowed: allowed.join(", "),
            })
        }
    }
}

/// Why a quote batch was refused
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteRejection {
    /// Nothing was submitted
    Empty,

    /// Lines missing an item number, price or quantity
    InvalidItems(Vec<String>),

    /// Vatable lines without a VAT percentage
    InvalidVat(Vec<String>),
}

impl QuoteRejection {
    pub fn message(&self) -> &'static str {
        match self {
            QuoteRejection::Empty => "No quotes were submitted.",
            QuoteRejection::InvalidItems(_) => {
                "Invalid quotes detected. Please ensure all items have valid Item No, Unit Cost (> 0), and Quantity (> 0)."
            }
            QuoteRejection::InvalidVat(_) => {
                "VAT percentage must be greater than zero for Vatable items."
            }
        }
    }
}

/// Rules for a single quote, first failure wins
pub fn validate_quote(quote: &QuoteSubmission) -> Result<(), &'static str> {
    if quote.item_no.is_empty() {
        return Err("Item number is required");
    }
    if quote.unit_cost <= 0.0 {
        return Err("Unit cost must be greater than zero");
    }
    if quote.is_vatable() && quote.vat_percentage <= 0.0 {
        return Err("VAT percentage must be greater than zero for Vatable items");
    }
    if quote.quantity <= 0.0 {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

/// Rules for a batch: basic fields across every line first, then VAT
pub fn validate_quote_batch(quotes: &[QuoteSubmission]) -> Result<(), QuoteRejection> {
    if quotes.is_empty() {
        return Err(QuoteRejection::Empty);
    }

    let invalid: Vec<String> = quotes
        .iter()
        .filter(|q| q.item_no.is_empty() || q.unit_cost <= 0.0 || q.quantity <= 0.0)
        .map(|q| q.item_no.clone())
        .collect();
    if !invalid.is_empty() {
        return Err(QuoteRejection::InvalidItems(invalid));
    }

    let invalid_vat: Vec<String> = quotes
        .iter()
        .filter(|q| q.is_vatable() && q.vat_percentage <= 0.0)
        .map(|q| q.item_no.clone())
        .collect();
    if !invalid_vat.is_empty() {
        return Err(QuoteRejection::InvalidVat(invalid_vat));
    }

    Ok(())
}
