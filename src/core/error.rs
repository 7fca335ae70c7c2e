//! Typed error handling for the vendor portal
//!
//! Handlers mostly log remote failures and fall back to a default view, so
//! these errors surface to callers only where a request cannot be answered
//! meaningfully: configuration problems at startup, JSON endpoints, and
//! downloads.
//!
//! # Error Categories
//!
//! - [`ErpError`]: transport, status and SOAP fault errors from the ERP backend
//! - [`ConfigError`]: configuration parsing and validation
//! - [`ValidationError`]: rejected user input
//! - [`UploadError`]: rejected or unreadable file uploads

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for the portal
#[derive(Debug, Error)]
pub enum PortalError {
    /// ERP backend errors
    #[error(transparent)]
    Erp(#[from] ErpError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Upload errors
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Template rendering failed
    #[error("Failed to render page '{template}': {message}")]
    Render { template: String, message: String },
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl PortalError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PortalError::Erp(e) => e.status_code(),
            PortalError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PortalError::Validation(_) => StatusCode::BAD_REQUEST,
            PortalError::Upload(e) => e.status_code(),
            PortalError::Render { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            PortalError::Erp(e) => e.error_code(),
            PortalError::Config(_) => "CONFIG_ERROR",
            PortalError::Validation(_) => "VALIDATION_ERROR",
            PortalError::Upload(e) => e.error_code(),
            PortalError::Render { .. } => "RENDER_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            PortalError::Erp(ErpError::Status { status, url, .. }) => Some(serde_json::json!({
                "status": status,
                "url": url
            })),
            PortalError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// ERP Errors
// =============================================================================

/// Errors raised while talking to the ERP backend
#[derive(Debug, Error)]
pub enum ErpError {
    /// The request never produced a response (DNS, TLS, timeout, ...)
    #[error("ERP request to '{url}' failed: {message}")]
    Transport { url: String, message: String },

    /// The backend answered with a non-success status
    #[error("ERP request to '{url}' returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected shape
    #[error("Failed to decode ERP response from '{url}': {message}")]
    Decode { url: String, message: String },

    /// The SOAP service returned a fault
    #[error("SOAP fault from {operation}: {fault}")]
    SoapFault { operation: String, fault: String },

    /// The SOAP response lacked a required element
    #[error("SOAP response from {operation} is missing '{element}'")]
    MissingElement { operation: String, element: String },
}

impl ErpError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErpError::Status { status: 404, .. } => StatusCode::NOT_FOUND,
            ErpError::Transport { .. } => StatusCode::BAD_GATEWAY,
            ErpError::Status { .. } => StatusCode::BAD_GATEWAY,
            ErpError::Decode { .. } => StatusCode::BAD_GATEWAY,
            ErpError::SoapFault { .. } => StatusCode::BAD_GATEWAY,
            ErpError::MissingElement { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ErpError::Transport { .. } => "ERP_UNREACHABLE",
            ErpError::Status { .. } => "ERP_STATUS",
            ErpError::Decode { .. } => "ERP_DECODE",
            ErpError::SoapFault { .. } => "ERP_SOAP_FAULT",
            ErpError::MissingElement { .. } => "ERP_SOAP_MISSING_ELEMENT",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse config{}: {message}", .file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Missing required field in configuration
    #[error("Missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Multiple field validation errors
    #[error("Validation errors: {}", .0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect::<Vec<_>>().join(", "))]
    FieldErrors(Vec<FieldValidationError>),

    /// Request body could not be parsed
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// Flatten `validator` output into field errors, keeping the declared messages
    pub fn from_validator(errors: &validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| FieldValidationError {
                    field: field.to_string(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }

    /// Messages suitable for a page's validation summary
    pub fn messages(&self) -> Vec<String> {
        match self {
            ValidationError::FieldErrors(errors) => {
                errors.iter().map(|e| e.message.clone()).collect()
            }
            other => vec![other.to_string()],
        }
    }
}

// =============================================================================
// Upload Errors
// =============================================================================

/// Errors related to uploaded files
#[derive(Debug, Error)]
pub enum UploadError {
    /// No file part, or an empty one
    #[error("Please select a file to upload.")]
    Missing,

    /// File exceeds the configured limit
    #[error("{message}")]
    TooLarge {
        size: usize,
        limit: usize,
        message: String,
    },

    /// Extension not in the allowed list
    #[error("Only {allowed} files are allowed.")]
    Extension { allowed: String },

    /// File name is empty or tries to leave the target directory
    #[error("Invalid file name '{name}'")]
    InvalidName { name: String },

    /// Multipart stream could not be read
    #[error("Failed to read upload: {message}")]
    Malformed { message: String },

    /// Saving the file to disk failed
    #[error("Failed to store upload: {message}")]
    Storage { message: String },
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::Missing => "UPLOAD_MISSING",
            UploadError::TooLarge { .. } => "UPLOAD_TOO_LARGE",
            UploadError::Extension { .. } => "UPLOAD_EXTENSION",
            UploadError::InvalidName { .. } => "UPLOAD_INVALID_NAME",
            UploadError::Malformed { .. } => "UPLOAD_MALFORMED",
            UploadError::Storage { .. } => "UPLOAD_STORAGE",
        }
    }
}

/// Result type alias for portal operations
pub type PortalResult<T> = Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erp_status_maps_to_bad_gateway() {
        let err = PortalError::Erp(ErpError::Status {
            url: "http://erp/JobPostingAPI".into(),
            status: 500,
            body: "boom".into(),
        });

        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), "ERP_STATUS");

        let response = err.to_response();
        assert_eq!(response.code, "ERP_STATUS");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_erp_not_found_is_preserved() {
        let err = PortalError::from(ErpError::Status {
            url: "http://erp/TenderDocumentsAPI(x)".into(),
            status: 404,
            body: String::new(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_config_parse_error_message() {
        let with_file = ConfigError::ParseError {
            file: Some("portal.yaml".into()),
            message: "bad indent".into(),
        };
        assert_eq!(
            with_file.to_string(),
            "Failed to parse config file 'portal.yaml': bad indent"
        );

        let without_file = ConfigError::ParseError {
            file: None,
            message: "bad indent".into(),
        };
        assert_eq!(
            without_file.to_string(),
            "Failed to parse config: bad indent"
        );
    }

    #[test]
    fn test_upload_errors() {
        let missing = PortalError::from(UploadError::Missing);
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.to_string(), "Please select a file to upload.");

        let large = PortalError::from(UploadError::TooLarge {
            size: 11,
            limit: 10,
            message: "File size exceeds maximum limit of 10MB.".into(),
        });
        assert_eq!(large.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(large.error_code(), "UPLOAD_TOO_LARGE");
    }

    #[test]
    fn test_field_errors_messages() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError {
                field: "email".into(),
                message: "The Email field is required.".into(),
            },
            FieldValidationError {
                field: "password".into(),
                message: "The Password field is required.".into(),
            },
        ]);
        assert_eq!(err.messages().len(), 2);
        assert!(
            err.to_string()
                .contains("email: The Email field is required.")
        );
    }
}
