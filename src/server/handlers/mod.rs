//! HTTP handlers, one module per portal area
//!
//! Page handlers log remote failures and fall back to an empty model; JSON
//! handlers answer with an [`ActionResult`] carrying the failure message.

pub mod account;
pub mod home;
pub mod job;
pub mod profile;
pub mod requisition;
pub mod rfq;
pub mod tender;

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::core::validation::filters::{content_type_for, download_name};
use crate::core::{AuthContext, FileDownload, Identity};
use crate::server::host::{PageFlash, PortalHost};

pub const LOGIN_PATH: &str = "/Account/Login";
pub const HOME_PATH: &str = "/Home/Index";

// =============================================================================
// Extractors
// =============================================================================

/// Whoever is making the request, signed in or not
#[derive(Debug, Clone)]
pub struct Viewer {
    pub auth: AuthContext,
    pub flash: PageFlash,
}

impl FromRequestParts<PortalHost> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        host: &PortalHost,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self {
            auth: host.session.authenticate(&parts.headers, Utc::now()),
            flash: read_flash(parts, host),
        })
    }
}

/// A signed-in user; anonymous requests are sent to the login page
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: Identity,
    pub flash: PageFlash,
}

impl CurrentUser {
    pub fn email(&self) -> &str {
        &self.identity.email
    }

    /// Show `message` as an error banner on the page being rendered
    pub fn flash_error(&mut self, message: impl Into<String>) {
        self.flash.messages.error = Some(message.into());
    }
}

impl FromRequestParts<PortalHost> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        host: &PortalHost,
    ) -> Result<Self, Self::Rejection> {
        match host.session.authenticate(&parts.headers, Utc::now()) {
            AuthContext::User(identity) => Ok(Self {
                identity,
                flash: read_flash(parts, host),
            }),
            AuthContext::Anonymous => {
                tracing::debug!(path = %parts.uri.path(), "anonymous request redirected to login");
                Err(Redirect::to(LOGIN_PATH))
            }
        }
    }
}

fn read_flash(parts: &Parts, host: &PortalHost) -> PageFlash {
    PageFlash {
        messages: host.session.read_flash(&parts.headers),
        pending: host.session.has_flash(&parts.headers),
    }
}

// =============================================================================
// JSON results
// =============================================================================

/// `{success, message, documentNo, ...}` answer of the JSON endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_items: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_vat_items: Option<Vec<String>>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn done(message: impl Into<String>, document_no: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            document_no: Some(document_no.into()),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// 200 on success, 400 otherwise
    pub fn into_status_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        };
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for ActionResult {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Vendor number of the signed-in user, `None` when none is assigned
pub async fn vendor_no(host: &PortalHost, email: &str) -> Option<String> {
    match host.services.auth.vendor_no_by_email(email).await {
        Ok(vendor_no) => Some(vendor_no),
        Err(e) => {
            tracing::warn!(user = email, error = %e, "no vendor assigned to user");
            None
        }
    }
}

/// Attachment response; `content_type` is reduced to its media type
pub fn file_response(bytes: Vec<u8>, content_type: &str, file_name: &str) -> Response {
    let media_type = content_type.split(';').next().unwrap_or_default().trim();
    let media_type = if media_type.is_empty() {
        "application/octet-stream"
    } else {
        media_type
    };

    let disposition = format!("attachment; filename=\"{}\"", file_name.replace('"', ""));
    let mut response = bytes.into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(media_type) {
        headers.insert(CONTENT_TYPE, value);
    }
    match HeaderValue::from_str(&disposition) {
        Ok(value) => {
            headers.insert(CONTENT_DISPOSITION, value);
        }
        Err(_) => {
            headers.insert(CONTENT_DISPOSITION, HeaderValue::from_static("attachment"));
        }
    }
    response
}

/// Response for a backend download, typed by the backend or by extension
pub fn download_response(file: FileDownload) -> Response {
    let name = download_name(&file.file_name, &file.file_extension);
    let content_type = file
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or_default().trim())
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| content_type_for(&file.file_extension))
        .to_string();
    file_response(file.bytes, &content_type, &name)
}

pub fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_result_shape() {
        let body = serde_json::to_value(ActionResult::done("Quote submitted successfully", "RFQ-1"))
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": true,
                "message": "Quote submitted successfully",
                "documentNo": "RFQ-1"
            })
        );

        let body = serde_json::to_value(ActionResult::ok()).unwrap();
        assert_eq!(body, serde_json::json!({"success": true}));
    }

    #[test]
    fn test_failed_action_is_bad_request() {
        let response = ActionResult::failed("nope").into_status_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_download_prefers_backend_media_type() {
        let response = download_response(FileDownload {
            bytes: b"x".to_vec(),
            content_type: Some("application/pdf; charset=binary".into()),
            file_name: "bid".into(),
            file_extension: "pdf".into(),
        });
        assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"bid.pdf\""
        );
    }

    #[test]
    fn test_download_falls_back_to_extension() {
        let response = download_response(FileDownload {
            bytes: Vec::new(),
            content_type: None,
            file_name: "sheet".into(),
            file_extension: "xlsx".into(),
        });
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }
}
