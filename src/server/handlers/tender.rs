//! Tender list, downloads and vendor response documents

use axum::Form;
use axum::extract::{Query, State};
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Local;
use serde::{Deserialize, Serialize};

use super::{ActionResult, CurrentUser, download_response, file_response, not_found, vendor_no};
use crate::core::Flash;
use crate::core::status::TenderCounts;
use crate::core::validation::filters::{download_name, final_component};
use crate::core::validation::validators::{DOCUMENT_LIMIT, max_file_size};
use crate::models::{Tender, TenderAttachment, TenderDocument, TenderUpload};
use crate::server::host::PortalHost;
use crate::server::uploads::MultipartForm;
use crate::server::views::Page;

pub const TENDER_INDEX: &str = "/Tender/Index";
const INDEX_PAGE: &str = "tender/index.html";
const UPLOAD_PAGE: &str = "tender/upload.html";

const NO_VENDOR: &str = "Your account is not associated with a vendor. Please contact support.";
const DOWNLOAD_FAILED: &str = "An error occurred while downloading the document. Please try again.";

#[derive(Debug, Default, Serialize)]
struct TenderListModel {
    tenders: Vec<Tender>,
    current_vendor_no: String,
    counts: TenderCounts,
}

/// Upload form, also re-rendered when an upload is refused
#[derive(Debug, Clone, Serialize)]
struct UploadModel {
    tender_id: String,
    tender_no: String,
    description: String,
    status: String,
    vendor_no: String,
    document_type: String,
    security_level: String,
    is_encrypted: bool,
    existing_documents: Vec<TenderDocument>,
}

impl UploadModel {
    fn from_form(form: &MultipartForm) -> Self {
        Self {
            tender_id: form.text_or("TenderId", ""),
            tender_no: form.text_or("TenderNo", ""),
            description: form.text_or("Description", ""),
            status: form.text_or("Status", ""),
            vendor_no: form.text_or("VendorNo", ""),
            document_type: form.text_or("DocumentType", "Other"),
            security_level: form.text_or("SecurityLevel", "Internal"),
            is_encrypted: form.flag("IsEncrypted"),
            existing_documents: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentQuery {
    pub attachment_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    pub tender_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQuery {
    pub document_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDocumentForm {
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub tender_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAttachmentForm {
    #[serde(default)]
    pub attachment_id: String,
    #[serde(default)]
    pub tender_id: String,
}

pub async fn index(State(host): State<PortalHost>, mut user: CurrentUser) -> Response {
    let mut model = TenderListModel::default();

    let vendor = vendor_no(&host, user.email()).await;
    match vendor {
        None => user.flash_error(NO_VENDOR),
        Some(vendor_no) => {
            match host.services.tenders.published_tenders(&vendor_no).await {
                Ok(tenders) => {
                    let (open, closed, awarded) = host
                        .services
                        .tenders
                        .counts_by_status(&vendor_no)
                        .await
                        .unwrap_or_default();
                    model = TenderListModel {
                        tenders,
                        current_vendor_no: vendor_no,
                        counts: TenderCounts {
                            open,
                            closed,
                            awarded,
                        },
                    };
                }
                Err(e) => {
                    tracing::error!(vendor_no = %vendor_no, error = %e, "failed to load tenders");
                    user.flash_error("An error occurred while loading tenders. Please try again later.");
                }
            }
        }
    }

    let page = Page::new(INDEX_PAGE).with("model", &model);
    host.render(page, Some(user.email()), &user.flash).await
}

/// First attachment published with a tender
pub async fn download(
    State(host): State<PortalHost>,
    _user: CurrentUser,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let Some(id) = query.id.filter(|id| !id.is_empty()) else {
        return not_found();
    };

    let tender = match host.services.tenders.tender(&id).await {
        Ok(tender) => tender,
        Err(e) => {
            tracing::error!(tender_id = %id, error = %e, "failed to read tender");
            return host.redirect_with(TENDER_INDEX, Flash::error(DOWNLOAD_FAILED));
        }
    };

    let Some(attachment) = tender.and_then(|t| t.attachments.into_iter().next()) else {
        return not_found();
    };

    match decode_attachment(&attachment) {
        Ok(bytes) => file_response(
            bytes,
            "application/octet-stream",
            &download_name(&attachment.file_name, &attachment.file_extension),
        ),
        Err(e) => {
            tracing::error!(tender_id = %id, error = %e, "attachment content is not base64");
            host.redirect_with(TENDER_INDEX, Flash::error(DOWNLOAD_FAILED))
        }
    }
}

pub async fn download_attachment(
    State(host): State<PortalHost>,
    _user: CurrentUser,
    Query(query): Query<AttachmentQuery>,
) -> Response {
    const FAILED: &str = "An error occurred while downloading the attachment. Please try again.";

    let Some(id) = query.attachment_id.filter(|id| !id.is_empty()) else {
        return not_found();
    };

    let attachment = match host.services.tenders.attachment(&id).await {
        Ok(Some(attachment)) if !attachment.file_content.is_empty() => attachment,
        Ok(_) => return not_found(),
        Err(e) => {
            tracing::error!(attachment_id = %id, error = %e, "failed to read attachment");
            return host.redirect_with(TENDER_INDEX, Flash::error(FAILED));
        }
    };

    match decode_attachment(&attachment) {
        Ok(bytes) => file_response(
            bytes,
            "application/octet-stream",
            &download_name(&attachment.file_name, &attachment.file_extension),
        ),
        Err(e) => {
            tracing::error!(attachment_id = %id, error = %e, "attachment content is not base64");
            host.redirect_with(TENDER_INDEX, Flash::error(FAILED))
        }
    }
}

fn decode_attachment(attachment: &TenderAttachment) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(attachment.file_content.trim())
}

pub async fn upload_page(
    State(host): State<PortalHost>,
    user: CurrentUser,
    Query(query): Query<UploadQuery>,
) -> Response {
    let Some(vendor_no) = vendor_no(&host, user.email()).await else {
        return host.redirect_with(TENDER_INDEX, Flash::error(NO_VENDOR));
    };
    let tender_id = query.tender_id.unwrap_or_default();

    let tender = match host.services.tenders.tender(&tender_id).await {
        Ok(Some(tender)) => tender,
        Ok(None) => {
            return host.redirect_with(
                TENDER_INDEX,
                Flash::error("The requested tender was not found."),
            );
        }
        Err(e) => {
            tracing::error!(tender_id = %tender_id, error = %e, "failed to load tender");
            return host.redirect_with(
                TENDER_INDEX,
                Flash::error(format!("Error loading tender: {}", e)),
            );
        }
    };

    if !tender.is_open_on(Local::now().date_naive()) {
        return host.redirect_with(
            TENDER_INDEX,
            Flash::error("This tender has already closed and no longer accepts submissions."),
        );
    }

    let existing_documents = host
        .services
        .tenders
        .documents(&tender_id, &vendor_no)
        .await
        .unwrap_or_default();

    let model = UploadModel {
        tender_id,
        tender_no: tender.tender_no,
        description: tender.description,
        status: tender.status,
        vendor_no,
        document_type: "Other".to_string(),
        security_level: "Internal".to_string(),
        is_encrypted: false,
        existing_documents,
    };
    let page = Page::new(UPLOAD_PAGE).with("model", &model);
    host.render(page, Some(user.email()), &user.flash).await
}

pub async fn upload(
    State(host): State<PortalHost>,
    user: CurrentUser,
    form: MultipartForm,
) -> Response {
    let mut model = UploadModel::from_form(&form);

    // The vendor comes from the session, never from the posted form
    let Some(vendor_no) = vendor_no(&host, user.email()).await else {
        return host.redirect_with(TENDER_INDEX, Flash::error(NO_VENDOR));
    };
    model.vendor_no = vendor_no.clone();
    model.existing_documents = host
        .services
        .tenders
        .documents(&model.tender_id, &vendor_no)
        .await
        .unwrap_or_default();

    let Some(file) = form.file("DocumentFile").filter(|f| !f.is_empty()) else {
        return refuse(&host, &user, &model, "Please select a file to upload.").await;
    };
    let within_limit = max_file_size(DOCUMENT_LIMIT, "File size exceeds maximum limit of 10MB.");
    if let Err(e) = within_limit(&file.file_name, &file.bytes) {
        return refuse(&host, &user, &model, &e.to_string()).await;
    }

    let upload = TenderUpload {
        tender_no: model.tender_no.clone(),
        file_name: final_component(&file.file_name).to_string(),
        content: file.bytes.clone(),
        document_type: model.document_type.clone(),
        security_level: model.security_level.clone(),
        is_encrypted: model.is_encrypted,
        vendor_no,
        uploaded_by: Some(user.email().to_string()),
    };

    match host.services.tenders.upload_document(&upload).await {
        Ok(true) => {
            tracing::info!(tender_no = %upload.tender_no, file = %upload.file_name, "tender document uploaded");
            host.redirect_with(TENDER_INDEX, Flash::success("Document uploaded successfully!"))
        }
        Ok(false) => {
            refuse(&host, &user, &model, "Failed to upload document. Please try again.").await
        }
        Err(e) => {
            tracing::error!(tender_no = %upload.tender_no, error = %e, "tender document upload failed");
            refuse(&host, &user, &model, &e.to_string()).await
        }
    }
}

async fn refuse(host: &PortalHost, user: &CurrentUser, model: &UploadModel, message: &str) -> Response {
    let page = Page::new(UPLOAD_PAGE).with("model", model).error(message);
    host.render(page, Some(user.email()), &user.flash).await
}

pub async fn delete_document(
    State(host): State<PortalHost>,
    _user: CurrentUser,
    Form(form): Form<DeleteDocumentForm>,
) -> ActionResult {
    match host.services.tenders.delete_document(&form.document_id).await {
        Ok(true) => {
            tracing::info!(document_id = %form.document_id, tender_id = %form.tender_id, "tender document deleted");
            ActionResult::ok()
        }
        Ok(false) => ActionResult::failed("Failed to delete document."),
        Err(e) => ActionResult::failed(e.to_string()),
    }
}

pub async fn delete_attachment(
    State(host): State<PortalHost>,
    _user: CurrentUser,
    Form(form): Form<DeleteAttachmentForm>,
) -> ActionResult {
    match host.services.tenders.delete_attachment(&form.attachment_id).await {
        Ok(true) => {
            tracing::info!(attachment_id = %form.attachment_id, tender_id = %form.tender_id, "tender attachment deleted");
            ActionResult::ok()
        }
        Ok(false) => ActionResult::failed("Failed to delete attachment."),
        Err(e) => ActionResult::failed(e.to_string()),
    }
}

pub async fn download_document(
    State(host): State<PortalHost>,
    _user: CurrentUser,
    Query(query): Query<DocumentQuery>,
) -> Response {
    let Some(id) = query.document_id.filter(|id| !id.is_empty()) else {
        return not_found();
    };

    match host.services.tenders.download_document(&id).await {
        Ok(Some(file)) => download_response(file),
        Ok(None) => not_found(),
        Err(e) => {
            tracing::error!(document_id = %id, error = %e, "failed to download tender document");
            host.redirect_with(TENDER_INDEX, Flash::error(DOWNLOAD_FAILED))
        }
    }
}
