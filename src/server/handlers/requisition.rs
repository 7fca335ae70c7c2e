//! Imprest and item requisitions

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ActionResult, CurrentUser, download_response, not_found};
use crate::core::Flash;
use crate::core::status::{RequisitionBuckets, RequisitionStatus};
use crate::core::validation::filters::final_component;
use crate::core::validation::validators::{DOCUMENT_LIMIT, max_file_size};
use crate::models::{
    Dimension, EditRequisitionRequest, GlAccount, Item, RequisitionDocument, RequisitionHeader,
    RequisitionLine, RequisitionType, RequisitionUpload, SubmitRequisitionRequest,
};
use crate::server::host::PortalHost;
use crate::server::uploads::MultipartForm;
use crate::server::views::Page;

pub const REQUISITION_INDEX: &str = "/ImprestItemRequisition/Index";
const INDEX_PAGE: &str = "requisition/index.html";
const UPLOAD_PAGE: &str = "requisition/upload.html";

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNoQuery {
    pub document_no: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionNoQuery {
    pub requisition_no: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPageQuery {
    #[serde(alias = "requisitionNo")]
    pub document_no: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentIdQuery {
    pub document_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDocumentForm {
    #[serde(default)]
    pub document_id: String,
}

#[derive(Debug, Default, Serialize)]
struct IndexModel {
    requisitions: RequisitionBuckets,
    departments: Vec<Dimension>,
    projects: Vec<Dimension>,
    items: Vec<Item>,
    gl_accounts: Vec<GlAccount>,
    current_user_id: String,
    current_filter: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct UploadModel {
    requisition_no: String,
    description: String,
    status: String,
    document_type: String,
    security_level: String,
    is_encrypted: bool,
    existing_documents: Vec<RequisitionDocument>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HeaderView<'a> {
    no: &'a str,
    requisition_type: &'a str,
    status: &'a str,
    request_date: Option<NaiveDate>,
    posting_date: Option<NaiveDate>,
    requestor_id: &'a str,
    department_code: &'a str,
    project_code: &'a str,
    description: &'a str,
    total_amount: f64,
}

impl<'a> From<&'a RequisitionHeader> for HeaderView<'a> {
    fn from(h: &'a RequisitionHeader) -> Self {
        Self {
            no: &h.no,
            requisition_type: &h.requisition_type,
            status: &h.status,
            request_date: h.request_date,
            posting_date: h.posting_date,
            requestor_id: &h.requestor_id,
            department_code: &h.department_code,
            project_code: &h.project_code,
            description: &h.description,
            total_amount: h.total_amount,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LineView<'a> {
    line_no: i64,
    #[serde(rename = "type")]
    line_type: &'a str,
    no: &'a str,
    description: &'a str,
    quantity: f64,
    unit_cost: f64,
    unit_of_measure: &'a str,
    location_code: &'a str,
    bin_code: &'a str,
}

impl<'a> From<&'a RequisitionLine> for LineView<'a> {
    fn from(l: &'a RequisitionLine) -> Self {
        Self {
            line_no: l.line_no,
            line_type: &l.line_type,
            no: &l.no,
            description: &l.description,
            quantity: l.quantity,
            unit_cost: l.unit_cost,
            unit_of_measure: &l.unit_of_measure,
            location_code: &l.location_code,
            bin_code: &l.bin_code,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentView<'a> {
    system_id: &'a str,
    file_name: &'a str,
    file_extension: &'a str,
    document_type: &'a str,
    uploaded_date: Option<NaiveDate>,
    requisition_no: &'a str,
}

impl<'a> From<&'a RequisitionDocument> for DocumentView<'a> {
    fn from(d: &'a RequisitionDocument) -> Self {
        Self {
            system_id: &d.system_id,
            file_name: &d.file_name,
            file_extension: &d.file_extension,
            document_type: &d.document_type,
            uploaded_date: d.uploaded_date,
            requisition_no: &d.requisition_no,
        }
    }
}

pub async fn index(
    State(host): State<PortalHost>,
    user: CurrentUser,
    Query(query): Query<StatusQuery>,
) -> Response {
    let service = &host.services.requisitions;
    let status = query.status.filter(|s| !s.is_empty());

    let model = match service.headers(Some(user.email())).await {
        Ok(headers) => {
            let mut requisitions = RequisitionBuckets::from_headers(&headers);
            requisitions.apply_filter(status.as_deref());
            IndexModel {
                requisitions,
                departments: service.departments().await.unwrap_or_default(),
                projects: service.projects().await.unwrap_or_default(),
                items: service.items().await.unwrap_or_default(),
                gl_accounts: service.gl_accounts().await.unwrap_or_default(),
                current_user_id: user.email().to_string(),
                current_filter: status,
            }
        }
        Err(e) => {
            tracing::error!(user = %user.email(), error = %e, "failed to load requisitions");
            IndexModel::default()
        }
    };

    let page = Page::new(INDEX_PAGE).with("model", &model);
    host.render(page, Some(user.email()), &user.flash).await
}

pub async fn details(
    State(host): State<PortalHost>,
    user: CurrentUser,
    Query(query): Query<DocumentNoQuery>,
) -> Response {
    let document_no = query.document_no.unwrap_or_default();
    let service = &host.services.requisitions;

    let headers = match service.headers(Some(user.email())).await {
        Ok(headers) => headers,
        Err(e) => return ActionResult::failed(e.to_string()).into_response(),
    };
    let Some(header) = headers.iter().find(|h| h.no == document_no) else {
        return ActionResult::failed("Requisition not found or access denied").into_response();
    };

    match service.lines(&document_no).await {
        Ok(lines) => Json(serde_json::json!({
            "success": true,
            "header": HeaderView::from(header),
            "lines": lines.iter().map(LineView::from).collect::<Vec<_>>(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(document_no = %document_no, error = %e, "failed to read requisition lines");
            ActionResult::failed(e.to_string()).into_response()
        }
    }
}

pub async fn submit(
    State(host): State<PortalHost>,
    user: CurrentUser,
    Json(request): Json<SubmitRequisitionRequest>,
) -> Response {
    if RequisitionType::parse(&request.requisition_type).is_none() {
        return ActionResult::failed("Invalid requisition type. Must be 'Imprest' or 'Item'")
            .into_status_response();
    }

    match host
        .services
        .requisitions
        .submit(&request, user.email())
        .await
    {
        Ok(outcome) => {
            tracing::info!(document_no = %outcome.document_no, user = %user.email(), "requisition submitted");
            ActionResult::done(outcome.message, outcome.document_no).into_status_response()
        }
        Err(e) => {
            tracing::error!(user = %user.email(), error = %e, "requisition submission failed");
            ActionResult::failed(e.to_string()).into_status_response()
        }
    }
}

pub async fn edit(
    State(host): State<PortalHost>,
    _user: CurrentUser,
    Json(request): Json<EditRequisitionRequest>,
) -> Response {
    match host.services.requisitions.edit(&request).await {
        Ok(outcome) => ActionResult::done(outcome.message, outcome.document_no).into_status_response(),
        Err(e) => {
            tracing::error!(document_no = %request.document_no, error = %e, "requisition edit failed");
            ActionResult::failed(e.to_string()).into_status_response()
        }
    }
}

pub async fn post(
    State(host): State<PortalHost>,
    _user: CurrentUser,
    Query(query): Query<DocumentNoQuery>,
) -> Response {
    let document_no = query.document_no.unwrap_or_default();
    match host.services.requisitions.post(&document_no).await {
        Ok(outcome) => ActionResult::done(outcome.message, outcome.document_no).into_status_response(),
        Err(e) => {
            tracing::error!(document_no = %document_no, error = %e, "requisition post failed");
            ActionResult::failed(e.to_string()).into_status_response()
        }
    }
}

pub async fn cancel(
    State(host): State<PortalHost>,
    _user: CurrentUser,
    Query(query): Query<DocumentNoQuery>,
) -> Response {
    let document_no = query.document_no.unwrap_or_default();
    match host.services.requisitions.cancel(&document_no).await {
        Ok(outcome) => ActionResult::done(outcome.message, outcome.document_no).into_status_response(),
        Err(e) => {
            tracing::error!(document_no = %document_no, error = %e, "requisition cancel failed");
            ActionResult::failed(e.to_string()).into_status_response()
        }
    }
}

pub async fn items(State(host): State<PortalHost>, _user: CurrentUser) -> Response {
    match host.services.requisitions.items().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => ActionResult::failed(e.to_string()).into_status_response(),
    }
}

pub async fn gl_accounts(State(host): State<PortalHost>, _user: CurrentUser) -> Response {
    match host.services.requisitions.gl_accounts().await {
        Ok(accounts) => Json(accounts).into_response(),
        Err(e) => ActionResult::failed(e.to_string()).into_status_response(),
    }
}

fn accepts_documents(status: &str) -> bool {
    RequisitionStatus::Open.matches(status)
}

pub async fn upload_page(
    State(host): State<PortalHost>,
    user: CurrentUser,
    Query(query): Query<UploadPageQuery>,
) -> Response {
    let requisition_no = query.document_no.unwrap_or_default();
    if requisition_no.trim().is_empty() {
        return host.redirect_with(
            REQUISITION_INDEX,
            Flash::error("No requisition number was specified."),
        );
    }

    let service = &host.services.requisitions;
    let headers = match service.headers(Some(user.email())).await {
        Ok(headers) => headers,
        Err(e) => {
            return host.redirect_with(
                REQUISITION_INDEX,
                Flash::error(format!("Error loading requisition: {}", e)),
            );
        }
    };

    let Some(header) = headers
        .into_iter()
        .find(|h| h.no.eq_ignore_ascii_case(&requisition_no))
    else {
        return host.redirect_with(
            REQUISITION_INDEX,
            Flash::error(format!(
                "The requisition {} was not found or you don't have access to it.",
                requisition_no
            )),
        );
    };

    if !accepts_documents(&header.status) {
        return host.redirect_with(
            REQUISITION_INDEX,
            Flash::error(format!(
                "Requisition {} is no longer open for document uploads (Status: {}).",
                requisition_no, header.status
            )),
        );
    }

    let existing_documents = match service.documents(&header.no).await {
        Ok(documents) => documents,
        Err(e) => {
            return host.redirect_with(
                REQUISITION_INDEX,
                Flash::error(format!("Error loading requisition: {}", e)),
            );
        }
    };

    let model = UploadModel {
        requisition_no: header.no,
        description: header.description,
        status: header.status,
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
    let mut model = UploadModel {
        requisition_no: form.text_or("RequisitionNo", ""),
        description: form.text_or("Description", ""),
        status: form.text_or("Status", ""),
        document_type: form.text_or("DocumentType", "Other"),
        security_level: form.text_or("SecurityLevel", "Internal"),
        is_encrypted: form.flag("IsEncrypted"),
        existing_documents: Vec::new(),
    };
    model.existing_documents = host
        .services
        .requisitions
        .documents(&model.requisition_no)
        .await
        .unwrap_or_default();

    let Some(file) = form.file("DocumentFile").filter(|f| !f.is_empty()) else {
        return refuse(&host, &user, &model, "Please select a file to upload.").await;
    };
    let within_limit = max_file_size(DOCUMENT_LIMIT, "File size exceeds maximum limit of 10MB.");
    if let Err(e) = within_limit(&file.file_name, &file.bytes) {
        return refuse(&host, &user, &model, &e.to_string()).await;
    }

    let upload = RequisitionUpload {
        requisition_no: model.requisition_no.clone(),
        file_name: final_component(&file.file_name).to_string(),
        content: file.bytes.clone(),
        document_type: model.document_type.clone(),
        security_level: model.security_level.clone(),
        is_encrypted: model.is_encrypted,
        uploaded_by: None,
    };

    match host.services.requisitions.upload_document(&upload).await {
        Ok(true) => {
            tracing::info!(requisition_no = %upload.requisition_no, file = %upload.file_name, "requisition document uploaded");
            host.redirect_with(REQUISITION_INDEX, Flash::success("Document uploaded successfully!"))
        }
        Ok(false) => {
            refuse(&host, &user, &model, "Failed to upload document. Please try again.").await
        }
        Err(e) => {
            tracing::error!(requisition_no = %upload.requisition_no, error = %e, "requisition document upload failed");
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
    match host.services.requisitions.delete_document(&form.document_id).await {
        Ok(true) => {
            tracing::info!(document_id = %form.document_id, "requisition document deleted");
            ActionResult::ok()
        }
        Ok(false) => ActionResult::failed("Failed to delete document."),
        Err(e) => ActionResult::failed(e.to_string()),
    }
}

pub async fn download_document(
    State(host): State<PortalHost>,
    _user: CurrentUser,
    Query(query): Query<DocumentIdQuery>,
) -> Response {
    let Some(id) = query.document_id.filter(|id| !id.is_empty()) else {
        return not_found();
    };

    match host.services.requisitions.download_document(&id).await {
        Ok(Some(file)) => download_response(file),
        Ok(None) => not_found(),
        Err(e) => {
            tracing::error!(document_id = %id, error = %e, "failed to download requisition document");
            host.redirect_with(
                REQUISITION_INDEX,
                Flash::error("An error occurred while downloading the document. Please try again."),
            )
        }
    }
}

pub async fn documents_count(
    State(host): State<PortalHost>,
    _user: CurrentUser,
    Query(query): Query<RequisitionNoQuery>,
) -> Json<usize> {
    let requisition_no = query.requisition_no.unwrap_or_default();
    let count = match host.services.requisitions.documents(&requisition_no).await {
        Ok(documents) => documents.len(),
        Err(e) => {
            tracing::error!(requisition_no = %requisition_no, error = %e, "failed to count requisition documents");
            0
        }
    };
    Json(count)
}

pub async fn documents(
    State(host): State<PortalHost>,
    user: CurrentUser,
    Query(query): Query<RequisitionNoQuery>,
) -> Response {
    let requisition_no = query.requisition_no.unwrap_or_default();
    let service = &host.services.requisitions;

    let header = match service.headers(Some(user.email())).await {
        Ok(headers) => headers.into_iter().find(|h| h.no == requisition_no),
        Err(e) => return ActionResult::failed(e.to_string()).into_response(),
    };
    let Some(header) = header else {
        return ActionResult::failed("Access denied to this requisition").into_response();
    };

    match service.documents(&requisition_no).await {
        Ok(documents) => Json(serde_json::json!({
            "success": true,
            "documents": documents.iter().map(DocumentView::from).collect::<Vec<_>>(),
            "isOpen": header.status == RequisitionStatus::Open.code(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(requisition_no = %requisition_no, error = %e, "failed to list requisition documents");
            ActionResult::failed(e.to_string()).into_response()
        }
    }
}
