//! Imprest and item requisitions over OData

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::core::error::ErpError;
use crate::core::{FileDownload, RequisitionOutcome, RequisitionService};
use crate::erp::client::ErpClient;
use crate::models::odata::{escape_data_string, filter_query, quote_literal};
use crate::models::{
    Dimension, EditRequisitionRequest, GlAccount, Item, RequisitionDocument, RequisitionHeader,
    RequisitionLine, RequisitionType, RequisitionUpload, SubmitRequisitionRequest,
};

const HEADERS: &str = "ImprestItemReqHeaderAPI";
const LINES: &str = "ImprestItemReqLineAPI";
const POST: &str = "ImprestItemReqPostAPI";
const CANCEL: &str = "ImprestItemReqCancelAPI";
const DOCUMENTS: &str = "ImprestItemReqDocAPI";
const DEPARTMENTS: &str = "Dimension1API";
const PROJECTS: &str = "Dimension2API";
const ITEMS: &str = "ItemsListAPI";
const GL_ACCOUNTS: &str = "GLAccountsListAPI";

#[derive(Debug, Clone)]
pub struct ErpRequisitionService {
    client: ErpClient,
}

impl ErpRequisitionService {
    pub fn new(client: ErpClient) -> Self {
        Self { client }
    }

    /// Read a whole entity set, logging and returning nothing on failure
    async fn lookup<T: DeserializeOwned>(&self, entity_set: &str) -> Vec<T> {
        match self.client.get_list(entity_set).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(entity_set, error = %e, "lookup failed");
                Vec::new()
            }
        }
    }

    /// POST one line, turning a refusal into the backend's message
    async fn create_line(&self, line: &RequisitionLine, document_no: &str) -> Result<()> {
        match self.client.post(LINES, &line.to_create_body(document_no)).await {
            Ok(()) => Ok(()),
            Err(ErpError::Status { body, .. }) => bail!("Failed to create line: {}", body),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(
        &self,
        request: &SubmitRequisitionRequest,
        requestor_id: &str,
    ) -> Result<String> {
        let Some(kind) = RequisitionType::parse(&request.requisition_type) else {
            bail!("Invalid requisition type. Must be 'Imprest' or 'Item'");
        };
        if request
            .lines
            .iter()
            .any(|line| line.line_type != kind.line_type())
        {
            bail!(kind.line_type_error());
        }

        let first = request.lines.first();
        let header = json!({
            "requisitionType": kind.as_str(),
            "reqTypeAPI": kind.as_str(),
            "description": request.description,
            "shortcutDimension1Code": first.map(|l| l.shortcut_dimension1_code.as_str()),
            "shortcutDimension2Code": first.map(|l| l.shortcut_dimension2_code.as_str()),
            "postingDate": Local::now().date_naive().format("%Y-%m-%d").to_string(),
            "requestorId": requestor_id,
        });
        let created: RequisitionHeader = self.client.post_json(HEADERS, &header).await?;
        let document_no = created.no;
        tracing::info!(document_no = %document_no, requestor_id, "requisition header created");

        for line in &request.lines {
            self.create_line(line, &document_no).await?;
        }
        Ok(document_no)
    }

    async fn replace(&self, request: &EditRequisitionRequest) -> Result<String> {
        let document_no = request.document_no.as_str();
        let path = format!(
            "{}?{}",
            HEADERS,
            filter_query(&format!("No eq {}", quote_literal(document_no)))
        );
        let headers: Vec<RequisitionHeader> = self.client.get_list(&path).await?;
        let Some(header) = headers.into_iter().next() else {
            bail!("Requisition {} not found", document_no);
        };

        let changes = json!({
            "postingDate": request.posting_date,
            "description": request.description,
            "shortcutDimension1Code": request.department_code,
            "shortcutDimension2Code": request.project_code,
        });
        match self
            .client
            .patch(&format!("{}({})", HEADERS, header.system_id), &changes)
            .await
        {
            Ok(()) => {}
            Err(ErpError::Status { body, .. }) => bail!("Failed to update header: {}", body),
            Err(e) => return Err(e.into()),
        }

        // Lines that refuse to go are left behind; the new lines are added regardless.
        for line in self.lines(document_no).await? {
            let deleted = self
                .client
                .delete(&format!("{}({})", LINES, line.system_id), true)
                .await?;
            if !deleted {
                tracing::warn!(document_no, line_no = line.line_no, "failed to delete requisition line");
            }
        }

        for line in &request.lines {
            self.create_line(line, document_no).await?;
        }
        Ok(document_no.to_string())
    }
}

#[async_trait]
impl RequisitionService for ErpRequisitionService {
    async fn headers(&self, requestor_id: Option<&str>) -> Result<Vec<RequisitionHeader>> {
        let filter = match requestor_id.filter(|id| !id.is_empty()) {
            Some(id) => format!("RequestorId eq {}", quote_literal(id)),
            None => "Status eq 'Open' or Status eq '0'".to_string(),
        };
        let path = format!("{}?{}", HEADERS, filter_query(&filter));
        match self.client.get_list(&path).await {
            Ok(headers) => Ok(headers),
            Err(e) => {
                tracing::error!(requestor_id = ?requestor_id, error = %e, "failed to read requisition headers");
                Ok(Vec::new())
            }
        }
    }

    async fn lines(&self, document_no: &str) -> Result<Vec<RequisitionLine>> {
        let path = format!(
            "{}?{}",
            LINES,
            filter_query(&format!("DocumentNo eq {}", quote_literal(document_no)))
        );
        match self.client.get_list(&path).await {
            Ok(lines) => Ok(lines),
            Err(e) => {
                tracing::error!(document_no, error = %e, "failed to read requisition lines");
                Ok(Vec::new())
            }
        }
    }

    async fn submit(
        &self,
        request: &SubmitRequisitionRequest,
        requestor_id: &str,
    ) -> Result<RequisitionOutcome> {
        let document_no = self.create(request, requestor_id).await.map_err(|e| {
            tracing::error!(requestor_id, error = %e, "failed to submit requisition");
            e
        })?;
        Ok(RequisitionOutcome {
            message: "Requisition submitted successfully".to_string(),
            document_no,
        })
    }

    async fn edit(&self, request: &EditRequisitionRequest) -> Result<RequisitionOutcome> {
        match self.replace(request).await {
            Ok(document_no) => Ok(RequisitionOutcome {
                message: "Requisition updated successfully".to_string(),
                document_no,
            }),
            Err(e) => {
                tracing::error!(document_no = %request.document_no, error = %e, "failed to edit requisition");
                Err(anyhow!("Error editing requisition: {}", e))
            }
        }
    }

    async fn post(&self, document_no: &str) -> Result<RequisitionOutcome> {
        let result: serde_json::Value = self
            .client
            .post_json(POST, &json!({ "documentNo": document_no }))
            .await
            .map_err(|e| {
                tracing::error!(document_no, error = %e, "failed to post requisition");
                e
            })?;
        let posted = result
            .get("postedDocumentNo")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        Ok(RequisitionOutcome {
            message: "Requisition posted successfully".to_string(),
            document_no: posted.to_string(),
        })
    }

    async fn cancel(&self, document_no: &str) -> Result<RequisitionOutcome> {
        self.client
            .post(CANCEL, &json!({ "documentNo": document_no }))
            .await
            .map_err(|e| {
                tracing::error!(document_no, error = %e, "failed to cancel requisition");
                e
            })?;
        Ok(RequisitionOutcome {
            message: "Requisition cancelled successfully".to_string(),
            document_no: document_no.to_string(),
        })
    }

    async fn departments(&self) -> Result<Vec<Dimension>> {
        Ok(self.lookup(DEPARTMENTS).await)
    }

    async fn projects(&self) -> Result<Vec<Dimension>> {
        Ok(self.lookup(PROJECTS).await)
    }

    async fn items(&self) -> Result<Vec<Item>> {
        Ok(self.lookup(ITEMS).await)
    }

    async fn gl_accounts(&self) -> Result<Vec<GlAccount>> {
        Ok(self.lookup(GL_ACCOUNTS).await)
    }

    async fn documents(&self, requisition_no: &str) -> Result<Vec<RequisitionDocument>> {
        let path = format!(
            "{}?{}",
            DOCUMENTS,
            filter_query(&format!("requisitionNo eq {}", quote_literal(requisition_no)))
        );
        match self.client.get_list(&path).await {
            Ok(documents) => Ok(documents),
            Err(e) => {
                tracing::error!(requisition_no, error = %e, "failed to read requisition documents");
                Ok(Vec::new())
            }
        }
    }

    async fn upload_document(&self, upload: &RequisitionUpload) -> Result<bool> {
        let body = json!({
            "requisitionNo": upload.requisition_no,
            "fileName": upload.file_name,
            "fileContent": STANDARD.encode(&upload.content),
            "documentType": upload.document_type,
            "securityLevel": upload.security_level,
            "isEncrypted": upload.is_encrypted,
            "uploadedBy": upload.uploaded_by.as_deref().unwrap_or("System"),
        });

        match self.client.post(DOCUMENTS, &body).await {
            Ok(()) => {
                tracing::info!(requisition_no = %upload.requisition_no, file = %upload.file_name, "requisition document uploaded");
                Ok(true)
            }
            Err(ErpError::Status { status, .. }) => {
                tracing::error!(requisition_no = %upload.requisition_no, status, "requisition document upload refused");
                Ok(false)
            }
            Err(e) => {
                tracing::error!(requisition_no = %upload.requisition_no, error = %e, "requisition document upload failed");
                Err(anyhow!("Error uploading document: {}", e))
            }
        }
    }

    async fn delete_document(&self, document_id: &str) -> Result<bool> {
        let path = format!("{}({})", DOCUMENTS, escape_data_string(document_id));
        Ok(self.client.delete(&path, false).await?)
    }

    async fn download_document(&self, document_id: &str) -> Result<Option<FileDownload>> {
        let path = format!("{}({})", DOCUMENTS, escape_data_string(document_id));
        let document: RequisitionDocument = self.client.get_json(&path).await?;

        let Some((bytes, content_type)) = self
            .client
            .get_bytes(&format!("{}/fileContent", path))
            .await?
        else {
            tracing::warn!(document_id, "requisition document content unavailable");
            return Ok(None);
        };

        Ok(Some(FileDownload {
            bytes,
            content_type,
            file_name: document.file_name,
            file_extension: document.file_extension,
        }))
    }
}
