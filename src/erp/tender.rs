//! Tender notices, attachments and vendor response documents

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Local;

use crate::core::error::ErpError;
use crate::core::{FileDownload, TenderService};
use crate::erp::client::ErpClient;
use crate::erp::soap::SoapCall;
use crate::models::odata::{any_of, escape_data_string, filter_query, quote_literal};
use crate::models::{ODataResponse, RfqVendorCategory, Tender, TenderAttachment, TenderDocument, TenderUpload};

const TENDERS: &str = "TenderDocumentsAPI";
const ATTACHMENTS: &str = "TenderDocumentsAPIattachments";
const RESPONSES: &str = "TenderDocResponsesAPI";
const VENDOR_CATEGORIES: &str = "RFQVendorCategoriesAPI";
const TENDER_SERVICE: &str = "TenderDocumentAPI";

#[derive(Debug, Clone)]
pub struct ErpTenderService {
    client: ErpClient,
    endpoint: String,
}

impl ErpTenderService {
    pub fn new(client: ErpClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn category_codes(&self, vendor_no: &str) -> Result<Vec<String>, ErpError> {
        let path = format!(
            "{}?{}",
            VENDOR_CATEGORIES,
            filter_query(&format!("VendorNo eq {}", quote_literal(vendor_no)))
        );
        let categories: Vec<RfqVendorCategory> = self.client.get_list(&path).await?;
        Ok(categories.into_iter().map(|c| c.category_code).collect())
    }

    async fn load_documents(&self, tender_id: &str, vendor_no: &str) -> Result<Vec<TenderDocument>> {
        let Some(tender) = self.tender(tender_id).await? else {
            tracing::warn!(tender_id = %tender_id, "tender not found");
            return Ok(Vec::new());
        };

        let mut filter = format!("tenderNo eq {}", quote_literal(&tender.tender_no));
        if !vendor_no.is_empty() {
            filter.push_str(&format!(" and vendorNo eq {}", quote_literal(vendor_no)));
        }
        let path = format!("{}?{}", RESPONSES, filter_query(&filter));
        Ok(self.client.get_list(&path).await?)
    }
}

/// A keyed read may come back as the record itself or wrapped in a collection
fn single_tender(value: serde_json::Value) -> Result<Option<Tender>, serde_json::Error> {
    if value.get("value").is_some_and(serde_json::Value::is_array) {
        let envelope: ODataResponse<Tender> = serde_json::from_value(value)?;
        return Ok(envelope.value.into_iter().next());
    }
    serde_json::from_value(value).map(Some)
}

#[async_trait]
impl TenderService for ErpTenderService {
    async fn published_tenders(&self, vendor_no: &str) -> Result<Vec<Tender>> {
        let mut path = format!("{}?$expand={}", TENDERS, ATTACHMENTS);
        if !vendor_no.is_empty() {
            let codes = self.category_codes(vendor_no).await?;
            if !codes.is_empty() {
                let filter = format!("({})", any_of("categoryCode", &codes));
                path = format!("{}&{}", path, filter_query(&filter));
            }
        }

        let tenders: Vec<Tender> = self.client.get_list(&path).await.map_err(|e| {
            tracing::error!(vendor_no = %vendor_no, error = %e, "failed to read published tenders");
            e
        })?;
        let today = Local::now().date_naive();
        Ok(tenders.into_iter().filter(|t| t.is_open_on(today)).collect())
    }

    async fn tender(&self, tender_id: &str) -> Result<Option<Tender>> {
        let path = format!(
            "{}({})?$expand={}",
            TENDERS,
            escape_data_string(tender_id),
            ATTACHMENTS
        );
        let Some(value) = self.client.get_value(&path).await? else {
            tracing::error!(tender_id = %tender_id, "tender lookup returned no record");
            return Ok(None);
        };

        match single_tender(value) {
            Ok(tender) => Ok(tender),
            Err(e) => {
                tracing::error!(tender_id = %tender_id, error = %e, "tender record could not be decoded");
                Ok(None)
            }
        }
    }

    async fn attachments(&self, tender_id: &str) -> Result<Vec<TenderAttachment>> {
        let path = format!("{}({})/{}", TENDERS, escape_data_string(tender_id), ATTACHMENTS);
        Ok(self.client.get_list(&path).await?)
    }

    async fn attachment(&self, attachment_id: &str) -> Result<Option<TenderAttachment>> {
        let path = format!("{}({})", ATTACHMENTS, escape_data_string(attachment_id));
        Ok(self.client.get_optional(&path).await?)
    }

    async fn documents(&self, tender_id: &str, vendor_no: &str) -> Result<Vec<TenderDocument>> {
        match self.load_documents(tender_id, vendor_no).await {
            Ok(documents) => Ok(documents),
            Err(e) => {
                tracing::error!(tender_id = %tender_id, error = %e, "failed to read tender documents");
                Ok(Vec::new())
            }
        }
    }

    async fn upload_document(&self, upload: &TenderUpload) -> Result<bool> {
        let call = SoapCall::new(TENDER_SERVICE, "UploadTenderDocument")
            .param("tenderNo", &upload.tender_no)
            .param("fileName", &upload.file_name)
            .param("fileContent", STANDARD.encode(&upload.content))
            .param("documentType", &upload.document_type)
            .param("securityLevel", &upload.security_level)
            .param("isEncrypted", upload.is_encrypted)
            .param("uploadedBy", upload.uploaded_by.as_deref().unwrap_or("System"))
            .param("vendorNo", &upload.vendor_no);

        match self.client.soap_call(&self.endpoint, &call).await {
            Ok(_) => {
                tracing::info!(tender_no = %upload.tender_no, file = %upload.file_name, "tender document uploaded");
                Ok(true)
            }
            Err(e) => {
                tracing::error!(tender_no = %upload.tender_no, file = %upload.file_name, error = %e, "tender document upload failed");
                Err(anyhow!("Error uploading document: {}", e))
            }
        }
    }

    async fn delete_document(&self, document_id: &str) -> Result<bool> {
        let path = format!("{}({})", RESPONSES, escape_data_string(document_id));
        Ok(self.client.delete(&path, false).await?)
    }

    async fn delete_attachment(&self, attachment_id: &str) -> Result<bool> {
        let path = format!("{}({})", ATTACHMENTS, escape_data_string(attachment_id));
        Ok(self.client.delete(&path, false).await?)
    }

    async fn download_document(&self, document_id: &str) -> Result<Option<FileDownload>> {
        let path = format!("{}({})", RESPONSES, escape_data_string(document_id));
        let document: TenderDocument = self.client.get_json(&path).await?;

        let Some((bytes, content_type)) = self
            .client
            .get_bytes(&format!("{}/fileContent", path))
            .await?
        else {
            tracing::warn!(document_id = %document_id, "tender document content unavailable");
            return Ok(None);
        };

        Ok(Some(FileDownload {
            bytes,
            content_type,
            file_name: document.file_name,
            file_extension: document.file_extension,
        }))
    }

    async fn counts_by_status(&self, vendor_no: &str) -> Result<(usize, usize, usize)> {
        match self.published_tenders(vendor_no).await {
            Ok(tenders) => {
                let counts = crate::core::status::TenderCounts::from_tenders(&tenders);
                Ok((counts.open, counts.closed, counts.awarded))
            }
            Err(e) => {
                tracing::error!(vendor_no = %vendor_no, error = %e, "failed to count tenders");
                Ok((0, 0, 0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErpConfig;
    use httpmock::prelude::*;
    use serde_json::json;

    fn service(server: &MockServer) -> ErpTenderService {
        let config = ErpConfig {
            odata_base_url: server.base_url(),
            company: "CRONUS".into(),
            ..Default::default()
        };
        ErpTenderService::new(ErpClient::new(&config).unwrap(), server.url("/soap/tender"))
    }

    fn future(days: i64) -> String {
        (Local::now().date_naive() + chrono::Duration::days(days))
            .format("%Y-%m-%d")
            .to_string()
    }

    #[tokio::test]
    async fn test_published_tenders_drops_closed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path_contains("RFQVendorCategoriesAPI")
                    .query_param("$filter", "VendorNo eq 'V001'");
                then.status(200)
                    .json_body(json!({"value": [{"categoryCode": "WORKS"}]}));
            })
            .await;
        let tenders_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path_contains("TenderDocumentsAPI")
                    .query_param("$expand", "TenderDocumentsAPIattachments")
                    .query_param("$filter", "(categoryCode eq 'WORKS')");
                then.status(200).json_body(json!({"value": [
                    {"systemId": "a", "tenderNo": "T-1", "status": "Open", "closingDate": future(3)},
                    {"systemId": "b", "tenderNo": "T-2", "status": "Open", "closingDate": future(-1)},
                    {"systemId": "c", "tenderNo": "T-3", "status": "Open", "closingDate": null}
                ]}));
            })
            .await;

        let tenders = service(&server).published_tenders("V001").await.unwrap();
        tenders_mock.assert_async().await;
        assert_eq!(tenders.len(), 1);
        assert_eq!(tenders[0].tender_no, "T-1");
    }

    #[tokio::test]
    async fn test_tender_accepts_wrapped_record() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("TenderDocumentsAPI(abc)");
                then.status(200).json_body(json!({"value": [{
                    "systemId": "abc",
                    "tenderNo": "T-9",
                    "TenderDocumentsAPIattachments": [{"systemId": "x", "fileName": "spec", "fileExtension": "pdf"}]
                }]}));
            })
            .await;

        let tender = service(&server).tender("abc").await.unwrap().unwrap();
        assert_eq!(tender.tender_no, "T-9");
        assert_eq!(tender.attachments.len(), 1);
    }

    #[tokio::test]
    async fn test_tender_miss_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("TenderDocumentsAPI");
                then.status(404);
            })
            .await;

        assert!(service(&server).tender("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_documents_filter_by_tender_and_vendor() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("TenderDocumentsAPI(abc)");
                then.status(200)
                    .json_body(json!({"systemId": "abc", "tenderNo": "T-9"}));
            })
            .await;
        let docs_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path_contains("TenderDocResponsesAPI")
                    .query_param("$filter", "tenderNo eq 'T-9' and vendorNo eq 'V001'");
                then.status(200).json_body(json!({"value": [
                    {"systemId": "d1", "tenderNo": "T-9", "fileName": "bid", "fileExtension": "pdf"}
                ]}));
            })
            .await;

        let docs = service(&server).documents("abc", "V001").await.unwrap();
        docs_mock.assert_async().await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_name, "bid");
    }

    #[tokio::test]
    async fn test_upload_encodes_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/soap/tender")
                    .body_contains("<fileContent>aGVsbG8=</fileContent>")
                    .body_contains("<uploadedBy>System</uploadedBy>")
                    .body_contains("<isEncrypted>false</isEncrypted>");
                then.status(200).body(
                    "<s:Envelope><s:Body><UploadTenderDocument_Result/></s:Body></s:Envelope>",
                );
            })
            .await;

        let ok = service(&server)
            .upload_document(&TenderUpload {
                tender_no: "T-9".into(),
                file_name: "bid.pdf".into(),
                content: b"hello".to_vec(),
                document_type: "Other".into(),
                security_level: "Internal".into(),
                is_encrypted: false,
                vendor_no: "V001".into(),
                uploaded_by: None,
            })
            .await
            .unwrap();
        assert!(ok);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_fault_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/soap/tender");
                then.status(500)
                    .body("<s:Fault><faultstring>Tender closed</faultstring></s:Fault>");
            })
            .await;

        let err = service(&server)
            .upload_document(&TenderUpload {
                tender_no: "T-9".into(),
                file_name: "bid.pdf".into(),
                content: vec![1],
                document_type: "Other".into(),
                security_level: "Internal".into(),
                is_encrypted: false,
                vendor_no: "V001".into(),
                uploaded_by: Some("jane@example.com".into()),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Error uploading document: "));
        assert!(err.to_string().contains("Tender closed"));
    }

    #[tokio::test]
    async fn test_download_document() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("TenderDocResponsesAPI(d1)/fileContent");
                then.status(200)
                    .header("content-type", "application/pdf")
                    .body("PDFDATA");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("TenderDocResponsesAPI(d1)");
                then.status(200)
                    .json_body(json!({"systemId": "d1", "fileName": "bid", "fileExtension": "pdf"}));
            })
            .await;

        let file = service(&server)
            .download_document("d1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(file.bytes, b"PDFDATA");
        assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(file.file_name, "bid");
    }

    #[tokio::test]
    async fn test_counts_fall_back_to_zero() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("TenderDocumentsAPI");
                then.status(500);
            })
            .await;

        assert_eq!(service(&server).counts_by_status("").await.unwrap(), (0, 0, 0));
    }
}
