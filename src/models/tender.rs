//! Tender notices, their attachments, and vendor response documents

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::odata::{erp_date, nullable};

/// A published tender with its expanded attachments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    #[serde(default, deserialize_with = "nullable")]
    pub system_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tender_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub category_code: String,
    #[serde(default, with = "erp_date")]
    pub publish_date: Option<NaiveDate>,
    #[serde(default, with = "erp_date")]
    pub closing_date: Option<NaiveDate>,
    #[serde(default)]
    pub days_remaining: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub published: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub security_level: String,
    #[serde(default, deserialize_with = "nullable")]
    pub created_by: String,
    #[serde(default, with = "erp_date")]
    pub created_date: Option<NaiveDate>,
    #[serde(
        rename = "TenderDocumentsAPIattachments",
        default,
        deserialize_with = "nullable"
    )]
    pub attachments: Vec<TenderAttachment>,
}

impl Tender {
    /// Still accepting submissions on `today`; a missing closing date counts as closed
    pub fn is_open_on(&self, today: NaiveDate) -> bool {
        self.closing_date.is_some_and(|closing| closing >= today)
    }
}

/// A document published with a tender, content inlined as base64
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderAttachment {
    #[serde(default, deserialize_with = "nullable")]
    pub system_id: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub file_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub file_extension: String,
    #[serde(default, deserialize_with = "nullable")]
    pub document_type: String,
    #[serde(default, with = "erp_date")]
    pub attached_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub attached_by: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing)]
    pub file_content: String,
}

/// A document a vendor uploaded in response to a tender
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderDocument {
    #[serde(default, deserialize_with = "nullable")]
    pub system_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tender_no: String,
    #[serde(default)]
    pub line_no: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub file_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub file_extension: String,
    #[serde(default)]
    pub file_size: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub document_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub security_level: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uploaded_by: String,
    #[serde(default, with = "erp_date")]
    pub uploaded_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_encrypted: bool,
}

/// Vendor document headed for `UploadTenderDocument`
#[derive(Debug, Clone, PartialEq)]
pub struct TenderUpload {
    pub tender_no: String,
    pub file_name: String,
    pub content: Vec<u8>,
    pub document_type: String,
    pub security_level: String,
    pub is_encrypted: bool,
    pub vendor_no: String,
    /// Signed-in user, `System` when absent
    pub uploaded_by: Option<String>,
}

crate::impl_has_system_id!(Tender, TenderAttachment, TenderDocument);
