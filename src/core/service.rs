//! Service traits for each ERP-backed area of the portal
//!
//! Handlers only see these traits. The ERP implementations live in
//! [`crate::erp`]; tests substitute in-memory stubs.
//!
//! Calls whose failure the pages tolerate (list lookups, counts, boolean
//! confirmations) log and return an empty value instead of `Err`. Calls whose
//! failure the caller has to report return `Err`.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    ColorSettings, Dimension, EditRequisitionRequest, GlAccount, Item, JobApplication, JobDetails,
    ProfileUpdate, QuoteSubmission, RequisitionDocument, RequisitionHeader, RequisitionLine,
    RequisitionUpload, RfqPublishedLine, RfqVendorCategory, SubmitRequisitionRequest, Tender,
    TenderAttachment, TenderDocument, TenderUpload, UserProfile,
};

/// A downloaded file
#[derive(Debug, Clone, PartialEq)]
pub struct FileDownload {
    pub bytes: Vec<u8>,
    /// Content type reported by the backend, if any
    pub content_type: Option<String>,
    pub file_name: String,
    pub file_extension: String,
}

/// Outcome of a requisition write
#[derive(Debug, Clone, PartialEq)]
pub struct RequisitionOutcome {
    pub message: String,
    pub document_no: String,
}

/// Sign-in, registration and profile codeunit
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a user; `false` when the backend refused or failed
    async fn create_user(&self, email: &str, password: &str, full_name: &str) -> Result<bool>;

    /// Check credentials; `false` when invalid or when the backend failed
    async fn validate_user(&self, email: &str, password: &str) -> Result<bool>;

    /// Vendor number linked to the email; `Err` when none is assigned
    async fn vendor_no_by_email(&self, email: &str) -> Result<String>;

    /// Candidate id used for job applications
    async fn candidate_id(&self, email: &str) -> Result<i64>;

    /// Stored profile, `None` when it could not be read
    async fn profile(&self, email: &str) -> Result<Option<UserProfile>>;

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<bool>;
}

/// Job postings and applications
#[async_trait]
pub trait JobService: Send + Sync {
    async fn active_jobs(&self) -> Result<Vec<JobDetails>>;

    async fn job(&self, job_id: i64) -> Result<Option<JobDetails>>;

    async fn apply(&self, application: &JobApplication) -> Result<bool>;
}

/// Request-for-quotation lines and quote submission
#[async_trait]
pub trait RfqService: Send + Sync {
    /// Published lines visible to the vendor, with quote state filled in
    async fn published_lines(&self, vendor_no: &str) -> Result<Vec<RfqPublishedLine>>;

    async fn vendor_categories(&self) -> Result<Vec<RfqVendorCategory>>;

    async fn vendor_categories_for(&self, vendor_no: &str) -> Result<Vec<RfqVendorCategory>>;

    /// System ids of lines the vendor already quoted
    async fn quoted_line_ids(&self, vendor_no: &str) -> Result<Vec<Uuid>>;

    /// Default VAT rate, falling back to 16
    async fn default_vat_percentage(&self) -> Result<f64>;

    /// Quote one published line; returns the backend document number
    async fn submit_quote(&self, vendor_no: &str, quote: &QuoteSubmission) -> Result<String>;

    /// Quote several lines in one call; returns the backend document number
    async fn submit_quotes(&self, vendor_no: &str, quotes: &[QuoteSubmission]) -> Result<String>;
}

/// Tender notices and vendor response documents
#[async_trait]
pub trait TenderService: Send + Sync {
    /// Tenders in the vendor's categories that have not closed yet
    async fn published_tenders(&self, vendor_no: &str) -> Result<Vec<Tender>>;

    async fn tender(&self, tender_id: &str) -> Result<Option<Tender>>;

    async fn attachments(&self, tender_id: &str) -> Result<Vec<TenderAttachment>>;

    async fn attachment(&self, attachment_id: &str) -> Result<Option<TenderAttachment>>;

    /// Documents the vendor uploaded for a tender
    async fn documents(&self, tender_id: &str, vendor_no: &str) -> Result<Vec<TenderDocument>>;

    async fn upload_document(&self, upload: &TenderUpload) -> Result<bool>;

    async fn delete_document(&self, document_id: &str) -> Result<bool>;

    async fn delete_attachment(&self, attachment_id: &str) -> Result<bool>;

    async fn download_document(&self, document_id: &str) -> Result<Option<FileDownload>>;

    /// `(open, closed, awarded)`, all zero when the tenders cannot be read
    async fn counts_by_status(&self, vendor_no: &str) -> Result<(usize, usize, usize)>;
}

/// Imprest and item requisitions
#[async_trait]
pub trait RequisitionService: Send + Sync {
    async fn headers(&self, requestor_id: Option<&str>) -> Result<Vec<RequisitionHeader>>;

    async fn lines(&self, document_no: &str) -> Result<Vec<RequisitionLine>>;

    async fn submit(
        &self,
        request: &SubmitRequisitionRequest,
        requestor_id: &str,
    ) -> Result<RequisitionOutcome>;

    async fn edit(&self, request: &EditRequisitionRequest) -> Result<RequisitionOutcome>;

    async fn post(&self, document_no: &str) -> Result<RequisitionOutcome>;

    async fn cancel(&self, document_no: &str) -> Result<RequisitionOutcome>;

    async fn departments(&self) -> Result<Vec<Dimension>>;

    async fn projects(&self) -> Result<Vec<Dimension>>;

    async fn items(&self) -> Result<Vec<Item>>;

    async fn gl_accounts(&self) -> Result<Vec<GlAccount>>;

    async fn documents(&self, requisition_no: &str) -> Result<Vec<RequisitionDocument>>;

    async fn upload_document(&self, upload: &RequisitionUpload) -> Result<bool>;

    async fn delete_document(&self, document_id: &str) -> Result<bool>;

    async fn download_document(&self, document_id: &str) -> Result<Option<FileDownload>>;
}

/// Portal colour scheme
#[async_trait]
pub trait ThemeService: Send + Sync {
    /// Never fails; defaults stand in for anything unreadable
    async fn color_settings(&self) -> ColorSettings;
}
