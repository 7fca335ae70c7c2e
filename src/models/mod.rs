//! Data-transfer shapes exchanged with the ERP backend and the browser

pub mod account;
pub mod job;
pub mod odata;
pub mod requisition;
pub mod rfq;
pub mod tender;
pub mod theme;

pub use account::{LoginForm, ProfileForm, ProfileUpdate, RegistrationForm, UserProfile};
pub use job::{JobApplication, JobApplicationForm, JobDetails, JobSelection};
pub use odata::ODataResponse;
pub use requisition::{
    Dimension, EditRequisitionRequest, GlAccount, Item, RequisitionDocument, RequisitionHeader,
    RequisitionLine, RequisitionType, RequisitionUpload, SubmitRequisitionRequest,
};
pub use rfq::{QuoteDetails, QuoteSubmission, RfqPublishedLine, RfqVendorCategory, RfqVendorQuote};
pub use tender::{Tender, TenderAttachment, TenderDocument, TenderUpload};
pub use theme::{ColorSettings, PurchasesPayablesSetup, RfqTenderSetup};
