//! Core types shared by the ERP services and the web layer

pub mod auth;
pub mod color;
pub mod error;
pub mod ids;
pub mod service;
pub mod status;
pub mod validation;

pub use auth::{AuthContext, Flash, Identity, SessionCodec, hash_password};
pub use error::{PortalError, PortalResult};
pub use ids::HasSystemId;
pub use service::{
    AuthService, FileDownload, JobService, RequisitionOutcome, RequisitionService, RfqService,
    TenderService, ThemeService,
};
