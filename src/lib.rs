//! # Vendor Portal
//!
//! A self-service web portal for suppliers and job candidates, fronting an
//! ERP that exposes OData entity sets and SOAP codeunits.
//!
//! ## Features
//!
//! - **Accounts**: registration, sign-in with a signed session cookie, profile
//! - **RFQs**: browse published lines, submit single or batch quotes
//! - **Tenders**: download notices, upload and manage response documents
//! - **Requisitions**: raise, edit, post and cancel imprest/item requisitions
//! - **Jobs**: browse postings and apply with a stored resume
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vendor_portal::prelude::*;
//!
//! let config = PortalConfig::load(Some(Path::new("portal.yaml")))?;
//! PortalBuilder::new(config).serve("127.0.0.1:8080").await?;
//! ```

pub mod config;
pub mod core;
pub mod erp;
pub mod models;
pub mod server;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AuthContext, AuthService, FileDownload, Flash, HasSystemId, Identity, JobService,
        PortalError, PortalResult, RequisitionOutcome, RequisitionService, RfqService,
        SessionCodec, TenderService, ThemeService,
    };

    // === ERP ===
    pub use crate::erp::{ErpClient, PortalServices};

    // === Config ===
    pub use crate::config::{ErpConfig, PortalConfig, ServerConfig, SessionConfig};

    // === Server ===
    pub use crate::server::{PortalBuilder, PortalHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use std::path::Path;
}
