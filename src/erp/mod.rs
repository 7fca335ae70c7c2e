//! ERP-backed implementations of the portal service traits
//!
//! Every service shares one [`ErpClient`]. OData entity sets are read and
//! written as JSON; codeunit operations go through [`soap::SoapCall`].

pub mod auth;
pub mod client;
pub mod job;
pub mod requisition;
pub mod rfq;
pub mod soap;
pub mod tender;
pub mod theme;

use std::sync::Arc;

use crate::config::ErpConfig;
use crate::core::error::ErpError;
use crate::core::{
    AuthService, JobService, RequisitionService, RfqService, TenderService, ThemeService,
};

pub use auth::ErpAuthService;
pub use client::ErpClient;
pub use job::ErpJobService;
pub use requisition::ErpRequisitionService;
pub use rfq::ErpRfqService;
pub use soap::{SoapCall, SoapReply};
pub use tender::ErpTenderService;
pub use theme::ErpThemeService;

/// The full set of services a portal host needs
#[derive(Clone)]
pub struct PortalServices {
    pub auth: Arc<dyn AuthService>,
    pub jobs: Arc<dyn JobService>,
    pub rfq: Arc<dyn RfqService>,
    pub tenders: Arc<dyn TenderService>,
    pub requisitions: Arc<dyn RequisitionService>,
    pub theme: Arc<dyn ThemeService>,
}

impl PortalServices {
    /// Wire every service to the ERP described by `config`
    pub fn from_erp(config: &ErpConfig) -> Result<Self, ErpError> {
        let client = ErpClient::new(config)?;

        Ok(Self {
            auth: Arc::new(ErpAuthService::new(client.clone(), config)),
            jobs: Arc::new(ErpJobService::new(client.clone(), &config.job_endpoint)),
            rfq: Arc::new(ErpRfqService::new(client.clone(), &config.rfq_endpoint)),
            tenders: Arc::new(ErpTenderService::new(client.clone(), &config.tender_endpoint)),
            requisitions: Arc::new(ErpRequisitionService::new(client.clone())),
            theme: Arc::new(ErpThemeService::new(client)),
        })
    }
}

impl std::fmt::Debug for PortalServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalServices").finish_non_exhaustive()
    }
}
