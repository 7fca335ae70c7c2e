//! Dashboard

use anyhow::Result;
use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use super::CurrentUser;
use crate::core::status::{RequisitionCounts, RfqCounts, TenderCounts};
use crate::server::host::PortalHost;
use crate::server::views::Page;

/// Tiles shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub rfq: RfqCounts,
    pub tenders: TenderCounts,
    pub requisitions: RequisitionCounts,
}

pub async fn index(State(host): State<PortalHost>, user: CurrentUser) -> Response {
    let dashboard = match load_dashboard(&host, user.email()).await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            tracing::error!(user = %user.email(), error = %e, "failed to load dashboard");
            Dashboard::default()
        }
    };

    let page = Page::new("home/index.html").with("dashboard", &dashboard);
    host.render(page, Some(user.email()), &user.flash).await
}

async fn load_dashboard(host: &PortalHost, email: &str) -> Result<Dashboard> {
    let vendor_no = host.services.auth.vendor_no_by_email(email).await?;

    let lines = host.services.rfq.published_lines(&vendor_no).await?;
    let (open, closed, awarded) = host.services.tenders.counts_by_status(&vendor_no).await?;
    let headers = host.services.requisitions.headers(Some(email)).await?;

    Ok(Dashboard {
        rfq: RfqCounts::from_lines(&lines, &vendor_no),
        tenders: TenderCounts {
            open,
            closed,
            awarded,
        },
        requisitions: RequisitionCounts::from_headers(&headers),
    })
}
