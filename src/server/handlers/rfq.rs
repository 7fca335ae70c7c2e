//! RFQ pages and quote submission

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::{ActionResult, CurrentUser, vendor_no};
use crate::core::HasSystemId;
use crate::core::status::{RfqIndexLines, awarded_rfq_lines, closed_rfq_lines, open_rfq_lines};
use crate::core::validation::{QuoteRejection, validate_quote, validate_quote_batch};
use crate::models::rfq::DEFAULT_VAT_PERCENTAGE;
use crate::models::{QuoteSubmission, RfqPublishedLine, RfqVendorCategory};
use crate::server::host::PortalHost;
use crate::server::views::Page;

const INDEX_PAGE: &str = "rfq/index.html";
const AWARDED_PAGE: &str = "rfq/awarded.html";
const CLOSED_PAGE: &str = "rfq/closed.html";

const NO_VENDOR: &str = "Vendor not assigned to user. Please contact your administrator.";

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct RfqModel {
    open_lines: Vec<RfqPublishedLine>,
    awarded_lines: Vec<RfqPublishedLine>,
    vendor_categories: Vec<RfqVendorCategory>,
    current_vendor_no: String,
    quoted_line_ids: Vec<String>,
    current_filter: Option<String>,
    default_vat_percentage: f64,
}

impl RfqModel {
    fn empty(default_vat_percentage: f64) -> Self {
        Self {
            default_vat_percentage,
            ..Default::default()
        }
    }
}

/// `{defaultVatPercentage, vendorNo}` used by the quote forms
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub default_vat_percentage: f64,
    pub vendor_no: String,
}

async fn default_vat(host: &PortalHost) -> f64 {
    host.services
        .rfq
        .default_vat_percentage()
        .await
        .unwrap_or(DEFAULT_VAT_PERCENTAGE)
}

async fn categories(host: &PortalHost) -> Vec<RfqVendorCategory> {
    host.services
        .rfq
        .vendor_categories()
        .await
        .unwrap_or_default()
}

/// Ids of lines the vendor already quoted, as marked on the lines themselves
fn quoted_ids(lines: &[RfqPublishedLine]) -> Vec<String> {
    lines
        .iter()
        .filter(|l| l.is_already_quoted)
        .map(|l| l.system_id_guid())
        .filter(|id| !id.is_nil())
        .map(|id| id.to_string())
        .collect()
}

pub async fn index(
    State(host): State<PortalHost>,
    user: CurrentUser,
    Query(query): Query<StatusQuery>,
) -> Response {
    let default_vat = default_vat(&host).await;
    let status = query.status.filter(|s| !s.is_empty());

    let model = match vendor_no(&host, user.email()).await {
        None => RfqModel::empty(default_vat),
        Some(vendor_no) => match host.services.rfq.published_lines(&vendor_no).await {
            Ok(lines) => {
                let split = RfqIndexLines::new(&lines, status.as_deref());
                RfqModel {
                    open_lines: split.open,
                    awarded_lines: split.awarded,
                    vendor_categories: categories(&host).await,
                    quoted_line_ids: quoted_ids(&lines),
                    current_vendor_no: vendor_no,
                    current_filter: status,
                    default_vat_percentage: default_vat,
                }
            }
            Err(e) => {
                tracing::error!(vendor_no = %vendor_no, error = %e, "failed to load RFQ index");
                RfqModel::empty(default_vat)
            }
        },
    };

    let page = Page::new(INDEX_PAGE).with("model", &model);
    host.render(page, Some(user.email()), &user.flash).await
}

pub async fn open(State(host): State<PortalHost>, user: CurrentUser) -> Response {
    let default_vat = default_vat(&host).await;

    let model = match vendor_no(&host, user.email()).await {
        None => RfqModel::empty(default_vat),
        Some(vendor_no) => match host.services.rfq.published_lines(&vendor_no).await {
            Ok(lines) => RfqModel {
                open_lines: open_rfq_lines(&lines),
                vendor_categories: categories(&host).await,
                quoted_line_ids: quoted_ids(&lines),
                current_vendor_no: vendor_no,
                current_filter: Some("0".to_string()),
                default_vat_percentage: default_vat,
                ..Default::default()
            },
            Err(e) => {
                tracing::error!(vendor_no = %vendor_no, error = %e, "failed to load open RFQs");
                RfqModel::empty(default_vat)
            }
        },
    };

    let page = Page::new(INDEX_PAGE).with("model", &model);
    host.render(page, Some(user.email()), &user.flash).await
}

pub async fn awarded(State(host): State<PortalHost>, user: CurrentUser) -> Response {
    let default_vat = default_vat(&host).await;

    let model = match vendor_no(&host, user.email()).await {
        None => RfqModel::empty(default_vat),
        Some(vendor_no) => match host.services.rfq.published_lines(&vendor_no).await {
            Ok(lines) => {
                let awarded_lines = awarded_rfq_lines(&lines, &vendor_no);
                tracing::info!(vendor_no = %vendor_no, count = awarded_lines.len(), "loaded awarded RFQ lines");
                RfqModel {
                    awarded_lines,
                    current_vendor_no: vendor_no,
                    default_vat_percentage: default_vat,
                    ..Default::default()
                }
            }
            Err(e) => {
                tracing::error!(vendor_no = %vendor_no, error = %e, "failed to load awarded RFQs");
                RfqModel::empty(default_vat)
            }
        },
    };

    let page = Page::new(AWARDED_PAGE).with("model", &model);
    host.render(page, Some(user.email()), &user.flash).await
}

pub async fn closed(State(host): State<PortalHost>, user: CurrentUser) -> Response {
    let default_vat = default_vat(&host).await;

    let model = match vendor_no(&host, user.email()).await {
        None => RfqModel::empty(default_vat),
        Some(vendor_no) => match host.services.rfq.published_lines(&vendor_no).await {
            Ok(lines) => {
                let quoted = host
                    .services
                    .rfq
                    .quoted_line_ids(&vendor_no)
                    .await
                    .unwrap_or_default();
                RfqModel {
                    open_lines: closed_rfq_lines(&lines),
                    vendor_categories: categories(&host).await,
                    quoted_line_ids: quoted.iter().map(ToString::to_string).collect(),
                    current_vendor_no: vendor_no,
                    current_filter: Some("1".to_string()),
                    default_vat_percentage: default_vat,
                    ..Default::default()
                }
            }
            Err(e) => {
                tracing::error!(vendor_no = %vendor_no, error = %e, "failed to load closed RFQs");
                RfqModel::empty(default_vat)
            }
        },
    };

    let page = Page::new(CLOSED_PAGE).with("model", &model);
    host.render(page, Some(user.email()), &user.flash).await
}

pub async fn submit_quote(
    State(host): State<PortalHost>,
    user: CurrentUser,
    Json(quote): Json<QuoteSubmission>,
) -> Response {
    let Some(vendor_no) = vendor_no(&host, user.email()).await else {
        return ActionResult::failed(NO_VENDOR).into_status_response();
    };

    if let Err(message) = validate_quote(&quote) {
        return ActionResult::failed(message).into_status_response();
    }

    match host.services.rfq.submit_quote(&vendor_no, &quote).await {
        Ok(document_no) => {
            tracing::info!(vendor_no = %vendor_no, item_no = %quote.item_no, "quote submitted");
            ActionResult::done("Quote submitted successfully", document_no).into_status_response()
        }
        Err(e) => {
            tracing::error!(item_no = %quote.item_no, error = %e, "quote submission failed");
            ActionResult::failed(e.to_string()).into_status_response()
        }
    }
}

pub async fn submit_all_quotes(
    State(host): State<PortalHost>,
    user: CurrentUser,
    Json(quotes): Json<Vec<QuoteSubmission>>,
) -> Response {
    let Some(vendor_no) = vendor_no(&host, user.email()).await else {
        return ActionResult::failed(NO_VENDOR).into_status_response();
    };

    if let Err(rejection) = validate_quote_batch(&quotes) {
        let mut result = ActionResult::failed(rejection.message());
        match rejection {
            QuoteRejection::Empty => {}
            QuoteRejection::InvalidItems(items) => result.invalid_items = Some(items),
            QuoteRejection::InvalidVat(items) => result.invalid_vat_items = Some(items),
        }
        return result.into_status_response();
    }

    let submitted = match quotes.as_slice() {
        [single] => host.services.rfq.submit_quote(&vendor_no, single).await,
        _ => host.services.rfq.submit_quotes(&vendor_no, &quotes).await,
    };

    match submitted {
        Ok(document_no) => {
            tracing::info!(vendor_no = %vendor_no, count = quotes.len(), "quotes submitted");
            ActionResult::done(format!("{} quotes submitted successfully", quotes.len()), document_no)
                .into_status_response()
        }
        Err(e) => {
            tracing::error!(count = quotes.len(), error = %e, "batch quote submission failed");
            ActionResult::failed(e.to_string()).into_status_response()
        }
    }
}

pub async fn global_settings(State(host): State<PortalHost>, user: CurrentUser) -> Response {
    let settings = GlobalSettings {
        default_vat_percentage: default_vat(&host).await,
        vendor_no: vendor_no(&host, user.email()).await.unwrap_or_default(),
    };
    Json(settings).into_response()
}
