//! Route table of the portal
//!
//! Paths keep the `/Area/Action` shape the browser pages and their scripts
//! post to, so links and form actions stay stable.

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use super::handlers::{account, home, job, profile, requisition, rfq, tender};
use super::host::PortalHost;

/// Build every page and JSON route, bound to `host`
///
/// - `/`, `/Account/*` - sign-in, registration, sign-out
/// - `/Home/*` - dashboard
/// - `/Profile/*` - profile view and update
/// - `/Rfq/*` - RFQ lines and quotes
/// - `/Tender/*` - tenders and response documents
/// - `/ImprestItemRequisition/*` - requisitions and their documents
/// - `/Job/*` - job listings and applications
pub fn build_routes(host: PortalHost) -> Router {
    Router::new()
        .merge(account_routes())
        .merge(home_routes())
        .merge(rfq_routes())
        .merge(tender_routes())
        .merge(requisition_routes())
        .merge(job_routes())
        .with_state(host)
}

/// Liveness routes, independent of the ERP
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "vendor-portal"
    }))
}

fn account_routes() -> Router<PortalHost> {
    Router::new()
        .route("/", get(account::login_page).post(account::login))
        .route("/Account/Login", get(account::login_page).post(account::login))
        .route(
            "/Account/Register",
            get(account::register_page).post(account::register),
        )
        .route("/Account/Logout", post(account::logout))
        .route("/Account/AccessDenied", get(account::access_denied))
        .route("/Profile", get(profile::index).post(profile::update))
        .route("/Profile/Index", get(profile::index).post(profile::update))
}

fn home_routes() -> Router<PortalHost> {
    Router::new()
        .route("/Home", get(home::index))
        .route("/Home/Index", get(home::index))
}

fn rfq_routes() -> Router<PortalHost> {
    Router::new()
        .route("/Rfq", get(rfq::index))
        .route("/Rfq/Index", get(rfq::index))
        .route("/Rfq/Open", get(rfq::open))
        .route("/Rfq/Awarded", get(rfq::awarded))
        .route("/Rfq/Closed", get(rfq::closed))
        .route("/Rfq/SubmitQuote", post(rfq::submit_quote))
        .route("/Rfq/SubmitAllQuotes", post(rfq::submit_all_quotes))
        .route("/Rfq/GlobalSettings", get(rfq::global_settings))
}

fn tender_routes() -> Router<PortalHost> {
    Router::new()
        .route("/Tender", get(tender::index))
        .route("/Tender/Index", get(tender::index))
        .route("/Tender/Download", get(tender::download))
        .route("/Tender/DownloadAttachment", get(tender::download_attachment))
        .route(
            "/Tender/UploadDocument",
            get(tender::upload_page).post(tender::upload),
        )
        .route("/Tender/DeleteTenderDocument", post(tender::delete_document))
        .route("/Tender/DeleteAttachment", post(tender::delete_attachment))
        .route(
            "/Tender/DownloadTenderDocument",
            get(tender::download_document),
        )
}

fn requisition_routes() -> Router<PortalHost> {
    const BASE: &str = "/ImprestItemRequisition";
    let at = |action: &str| format!("{}/{}", BASE, action);

    Router::new()
        .route(BASE, get(requisition::index))
        .route(&at("Index"), get(requisition::index))
        .route(&at("Details"), get(requisition::details))
        .route(&at("Submit"), post(requisition::submit))
        .route(&at("Edit"), post(requisition::edit))
        .route(&at("Post"), post(requisition::post))
        .route(&at("Cancel"), post(requisition::cancel))
        .route(&at("GetItems"), get(requisition::items))
        .route(&at("GetGLAccounts"), get(requisition::gl_accounts))
        .route(
            &at("UploadDocument"),
            get(requisition::upload_page).post(requisition::upload),
        )
        .route(&at("DeleteDocument"), post(requisition::delete_document))
        .route(&at("DownloadDocument"), get(requisition::download_document))
        .route(&at("GetDocumentsCount"), get(requisition::documents_count))
        .route(&at("GetDocuments"), get(requisition::documents))
}

fn job_routes() -> Router<PortalHost> {
    Router::new()
        .route("/Job", get(job::index))
        .route("/Job/Index", get(job::index))
        .route("/Job/Select", post(job::select))
        .route("/Job/Apply", get(job::apply_page).post(job::apply))
        .route(job::SUCCESS_PATH, get(job::application_success))
}
