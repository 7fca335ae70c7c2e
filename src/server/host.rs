//! Shared state handed to every handler
//!
//! The host is built once at startup and cloned into each request. All of
//! its parts are immutable and `Arc`-shared, so handlers never contend.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use cookie::Cookie;

use crate::config::PortalConfig;
use crate::core::error::PortalError;
use crate::core::{Flash, SessionCodec};
use crate::erp::PortalServices;
use crate::server::views::{Chrome, Page, Views};

/// Host context containing all portal state
///
/// # Example
///
/// ```rust,ignore
/// let host = PortalHost::new(config, PortalServices::from_erp(&config.erp)?)?;
/// let app = router::build_routes(host);
/// ```
#[derive(Clone)]
pub struct PortalHost {
    /// Loaded and validated configuration
    pub config: Arc<PortalConfig>,

    /// ERP-backed services, one per area
    pub services: PortalServices,

    /// Session and flash cookie codec
    pub session: Arc<SessionCodec>,

    /// Compiled page templates
    pub views: Arc<Views>,
}

impl std::fmt::Debug for PortalHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalHost")
            .field("bind", &self.config.server.bind)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl PortalHost {
    pub fn new(config: PortalConfig, services: PortalServices) -> Result<Self, PortalError> {
        let session = SessionCodec::new(
            &config.session.secret,
            &config.session.cookie_name,
            config.session.ttl_hours,
        )?;

        Ok(Self {
            config: Arc::new(config),
            services,
            session: Arc::new(session),
            views: Arc::new(Views::new()?),
        })
    }

    /// Directory resumes are written to and served from
    pub fn resumes_dir(&self) -> PathBuf {
        self.config.server.resumes_dir()
    }

    /// Render `page` for the current visitor
    ///
    /// Flash messages shown here are consumed: the response clears the flash
    /// cookie when the request carried one.
    pub async fn render(&self, page: Page, user: Option<&str>, flash: &PageFlash) -> Response {
        let colors = self.services.theme.color_settings().await;
        let chrome = Chrome {
            colors: &colors,
            user,
            flash: &flash.messages,
        };

        match self.views.render(&page, chrome) {
            Ok(html) => {
                let mut response = axum::response::Html(html).into_response();
                if flash.pending {
                    append_cookie(&mut response, &self.session.clear_flash());
                }
                response
            }
            Err(e) => {
                tracing::error!(template = page.template(), error = %e, "failed to render page");
                e.into_response()
            }
        }
    }

    /// Redirect after storing `flash` for the next rendered page
    pub fn redirect_with(&self, to: &str, flash: Flash) -> Response {
        let mut response = Redirect::to(to).into_response();
        if !flash.is_empty() {
            append_cookie(&mut response, &self.session.flash_cookie(&flash));
        }
        response
    }
}

/// Flash messages read from the request, and whether a cookie carried them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageFlash {
    pub messages: Flash,
    pub pending: bool,
}

pub fn append_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.encoded().to_string()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => tracing::error!(cookie = cookie.name(), error = %e, "unencodable cookie"),
    }
}
