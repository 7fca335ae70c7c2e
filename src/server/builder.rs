//! PortalBuilder for fluent API to build the portal server

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::host::PortalHost;
use super::router::{build_routes, health_routes};
use crate::config::PortalConfig;
use crate::erp::PortalServices;

/// Builder for the portal's HTTP server
///
/// # Example
///
/// ```ignore
/// let config = PortalConfig::load(Some(Path::new("portal.yaml")))?;
/// PortalBuilder::new(config)
///     .serve("127.0.0.1:8080")
///     .await?;
/// ```
pub struct PortalBuilder {
    config: PortalConfig,
    services: Option<PortalServices>,
    custom_routes: Vec<Router>,
}

impl PortalBuilder {
    pub fn new(config: PortalConfig) -> Self {
        Self {
            config,
            services: None,
            custom_routes: Vec::new(),
        }
    }

    /// Use these services instead of wiring them to the configured ERP
    pub fn with_services(mut self, services: PortalServices) -> Self {
        self.services = Some(services);
        self
    }

    /// Add routes that sit alongside the portal pages
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the shared host
    pub fn build_host(&mut self) -> Result<PortalHost> {
        let services = match self.services.take() {
            Some(services) => services,
            None => PortalServices::from_erp(&self.config.erp)?,
        };
        Ok(PortalHost::new(self.config.clone(), services)?)
    }

    /// Build the final router
    ///
    /// Health routes, portal pages, custom routes and stored resumes, behind
    /// request tracing and the configured body limit.
    pub fn build(mut self) -> Result<Router> {
        let host = self.build_host()?;
        let resumes = ServeDir::new(host.resumes_dir());
        let body_limit = self.config.server.max_request_bytes;

        let mut app = health_routes().merge(build_routes(host));
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app
            .nest_service("/resumes", resumes)
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(TraceLayer::new_for_http()))
    }

    /// Serve the portal with graceful shutdown
    ///
    /// Binds `addr`, serves until SIGTERM or Ctrl+C, then drains in-flight
    /// requests.
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PortalConfig {
        let mut config = PortalConfig::default();
        config.session.secret = "a-test-secret-that-is-long-enough-to-sign".to_string();
        config.erp.odata_base_url = "http://erp.test/ODataV4".to_string();
        config.erp.company = "CRONUS".to_string();
        config
    }

    #[test]
    fn test_new_has_no_services_or_routes() {
        let builder = PortalBuilder::new(config());
        assert!(builder.services.is_none());
        assert!(builder.custom_routes.is_empty());
    }

    #[test]
    fn test_with_custom_routes_appends_router() {
        let builder = PortalBuilder::new(config())
            .with_custom_routes(Router::new())
            .with_custom_routes(Router::new());
        assert_eq!(builder.custom_routes.len(), 2);
    }

    #[test]
    fn test_build_wires_erp_services() {
        let router = PortalBuilder::new(config()).build();
        assert!(router.is_ok(), "build should succeed: {:?}", router.err());
    }

    #[test]
    fn test_build_rejects_short_secret() {
        let mut config = config();
        config.session.secret = "short".to_string();
        let result = PortalBuilder::new(config).build();
        assert!(result.is_err());
    }
}
