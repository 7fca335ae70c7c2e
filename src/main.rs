use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use vendor_portal::prelude::*;

/// Environment variable naming the configuration file
const CONFIG_VAR: &str = "PORTAL_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vendor_portal=info,tower_http=info")),
        )
        .init();

    let path = std::env::var(CONFIG_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("portal.yaml"));
    let config = PortalConfig::load(Some(&path))?;

    tracing::info!(
        config = %path.display(),
        erp = %config.erp.odata_base_url,
        company = %config.erp.company,
        "starting vendor portal"
    );

    let addr = config.server.bind.clone();
    PortalBuilder::new(config).serve(&addr).await
}
