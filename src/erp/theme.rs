//! Colour scheme from `RFQTenderSetupAPI`

use async_trait::async_trait;

use crate::core::ThemeService;
use crate::erp::client::ErpClient;
use crate::models::theme::RfqTenderSetup;
use crate::models::ColorSettings;

const SETUP: &str = "RFQTenderSetupAPI";

#[derive(Debug, Clone)]
pub struct ErpThemeService {
    client: ErpClient,
}

impl ErpThemeService {
    pub fn new(client: ErpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ThemeService for ErpThemeService {
    async fn color_settings(&self) -> ColorSettings {
        match self.client.get_list::<RfqTenderSetup>(SETUP).await {
            Ok(rows) => ColorSettings::from(rows.into_iter().next()),
            Err(e) => {
                tracing::error!(error = %e, "failed to read colour settings");
                ColorSettings::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErpConfig;
    use httpmock::prelude::*;

    fn service(server: &MockServer) -> ErpThemeService {
        ErpThemeService::new(
            ErpClient::new(&ErpConfig {
                odata_base_url: server.base_url(),
                company: "CRONUS".into(),
                ..Default::default()
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_first_row_wins() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("RFQTenderSetupAPI");
                then.status(200).json_body(serde_json::json!({
                    "value": [{"primaryColor": "#123456"}, {"primaryColor": "#654321"}]
                }));
            })
            .await;

        let colors = service(&server).color_settings().await;
        assert_eq!(colors.primary_color, "#123456");
        assert_eq!(colors.secondary_color, "#6c757d");
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("RFQTenderSetupAPI");
                then.status(500);
            })
            .await;

        assert_eq!(service(&server).color_settings().await, ColorSettings::default());
    }
}
