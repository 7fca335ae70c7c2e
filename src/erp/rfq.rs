//! Published RFQ lines and vendor quotes

use std::collections::HashSet;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::ErpError;
use crate::core::RfqService;
use crate::core::ids::HasSystemId;
use crate::core::status::quoted_line_ids;
use crate::erp::client::ErpClient;
use crate::erp::soap::SoapCall;
use crate::models::odata::{any_of, filter_query, quote_literal};
use crate::models::rfq::DEFAULT_VAT_PERCENTAGE;
use crate::models::{
    PurchasesPayablesSetup, QuoteDetails, QuoteSubmission, RfqPublishedLine, RfqVendorCategory,
    RfqVendorQuote,
};

const PUBLISHED_LINES: &str = "RFQPublishedLinesAPI";
const VENDOR_CATEGORIES: &str = "RFQVendorCategoriesAPI";
const VENDOR_QUOTES: &str = "RFQVendorQuotesAPI";
const PURCHASES_SETUP: &str = "PurchasesPayablesSetup";
const RFQ_SERVICE: &str = "RFQVendorPortalAPI";

#[derive(Debug, Clone)]
pub struct ErpRfqService {
    client: ErpClient,
    endpoint: String,
}

impl ErpRfqService {
    pub fn new(client: ErpClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn read_default_vat(&self) -> f64 {
        match self
            .client
            .get_list::<PurchasesPayablesSetup>(PURCHASES_SETUP)
            .await
        {
            Ok(rows) => rows
                .into_iter()
                .next()
                .and_then(|setup| setup.default_vat_percentage)
                .unwrap_or(DEFAULT_VAT_PERCENTAGE),
            Err(e) => {
                tracing::error!(error = %e, "failed to read default VAT percentage");
                DEFAULT_VAT_PERCENTAGE
            }
        }
    }

    async fn read_categories_for(&self, vendor_no: &str) -> Vec<RfqVendorCategory> {
        let path = format!(
            "{}?{}",
            VENDOR_CATEGORIES,
            filter_query(&format!("VendorNo eq {}", quote_literal(vendor_no)))
        );
        match self.client.get_list(&path).await {
            Ok(categories) => categories,
            Err(e) => {
                tracing::error!(vendor_no = %vendor_no, error = %e, "failed to read vendor categories");
                Vec::new()
            }
        }
    }

    async fn read_quoted_ids(&self, vendor_no: &str) -> Vec<Uuid> {
        let path = format!(
            "{}?{}",
            VENDOR_QUOTES,
            filter_query(&format!(
                "prequalifiedSupplierNo eq {}",
                quote_literal(vendor_no)
            ))
        );
        match self.client.get_list::<RfqVendorQuote>(&path).await {
            Ok(quotes) => quoted_line_ids(&quotes).into_iter().collect(),
            Err(e) => {
                tracing::error!(vendor_no = %vendor_no, error = %e, "failed to read quoted lines");
                Vec::new()
            }
        }
    }

    async fn quote_details(&self, line_id: Uuid, vendor_no: &str) -> Option<QuoteDetails> {
        let path = format!(
            "{}?{}",
            VENDOR_QUOTES,
            filter_query(&format!(
                "prequalifiedSupplierNo eq {} and LineSystemId eq {}",
                quote_literal(vendor_no),
                line_id
            ))
        );
        match self.client.get_list::<QuoteDetails>(&path).await {
            Ok(rows) => rows.into_iter().next(),
            Err(e) => {
                tracing::error!(vendor_no = %vendor_no, line = %line_id, error = %e, "failed to read quote details");
                None
            }
        }
    }

    async fn load_published_lines(&self, vendor_no: &str) -> Result<Vec<RfqPublishedLine>, ErpError> {
        let default_vat = self.read_default_vat().await;

        let mut path = PUBLISHED_LINES.to_string();
        if !vendor_no.is_empty() {
            let codes: Vec<String> = self
                .read_categories_for(vendor_no)
                .await
                .into_iter()
                .map(|c| c.category_code)
                .collect();
            if !codes.is_empty() {
                path = format!("{}?{}", path, filter_query(&any_of("CategoryCode", &codes)));
            }
        }

        let mut lines: Vec<RfqPublishedLine> = self.client.get_list(&path).await?;
        let quoted: HashSet<Uuid> = self.read_quoted_ids(vendor_no).await.into_iter().collect();

        for line in &mut lines {
            line.normalize();
            let id = line.system_id_guid();
            line.is_already_quoted = quoted.contains(&id);
            if line.is_already_quoted {
                if let Some(details) = self.quote_details(id, vendor_no).await {
                    line.apply_quote(Some(&details), default_vat);
                }
            } else {
                line.apply_quote(None, default_vat);
            }
        }

        Ok(lines)
    }

    async fn send_quotes(&self, vendor_no: &str, quotes: &[QuoteSubmission]) -> Result<String> {
        if vendor_no.trim().is_empty() {
            bail!("Vendor number is required");
        }
        if quotes.is_empty() {
            bail!("At least one quote is required");
        }

        let wire: Vec<serde_json::Value> = quotes.iter().map(QuoteSubmission::to_wire).collect();
        let call = SoapCall::new(RFQ_SERVICE, "SubmitMultipleQuotes")
            .param("vendorNo", vendor_no)
            .param("quotesJson", serde_json::to_string(&wire)?);

        let reply = self.client.soap_call(&self.endpoint, &call).await?;
        Ok(reply.return_value()?)
    }
}

#[async_trait]
impl RfqService for ErpRfqService {
    async fn published_lines(&self, vendor_no: &str) -> Result<Vec<RfqPublishedLine>> {
        match self.load_published_lines(vendor_no).await {
            Ok(lines) => Ok(lines),
            Err(e) => {
                tracing::error!(vendor_no = %vendor_no, error = %e, "failed to read published RFQ lines");
                Ok(Vec::new())
            }
        }
    }

    async fn vendor_categories(&self) -> Result<Vec<RfqVendorCategory>> {
        match self.client.get_list(VENDOR_CATEGORIES).await {
            Ok(categories) => Ok(categories),
            Err(e) => {
                tracing::error!(error = %e, "failed to read RFQ vendor categories");
                Ok(Vec::new())
            }
        }
    }

    async fn vendor_categories_for(&self, vendor_no: &str) -> Result<Vec<RfqVendorCategory>> {
        Ok(self.read_categories_for(vendor_no).await)
    }

    async fn quoted_line_ids(&self, vendor_no: &str) -> Result<Vec<Uuid>> {
        Ok(self.read_quoted_ids(vendor_no).await)
    }

    async fn default_vat_percentage(&self) -> Result<f64> {
        Ok(self.read_default_vat().await)
    }

    async fn submit_quote(&self, vendor_no: &str, quote: &QuoteSubmission) -> Result<String> {
        let lines = self.published_lines(vendor_no).await?;
        if !lines
            .iter()
            .any(|line| line.system_id_guid() == quote.system_id2)
        {
            tracing::error!(vendor_no = %vendor_no, item_no = %quote.item_no, "quoted line is not published");
            bail!("No published RFQ line found with SystemId {}", quote.system_id2);
        }

        self.submit_quotes(vendor_no, std::slice::from_ref(quote)).await
    }

    async fn submit_quotes(&self, vendor_no: &str, quotes: &[QuoteSubmission]) -> Result<String> {
        match self.send_quotes(vendor_no, quotes).await {
            Ok(document_no) => {
                tracing::info!(vendor_no = %vendor_no, count = quotes.len(), "quotes submitted");
                Ok(document_no)
            }
            Err(e) => {
                tracing::error!(vendor_no = %vendor_no, count = quotes.len(), error = %e, "quote submission failed");
                Err(anyhow!("Failed to submit quotes: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErpConfig;
    use crate::models::odata::escape_data_string;
    use httpmock::prelude::*;
    use serde_json::json;

    const LINE_A: &str = "6f9619ff-8b86-d011-b42d-00c04fc964ff";
    const LINE_B: &str = "7a1e4c2d-0000-4000-8000-000000000001";

    fn service(server: &MockServer) -> ErpRfqService {
        let config = ErpConfig {
            odata_base_url: server.base_url(),
            company: "CRONUS".into(),
            ..Default::default()
        };
        ErpRfqService::new(ErpClient::new(&config).unwrap(), server.url("/soap/rfq"))
    }

    async fn mock_setup(server: &MockServer, body: serde_json::Value) {
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("PurchasesPayablesSetup");
                then.status(200).json_body(body);
            })
            .await;
    }

    #[tokio::test]
    async fn test_published_lines_filters_by_category_and_carries_quotes() {
        let server = MockServer::start_async().await;
        mock_setup(&server, json!({"value": [{"defaultVatPercentage": 14.0}]})).await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path_contains("RFQVendorCategoriesAPI")
                    .query_param("$filter", "VendorNo eq 'V001'");
                then.status(200).json_body(json!({
                    "value": [{"categoryCode": "STAT"}, {"categoryCode": "ICT"}]
                }));
            })
            .await;
        let lines_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path_contains("RFQPublishedLinesAPI")
                    .query_param("$filter", "CategoryCode eq 'STAT' or CategoryCode eq 'ICT'");
                then.status(200).json_body(json!({"value": [
                    {"systemId": LINE_A, "no": "ITEM-1", "rfqStatus": null},
                    {"systemId": LINE_B, "no": "ITEM-2", "rfqStatus": "0"}
                ]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path_contains("RFQVendorQuotesAPI")
                    .query_param("$filter", "prequalifiedSupplierNo eq 'V001'");
                then.status(200).json_body(json!({"value": [
                    {"lineSystemId": LINE_A, "vendorNo": "V001"},
                    {"lineSystemId": "not-a-guid", "vendorNo": "V001"}
                ]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("RFQVendorQuotesAPI").query_param(
                    "$filter",
                    format!("prequalifiedSupplierNo eq 'V001' and LineSystemId eq {}", LINE_A),
                );
                then.status(200).json_body(json!({"value": [{
                    "LineSystemId": LINE_A,
                    "submittedPrice": 120.5,
                    "vatOption": "Exempt",
                    "vatPercentage": 0.0,
                    "priceIncludesVAT": true
                }]}));
            })
            .await;

        let lines = service(&server).published_lines("V001").await.unwrap();
        lines_mock.assert_async().await;
        assert_eq!(lines.len(), 2);

        let quoted = &lines[0];
        assert!(quoted.is_already_quoted);
        assert_eq!(quoted.rfq_status, "0");
        assert_eq!(quoted.direct_unit_cost, 120.5);
        assert_eq!(quoted.vat_option, "Exempt");
        assert!(quoted.price_includes_vat);

        let fresh = &lines[1];
        assert!(!fresh.is_already_quoted);
        assert_eq!(fresh.vat_option, "Vatable");
        assert_eq!(fresh.vat_percentage, 14.0);
    }

    #[tokio::test]
    async fn test_published_lines_failure_is_empty() {
        let server = MockServer::start_async().await;
        mock_setup(&server, json!({"value": []})).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("RFQPublishedLinesAPI");
                then.status(500);
            })
            .await;

        let lines = service(&server).published_lines("").await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_default_vat_fallback() {
        let server = MockServer::start_async().await;
        mock_setup(&server, json!({"value": [{"defaultVatPercentage": null}]})).await;
        assert_eq!(service(&server).default_vat_percentage().await.unwrap(), 16.0);
    }

    #[tokio::test]
    async fn test_submit_quotes_builds_json_payload() {
        let server = MockServer::start_async().await;
        let line = Uuid::parse_str(LINE_A).unwrap();
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/soap/rfq")
                    .body_contains("<vendorNo>V001</vendorNo>")
                    .body_contains(format!("&quot;SystemId2&quot;:&quot;{}&quot;", LINE_A));
                then.status(200).body(
                    "<s:Envelope><s:Body><SubmitMultipleQuotes_Result><return_value>RFQQ-0009</return_value></SubmitMultipleQuotes_Result></s:Body></s:Envelope>",
                );
            })
            .await;

        let quote = QuoteSubmission {
            item_no: "ITEM-1".into(),
            unit_cost: 10.0,
            quantity: 2.0,
            system_id2: line,
            ..Default::default()
        };
        let doc = service(&server)
            .submit_quotes("V001", &[quote])
            .await
            .unwrap();
        assert_eq!(doc, "RFQQ-0009");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_quotes_requires_vendor_and_quotes() {
        let server = MockServer::start_async().await;
        let service = service(&server);

        let err = service
            .submit_quotes("", &[QuoteSubmission::default()])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to submit quotes: Vendor number is required");

        let err = service.submit_quotes("V001", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to submit quotes: At least one quote is required");
    }

    #[tokio::test]
    async fn test_submit_quote_for_unknown_line() {
        let server = MockServer::start_async().await;
        mock_setup(&server, json!({"value": []})).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("RFQVendorCategoriesAPI");
                then.status(200).json_body(json!({"value": []}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("RFQVendorQuotesAPI");
                then.status(200).json_body(json!({"value": []}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("RFQPublishedLinesAPI");
                then.status(200)
                    .json_body(json!({"value": [{"systemId": LINE_B, "no": "ITEM-2"}]}));
            })
            .await;

        let quote = QuoteSubmission {
            system_id2: Uuid::parse_str(LINE_A).unwrap(),
            ..Default::default()
        };
        let err = service(&server)
            .submit_quote("V001", &quote)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("No published RFQ line found with SystemId {}", LINE_A)
        );
    }

    #[test]
    fn test_filter_literal_is_escaped() {
        assert_eq!(
            filter_query(&format!("VendorNo eq {}", quote_literal("O'Neil"))),
            format!("$filter={}", escape_data_string("VendorNo eq 'O''Neil'"))
        );
    }
}
