//! Request-for-quotation records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::odata::{erp_date, nullable};

/// VAT option applied when a line has no quote yet
pub const DEFAULT_VAT_OPTION: &str = "Vatable";

/// VAT percentage used when the backend setup cannot be read
pub const DEFAULT_VAT_PERCENTAGE: f64 = 16.0;

fn default_vat_option() -> String {
    DEFAULT_VAT_OPTION.to_string()
}

fn default_vat_percentage() -> f64 {
    DEFAULT_VAT_PERCENTAGE
}

/// A published RFQ line vendors may quote on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqPublishedLine {
    #[serde(default, deserialize_with = "nullable")]
    pub system_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub worksheet_template_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub journal_batch_name: String,
    #[serde(default)]
    pub line_no: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub direct_unit_cost: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub category_code: String,
    #[serde(default)]
    pub published: bool,
    #[serde(rename = "approvedForRFQ", default)]
    pub approved_for_rfq: bool,
    #[serde(default, with = "erp_date")]
    pub rfq_expiration_date: Option<NaiveDate>,
    #[serde(default, with = "erp_date")]
    pub rfq_publish_date: Option<NaiveDate>,
    #[serde(default)]
    pub days_remaining: i64,
    #[serde(default)]
    pub is_already_quoted: bool,
    #[serde(rename = "priceIncludesVAT", default)]
    pub price_includes_vat: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub additional_notes: String,
    #[serde(default, deserialize_with = "nullable")]
    pub specifications: String,
    #[serde(default, deserialize_with = "nullable")]
    pub rfq_status: String,
    #[serde(default = "default_vat_option")]
    pub vat_option: String,
    #[serde(default = "default_vat_percentage")]
    pub vat_percentage: f64,
    #[serde(rename = "awardedtoVendorNo", default, deserialize_with = "nullable")]
    pub awarded_to_vendor_no: String,
    #[serde(rename = "rfqDateAwarded", default, with = "erp_date")]
    pub award_date: Option<NaiveDate>,
}

impl Default for RfqPublishedLine {
    fn default() -> Self {
        Self {
            system_id: String::new(),
            worksheet_template_name: String::new(),
            journal_batch_name: String::new(),
            line_no: 0,
            no: String::new(),
            description: String::new(),
            quantity: 0.0,
            direct_unit_cost: 0.0,
            category_code: String::new(),
            published: false,
            approved_for_rfq: false,
            rfq_expiration_date: None,
            rfq_publish_date: None,
            days_remaining: 0,
            is_already_quoted: false,
            price_includes_vat: false,
            additional_notes: String::new(),
            specifications: String::new(),
            rfq_status: String::new(),
            vat_option: default_vat_option(),
            vat_percentage: DEFAULT_VAT_PERCENTAGE,
            awarded_to_vendor_no: String::new(),
            award_date: None,
        }
    }
}

impl RfqPublishedLine {
    /// Fill in the values blank fields are displayed as
    pub fn normalize(&mut self) {
        if self.rfq_status.is_empty() {
            self.rfq_status = "0".to_string();
        }
    }

    /// Carry over the vendor's existing quote, or the defaults when unquoted
    pub fn apply_quote(&mut self, quote: Option<&QuoteDetails>, default_vat: f64) {
        match quote {
            Some(q) => {
                self.direct_unit_cost = q.submitted_price;
                self.vat_option = q.vat_option.clone();
                self.vat_percentage = q.vat_percentage;
                self.price_includes_vat = q.price_includes_vat;
            }
            None => {
                self.vat_option = DEFAULT_VAT_OPTION.to_string();
                self.vat_percentage = default_vat;
                self.price_includes_vat = false;
            }
        }
    }

    pub fn is_awarded(&self) -> bool {
        !self.awarded_to_vendor_no.is_empty()
    }

    /// Awarded to `vendor_no`, compared trimmed and case-insensitively
    pub fn is_awarded_to(&self, vendor_no: &str) -> bool {
        let vendor_no = vendor_no.trim();
        self.is_awarded()
            && !vendor_no.is_empty()
            && self
                .awarded_to_vendor_no
                .trim()
                .eq_ignore_ascii_case(vendor_no)
    }
}

/// Procurement category a vendor is registered under
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqVendorCategory {
    #[serde(default, deserialize_with = "nullable")]
    pub system_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub category_code: String,
}

/// Row of `RFQVendorQuotesAPI` as used to discover quoted lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqVendorQuote {
    #[serde(default, deserialize_with = "nullable")]
    pub line_system_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_no: String,
}

/// A vendor's submitted values for one line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteDetails {
    #[serde(rename = "LineSystemId", alias = "lineSystemId", default, deserialize_with = "nullable")]
    pub line_system_id: String,
    #[serde(rename = "submittedPrice", default)]
    pub submitted_price: f64,
    #[serde(rename = "vatOption", default = "default_vat_option")]
    pub vat_option: String,
    #[serde(rename = "vatPercentage", default)]
    pub vat_percentage: f64,
    #[serde(rename = "priceIncludesVAT", default)]
    pub price_includes_vat: bool,
}

/// Quote posted by the browser for one line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSubmission {
    #[serde(default = "Uuid::new_v4")]
    pub system_id: Uuid,
    #[serde(default)]
    pub item_no: String,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(rename = "priceIncludesVAT", alias = "priceIncludesVat", default)]
    pub price_includes_vat: bool,
    #[serde(default = "default_vat_option")]
    pub vat_option: String,
    #[serde(default = "default_vat_percentage")]
    pub vat_percentage: f64,
    #[serde(default)]
    pub quantity: f64,
    /// System id of the RFQ line being quoted
    #[serde(default)]
    pub system_id2: Uuid,
}

impl Default for QuoteSubmission {
    fn default() -> Self {
        Self {
            system_id: Uuid::new_v4(),
            item_no: String::new(),
            unit_cost: 0.0,
            price_includes_vat: false,
            vat_option: default_vat_option(),
            vat_percentage: DEFAULT_VAT_PERCENTAGE,
            quantity: 0.0,
            system_id2: Uuid::nil(),
        }
    }
}

impl QuoteSubmission {
    pub fn is_vatable(&self) -> bool {
        self.vat_option == DEFAULT_VAT_OPTION
    }

    /// Shape expected by the `SubmitMultipleQuotes` codeunit
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::json!({
            "SystemId": self.system_id2,
            "SystemId2": self.system_id2,
            "ItemNo": self.item_no,
            "Price": self.unit_cost,
            "PriceIncludesVAT": self.price_includes_vat,
            "VatOption": self.vat_option,
            "VatPercentage": self.vat_percentage,
            "Quantity": self.quantity,
        })
    }
}

crate::impl_has_system_id!(RfqPublishedLine, RfqVendorCategory);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::HasSystemId;

    #[test]
    fn test_line_defaults_and_nulls() {
        let line: RfqPublishedLine = serde_json::from_str(
            r#"{
                "systemId": "not-a-guid",
                "no": "ITEM-1",
                "specifications": null,
                "additionalNotes": null,
                "rfqStatus": null,
                "awardedtoVendorNo": null,
                "rfqExpirationDate": "2025-06-30"
            }"#,
        )
        .unwrap();

        assert_eq!(line.specifications, "");
        assert_eq!(line.awarded_to_vendor_no, "");
        assert_eq!(line.vat_option, "Vatable");
        assert_eq!(line.vat_percentage, 16.0);
        assert_eq!(line.system_id_guid(), Uuid::nil());
        assert_eq!(line.rfq_expiration_date, NaiveDate::from_ymd_opt(2025, 6, 30));

        let mut line = line;
        line.normalize();
        assert_eq!(line.rfq_status, "0");
    }

    #[test]
    fn test_awarded_matching_is_trimmed_and_case_insensitive() {
        let line = RfqPublishedLine {
            awarded_to_vendor_no: " v0001 ".into(),
            ..Default::default()
        };
        assert!(line.is_awarded_to("V0001"));
        assert!(!line.is_awarded_to("V0002"));
        assert!(!line.is_awarded_to(""));
    }

    #[test]
    fn test_apply_quote() {
        let mut line = RfqPublishedLine::default();
        let quote = QuoteDetails {
            line_system_id: String::new(),
            submitted_price: 120.5,
            vat_option: "Exempt".into(),
            vat_percentage: 0.0,
            price_includes_vat: true,
        };
        line.apply_quote(Some(&quote), 16.0);
        assert_eq!(line.direct_unit_cost, 120.5);
        assert_eq!(line.vat_option, "Exempt");
        assert!(line.price_includes_vat);

        line.apply_quote(None, 14.0);
        assert_eq!(line.vat_option, "Vatable");
        assert_eq!(line.vat_percentage, 14.0);
        assert!(!line.price_includes_vat);
    }

    #[test]
    fn test_submission_wire_shape() {
        let line_id = Uuid::new_v4();
        let submission: QuoteSubmission = serde_json::from_value(serde_json::json!({
            "itemNo": "ITEM-1",
            "unitCost": 10.0,
            "quantity": 2.0,
            "systemId2": line_id,
        }))
        .unwrap();

        assert!(submission.is_vatable());
        let wire = submission.to_wire();
        assert_eq!(wire["SystemId"], serde_json::json!(line_id));
        assert_eq!(wire["Price"], serde_json::json!(10.0));
        assert_eq!(wire["VatPercentage"], serde_json::json!(16.0));
    }
}
