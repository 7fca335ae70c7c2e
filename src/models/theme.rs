//! Portal colour scheme

use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIMARY: &str = "#0d6efd";
pub const DEFAULT_SECONDARY: &str = "#6c757d";
pub const DEFAULT_TERTIARY1: &str = "#198754";
pub const DEFAULT_TERTIARY2: &str = "#ffc107";
pub const DEFAULT_TERTIARY3: &str = "#0dcaf0";

/// Colours every page is rendered with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSettings {
    pub primary_color: String,
    pub secondary_color: String,
    pub tertiary1_color: String,
    pub tertiary2_color: String,
    pub tertiary3_color: String,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY.to_string(),
            secondary_color: DEFAULT_SECONDARY.to_string(),
            tertiary1_color: DEFAULT_TERTIARY1.to_string(),
            tertiary2_color: DEFAULT_TERTIARY2.to_string(),
            tertiary3_color: DEFAULT_TERTIARY3.to_string(),
        }
    }
}

impl ColorSettings {
    /// Inline CSS custom properties for the layout's root element
    pub fn css_variables(&self) -> String {
        format!(
            "--primary-color: {}; --secondary-color: {}; --tertiary1-color: {}; --tertiary2-color: {}; --tertiary3-color: {};",
            self.primary_color,
            self.secondary_color,
            self.tertiary1_color,
            self.tertiary2_color,
            self.tertiary3_color
        )
    }
}

/// First row of `RFQTenderSetupAPI`; absent colours fall back to the defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqTenderSetup {
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub tertiary1_color: Option<String>,
    #[serde(default)]
    pub tertiary2_color: Option<String>,
    #[serde(default)]
    pub tertiary3_color: Option<String>,
}

impl From<Option<RfqTenderSetup>> for ColorSettings {
    fn from(setup: Option<RfqTenderSetup>) -> Self {
        let setup = setup.unwrap_or_default();
        let pick = |value: Option<String>, fallback: &str| value.unwrap_or_else(|| fallback.to_string());
        Self {
            primary_color: pick(setup.primary_color, DEFAULT_PRIMARY),
            secondary_color: pick(setup.secondary_color, DEFAULT_SECONDARY),
            tertiary1_color: pick(setup.tertiary1_color, DEFAULT_TERTIARY1),
            tertiary2_color: pick(setup.tertiary2_color, DEFAULT_TERTIARY2),
            tertiary3_color: pick(setup.tertiary3_color, DEFAULT_TERTIARY3),
        }
    }
}

/// `PurchasesPayablesSetup` row carrying the default VAT rate
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasesPayablesSetup {
    #[serde(default)]
    pub default_vat_percentage: Option<f64>,
}
