//! Imprest and item requisitions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::odata::{erp_date, nullable};

/// Line type required on imprest requisitions
pub const GL_ACCOUNT_LINE: &str = "G/L Account";

/// Line type required on item requisitions
pub const ITEM_LINE: &str = "Item";

/// The two kinds of requisition a user may raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequisitionType {
    Imprest,
    Item,
}

impl RequisitionType {
    /// Exact, case-sensitive match on `Imprest` / `Item`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Imprest" => Some(Self::Imprest),
            "Item" => Some(Self::Item),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Imprest => "Imprest",
            Self::Item => "Item",
        }
    }

    /// Line type every line of this requisition must carry
    pub fn line_type(self) -> &'static str {
        match self {
            Self::Imprest => GL_ACCOUNT_LINE,
            Self::Item => ITEM_LINE,
        }
    }

    pub fn line_type_error(self) -> &'static str {
        match self {
            Self::Imprest => "All lines must be G/L Accounts for Imprest requisitions",
            Self::Item => "All lines must be Items for Item requisitions",
        }
    }
}

/// Requisition header as listed by `ImprestItemReqHeaderAPI`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionHeader {
    #[serde(default, deserialize_with = "nullable")]
    pub system_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub no: String,
    #[serde(rename = "reqTypeAPI", default, deserialize_with = "nullable")]
    pub req_type_api: String,
    #[serde(default, deserialize_with = "nullable")]
    pub requisition_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub requestor_id: String,
    #[serde(default, with = "erp_date")]
    pub request_date: Option<NaiveDate>,
    #[serde(default, with = "erp_date")]
    pub posting_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(rename = "shortcutDimension1Code", default, deserialize_with = "nullable")]
    pub department_code: String,
    #[serde(rename = "shortcutDimension2Code", default, deserialize_with = "nullable")]
    pub project_code: String,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub document_count: i64,
}

/// Requisition line, also the shape lines are submitted in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionLine {
    #[serde(default, deserialize_with = "nullable")]
    pub system_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub document_no: String,
    #[serde(default)]
    pub line_no: i64,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub line_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub unit_of_measure: String,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub location_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub bin_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub job_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub job_task_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub shortcut_dimension1_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub shortcut_dimension2_code: String,
}

impl RequisitionLine {
    /// Body posted to `ImprestItemReqLineAPI` under `document_no`
    pub fn to_create_body(&self, document_no: &str) -> serde_json::Value {
        let unit_of_measure = if self.line_type == GL_ACCOUNT_LINE {
            ""
        } else {
            self.unit_of_measure.as_str()
        };
        serde_json::json!({
            "documentNo": document_no,
            "type": self.line_type,
            "no": self.no,
            "description": self.description,
            "quantity": self.quantity,
            "unitOfMeasure": unit_of_measure,
            "unitCost": self.unit_cost,
            "locationCode": self.location_code,
            "binCode": self.bin_code,
            "shortcutDimension1Code": self.shortcut_dimension1_code,
            "shortcutDimension2Code": self.shortcut_dimension2_code,
        })
    }
}

/// A supporting document attached to a requisition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionDocument {
    #[serde(default, deserialize_with = "nullable")]
    pub system_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub requisition_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub file_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub file_extension: String,
    #[serde(default, deserialize_with = "nullable")]
    pub document_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub security_level: String,
    #[serde(default)]
    pub is_encrypted: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub uploaded_by: String,
    #[serde(default, with = "erp_date")]
    pub uploaded_date: Option<NaiveDate>,
}

/// Shortcut dimension value (department or project)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    #[serde(default, deserialize_with = "nullable")]
    pub code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, deserialize_with = "nullable")]
    pub no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub item_type: String,
    #[serde(default)]
    pub inventory: f64,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub unit_of_measure: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlAccount {
    #[serde(default, deserialize_with = "nullable")]
    pub no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
}

/// New requisition posted by the browser
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequisitionRequest {
    #[serde(default)]
    pub requisition_type: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "The Description field is required."))]
    pub description: String,
    #[serde(default)]
    pub lines: Vec<RequisitionLine>,
}

/// Replacement header values and lines for an existing requisition
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditRequisitionRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "The DocumentNo field is required."))]
    pub document_no: String,
    #[serde(default)]
    pub posting_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub department_code: String,
    #[serde(default)]
    pub project_code: String,
    #[serde(default)]
    pub lines: Vec<RequisitionLine>,
}

/// Supporting document headed for `ImprestItemReqDocAPI`
#[derive(Debug, Clone, PartialEq)]
pub struct RequisitionUpload {
    pub requisition_no: String,
    pub file_name: String,
    pub content: Vec<u8>,
    pub document_type: String,
    pub security_level: String,
    pub is_encrypted: bool,
    pub uploaded_by: Option<String>,
}

crate::impl_has_system_id!(RequisitionHeader, RequisitionLine, RequisitionDocument);
