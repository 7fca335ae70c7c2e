//! OData envelope and the value conventions shared by every entity set

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Collection envelope returned by every OData entity set query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ODataResponse<T> {
    #[serde(rename = "@odata.context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

impl<T> Default for ODataResponse<T> {
    fn default() -> Self {
        Self {
            context: None,
            value: Vec::new(),
        }
    }
}

/// Deserialize `null` as the type's default value
///
/// The backend sends `null` for blank text fields on some entity sets.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Date fields arrive either as `YYYY-MM-DD` or as a full timestamp.
/// The blank date `0001-01-01` and unparsable values map to `None`.
pub mod erp_date {
    use super::*;

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
            .or_else(|| {
                chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|d| d.date())
            })?;
        (Some(date) != NaiveDate::from_ymd_opt(1, 1, 1)).then_some(date)
    }

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }
}

/// Percent-encode a value for use inside a URL, leaving only RFC 3986
/// unreserved characters as they are
pub fn escape_data_string(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Quote a string literal for an OData `$filter` expression
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Build `<field> eq '<a>' or <field> eq '<b>' ...`
pub fn any_of(field: &str, values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("{} eq {}", field, quote_literal(v)))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// `?$filter=<escaped expression>`
pub fn filter_query(expression: &str) -> String {
    format!("$filter={}", escape_data_string(expression))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize, Default)]
    struct Row {
        #[serde(default, deserialize_with = "nullable")]
        status: String,
        #[serde(default, with = "erp_date")]
        closing_date: Option<NaiveDate>,
    }

    #[test]
    fn test_envelope_defaults_missing_value() {
        let parsed: ODataResponse<serde_json::Value> =
            serde_json::from_str(r#"{"@odata.context":"x"}"#).unwrap();
        assert!(parsed.value.is_empty());
        assert_eq!(parsed.context.as_deref(), Some("x"));
    }

    #[test]
    fn test_null_string_becomes_empty() {
        let row: Row = serde_json::from_str(r#"{"status":null}"#).unwrap();
        assert_eq!(row.status, "");
        assert!(row.closing_date.is_none());
    }

    #[test]
    fn test_dates_in_both_shapes() {
        let row: Row = serde_json::from_str(r#"{"closing_date":"2025-03-01"}"#).unwrap();
        assert_eq!(row.closing_date, NaiveDate::from_ymd_opt(2025, 3, 1));

        let row: Row =
            serde_json::from_str(r#"{"closing_date":"2025-03-01T10:00:00Z"}"#).unwrap();
        assert_eq!(row.closing_date, NaiveDate::from_ymd_opt(2025, 3, 1));

        let row: Row = serde_json::from_str(r#"{"closing_date":"0001-01-01"}"#).unwrap();
        assert!(row.closing_date.is_none());
    }

    #[test]
    fn test_escape_data_string() {
        assert_eq!(escape_data_string("CRONUS Kenya Ltd."), "CRONUS%20Kenya%20Ltd.");
        assert_eq!(escape_data_string("a'b&c"), "a%27b%26c");
        assert_eq!(escape_data_string("~_-."), "~_-.");
        assert_eq!(escape_data_string("A B'"), "A%20B%27");
        assert_eq!(escape_data_string("R&D/Ltd*"), "R%26D%2FLtd%2A");
    }

    #[test]
    fn test_filters() {
        assert_eq!(quote_literal("O'Neil"), "'O''Neil'");
        assert_eq!(
            any_of("CategoryCode", &["IT".to_string(), "FURN".to_string()]),
            "CategoryCode eq 'IT' or CategoryCode eq 'FURN'"
        );
        assert_eq!(
            filter_query("No eq 'REQ-1'"),
            "$filter=No%20eq%20%27REQ-1%27"
        );
    }
}
