//! Minimal SOAP 1.1 document/literal support for ERP codeunits
//!
//! Codeunit operations take a flat list of string parameters and answer with
//! a flat list of elements (`return_value` plus any out-parameters), so an
//! envelope template and element lookup cover every call the portal makes.

use regex::Regex;

use crate::core::error::ErpError;

const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const CODEUNIT_NS: &str = "urn:microsoft-dynamics-schemas/codeunit/";

/// One codeunit operation with its parameters in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct SoapCall {
    service: String,
    operation: String,
    params: Vec<(String, String)>,
}

impl SoapCall {
    pub fn new(service: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            operation: operation.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn namespace(&self) -> String {
        format!("{}{}", CODEUNIT_NS, self.service)
    }

    /// Value of the `SOAPAction` header, quoted as the binding expects
    pub fn action(&self) -> String {
        format!("\"{}:{}\"", self.namespace(), self.operation)
    }

    pub fn envelope(&self) -> String {
        let params: String = self
            .params
            .iter()
            .map(|(name, value)| format!("<{name}>{}</{name}>", xml_escape(value)))
            .collect();

        format!(
            concat!(
                r#"<?xml version="1.0" encoding="utf-8"?>"#,
                r#"<soap:Envelope xmlns:soap="{envelope}">"#,
                r#"<soap:Body><{op} xmlns="{ns}">{params}</{op}></soap:Body>"#,
                r#"</soap:Envelope>"#
            ),
            envelope = ENVELOPE_NS,
            op = self.operation,
            ns = self.namespace(),
            params = params,
        )
    }
}

/// Response body of a codeunit call
#[derive(Debug, Clone, PartialEq)]
pub struct SoapReply {
    operation: String,
    body: String,
}

impl SoapReply {
    /// Wrap a response body, turning a SOAP fault into an error
    pub fn parse(operation: &str, body: String) -> Result<Self, ErpError> {
        let reply = Self {
            operation: operation.to_string(),
            body,
        };
        match reply.value("faultstring") {
            Some(fault) => Err(ErpError::SoapFault {
                operation: operation.to_string(),
                fault,
            }),
            None => Ok(reply),
        }
    }

    /// Unescaped text of the first element called `name`, ignoring prefixes
    pub fn value(&self, name: &str) -> Option<String> {
        let name = regex::escape(name);
        let paired = Regex::new(&format!(
            r"(?s)<(?:[A-Za-z0-9_]+:)?{name}(?:\s[^>]*)?>(.*?)</(?:[A-Za-z0-9_]+:)?{name}>"
        ))
        .ok()?;
        if let Some(caps) = paired.captures(&self.body) {
            return caps.get(1).map(|m| xml_unescape(m.as_str()));
        }

        let empty = Regex::new(&format!(r"<(?:[A-Za-z0-9_]+:)?{name}(?:\s[^>]*)?/>")).ok()?;
        empty.is_match(&self.body).then(String::new)
    }

    /// `return_value` or an error naming the operation
    pub fn return_value(&self) -> Result<String, ErpError> {
        self.required("return_value")
    }

    /// `return_value` read as a boolean; anything but `true` is `false`
    pub fn return_bool(&self) -> bool {
        self.value("return_value")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    pub fn required(&self, name: &str) -> Result<String, ErpError> {
        self.value(name).ok_or_else(|| ErpError::MissingElement {
            operation: self.operation.clone(),
            element: name.to_string(),
        })
    }
}

pub fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn xml_unescape(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_and_action() {
        let call = SoapCall::new("PortalAuthManagement", "ValidateUser")
            .param("email", "a&b@example.com")
            .param("passwordHash", "abc");

        assert_eq!(
            call.action(),
            "\"urn:microsoft-dynamics-schemas/codeunit/PortalAuthManagement:ValidateUser\""
        );
        let envelope = call.envelope();
        assert!(envelope.contains(
            r#"<ValidateUser xmlns="urn:microsoft-dynamics-schemas/codeunit/PortalAuthManagement">"#
        ));
        assert!(envelope.contains("<email>a&amp;b@example.com</email>"));
        assert!(envelope.contains("<passwordHash>abc</passwordHash>"));
    }

    #[test]
    fn test_reply_values() {
        let body = r#"<Soap:Envelope xmlns:Soap="http://schemas.xmlsoap.org/soap/envelope/">
            <Soap:Body>
              <GetProfile_Result xmlns="urn:microsoft-dynamics-schemas/codeunit/PortalAuthManagement">
                <companyName>Acme &amp; Sons</companyName>
                <phoneNumber/>
                <return_value>true</return_value>
              </GetProfile_Result>
            </Soap:Body>
          </Soap:Envelope>"#;
        let reply = SoapReply::parse("GetProfile", body.to_string()).unwrap();
        assert_eq!(reply.value("companyName").as_deref(), Some("Acme & Sons"));
        assert_eq!(reply.value("phoneNumber").as_deref(), Some(""));
        assert_eq!(reply.value("profilePictureBase64"), None);
        assert!(reply.return_bool());
    }

    #[test]
    fn test_fault_is_error() {
        let body = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
            <s:Fault><faultcode>a:Microsoft.Dynamics.Nav.Service</faultcode>
            <faultstring xml:lang="en-US">The user does not exist.</faultstring></s:Fault>
            </s:Body></s:Envelope>"#;
        match SoapReply::parse("CreateUser", body.to_string()) {
            Err(ErpError::SoapFault { operation, fault }) => {
                assert_eq!(operation, "CreateUser");
                assert_eq!(fault, "The user does not exist.");
            }
            other => panic!("Expected SoapFault, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_return_value() {
        let reply = SoapReply::parse("X", "<a/>".to_string()).unwrap();
        assert!(matches!(
            reply.return_value(),
            Err(ErpError::MissingElement { .. })
        ));
        assert!(!reply.return_bool());
    }

    #[test]
    fn test_escape_round_trip_of_markup() {
        let raw = r#"<tag a="1">Tom's & Jerry's</tag>"#;
        assert_eq!(xml_unescape(&xml_escape(raw)), raw);
    }
}
