//! Configuration loading and management
//!
//! The portal reads a YAML file (see `portal.yaml`) and then applies
//! environment overrides named `PORTAL__<SECTION>__<KEY>`, for example
//! `PORTAL__ERP__ODATA_BASE_URL` or `PORTAL__SESSION__SECRET`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::ConfigError;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "PORTAL";

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: String,

    /// Directory holding static files; resumes land in `<web_root>/resumes`
    pub web_root: PathBuf,

    /// Upper bound for any request body, uploads included
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            web_root: PathBuf::from("wwwroot"),
            max_request_bytes: 12 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn resumes_dir(&self) -> PathBuf {
        self.web_root.join("resumes")
    }
}

/// ERP connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ErpConfig {
    /// OData root, up to but excluding `Company('...')`
    pub odata_base_url: String,
    pub company: String,
    pub odata_username: String,
    pub odata_password: String,

    pub soap_username: String,
    pub soap_password: String,

    /// `PortalAuthManagement` codeunit
    pub auth_endpoint: String,
    /// `RFQVendorPortalAPI` codeunit
    pub rfq_endpoint: String,
    /// `TenderDocumentAPI` codeunit
    pub tender_endpoint: String,
    /// `ApplicationManagement` codeunit
    pub job_endpoint: String,

    pub timeout_seconds: u64,

    /// Candidate id issued to every signed-in user
    pub default_candidate_id: i64,
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            odata_base_url: String::new(),
            company: String::new(),
            odata_username: String::new(),
            odata_password: String::new(),
            soap_username: String::new(),
            soap_password: String::new(),
            auth_endpoint: String::new(),
            rfq_endpoint: String::new(),
            tender_endpoint: String::new(),
            job_endpoint: String::new(),
            timeout_seconds: 30,
            default_candidate_id: 1,
        }
    }
}

/// Session cookie settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Signing secret, at least 32 bytes
    pub secret: String,
    pub ttl_hours: i64,
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_hours: 2,
            cookie_name: ".VendorPortal.Auth".to_string(),
        }
    }
}

/// Complete portal configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub server: ServerConfig,
    pub erp: ErpConfig,
    pub session: SessionConfig,
}

impl PortalConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// File (when present) plus process environment, validated
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_yaml_file(path)?,
            Some(path) => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_overrides(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PORTAL__SECTION__KEY=value` pairs; unrelated variables are ignored
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut tree = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        let mut touched = false;

        for (name, value) in vars {
            let mut parts = name.as_ref().split("__");
            let (Some(prefix), Some(section), Some(key), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            if prefix != ENV_PREFIX {
                continue;
            }

            let section = section.to_ascii_lowercase();
            let key = key.to_ascii_lowercase();
            let field = format!("{}.{}", section, key);
            let Some(slot) = tree.get_mut(&section).and_then(|s| s.get_mut(&key)) else {
                tracing::warn!(variable = name.as_ref(), "unknown configuration override");
                continue;
            };

            *slot = coerce(&field, slot, value.into())?;
            touched = true;
        }

        if touched {
            *self = serde_json::from_value(tree).map_err(|e| ConfigError::ParseError {
                file: None,
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Reject configurations the services cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(&self.erp.auth_endpoint, "auth_endpoint", "erp")?;
        require(&self.erp.rfq_endpoint, "rfq_endpoint", "erp")?;
        require(&self.erp.soap_username, "soap_username", "erp")?;
        require(&self.erp.soap_password, "soap_password", "erp")?;
        require(&self.erp.odata_base_url, "odata_base_url", "erp")?;
        require(&self.erp.company, "company", "erp")?;

        for (field, raw) in [
            ("erp.odata_base_url", &self.erp.odata_base_url),
            ("erp.auth_endpoint", &self.erp.auth_endpoint),
            ("erp.rfq_endpoint", &self.erp.rfq_endpoint),
            ("erp.tender_endpoint", &self.erp.tender_endpoint),
            ("erp.job_endpoint", &self.erp.job_endpoint),
        ] {
            if raw.is_empty() {
                continue;
            }
            url::Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
                field: field.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            })?;
        }

        if self.session.secret.len() < crate::core::SessionCodec::MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue {
                field: "session.secret".into(),
                value: "<redacted>".into(),
                message: "must be at least 32 bytes".into(),
            });
        }
        if self.session.ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.ttl_hours".into(),
                value: self.session.ttl_hours.to_string(),
                message: "must be positive".into(),
            });
        }
        if self.erp.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "erp.timeout_seconds".into(),
                value: "0".into(),
                message: "must be positive".into(),
            });
        }
        Ok(())
    }
}

fn require(value: &str, field: &str, context: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingField {
            field: field.to_string(),
            context: context.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Convert a raw override to the type of the value it replaces
fn coerce(field: &str, current: &Value, raw: String) -> Result<Value, ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        field: field.to_string(),
        value: raw.clone(),
        message: message.to_string(),
    };

    match current {
        Value::Number(_) => {
            if let Ok(n) = raw.trim().parse::<i64>() {
                Ok(Value::from(n))
            } else if let Ok(n) = raw.trim().parse::<u64>() {
                Ok(Value::from(n))
            } else {
                Err(invalid("expected an integer"))
            }
        }
        Value::Bool(_) => raw
            .trim()
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| invalid("expected true or false")),
        _ => Ok(Value::String(raw)),
    }
}
