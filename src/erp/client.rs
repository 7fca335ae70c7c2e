//! HTTP client for the ERP's OData entity sets and SOAP codeunits

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ErpConfig;
use crate::core::error::ErpError;
use crate::erp::soap::{SoapCall, SoapReply};
use crate::models::odata::{ODataResponse, escape_data_string};

/// Shared connection to one ERP company
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct ErpClient {
    http: Client,
    odata_base: String,
    company: String,
    odata_credentials: (String, String),
    soap_credentials: (String, String),
}

impl std::fmt::Debug for ErpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpClient")
            .field("odata_base", &self.odata_base)
            .field("company", &self.company)
            .finish_non_exhaustive()
    }
}

impl ErpClient {
    pub fn new(config: &ErpConfig) -> Result<Self, ErpError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ErpError::Transport {
                url: config.odata_base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            odata_base: config.odata_base_url.trim_end_matches('/').to_string(),
            company: config.company.clone(),
            odata_credentials: (config.odata_username.clone(), config.odata_password.clone()),
            soap_credentials: (config.soap_username.clone(), config.soap_password.clone()),
        })
    }

    /// Absolute URL of `path` (entity set plus optional key, segment and query)
    pub fn entity_url(&self, path: &str) -> String {
        format!(
            "{}/Company('{}')/{}",
            self.odata_base,
            escape_data_string(&self.company),
            path.trim_start_matches('/')
        )
    }

    fn odata(&self, request: RequestBuilder) -> RequestBuilder {
        let (user, password) = &self.odata_credentials;
        request
            .basic_auth(user, Some(password))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Response, ErpError> {
        request.send().await.map_err(|e| ErpError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn ensure_success(url: &str, response: Response) -> Result<Response, ErpError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ErpError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ErpError> {
        let bytes = response.bytes().await.map_err(|e| ErpError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ErpError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// GET a single JSON document
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ErpError> {
        let url = self.entity_url(path);
        tracing::debug!(url = %url, "odata get");
        let response = self.send(&url, self.odata(self.http.get(&url))).await?;
        let response = Self::ensure_success(&url, response).await?;
        Self::decode(&url, response).await
    }

    /// GET a collection and unwrap its `value` array
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ErpError> {
        let envelope: ODataResponse<T> = self.get_json(path).await?;
        Ok(envelope.value)
    }

    /// GET a single document, `None` on any non-success status
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ErpError> {
        let url = self.entity_url(path);
        let response = self.send(&url, self.odata(self.http.get(&url))).await?;
        if !response.status().is_success() {
            tracing::debug!(url = %url, status = %response.status(), "odata lookup missed");
            return Ok(None);
        }
        Self::decode(&url, response).await.map(Some)
    }

    /// GET raw JSON, `None` on any non-success status
    pub async fn get_value(&self, path: &str) -> Result<Option<serde_json::Value>, ErpError> {
        self.get_optional(path).await
    }

    /// POST a JSON body and decode the created record
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ErpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.entity_url(path);
        tracing::debug!(url = %url, "odata post");
        let response = self
            .send(&url, self.odata(self.http.post(&url)).json(body))
            .await?;
        let response = Self::ensure_success(&url, response).await?;
        Self::decode(&url, response).await
    }

    /// POST a JSON body, ignoring the response content
    pub async fn post(&self, path: &str, body: &serde_json::Value) -> Result<(), ErpError> {
        let url = self.entity_url(path);
        tracing::debug!(url = %url, "odata post");
        let response = self
            .send(&url, self.odata(self.http.post(&url)).json(body))
            .await?;
        Self::ensure_success(&url, response).await.map(|_| ())
    }

    /// PATCH a record unconditionally (`If-Match: *`)
    pub async fn patch(&self, path: &str, body: &serde_json::Value) -> Result<(), ErpError> {
        let url = self.entity_url(path);
        tracing::debug!(url = %url, "odata patch");
        let request = self
            .odata(self.http.patch(&url))
            .header("If-Match", "*")
            .json(body);
        let response = self.send(&url, request).await?;
        Self::ensure_success(&url, response).await.map(|_| ())
    }

    /// DELETE a record; `Ok(false)` when the backend refused
    pub async fn delete(&self, path: &str, if_match: bool) -> Result<bool, ErpError> {
        let url = self.entity_url(path);
        tracing::debug!(url = %url, "odata delete");
        let mut request = self.odata(self.http.delete(&url));
        if if_match {
            request = request.header("If-Match", "*");
        }
        let response = self.send(&url, request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = %status, body = %body, "odata delete refused");
        }
        Ok(status.is_success())
    }

    /// GET binary content with its content type, `None` on any non-success status
    pub async fn get_bytes(
        &self,
        path: &str,
    ) -> Result<Option<(Vec<u8>, Option<String>)>, ErpError> {
        let url = self.entity_url(path);
        let response = self.send(&url, self.odata(self.http.get(&url))).await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(|e| ErpError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;
        Ok(Some((bytes.to_vec(), content_type)))
    }

    /// Invoke a codeunit operation at `endpoint`
    pub async fn soap_call(&self, endpoint: &str, call: &SoapCall) -> Result<SoapReply, ErpError> {
        let (user, password) = &self.soap_credentials;
        tracing::debug!(endpoint = %endpoint, operation = call.operation(), "soap call");

        let request = self
            .http
            .post(endpoint)
            .basic_auth(user, Some(password))
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", call.action())
            .body(call.envelope());
        let response = self.send(endpoint, request).await?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ErpError::Transport {
            url: endpoint.to_string(),
            message: e.to_string(),
        })?;

        // Faults come back as 500 with a fault body; prefer the fault text.
        let reply = SoapReply::parse(call.operation(), body.clone())?;
        if !status.is_success() {
            return Err(ErpError::Status {
                url: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(reply)
    }
}
