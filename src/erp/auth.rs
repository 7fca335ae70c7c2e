//! Sign-in, registration and profile calls against `PortalAuthManagement`

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::config::ErpConfig;
use crate::core::error::ErpError;
use crate::core::{AuthService, hash_password};
use crate::erp::client::ErpClient;
use crate::erp::soap::SoapCall;
use crate::models::{ProfileUpdate, UserProfile};

const AUTH_SERVICE: &str = "PortalAuthManagement";
const RFQ_SERVICE: &str = "RFQVendorPortalAPI";

/// [`AuthService`] backed by the auth and RFQ codeunits
#[derive(Debug, Clone)]
pub struct ErpAuthService {
    client: ErpClient,
    auth_endpoint: String,
    rfq_endpoint: String,
    default_candidate_id: i64,
}

impl ErpAuthService {
    pub fn new(client: ErpClient, config: &ErpConfig) -> Self {
        Self {
            client,
            auth_endpoint: config.auth_endpoint.clone(),
            rfq_endpoint: config.rfq_endpoint.clone(),
            default_candidate_id: config.default_candidate_id,
        }
    }

    /// Run a boolean codeunit operation; any failure reads as `false`
    async fn confirm(&self, call: SoapCall) -> bool {
        match self.client.soap_call(&self.auth_endpoint, &call).await {
            Ok(reply) => reply.return_bool(),
            Err(e) => {
                tracing::error!(operation = call.operation(), error = %e, "auth call failed");
                false
            }
        }
    }

    async fn fetch_profile(&self, email: &str) -> Result<UserProfile> {
        let call = SoapCall::new(AUTH_SERVICE, "GetProfile")
            .param("email", email)
            .param("companyName", "")
            .param("phoneNumber", "")
            .param("profilePictureBase64", "");
        let reply = self.client.soap_call(&self.auth_endpoint, &call).await?;

        let picture = reply.value("profilePictureBase64").unwrap_or_default();
        let profile_picture = if picture.trim().is_empty() {
            None
        } else {
            Some(STANDARD.decode(picture.trim())?)
        };

        Ok(UserProfile {
            company_name: reply.value("companyName").unwrap_or_default(),
            phone_number: reply.value("phoneNumber").unwrap_or_default(),
            profile_picture,
        })
    }
}

#[async_trait]
impl AuthService for ErpAuthService {
    async fn create_user(&self, email: &str, password: &str, full_name: &str) -> Result<bool> {
        let call = SoapCall::new(AUTH_SERVICE, "CreateUser")
            .param("email", email)
            .param("passwordHash", hash_password(password))
            .param("fullName", full_name);
        Ok(self.confirm(call).await)
    }

    async fn validate_user(&self, email: &str, password: &str) -> Result<bool> {
        let call = SoapCall::new(AUTH_SERVICE, "ValidateUser")
            .param("email", email)
            .param("passwordHash", hash_password(password));
        Ok(self.confirm(call).await)
    }

    async fn vendor_no_by_email(&self, email: &str) -> Result<String> {
        let call = SoapCall::new(RFQ_SERVICE, "GetVendorNoByEmail").param("email", email);
        let reply = match self.client.soap_call(&self.rfq_endpoint, &call).await {
            Ok(reply) => reply,
            Err(e @ ErpError::SoapFault { .. }) => {
                tracing::error!(email = %email, error = %e, "vendor lookup faulted");
                return Err(anyhow!(e).context("Failed to get vendor number from the ERP"));
            }
            Err(e) => return Err(e.into()),
        };

        let vendor_no = reply.value("return_value").unwrap_or_default();
        if vendor_no.trim().is_empty() {
            bail!("No vendor assigned to this user");
        }
        Ok(vendor_no)
    }

    async fn candidate_id(&self, _email: &str) -> Result<i64> {
        Ok(self.default_candidate_id)
    }

    async fn profile(&self, email: &str) -> Result<Option<UserProfile>> {
        match self.fetch_profile(email).await {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                tracing::error!(email = %email, error = %e, "failed to read profile");
                Ok(None)
            }
        }
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<bool> {
        let picture = update
            .profile_picture
            .as_deref()
            .map(|bytes| STANDARD.encode(bytes))
            .unwrap_or_default();
        let call = SoapCall::new(AUTH_SERVICE, "UpdateProfile")
            .param("email", &update.email)
            .param("companyName", &update.company_name)
            .param("phoneNumber", &update.phone_number)
            .param("profilePictureBase64", picture);
        Ok(self.confirm(call).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn service(server: &MockServer) -> ErpAuthService {
        let config = ErpConfig {
            odata_base_url: server.base_url(),
            company: "CRONUS".into(),
            auth_endpoint: server.url("/soap/auth"),
            rfq_endpoint: server.url("/soap/rfq"),
            default_candidate_id: 42,
            ..Default::default()
        };
        ErpAuthService::new(ErpClient::new(&config).unwrap(), &config)
    }

    fn reply(op: &str, inner: &str) -> String {
        format!(
            "<Soap:Envelope><Soap:Body><{op}_Result>{inner}</{op}_Result></Soap:Body></Soap:Envelope>"
        )
    }

    #[tokio::test]
    async fn test_validate_user_sends_hash() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/soap/auth")
                    .body_contains(format!("<passwordHash>{}</passwordHash>", hash_password("s3cret")));
                then.status(200)
                    .body(reply("ValidateUser", "<return_value>true</return_value>"));
            })
            .await;

        let ok = service(&server)
            .validate_user("jane@example.com", "s3cret")
            .await
            .unwrap();
        assert!(ok);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_user_failure_is_false() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/soap/auth");
                then.status(500).body("<faultstring>User exists</faultstring>");
            })
            .await;

        let ok = service(&server)
            .create_user("jane@example.com", "pw", "Jane")
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_blank_vendor_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/soap/rfq");
                then.status(200)
                    .body(reply("GetVendorNoByEmail", "<return_value> </return_value>"));
            })
            .await;

        let err = service(&server)
            .vendor_no_by_email("jane@example.com")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No vendor assigned to this user");
    }

    #[tokio::test]
    async fn test_vendor_lookup() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/soap/rfq")
                    .body_contains("<email>jane@example.com</email>");
                then.status(200)
                    .body(reply("GetVendorNoByEmail", "<return_value>V0001</return_value>"));
            })
            .await;

        let vendor = service(&server)
            .vendor_no_by_email("jane@example.com")
            .await
            .unwrap();
        assert_eq!(vendor, "V0001");
    }

    #[tokio::test]
    async fn test_profile_decodes_picture() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/soap/auth").body_contains("GetProfile");
                then.status(200).body(reply(
                    "GetProfile",
                    "<companyName>Acme</companyName><phoneNumber>+254700000000</phoneNumber><profilePictureBase64>AQID</profilePictureBase64>",
                ));
            })
            .await;

        let profile = service(&server)
            .profile("jane@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.company_name, "Acme");
        assert_eq!(profile.phone_number, "+254700000000");
        assert_eq!(profile.profile_picture, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_profile_failure_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/soap/auth");
                then.status(503).body("unavailable");
            })
            .await;

        assert!(service(&server).profile("x@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_candidate_id_from_config() {
        let server = MockServer::start_async().await;
        assert_eq!(service(&server).candidate_id("x@example.com").await.unwrap(), 42);
    }
}
