//! Cookie session for signed-in vendors and candidates
//!
//! The session cookie carries a signed, base64 JSON [`Identity`]. Expiry is
//! checked against the embedded timestamp, so a persistent cookie replayed
//! after its lifetime is refused even if the browser kept it.
//!
//! One-shot [`Flash`] messages travel the same way in a second cookie.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, CookieJar, Key, SameSite};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256, Sha512};

use crate::core::error::ConfigError;

/// Lowercase hex SHA-256 of a plain password, the form the ERP stores
pub fn hash_password(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}

/// Claims of a signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub email: String,
    pub candidate_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Who is making the request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthContext {
    /// Valid, unexpired session
    User(Identity),

    /// No cookie, a tampered one, or an expired one
    Anonymous,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::User(_))
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            AuthContext::User(identity) => Some(&identity.email),
            AuthContext::Anonymous => None,
        }
    }

    pub fn candidate_id(&self) -> Option<i64> {
        match self {
            AuthContext::User(identity) => Some(identity.candidate_id),
            AuthContext::Anonymous => None,
        }
    }
}

/// Banner messages shown once on the next rendered page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(message.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: None,
            error: Some(message.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.success.is_none() && self.error.is_none()
    }
}

/// Issues and verifies the session and flash cookies
#[derive(Clone)]
pub struct SessionCodec {
    key: Key,
    cookie_name: String,
    flash_cookie_name: String,
    ttl: Duration,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("cookie_name", &self.cookie_name)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionCodec {
    /// Minimum secret length accepted for signing
    pub const MIN_SECRET_LEN: usize = 32;

    pub fn new(secret: &str, cookie_name: &str, ttl_hours: i64) -> Result<Self, ConfigError> {
        if secret.len() < Self::MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue {
                field: "session.secret".into(),
                value: "<redacted>".into(),
                message: format!("must be at least {} bytes", Self::MIN_SECRET_LEN),
            });
        }
        if ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.ttl_hours".into(),
                value: ttl_hours.to_string(),
                message: "must be positive".into(),
            });
        }

        let digest = Sha512::digest(secret.as_bytes());
        let key = Key::try_from(digest.as_slice()).map_err(|e| ConfigError::InvalidValue {
            field: "session.secret".into(),
            value: "<redacted>".into(),
            message: e.to_string(),
        })?;

        Ok(Self {
            key,
            cookie_name: cookie_name.to_string(),
            flash_cookie_name: format!("{}.Flash", cookie_name),
            ttl: Duration::hours(ttl_hours),
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signed session cookie for a successful sign-in
    ///
    /// `persistent` (remember me) sets `Max-Age`; otherwise the browser drops
    /// the cookie when it closes.
    pub fn issue(
        &self,
        email: &str,
        candidate_id: i64,
        persistent: bool,
        now: DateTime<Utc>,
    ) -> Cookie<'static> {
        let identity = Identity {
            email: email.to_string(),
            candidate_id,
            expires_at: now + self.ttl,
        };

        let mut cookie = self.base_cookie(self.cookie_name.clone(), encode_payload(&identity));
        if persistent {
            cookie.set_max_age(cookie::time::Duration::seconds(self.ttl.num_seconds()));
        }
        self.sign(cookie)
    }

    /// Resolve the request's session at `now`
    pub fn authenticate(&self, headers: &HeaderMap, now: DateTime<Utc>) -> AuthContext {
        let Some(identity) = self.verified::<Identity>(headers, &self.cookie_name) else {
            return AuthContext::Anonymous;
        };

        if identity.expires_at <= now {
            tracing::debug!(email = %identity.email, "session expired");
            return AuthContext::Anonymous;
        }

        AuthContext::User(identity)
    }

    /// Cookie that removes the session
    pub fn clear(&self) -> Cookie<'static> {
        let mut cookie = self.base_cookie(self.cookie_name.clone(), String::new());
        cookie.make_removal();
        cookie
    }

    pub fn flash_cookie(&self, flash: &Flash) -> Cookie<'static> {
        let cookie = self.base_cookie(self.flash_cookie_name.clone(), encode_payload(flash));
        self.sign(cookie)
    }

    /// Pending flash messages, empty when absent or tampered with
    pub fn read_flash(&self, headers: &HeaderMap) -> Flash {
        self.verified::<Flash>(headers, &self.flash_cookie_name)
            .unwrap_or_default()
    }

    pub fn has_flash(&self, headers: &HeaderMap) -> bool {
        request_jar(headers).get(&self.flash_cookie_name).is_some()
    }

    pub fn clear_flash(&self) -> Cookie<'static> {
        let mut cookie = self.base_cookie(self.flash_cookie_name.clone(), String::new());
        cookie.make_removal();
        cookie
    }

    fn base_cookie(&self, name: String, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }

    fn sign(&self, cookie: Cookie<'static>) -> Cookie<'static> {
        let name = cookie.name().to_string();
        let mut jar = CookieJar::new();
        jar.signed_mut(&self.key).add(cookie.clone());
        jar.get(&name).cloned().unwrap_or(cookie)
    }

    fn verified<T: DeserializeOwned>(&self, headers: &HeaderMap, name: &str) -> Option<T> {
        let jar = request_jar(headers);
        let cookie = jar.signed(&self.key).get(name)?;
        decode_payload(cookie.value())
    }
}

fn request_jar(headers: &HeaderMap) -> CookieJar {
    let mut jar = CookieJar::new();
    for value in headers.get_all(COOKIE) {
        let Ok(raw) = value.to_str() else {
            continue;
        };
        for cookie in Cookie::split_parse_encoded(raw).flatten() {
            jar.add_original(cookie.into_owned());
        }
    }
    jar
}

fn encode_payload<T: Serialize>(payload: &T) -> String {
    let json = serde_json::to_vec(payload).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode_payload<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "0123456789abcdef0123456789abcdef-test";

    fn codec() -> SessionCodec {
        SessionCodec::new(SECRET, ".VendorPortal.Auth", 2).unwrap()
    }

    fn headers_with(cookie: &Cookie<'_>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let pair = cookie.encoded().stripped().to_string();
        headers.insert(COOKIE, HeaderValue::from_str(&pair).unwrap());
        headers
    }

    #[test]
    fn test_hash_password_is_lowercase_hex_sha256() {
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(SessionCodec::new("short", "x", 2).is_err());
        assert!(SessionCodec::new(SECRET, "x", 0).is_err());
    }

    #[test]
    fn test_issue_then_authenticate() {
        let codec = codec();
        let now = Utc::now();
        let cookie = codec.issue("jane@example.com", 1, false, now);
        assert!(cookie.max_age().is_none());
        assert!(cookie.http_only().unwrap_or(false));

        let ctx = codec.authenticate(&headers_with(&cookie), now);
        assert_eq!(ctx.email(), Some("jane@example.com"));
        assert_eq!(ctx.candidate_id(), Some(1));
    }

    #[test]
    fn test_remember_me_sets_max_age() {
        let cookie = codec().issue("jane@example.com", 1, true, Utc::now());
        assert_eq!(
            cookie.max_age(),
            Some(cookie::time::Duration::hours(2))
        );
    }

    #[test]
    fn test_expired_session_is_anonymous() {
        let codec = codec();
        let issued = Utc::now() - Duration::hours(3);
        let cookie = codec.issue("jane@example.com", 1, true, issued);
        let ctx = codec.authenticate(&headers_with(&cookie), Utc::now());
        assert_eq!(ctx, AuthContext::Anonymous);
    }

    #[test]
    fn test_tampered_cookie_rejected() {
        let codec = codec();
        let cookie = codec.issue("jane@example.com", 1, false, Utc::now());
        let forged = Identity {
            email: "admin@example.com".into(),
            candidate_id: 1,
            expires_at: Utc::now() + Duration::hours(1),
        };
        let tampered = Cookie::new(cookie.name().to_string(), encode_payload(&forged));
        assert!(!codec.authenticate(&headers_with(&tampered), Utc::now()).is_authenticated());

        let other = SessionCodec::new("another-secret-that-is-long-enough!!", ".VendorPortal.Auth", 2)
            .unwrap();
        assert!(!other.authenticate(&headers_with(&cookie), Utc::now()).is_authenticated());
    }

    #[test]
    fn test_missing_cookie_is_anonymous() {
        assert!(!codec().authenticate(&HeaderMap::new(), Utc::now()).is_authenticated());
    }

    #[test]
    fn test_flash_round_trip() {
        let codec = codec();
        let cookie = codec.flash_cookie(&Flash::error("Invalid login attempt."));
        let headers = headers_with(&cookie);
        assert!(codec.has_flash(&headers));
        let flash = codec.read_flash(&headers);
        assert_eq!(flash.error.as_deref(), Some("Invalid login attempt."));
        assert!(flash.success.is_none());
    }

    #[test]
    fn test_clear_removes_cookie() {
        let cookie = codec().clear();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::ZERO));
    }
}
