//! Axum extractor for validated form posts
//!
//! Page handlers re-render the form with a validation summary instead of
//! rejecting the request, so validation failures are carried alongside the
//! parsed value. Only an unparsable body is rejected outright.

use axum::{
    Form,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::core::error::{PortalError, ValidationError};

/// A url-encoded form body and the outcome of its `validator` rules
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn login(form: Validated<LoginForm>) -> Response {
///     if !form.is_valid() {
///         // render the page with form.messages()
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Validated<T> {
    pub value: T,
    pub errors: Option<ValidationError>,
}

impl<T> Validated<T> {
    pub fn is_valid(&self) -> bool {
        self.errors.is_none()
    }

    /// Messages for the page's validation summary
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .as_ref()
            .map(ValidationError::messages)
            .unwrap_or_default()
    }
}

impl<T: Validate> Validated<T> {
    pub fn check(value: T) -> Self {
        let errors = value
            .validate()
            .err()
            .map(|e| ValidationError::from_validator(&e));
        Self { value, errors }
    }
}

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value): Form<T> = Form::from_request(req, state).await.map_err(|e| {
            PortalError::from(ValidationError::InvalidBody {
                message: e.body_text(),
            })
            .into_response()
        })?;

        Ok(Self::check(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::LoginForm;

    #[test]
    fn test_check_collects_messages() {
        let form = Validated::check(LoginForm {
            email: String::new(),
            password: String::new(),
            remember_me: false,
        });
        assert!(!form.is_valid());
        let messages = form.messages();
        assert!(messages.contains(&"The Password field is required.".to_string()));
    }

    #[test]
    fn test_check_valid_form() {
        let form = Validated::check(LoginForm {
            email: "jane@example.com".into(),
            password: "secret".into(),
            remember_me: true,
        });
        assert!(form.is_valid());
        assert!(form.messages().is_empty());
    }
}
