//! Registration, sign-in and profile forms

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn is_valid_phone(phone: &str) -> bool {
    static PHONE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+?[0-9][0-9 ()\-.]{4,}$").ok())
        .as_ref()
        .is_none_or(|regex| regex.is_match(phone))
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || is_valid_phone(value) {
        Ok(())
    } else {
        Err(ValidationError::new("phone")
            .with_message("The Phone Number field is not a valid phone number.".into()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct RegistrationForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "The FullName field is required."))]
    pub full_name: String,

    #[serde(default)]
    #[validate(
        length(min = 1, message = "The Email field is required."),
        email(message = "The Email field is not a valid e-mail address.")
    )]
    pub email: String,

    #[serde(default, skip_serializing)]
    #[validate(length(min = 1, message = "The Password field is required."))]
    pub password: String,

    #[serde(default, skip_serializing)]
    #[validate(must_match(other = "password", message = "Passwords don't match."))]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct LoginForm {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "The Email field is required."),
        email(message = "The Email field is not a valid e-mail address.")
    )]
    pub email: String,

    #[serde(default, skip_serializing)]
    #[validate(length(min = 1, message = "The Password field is required."))]
    pub password: String,

    #[serde(default)]
    pub remember_me: bool,
}

/// Text fields of the profile form; the picture travels as a file part
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(length(
        max = 100,
        message = "The field Company Name must be a string or array type with a maximum length of '100'."
    ))]
    pub company_name: String,

    #[serde(default)]
    #[validate(
        length(
            max = 30,
            message = "The field Phone Number must be a string or array type with a maximum length of '30'."
        ),
        custom(function = "validate_phone")
    )]
    pub phone_number: String,
}

/// Profile as stored in the ERP
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub company_name: String,
    pub phone_number: String,
    pub profile_picture: Option<Vec<u8>>,
}

/// Profile changes for `UpdateProfile`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub email: String,
    pub company_name: String,
    pub phone_number: String,
    pub profile_picture: Option<Vec<u8>>,
}
