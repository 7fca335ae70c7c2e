//! Profile view and update

use axum::extract::State;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use super::CurrentUser;
use crate::core::Flash;
use crate::core::validation::Validated;
use crate::core::validation::validators::{PICTURE_LIMIT, max_file_size};
use crate::models::{ProfileForm, ProfileUpdate};
use crate::server::host::PortalHost;
use crate::server::uploads::MultipartForm;
use crate::server::views::Page;

const PROFILE_PAGE: &str = "profile/index.html";
pub const PROFILE_PATH: &str = "/Profile";

#[derive(Debug, Default, Serialize)]
struct ProfileModel {
    email: String,
    company_name: String,
    phone_number: String,
    /// Stored picture, base64 for an inline `data:` URL
    picture_base64: Option<String>,
}

pub async fn index(State(host): State<PortalHost>, user: CurrentUser) -> Response {
    let profile = host
        .services
        .auth
        .profile(user.email())
        .await
        .ok()
        .flatten()
        .unwrap_or_default();

    let model = ProfileModel {
        email: user.email().to_string(),
        company_name: profile.company_name,
        phone_number: profile.phone_number,
        picture_base64: profile.profile_picture.as_deref().map(|p| STANDARD.encode(p)),
    };
    let page = Page::new(PROFILE_PAGE).with("model", &model);
    host.render(page, Some(user.email()), &user.flash).await
}

pub async fn update(
    State(host): State<PortalHost>,
    user: CurrentUser,
    form: MultipartForm,
) -> Response {
    let submitted = Validated::check(ProfileForm {
        company_name: form.text("CompanyName").unwrap_or_default().to_string(),
        phone_number: form.text("PhoneNumber").unwrap_or_default().to_string(),
    });

    let mut model = ProfileModel {
        email: user.email().to_string(),
        company_name: submitted.value.company_name.clone(),
        phone_number: submitted.value.phone_number.clone(),
        picture_base64: None,
    };

    if !submitted.is_valid() {
        model.picture_base64 = current_picture(&host, user.email()).await;
        let page = Page::new(PROFILE_PAGE)
            .with("model", &model)
            .errors(submitted.messages());
        return host.render(page, Some(user.email()), &user.flash).await;
    }

    let picture = form.file("ProfilePicture");
    if let Some(file) = picture {
        let check = max_file_size(PICTURE_LIMIT, "The profile picture must be less than 5MB.");
        if let Err(e) = check(&file.file_name, &file.bytes) {
            let page = Page::new(PROFILE_PAGE)
                .with("model", &model)
                .error(e.to_string());
            return host.render(page, Some(user.email()), &user.flash).await;
        }
    }

    let update = ProfileUpdate {
        email: user.email().to_string(),
        company_name: submitted.value.company_name,
        phone_number: submitted.value.phone_number,
        profile_picture: picture.map(|f| f.bytes.clone()),
    };

    match host.services.auth.update_profile(&update).await {
        Ok(true) => {
            tracing::info!(user = %user.email(), "profile updated");
            host.redirect_with(PROFILE_PATH, Flash::success("Profile updated successfully!"))
        }
        Ok(false) | Err(_) => {
            let page = Page::new(PROFILE_PAGE)
                .with("model", &model)
                .error("Failed to update profile. Please try again.");
            host.render(page, Some(user.email()), &user.flash).await
        }
    }
}

async fn current_picture(host: &PortalHost, email: &str) -> Option<String> {
    let profile = host.services.auth.profile(email).await.ok().flatten()?;
    profile.profile_picture.as_deref().map(|p| STANDARD.encode(p))
}
