//! Sign-in, registration and sign-out

use axum::extract::State;
use axum::response::Response;
use chrono::Utc;

use super::{HOME_PATH, LOGIN_PATH, Viewer};
use crate::core::Flash;
use crate::core::validation::Validated;
use crate::models::{LoginForm, RegistrationForm};
use crate::server::host::{PortalHost, append_cookie};
use crate::server::views::Page;

const LOGIN_PAGE: &str = "account/login.html";
const REGISTER_PAGE: &str = "account/register.html";

pub async fn login_page(State(host): State<PortalHost>, viewer: Viewer) -> Response {
    let page = Page::new(LOGIN_PAGE).with("form", &LoginForm::default());
    host.render(page, viewer.auth.email(), &viewer.flash).await
}

pub async fn login(
    State(host): State<PortalHost>,
    viewer: Viewer,
    form: Validated<LoginForm>,
) -> Response {
    let page = Page::new(LOGIN_PAGE).with("form", &form.value);
    if !form.is_valid() {
        return host
            .render(page.errors(form.messages()), None, &viewer.flash)
            .await;
    }

    let LoginForm {
        email,
        password,
        remember_me,
    } = &form.value;

    let valid = host
        .services
        .auth
        .validate_user(email, password)
        .await
        .unwrap_or(false);
    if !valid {
        tracing::info!(user = %email, "rejected sign-in");
        return host
            .render(page.error("Invalid login attempt."), None, &viewer.flash)
            .await;
    }

    let candidate_id = match host.services.auth.candidate_id(email).await {
        Ok(id) if id > 0 => id,
        Ok(_) | Err(_) => {
            return host
                .render(
                    page.error("Could not retrieve candidate information."),
                    None,
                    &viewer.flash,
                )
                .await;
        }
    };

    let cookie = host
        .session
        .issue(email, candidate_id, *remember_me, Utc::now());
    tracing::info!(user = %email, persistent = remember_me, "signed in");

    let mut response = host.redirect_with(HOME_PATH, Flash::default());
    append_cookie(&mut response, &cookie);
    response
}

pub async fn register_page(State(host): State<PortalHost>, viewer: Viewer) -> Response {
    let page = Page::new(REGISTER_PAGE).with("form", &RegistrationForm::default());
    host.render(page, viewer.auth.email(), &viewer.flash).await
}

pub async fn register(
    State(host): State<PortalHost>,
    viewer: Viewer,
    form: Validated<RegistrationForm>,
) -> Response {
    let page = Page::new(REGISTER_PAGE).with("form", &form.value);
    if !form.is_valid() {
        return host
            .render(page.errors(form.messages()), None, &viewer.flash)
            .await;
    }

    let RegistrationForm {
        full_name,
        email,
        password,
        ..
    } = &form.value;

    let created = host
        .services
        .auth
        .create_user(email, password, full_name)
        .await
        .unwrap_or(false);
    if !created {
        return host
            .render(
                page.error("Registration failed. User may already exist or not active."),
                None,
                &viewer.flash,
            )
            .await;
    }

    tracing::info!(user = %email, "registered");
    host.redirect_with(LOGIN_PATH, Flash::default())
}

pub async fn logout(State(host): State<PortalHost>, viewer: Viewer) -> Response {
    if let Some(email) = viewer.auth.email() {
        tracing::info!(user = %email, "signed out");
    }
    let mut response = host.redirect_with(HOME_PATH, Flash::default());
    append_cookie(&mut response, &host.session.clear());
    response
}

pub async fn access_denied(State(host): State<PortalHost>, viewer: Viewer) -> Response {
    host.render(
        Page::new("account/access_denied.html"),
        viewer.auth.email(),
        &viewer.flash,
    )
    .await
}
