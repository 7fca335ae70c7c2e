//! Server-rendered pages
//!
//! Templates are compiled into the binary and registered once at startup.
//! Every page is rendered inside `layout.html` with the colour scheme, the
//! signed-in user, pending flash messages and the validation summary.

use std::collections::HashMap;

use serde::Serialize;
use tera::{Context, Tera, Value};

use crate::core::color::darken;
use crate::core::error::PortalError;
use crate::core::Flash;
use crate::models::ColorSettings;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("account/login.html", include_str!("../../templates/account/login.html")),
    ("account/register.html", include_str!("../../templates/account/register.html")),
    (
        "account/access_denied.html",
        include_str!("../../templates/account/access_denied.html"),
    ),
    ("profile/index.html", include_str!("../../templates/profile/index.html")),
    ("home/index.html", include_str!("../../templates/home/index.html")),
    ("rfq/index.html", include_str!("../../templates/rfq/index.html")),
    ("rfq/awarded.html", include_str!("../../templates/rfq/awarded.html")),
    ("rfq/closed.html", include_str!("../../templates/rfq/closed.html")),
    ("tender/index.html", include_str!("../../templates/tender/index.html")),
    ("tender/upload.html", include_str!("../../templates/tender/upload.html")),
    ("requisition/index.html", include_str!("../../templates/requisition/index.html")),
    ("requisition/upload.html", include_str!("../../templates/requisition/upload.html")),
    ("job/index.html", include_str!("../../templates/job/index.html")),
    ("job/apply.html", include_str!("../../templates/job/apply.html")),
    ("job/success.html", include_str!("../../templates/job/success.html")),
];

/// Percentage used by `darken` when the template gives none
const DEFAULT_DARKEN_PERCENT: i64 = 10;

/// Registry of every page template
#[derive(Debug)]
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, PortalError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .map_err(|e| PortalError::Render {
                template: "<registry>".into(),
                message: e.to_string(),
            })?;
        tera.register_filter("darken", darken_filter);
        Ok(Self { tera })
    }

    pub fn render(&self, page: &Page, chrome: Chrome<'_>) -> Result<String, PortalError> {
        let mut context = page.context.clone();
        context.insert("colors", chrome.colors);
        context.insert("css_variables", &chrome.colors.css_variables());
        context.insert("current_user", &chrome.user);
        context.insert("flash", chrome.flash);
        context.insert("errors", &page.errors);

        self.tera
            .render(page.template, &context)
            .map_err(|e| PortalError::Render {
                template: page.template.to_string(),
                message: render_message(&e),
            })
    }
}

/// Values every page shares, supplied by the host at render time
#[derive(Debug, Clone, Copy)]
pub struct Chrome<'a> {
    pub colors: &'a ColorSettings,
    pub user: Option<&'a str>,
    pub flash: &'a Flash,
}

/// A template plus its page-specific model
#[derive(Debug, Clone)]
pub struct Page {
    template: &'static str,
    context: Context,
    errors: Vec<String>,
}

impl Page {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            context: Context::new(),
            errors: Vec::new(),
        }
    }

    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    /// Add a line to the validation summary
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.errors.push(message.into());
        self
    }

    pub fn errors(mut self, messages: impl IntoIterator<Item = String>) -> Self {
        self.errors.extend(messages);
        self
    }

    pub fn template(&self) -> &'static str {
        self.template
    }

    pub fn validation_errors(&self) -> &[String] {
        &self.errors
    }
}

/// `{{ colors.primaryColor | darken(percent=15) }}`
fn darken_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let hex = value.as_str().unwrap_or_default();
    let percent = args
        .get("percent")
        .and_then(Value::as_i64)
        .unwrap_or(DEFAULT_DARKEN_PERCENT);
    Ok(Value::String(darken(hex, percent)))
}

// Tera hides the useful part of an error in its source chain
fn render_message(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome<'a>(colors: &'a ColorSettings, flash: &'a Flash) -> Chrome<'a> {
        Chrome {
            colors,
            user: Some("jane@example.com"),
            flash,
        }
    }

    #[test]
    fn test_all_templates_compile() {
        let views = Views::new().unwrap();
        assert_eq!(views.tera.get_template_names().count(), TEMPLATES.len());
    }

    #[test]
    fn test_darken_filter() {
        let mut args = HashMap::new();
        args.insert("percent".to_string(), Value::from(50));
        let out = darken_filter(&Value::from("#FFFFFF"), &args).unwrap();
        assert_eq!(out, Value::from("#7F7F7F"));

        let out = darken_filter(&Value::from("#000"), &HashMap::new()).unwrap();
        assert_eq!(out, Value::from("#000000"));
    }

    #[test]
    fn test_layout_carries_theme_and_flash() {
        let views = Views::new().unwrap();
        let colors = ColorSettings::default();
        let flash = Flash::success("Profile updated successfully!");
        let html = views
            .render(&Page::new("job/success.html"), chrome(&colors, &flash))
            .unwrap();
        assert!(html.contains("--primary-color: #0d6efd;"));
        assert!(html.contains("Profile updated successfully!"));
        assert!(html.contains("jane@example.com"));
    }

    #[test]
    fn test_validation_summary_is_rendered() {
        let views = Views::new().unwrap();
        let colors = ColorSettings::default();
        let flash = Flash::default();
        let page = Page::new("account/login.html")
            .with("form", &serde_json::json!({"Email": "", "RememberMe": false}))
            .error("Invalid login attempt.");
        let html = views.render(&page, chrome(&colors, &flash)).unwrap();
        assert!(html.contains("Invalid login attempt."));
    }

    #[test]
    fn test_missing_model_is_render_error() {
        let views = Views::new().unwrap();
        let colors = ColorSettings::default();
        let flash = Flash::default();
        let err = views
            .render(&Page::new("tender/upload.html"), chrome(&colors, &flash))
            .unwrap_err();
        assert_eq!(err.error_code(), "RENDER_ERROR");
    }
}
