//! Multipart form bodies and resume storage

use std::collections::HashMap;
use std::path::Path;

use axum::extract::{FromRequest, Multipart, Request};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::core::error::{PortalError, UploadError};
use crate::core::validation::filters::safe_file_name;

/// A file part of a multipart body
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    /// Name as sent by the browser, possibly a full client path
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A fully buffered `multipart/form-data` body
///
/// Text parts are kept by name; file parts are kept only when the browser
/// actually attached a file.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, UploadError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(malformed)?;
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let value = field.text().await.map_err(malformed)?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Text value, or `default` when the part is missing or blank
    pub fn text_or(&self, name: &str, default: &str) -> String {
        self.text(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    /// Checkbox semantics: `true`, `on` or `1`
    pub fn flag(&self, name: &str) -> bool {
        self.text(name).is_some_and(|v| {
            let v = v.trim();
            v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("on") || v == "1"
        })
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    /// Builder used by tests and handlers that synthesize forms
    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.files.insert(name.to_string(), file);
        self
    }
}

impl<S> FromRequest<S> for MultipartForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| {
                PortalError::from(UploadError::Malformed {
                    message: e.body_text(),
                })
                .into_response()
            })?;

        Self::read(multipart)
            .await
            .map_err(|e| PortalError::from(e).into_response())
    }
}

fn malformed(e: impl std::fmt::Display) -> UploadError {
    UploadError::Malformed {
        message: e.to_string(),
    }
}

/// Store a resume under `dir` as `<uuid>_<name>` and return its public path
pub async fn save_resume(dir: &Path, file: &UploadedFile) -> Result<String, UploadError> {
    if file.is_empty() {
        return Err(UploadError::Missing);
    }
    let name = safe_file_name(&file.file_name)?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| UploadError::Storage {
            message: e.to_string(),
        })?;

    let unique = format!("{}_{}", Uuid::new_v4(), name);
    tokio::fs::write(dir.join(&unique), &file.bytes)
        .await
        .map_err(|e| UploadError::Storage {
            message: e.to_string(),
        })?;

    tracing::info!(file = %unique, size = file.len(), "resume stored");
    Ok(format!("/resumes/{}", unique))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: None,
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_save_resume_uses_final_component() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_resume(dir.path(), &upload(r"C:\Users\jane\cv.pdf", b"%PDF"))
            .await
            .unwrap();

        assert!(path.starts_with("/resumes/"));
        assert!(path.ends_with("_cv.pdf"));

        let stored = path.trim_start_matches("/resumes/");
        let bytes = std::fs::read(dir.path().join(stored)).unwrap();
        assert_eq!(bytes, b"%PDF");
    }

    #[tokio::test]
    async fn test_save_resume_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("wwwroot").join("resumes");
        save_resume(&nested, &upload("cv.docx", b"doc")).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_save_resume_rejects_empty_and_traversal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            save_resume(dir.path(), &upload("cv.pdf", b"")).await,
            Err(UploadError::Missing)
        ));
        assert!(matches!(
            save_resume(dir.path(), &upload("..", b"x")).await,
            Err(UploadError::InvalidName { .. })
        ));
        assert!(matches!(
            save_resume(dir.path(), &upload("   ", b"x")).await,
            Err(UploadError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_form_accessors() {
        let form = MultipartForm::default()
            .with_text("DocumentType", "  ")
            .with_text("IsEncrypted", "on")
            .with_file("DocumentFile", upload("a.pdf", b"1"));

        assert_eq!(form.text_or("DocumentType", "Other"), "Other");
        assert!(form.flag("IsEncrypted"));
        assert!(!form.flag("Missing"));
        assert_eq!(form.file("DocumentFile").map(UploadedFile::len), Some(1));
    }
}
