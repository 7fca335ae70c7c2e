//! File name filters applied before uploads are validated or stored

use crate::core::error::UploadError;

/// Final path component of a client-supplied file name
///
/// Browsers on Windows may send the full `C:\...\name.pdf` path, so both
/// separators are honoured.
pub fn final_component(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim()
}

/// Extension including the leading dot, empty when there is none
pub fn extension_of(file_name: &str) -> &str {
    let name = final_component(file_name);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &name[idx..],
    }
}

/// File name safe to place under the resume directory
pub fn safe_file_name(raw: &str) -> Result<String, UploadError> {
    let name = final_component(raw);
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(UploadError::InvalidName {
            name: raw.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Content type for a download, chosen by extension
pub fn content_type_for(extension: &str) -> &'static str {
    match extension
        .trim_start_matches('.')
        .to_ascii_lowercase()
        .as_str()
    {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// `<name>.<extension>` as shown in the download dialog
pub fn download_name(file_name: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        file_name.to_string()
    } else {
        format!("{}.{}", file_name, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_component() {
        assert_eq!(final_component("C:\\Users\\jane\\cv.pdf"), "cv.pdf");
        assert_eq!(final_component("/tmp/cv.pdf"), "cv.pdf");
        assert_eq!(final_component("cv.pdf"), "cv.pdf");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("report.final.PDF"), ".PDF");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".bashrc"), "");
    }

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("dir/cv.pdf").unwrap(), "cv.pdf");
        assert!(safe_file_name("").is_err());
        assert!(safe_file_name("   ").is_err());
        assert!(safe_file_name("cv..pdf").is_err());
        assert!(safe_file_name("dir/").is_err());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("pdf"), "application/pdf");
        assert_eq!(content_type_for(".JPEG"), "image/jpeg");
        assert_eq!(content_type_for("zip"), "application/octet-stream");
        assert_eq!(content_type_for(""), "application/octet-stream");
    }

    #[test]
    fn test_download_name() {
        assert_eq!(download_name("quote", "pdf"), "quote.pdf");
        assert_eq!(download_name("quote", ".pdf"), "quote.pdf");
        assert_eq!(download_name("quote", ""), "quote");
    }
}
