//! Job postings and applications

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::odata::nullable;

const COVER_LETTER_LIMIT: usize = 5000;

fn validate_cover_letter(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required")
            .with_message("The Cover Letter field is required.".into()));
    }
    if value.chars().count() > COVER_LETTER_LIMIT {
        return Err(ValidationError::new("length")
            .with_message("Cover letter cannot exceed 5000 characters.".into()));
    }
    Ok(())
}

/// A job posting from `JobPostingAPI`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDetails {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub location: String,
    #[serde(rename = "jobtype", default, deserialize_with = "nullable")]
    pub job_type: String,
}

/// Text fields of the application form; the resume travels as a file part
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct JobApplicationForm {
    #[serde(default)]
    #[validate(range(min = 1, message = "The JobId field is required."))]
    pub job_id: i64,
    #[serde(default)]
    #[validate(custom(function = "validate_cover_letter"))]
    pub cover_letter: String,
}

/// Job picked on the listing page
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobSelection {
    #[serde(default)]
    pub selected_job_id: i64,
}

/// Arguments of the `ApplyForJob` codeunit call
#[derive(Debug, Clone, PartialEq)]
pub struct JobApplication {
    pub job_id: i64,
    pub candidate_id: i64,
    pub cover_letter: String,
    pub resume_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_details_jobtype_key() {
        let job: JobDetails = serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": "Storekeeper",
            "location": null,
            "jobtype": "Full-time"
        }))
        .unwrap();
        assert_eq!(job.id, 7);
        assert_eq!(job.location, "");
        assert_eq!(job.job_type, "Full-time");
    }

    #[test]
    fn test_cover_letter_limits() {
        let form = JobApplicationForm {
            job_id: 3,
            cover_letter: "x".repeat(5001),
        };
        assert!(form.validate().is_err());

        let form = JobApplicationForm {
            job_id: 3,
            cover_letter: "I would like to apply.".into(),
        };
        assert!(form.validate().is_ok());

        let form = JobApplicationForm {
            job_id: 0,
            cover_letter: "I would like to apply.".into(),
        };
        assert!(form.validate().is_err());
    }
}
