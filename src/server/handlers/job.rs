//! Job listings and applications

use axum::Form;
use axum::extract::{Query, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};

use super::{CurrentUser, LOGIN_PATH, not_found};
use crate::core::Flash;
use crate::core::validation::Validated;
use crate::core::validation::validators::{
    RESUME_EXTENSIONS, RESUME_LIMIT, allowed_extensions, max_file_size,
};
use crate::models::{JobApplication, JobApplicationForm, JobDetails, JobSelection};
use crate::server::host::PortalHost;
use crate::server::uploads::{MultipartForm, save_resume};
use crate::server::views::Page;

const INDEX_PAGE: &str = "job/index.html";
const APPLY_PAGE: &str = "job/apply.html";
const SUCCESS_PAGE: &str = "job/success.html";

pub const SUCCESS_PATH: &str = "/Job/ApplicationSuccess";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyQuery {
    #[serde(default)]
    pub job_id: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
struct ApplyModel {
    job_id: i64,
    candidate_id: i64,
    job_title: String,
    cover_letter: String,
}

async fn active_jobs(host: &PortalHost) -> Vec<JobDetails> {
    match host.services.jobs.active_jobs().await {
        Ok(jobs) => jobs,
        Err(e) => {
            tracing::error!(error = %e, "failed to load active jobs");
            Vec::new()
        }
    }
}

pub async fn index(State(host): State<PortalHost>, user: CurrentUser) -> Response {
    let jobs = active_jobs(&host).await;
    let page = Page::new(INDEX_PAGE).with("jobs", &jobs);
    host.render(page, Some(user.email()), &user.flash).await
}

pub async fn select(
    State(host): State<PortalHost>,
    user: CurrentUser,
    Form(selection): Form<JobSelection>,
) -> Response {
    if selection.selected_job_id <= 0 {
        let jobs = active_jobs(&host).await;
        let page = Page::new(INDEX_PAGE)
            .with("jobs", &jobs)
            .error("Please select a job to apply for");
        return host.render(page, Some(user.email()), &user.flash).await;
    }

    host.redirect_with(
        &format!("/Job/Apply?jobId={}", selection.selected_job_id),
        Flash::default(),
    )
}

pub async fn apply_page(
    State(host): State<PortalHost>,
    user: CurrentUser,
    Query(query): Query<ApplyQuery>,
) -> Response {
    if user.identity.candidate_id <= 0 {
        return host.redirect_with(
            LOGIN_PATH,
            Flash::error("Please complete your profile before applying for jobs."),
        );
    }

    let job = match host.services.jobs.job(query.job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => return not_found(),
        Err(e) => {
            tracing::error!(job_id = query.job_id, error = %e, "failed to load job");
            return not_found();
        }
    };

    let model = ApplyModel {
        job_id: job.id,
        candidate_id: user.identity.candidate_id,
        job_title: job.title,
        cover_letter: String::new(),
    };
    let page = Page::new(APPLY_PAGE).with("model", &model);
    host.render(page, Some(user.email()), &user.flash).await
}

pub async fn apply(
    State(host): State<PortalHost>,
    user: CurrentUser,
    form: MultipartForm,
) -> Response {
    let submitted = Validated::check(JobApplicationForm {
        job_id: form.text("JobId").and_then(|v| v.trim().parse().ok()).unwrap_or_default(),
        cover_letter: form.text("CoverLetter").unwrap_or_default().to_string(),
    });

    let job_title = match host.services.jobs.job(submitted.value.job_id).await {
        Ok(Some(job)) => job.title,
        _ => String::new(),
    };
    let model = ApplyModel {
        job_id: submitted.value.job_id,
        candidate_id: user.identity.candidate_id,
        job_title,
        cover_letter: submitted.value.cover_letter.clone(),
    };

    let mut errors = submitted.messages();
    let resume = form.file("ResumeFile").filter(|f| !f.is_empty());
    match resume {
        None => errors.push("The Resume field is required.".to_string()),
        Some(file) => {
            let extension = allowed_extensions(RESUME_EXTENSIONS);
            let size = max_file_size(RESUME_LIMIT, "Maximum allowed file size is 5MB.");
            if let Err(e) = extension(&file.file_name, &file.bytes) {
                errors.push(e.to_string());
            } else if let Err(e) = size(&file.file_name, &file.bytes) {
                errors.push(e.to_string());
            }
        }
    }

    let Some(file) = resume.filter(|_| errors.is_empty()) else {
        let page = Page::new(APPLY_PAGE).with("model", &model).errors(errors);
        return host.render(page, Some(user.email()), &user.flash).await;
    };

    let resume_path = match save_resume(&host.resumes_dir(), file).await {
        Ok(path) => path,
        Err(e) => {
            tracing::error!(user = %user.email(), error = %e, "failed to store resume");
            let page = Page::new(APPLY_PAGE)
                .with("model", &model)
                .error(format!("Error processing your application: {}", e));
            return host.render(page, Some(user.email()), &user.flash).await;
        }
    };

    let application = JobApplication {
        job_id: model.job_id,
        candidate_id: user.identity.candidate_id,
        cover_letter: model.cover_letter.clone(),
        resume_path,
    };

    match host.services.jobs.apply(&application).await {
        Ok(true) => {
            tracing::info!(job_id = application.job_id, candidate_id = application.candidate_id, "job application submitted");
            host.redirect_with(SUCCESS_PATH, Flash::default())
        }
        Ok(false) => {
            let page = Page::new(APPLY_PAGE)
                .with("model", &model)
                .error("Failed to submit application. Please try again.");
            host.render(page, Some(user.email()), &user.flash).await
        }
        Err(e) => {
            tracing::error!(job_id = application.job_id, error = %e, "job application failed");
            let page = Page::new(APPLY_PAGE)
                .with("model", &model)
                .error(format!("Error processing your application: {}", e));
            host.render(page, Some(user.email()), &user.flash).await
        }
    }
}

pub async fn application_success(State(host): State<PortalHost>, user: CurrentUser) -> Response {
    host.render(Page::new(SUCCESS_PAGE), Some(user.email()), &user.flash)
        .await
}
