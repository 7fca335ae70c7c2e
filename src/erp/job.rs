//! Job postings over OData, applications through `ApplicationManagement`

use anyhow::Result;
use async_trait::async_trait;

use crate::core::JobService;
use crate::erp::client::ErpClient;
use crate::erp::soap::SoapCall;
use crate::models::{JobApplication, JobDetails};

const JOB_POSTINGS: &str = "JobPostingAPI";
const APPLICATION_SERVICE: &str = "ApplicationManagement";

#[derive(Debug, Clone)]
pub struct ErpJobService {
    client: ErpClient,
    endpoint: String,
}

impl ErpJobService {
    pub fn new(client: ErpClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl JobService for ErpJobService {
    async fn active_jobs(&self) -> Result<Vec<JobDetails>> {
        match self.client.get_list(JOB_POSTINGS).await {
            Ok(jobs) => Ok(jobs),
            Err(e) => {
                tracing::error!(error = %e, "failed to list job postings");
                Ok(Vec::new())
            }
        }
    }

    async fn job(&self, job_id: i64) -> Result<Option<JobDetails>> {
        match self
            .client
            .get_optional(&format!("{}({})", JOB_POSTINGS, job_id))
            .await
        {
            Ok(job) => Ok(job),
            Err(e) => {
                tracing::error!(job_id, error = %e, "failed to read job posting");
                Ok(None)
            }
        }
    }

    async fn apply(&self, application: &JobApplication) -> Result<bool> {
        let call = SoapCall::new(APPLICATION_SERVICE, "ApplyForJob")
            .param("jobId", application.job_id)
            .param("candidateId", application.candidate_id)
            .param("coverLetter", &application.cover_letter)
            .param("resumePath", &application.resume_path);

        match self.client.soap_call(&self.endpoint, &call).await {
            Ok(reply) => Ok(reply.return_bool()),
            Err(e) => {
                tracing::error!(job_id = application.job_id, error = %e, "job application failed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErpConfig;
    use httpmock::prelude::*;

    fn service(server: &MockServer) -> ErpJobService {
        let config = ErpConfig {
            odata_base_url: server.base_url(),
            company: "CRONUS".into(),
            ..Default::default()
        };
        ErpJobService::new(ErpClient::new(&config).unwrap(), server.url("/soap/jobs"))
    }

    #[tokio::test]
    async fn test_active_jobs() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("JobPostingAPI");
                then.status(200).json_body(serde_json::json!({
                    "value": [{"id": 1, "title": "Clerk", "jobtype": "Contract"}]
                }));
            })
            .await;

        let jobs = service(&server).active_jobs().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_type, "Contract");
    }

    #[tokio::test]
    async fn test_missing_job_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("JobPostingAPI(9)");
                then.status(404);
            })
            .await;

        assert!(service(&server).job(9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_apply_sends_all_fields() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/soap/jobs")
                    .body_contains("<jobId>3</jobId>")
                    .body_contains("<candidateId>1</candidateId>")
                    .body_contains("<resumePath>/resumes/abc_cv.pdf</resumePath>");
                then.status(200).body(
                    "<s:Envelope><s:Body><ApplyForJob_Result><return_value>true</return_value></ApplyForJob_Result></s:Body></s:Envelope>",
                );
            })
            .await;

        let ok = service(&server)
            .apply(&JobApplication {
                job_id: 3,
                candidate_id: 1,
                cover_letter: "Hello".into(),
                resume_path: "/resumes/abc_cv.pdf".into(),
            })
            .await
            .unwrap();
        assert!(ok);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_apply_failure_is_false() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/soap/jobs");
                then.status(500).body("boom");
            })
            .await;

        let ok = service(&server)
            .apply(&JobApplication {
                job_id: 3,
                candidate_id: 1,
                cover_letter: String::new(),
                resume_path: String::new(),
            })
            .await
            .unwrap();
        assert!(!ok);
    }
}
