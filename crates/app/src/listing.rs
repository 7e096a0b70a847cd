use tracing::debug;

use job_board_core::types::{ApplicantList, ApplicantSummary, JobList, JobListing, JobRef};
use job_board_storage::Database;

use crate::service::ServiceError;

/// Read-only projections over postings and their applicants.
#[derive(Clone)]
pub struct Listing {
    database: Database,
}

impl Listing {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Every posting, newest first, with its company summary.
    pub async fn list_postings(&self) -> Result<JobList, ServiceError> {
        let jobs = self.database.job_posts().list_with_company().await?;
        let list = JobList::new(jobs.into_iter().map(JobListing::from).collect());
        debug!(stage = "listing", total_jobs = list.total_jobs, "listed postings");
        Ok(list)
    }

    /// Applications for one posting, newest first.
    pub async fn list_applicants(&self, job_id: &str) -> Result<ApplicantList, ServiceError> {
        let job = self
            .database
            .job_posts()
            .fetch_with_company(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound)?;

        let applicants = self
            .database
            .applicants()
            .list_for_job(&job.job.id)
            .await?
            .into_iter()
            .map(ApplicantSummary::from)
            .collect();

        let list = ApplicantList::new(JobRef::from(&job), applicants);
        debug!(
            stage = "listing",
            job_id = %job.job.id,
            total_applicants = list.total_applicants,
            "listed applicants"
        );
        Ok(list)
    }
}
