use metrics::counter;
use tracing::{info, warn};

use job_board_core::{
    types::{JobRef, SubmittedApplication},
    NewApplicationInput, Payload,
};
use job_board_storage::{Database, NewApplicant};

use crate::service::{Clock, ServiceError};

/// Accepts candidate applications, one per email and posting.
#[derive(Clone)]
pub struct ApplicationService {
    database: Database,
    clock: Clock,
}

impl ApplicationService {
    pub fn new(database: Database, clock: Clock) -> Self {
        Self { database, clock }
    }

    /// Submits an application and records the outcome.
    pub async fn apply(&self, payload: &Payload) -> Result<SubmittedApplication, ServiceError> {
        let outcome = self.submit(payload).await;
        let result = match &outcome {
            Ok(_) => "submitted",
            Err(ServiceError::DuplicateApplication) => "duplicate",
            Err(ServiceError::Unexpected(_)) => "error",
            Err(_) => "rejected",
        };
        counter!("applications_total", "result" => result).increment(1);
        outcome
    }

    async fn submit(&self, payload: &Payload) -> Result<SubmittedApplication, ServiceError> {
        let input = NewApplicationInput::from_payload(payload)?;

        let job = self
            .database
            .job_posts()
            .fetch_with_company(&input.job_id)
            .await?
            .ok_or(ServiceError::JobNotFound)?;

        let existing = self
            .database
            .applicants()
            .find_by_email_and_job(&input.email, &job.job.id)
            .await?;
        if existing.is_some() {
            warn!(stage = "applications", job_id = %job.job.id, "duplicate application rejected");
            return Err(ServiceError::DuplicateApplication);
        }

        input.validate_contact()?;

        // The unique index still guards against a concurrent submission racing past the lookup.
        let record = NewApplicant::new(
            &input.name,
            &input.email,
            &input.resume_link,
            &job.job.id,
            (self.clock)(),
        );
        let applicant = self.database.applicants().insert(&record).await?;

        info!(
            stage = "applications",
            applicant_id = %applicant.id,
            job_id = %job.job.id,
            job = %job,
            "application submitted"
        );

        Ok(SubmittedApplication {
            id: applicant.id,
            name: applicant.name,
            email: applicant.email,
            resume_link: applicant.resume_link,
            job: JobRef::from(&job),
            applied_at: applicant.applied_at,
        })
    }
}
