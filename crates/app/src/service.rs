use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use job_board_core::ValidationError;
use job_board_storage::{ApplicantError, CompanyError, JobPostError};

/// Source of creation timestamps, injectable for tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Failures returned by the domain services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Company not found")]
    CompanyNotFound,
    #[error("Job not found")]
    JobNotFound,
    #[error("You have already applied for this job")]
    DuplicateApplication,
    #[error("{0}")]
    Unexpected(String),
}

impl From<CompanyError> for ServiceError {
    fn from(err: CompanyError) -> Self {
        Self::Unexpected(err.to_string())
    }
}

impl From<JobPostError> for ServiceError {
    fn from(err: JobPostError) -> Self {
        match err {
            JobPostError::MissingCompany => Self::CompanyNotFound,
            other => Self::Unexpected(other.to_string()),
        }
    }
}

impl From<ApplicantError> for ServiceError {
    fn from(err: ApplicantError) -> Self {
        match err {
            ApplicantError::Duplicate => Self::DuplicateApplication,
            ApplicantError::MissingJob => Self::JobNotFound,
            other => Self::Unexpected(other.to_string()),
        }
    }
}
