use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Organization that publishes job postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Identifier, name and location, as embedded in posting listings.
    pub fn summary(&self) -> CompanySummary {
        CompanySummary {
            id: self.id.clone(),
            name: self.name.clone(),
            location: self.location.clone(),
        }
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Job posting owned by exactly one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPost {
    pub id: String,
    pub company_id: String,
    pub title: String,
    pub description: String,
    pub salary: i64,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

/// Job posting joined with the owning company's summary fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPostWithCompany {
    pub job: JobPost,
    pub company: CompanySummary,
}

impl fmt::Display for JobPostWithCompany {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.job.title, self.company.name)
    }
}

/// Candidate application bound to a single job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: String,
    pub name: String,
    pub email: String,
    pub resume_link: String,
    pub job_id: String,
    pub applied_at: DateTime<Utc>,
}

/// Company fields embedded in posting listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub id: String,
    pub name: String,
    pub location: String,
}

/// Posting returned by the post-job operation, carrying the company name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedJob {
    pub id: String,
    pub company: String,
    pub title: String,
    pub description: String,
    pub salary: i64,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl From<JobPostWithCompany> for PostedJob {
    fn from(value: JobPostWithCompany) -> Self {
        let JobPostWithCompany { job, company } = value;
        Self {
            id: job.id,
            company: company.name,
            title: job.title,
            description: job.description,
            salary: job.salary,
            location: job.location,
            created_at: job.created_at,
        }
    }
}

/// Short reference to a posting: identifier, title and company name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    pub id: String,
    pub title: String,
    pub company: String,
}

impl From<&JobPostWithCompany> for JobRef {
    fn from(value: &JobPostWithCompany) -> Self {
        Self {
            id: value.job.id.clone(),
            title: value.job.title.clone(),
            company: value.company.name.clone(),
        }
    }
}

/// Application returned by the apply operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedApplication {
    pub id: String,
    pub name: String,
    pub email: String,
    pub resume_link: String,
    pub job: JobRef,
    pub applied_at: DateTime<Utc>,
}

/// Entry of the public posting listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub salary: i64,
    pub location: String,
    pub company: CompanySummary,
    pub created_at: DateTime<Utc>,
}

impl From<JobPostWithCompany> for JobListing {
    fn from(value: JobPostWithCompany) -> Self {
        let JobPostWithCompany { job, company } = value;
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            salary: job.salary,
            location: job.location,
            company,
            created_at: job.created_at,
        }
    }
}

/// Full posting listing together with its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobList {
    pub jobs: Vec<JobListing>,
    pub total_jobs: usize,
}

impl JobList {
    pub fn new(jobs: Vec<JobListing>) -> Self {
        let total_jobs = jobs.len();
        Self { jobs, total_jobs }
    }
}

/// Applicant entry listed under a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub resume_link: String,
    pub applied_at: DateTime<Utc>,
}

impl From<Applicant> for ApplicantSummary {
    fn from(value: Applicant) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            resume_link: value.resume_link,
            applied_at: value.applied_at,
        }
    }
}

/// Applicants of one posting, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantList {
    pub job: JobRef,
    pub applicants: Vec<ApplicantSummary>,
    pub total_applicants: usize,
}

impl ApplicantList {
    pub fn new(job: JobRef, applicants: Vec<ApplicantSummary>) -> Self {
        let total_applicants = applicants.len();
        Self {
            job,
            applicants,
            total_applicants,
        }
    }
}
