use metrics::counter;
use tracing::info;

use job_board_core::{
    types::{JobPostWithCompany, PostedJob},
    JobPostPayload, Payload,
};
use job_board_storage::{Database, NewJobPost};

use crate::service::{Clock, ServiceError};

/// Publishes job postings on behalf of existing companies.
#[derive(Clone)]
pub struct JobPostingService {
    database: Database,
    clock: Clock,
}

impl JobPostingService {
    pub fn new(database: Database, clock: Clock) -> Self {
        Self { database, clock }
    }

    /// Creates a posting.
    ///
    /// Checks run in a fixed order: key presence, company existence, salary
    /// format, salary range. The first failure is returned.
    pub async fn create(&self, payload: &Payload) -> Result<PostedJob, ServiceError> {
        let stage = JobPostPayload::from_payload(payload)?;

        let company = match stage.company_id() {
            Some(company_id) => self.database.companies().fetch(&company_id).await?,
            None => None,
        }
        .ok_or(ServiceError::CompanyNotFound)?;

        let input = stage.into_input()?;
        let record = NewJobPost::new(
            &company.id,
            &input.title,
            &input.description,
            input.salary,
            &input.location,
            (self.clock)(),
        );
        let job = self.database.job_posts().insert(&record).await?;
        let posted = JobPostWithCompany {
            job,
            company: company.summary(),
        };

        counter!("jobs_posted_total").increment(1);
        info!(
            stage = "postings",
            job_id = %posted.job.id,
            company_id = %company.id,
            job = %posted,
            "job posted"
        );
        Ok(PostedJob::from(posted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use job_board_core::{types::Company, ValidationError};
    use serde_json::{json, Value};

    use crate::registry::CompanyRegistry;
    use crate::testing::{payload, setup_database, stepping_clock};

    async fn seed_company(database: &Database) -> Company {
        CompanyRegistry::new(database.clone(), stepping_clock())
            .create(&payload(json!({
                "name": "Acme",
                "location": "Berlin",
                "description": "Widgets"
            })))
            .await
            .expect("company")
    }

    fn job_body(company_id: &str, salary: Value) -> Payload {
        payload(json!({
            "company_id": company_id,
            "title": " Backend Engineer ",
            "description": " Rust services ",
            "salary": salary,
            "location": "Remote\n"
        }))
    }

    async fn job_count(database: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM job_posts")
            .fetch_one(database.pool())
            .await
            .expect("count jobs")
    }

    #[tokio::test]
    async fn posts_job_with_company_name() {
        let database = setup_database().await;
        let company = seed_company(&database).await;
        let service = JobPostingService::new(database.clone(), stepping_clock());

        let posted = service
            .create(&job_body(&company.id, json!("100")))
            .await
            .expect("job posted");

        assert_eq!(posted.company, "Acme");
        assert_eq!(posted.title, "Backend Engineer");
        assert_eq!(posted.description, "Rust services");
        assert_eq!(posted.location, "Remote");
        assert_eq!(posted.salary, 100);
        let stored: (String, String, String, i64) = sqlx::query_as(
            "SELECT title, description, location, salary FROM job_posts WHERE id = ?",
        )
        .bind(&posted.id)
        .fetch_one(database.pool())
        .await
        .expect("stored job");
        assert_eq!(
            stored,
            (
                "Backend Engineer".to_string(),
                "Rust services".to_string(),
                "Remote".to_string(),
                100
            )
        );
    }

    #[tokio::test]
    async fn unknown_company_is_not_found() {
        let database = setup_database().await;
        let service = JobPostingService::new(database.clone(), stepping_clock());

        let err = service
            .create(&job_body("00000000-0000-0000-0000-000000000000", json!(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CompanyNotFound));
        assert_eq!(job_count(&database).await, 0);
    }

    #[tokio::test]
    async fn salary_format_and_range_are_distinct() {
        let database = setup_database().await;
        let company = seed_company(&database).await;
        let service = JobPostingService::new(database.clone(), stepping_clock());

        let err = service
            .create(&job_body(&company.id, json!("-5")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::NegativeSalary)
        ));

        let err = service
            .create(&job_body(&company.id, json!("abc")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::InvalidSalaryFormat)
        ));
        assert_eq!(job_count(&database).await, 0);
    }

    #[tokio::test]
    async fn missing_field_is_reported_before_company_lookup() {
        let database = setup_database().await;
        let service = JobPostingService::new(database, stepping_clock());
        let mut body = job_body("missing-company", json!("abc"));
        body.remove("location");

        let err = service.create(&body).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::MissingField("location"))
        ));
    }

    #[tokio::test]
    async fn company_lookup_precedes_salary_checks() {
        let database = setup_database().await;
        let service = JobPostingService::new(database, stepping_clock());

        let err = service
            .create(&job_body("missing-company", json!("abc")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CompanyNotFound));
    }

    #[tokio::test]
    async fn blank_text_fields_are_accepted() {
        let database = setup_database().await;
        let company = seed_company(&database).await;
        let service = JobPostingService::new(database, stepping_clock());
        let body = payload(json!({
            "company_id": company.id,
            "title": "",
            "description": "",
            "salary": 0,
            "location": ""
        }));

        let posted = service.create(&body).await.expect("job posted");
        assert_eq!(posted.title, "");
        assert_eq!(posted.salary, 0);
    }
}
