use metrics::counter;
use tracing::info;

use job_board_core::{types::Company, NewCompanyInput, Payload};
use job_board_storage::{Database, NewCompany};

use crate::service::{Clock, ServiceError};

/// Creates and stores companies.
#[derive(Clone)]
pub struct CompanyRegistry {
    database: Database,
    clock: Clock,
}

impl CompanyRegistry {
    pub fn new(database: Database, clock: Clock) -> Self {
        Self { database, clock }
    }

    /// Validates the payload and persists a new company.
    ///
    /// Nothing is written when a required field is missing or blank.
    pub async fn create(&self, payload: &Payload) -> Result<Company, ServiceError> {
        let input = NewCompanyInput::from_payload(payload)?;
        let record = NewCompany::new(
            &input.name,
            &input.location,
            &input.description,
            (self.clock)(),
        );
        let company = self.database.companies().insert(&record).await?;

        counter!("companies_created_total").increment(1);
        info!(stage = "registry", company_id = %company.id, company = %company, "company created");
        Ok(company)
    }
}
