use std::{str::FromStr, time::Duration};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use thiserror::Error;
use uuid::Uuid;

use job_board_core::types::{Applicant, Company, CompanySummary, JobPost, JobPostWithCompany};

const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    ///
    /// Database files are created when missing. Every pooled connection enforces
    /// foreign keys.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(StorageError::Connect)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(StorageError::Connect)?;

        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle for interacting with companies.
    pub fn companies(&self) -> CompanyRepository {
        CompanyRepository {
            pool: self.pool.clone(),
        }
    }

    /// Returns a handle for interacting with job postings.
    pub fn job_posts(&self) -> JobPostRepository {
        JobPostRepository {
            pool: self.pool.clone(),
        }
    }

    /// Returns a handle for interacting with applications.
    pub fn applicants(&self) -> ApplicantRepository {
        ApplicantRepository {
            pool: self.pool.clone(),
        }
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Rows removed by a cascading delete, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub companies: u64,
    pub job_posts: u64,
    pub applicants: u64,
}

/// Repository for the `companies` table.
#[derive(Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    /// Inserts a company and returns the stored record.
    pub async fn insert(&self, record: &NewCompany<'_>) -> Result<Company, CompanyError> {
        sqlx::query(
            "INSERT INTO companies (id, name, location, description, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(record.name)
        .bind(record.location)
        .bind(record.description)
        .bind(to_rfc3339(record.created_at))
        .execute(&self.pool)
        .await?;

        Ok(Company {
            id: record.id.clone(),
            name: record.name.to_string(),
            location: record.location.to_string(),
            description: record.description.to_string(),
            created_at: record.created_at,
        })
    }

    /// Loads a company by identifier.
    pub async fn fetch(&self, company_id: &str) -> Result<Option<Company>, CompanyError> {
        let row = sqlx::query_as::<_, CompanyRow>(
            "SELECT id, name, location, description, created_at FROM companies WHERE id = ?",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CompanyRow::into_domain))
    }

    /// Deletes a company together with its postings and their applications.
    pub async fn delete(&self, company_id: &str) -> Result<CascadeSummary, CompanyError> {
        let mut tx = self.pool.begin().await?;

        let applicants = sqlx::query(
            "DELETE FROM applicants \
             WHERE job_id IN (SELECT id FROM job_posts WHERE company_id = ?)",
        )
        .bind(company_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let job_posts = sqlx::query("DELETE FROM job_posts WHERE company_id = ?")
            .bind(company_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let companies = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(company_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(CascadeSummary {
            companies,
            job_posts,
            applicants,
        })
    }
}

/// Data required to create a company.
#[derive(Debug, Clone)]
pub struct NewCompany<'a> {
    pub id: String,
    pub name: &'a str,
    pub location: &'a str,
    pub description: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewCompany<'a> {
    /// Builds a record with a freshly generated identifier.
    ///
    /// Timestamps are truncated to the stored microsecond precision.
    pub fn new(
        name: &'a str,
        location: &'a str,
        description: &'a str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_id(),
            name,
            location,
            description,
            created_at: created_at.trunc_subsecs(6),
        }
    }
}

/// Errors raised by the company repository.
#[derive(Debug, Error)]
pub enum CompanyError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    id: String,
    name: String,
    location: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl CompanyRow {
    fn into_domain(self) -> Company {
        Company {
            id: self.id,
            name: self.name,
            location: self.location,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

/// Repository for the `job_posts` table.
#[derive(Clone)]
pub struct JobPostRepository {
    pool: SqlitePool,
}

impl JobPostRepository {
    /// Inserts a posting owned by an existing company.
    pub async fn insert(&self, record: &NewJobPost<'_>) -> Result<JobPost, JobPostError> {
        sqlx::query(
            "INSERT INTO job_posts \
             (id, company_id, title, description, salary, location, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(record.company_id)
        .bind(record.title)
        .bind(record.description)
        .bind(record.salary)
        .bind(record.location)
        .bind(to_rfc3339(record.created_at))
        .execute(&self.pool)
        .await
        .map_err(|err| match constraint_code(&err) {
            Some(SQLITE_CONSTRAINT_FOREIGNKEY) => JobPostError::MissingCompany,
            _ => JobPostError::Database(err),
        })?;

        Ok(JobPost {
            id: record.id.clone(),
            company_id: record.company_id.to_string(),
            title: record.title.to_string(),
            description: record.description.to_string(),
            salary: record.salary,
            location: record.location.to_string(),
            created_at: record.created_at,
        })
    }

    /// Loads a posting joined with its company.
    pub async fn fetch_with_company(
        &self,
        job_id: &str,
    ) -> Result<Option<JobPostWithCompany>, JobPostError> {
        let row = sqlx::query_as::<_, JobPostWithCompanyRow>(
            r#"
SELECT j.id,
       j.company_id,
       j.title,
       j.description,
       j.salary,
       j.location,
       j.created_at,
       c.name AS company_name,
       c.location AS company_location
  FROM job_posts AS j
  JOIN companies AS c
    ON c.id = j.company_id
 WHERE j.id = ?
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(JobPostWithCompanyRow::into_domain))
    }

    /// Lists every posting with its company, newest first.
    pub async fn list_with_company(&self) -> Result<Vec<JobPostWithCompany>, JobPostError> {
        let rows = sqlx::query_as::<_, JobPostWithCompanyRow>(
            r#"
SELECT j.id,
       j.company_id,
       j.title,
       j.description,
       j.salary,
       j.location,
       j.created_at,
       c.name AS company_name,
       c.location AS company_location
  FROM job_posts AS j
  JOIN companies AS c
    ON c.id = j.company_id
 ORDER BY j.created_at DESC, j.rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(JobPostWithCompanyRow::into_domain)
            .collect())
    }

    /// Deletes a posting together with its applications.
    pub async fn delete(&self, job_id: &str) -> Result<CascadeSummary, JobPostError> {
        let mut tx = self.pool.begin().await?;

        let applicants = sqlx::query("DELETE FROM applicants WHERE job_id = ?")
            .bind(job_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let job_posts = sqlx::query("DELETE FROM job_posts WHERE id = ?")
            .bind(job_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(CascadeSummary {
            companies: 0,
            job_posts,
            applicants,
        })
    }
}

/// Data required to create a job posting.
#[derive(Debug, Clone)]
pub struct NewJobPost<'a> {
    pub id: String,
    pub company_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub salary: i64,
    pub location: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewJobPost<'a> {
    /// Builds a record with a freshly generated identifier.
    pub fn new(
        company_id: &'a str,
        title: &'a str,
        description: &'a str,
        salary: i64,
        location: &'a str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_id(),
            company_id,
            title,
            description,
            salary,
            location,
            created_at: created_at.trunc_subsecs(6),
        }
    }
}

/// Errors raised by the job post repository.
#[derive(Debug, Error)]
pub enum JobPostError {
    #[error("company referenced by the job post does not exist")]
    MissingCompany,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for JobPostError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JobPostWithCompanyRow {
    id: String,
    company_id: String,
    title: String,
    description: String,
    salary: i64,
    location: String,
    created_at: DateTime<Utc>,
    company_name: String,
    company_location: String,
}

impl JobPostWithCompanyRow {
    fn into_domain(self) -> JobPostWithCompany {
        JobPostWithCompany {
            company: CompanySummary {
                id: self.company_id.clone(),
                name: self.company_name,
                location: self.company_location,
            },
            job: JobPost {
                id: self.id,
                company_id: self.company_id,
                title: self.title,
                description: self.description,
                salary: self.salary,
                location: self.location,
                created_at: self.created_at,
            },
        }
    }
}

/// Repository for the `applicants` table.
#[derive(Clone)]
pub struct ApplicantRepository {
    pool: SqlitePool,
}

impl ApplicantRepository {
    /// Inserts an application.
    ///
    /// The `(email, job_id)` unique index turns a concurrent second submission
    /// into [`ApplicantError::Duplicate`].
    pub async fn insert(&self, record: &NewApplicant<'_>) -> Result<Applicant, ApplicantError> {
        sqlx::query(
            "INSERT INTO applicants (id, name, email, resume_link, job_id, applied_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(record.name)
        .bind(record.email)
        .bind(record.resume_link)
        .bind(record.job_id)
        .bind(to_rfc3339(record.applied_at))
        .execute(&self.pool)
        .await
        .map_err(|err| match constraint_code(&err) {
            Some(SQLITE_CONSTRAINT_UNIQUE) => ApplicantError::Duplicate,
            Some(SQLITE_CONSTRAINT_FOREIGNKEY) => ApplicantError::MissingJob,
            _ => ApplicantError::Database(err),
        })?;

        Ok(Applicant {
            id: record.id.clone(),
            name: record.name.to_string(),
            email: record.email.to_string(),
            resume_link: record.resume_link.to_string(),
            job_id: record.job_id.to_string(),
            applied_at: record.applied_at,
        })
    }

    /// Finds the application submitted by `email` for the given posting, if any.
    pub async fn find_by_email_and_job(
        &self,
        email: &str,
        job_id: &str,
    ) -> Result<Option<Applicant>, ApplicantError> {
        let row = sqlx::query_as::<_, ApplicantRow>(
            "SELECT id, name, email, resume_link, job_id, applied_at \
             FROM applicants WHERE email = ? AND job_id = ? LIMIT 1",
        )
        .bind(email)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ApplicantRow::into_domain))
    }

    /// Lists the applications of one posting, newest first.
    pub async fn list_for_job(&self, job_id: &str) -> Result<Vec<Applicant>, ApplicantError> {
        let rows = sqlx::query_as::<_, ApplicantRow>(
            "SELECT id, name, email, resume_link, job_id, applied_at \
             FROM applicants WHERE job_id = ? \
             ORDER BY applied_at DESC, rowid DESC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ApplicantRow::into_domain).collect())
    }
}

/// Data required to create an application.
#[derive(Debug, Clone)]
pub struct NewApplicant<'a> {
    pub id: String,
    pub name: &'a str,
    pub email: &'a str,
    pub resume_link: &'a str,
    pub job_id: &'a str,
    pub applied_at: DateTime<Utc>,
}

impl<'a> NewApplicant<'a> {
    /// Builds a record with a freshly generated identifier.
    pub fn new(
        name: &'a str,
        email: &'a str,
        resume_link: &'a str,
        job_id: &'a str,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_id(),
            name,
            email,
            resume_link,
            job_id,
            applied_at: applied_at.trunc_subsecs(6),
        }
    }
}

/// Errors raised by the applicant repository.
#[derive(Debug, Error)]
pub enum ApplicantError {
    #[error("an application for this email and job already exists")]
    Duplicate,
    #[error("job post referenced by the application does not exist")]
    MissingJob,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for ApplicantError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ApplicantRow {
    id: String,
    name: String,
    email: String,
    resume_link: String,
    job_id: String,
    applied_at: DateTime<Utc>,
}

impl ApplicantRow {
    fn into_domain(self) -> Applicant {
        Applicant {
            id: self.id,
            name: self.name,
            email: self.email,
            resume_link: self.resume_link,
            job_id: self.job_id,
            applied_at: self.applied_at,
        }
    }
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

fn constraint_code(err: &sqlx::Error) -> Option<&'static str> {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code()? {
            code if code == SQLITE_CONSTRAINT_UNIQUE => Some(SQLITE_CONSTRAINT_UNIQUE),
            code if code == SQLITE_CONSTRAINT_FOREIGNKEY => Some(SQLITE_CONSTRAINT_FOREIGNKEY),
            _ => None,
        },
        _ => None,
    }
}

// Fixed-width microsecond timestamps keep text ordering chronological.
fn to_rfc3339(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ts(offset_secs: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .expect("fixed time")
            .with_timezone(&Utc)
            + Duration::seconds(offset_secs)
    }

    async fn setup_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.expect("connect");
        db.run_migrations().await.expect("migrations");
        db
    }

    async fn seed_company(db: &Database, name: &str) -> Company {
        db.companies()
            .insert(&NewCompany::new(name, "Berlin", "Widgets", ts(0)))
            .await
            .expect("insert company")
    }

    async fn seed_job(db: &Database, company_id: &str, title: &str, at: i64) -> JobPost {
        db.job_posts()
            .insert(&NewJobPost::new(
                company_id, title, "desc", 1000, "Remote", ts(at),
            ))
            .await
            .expect("insert job")
    }

    async fn seed_applicant(db: &Database, job_id: &str, email: &str, at: i64) -> Applicant {
        db.applicants()
            .insert(&NewApplicant::new(
                "Jane",
                email,
                "https://cv.example.com/jane",
                job_id,
                ts(at),
            ))
            .await
            .expect("insert applicant")
    }

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .expect("count rows")
    }

    #[tokio::test]
    async fn migrations_apply() {
        let db = setup_db().await;
        let tables: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('companies', 'job_posts', 'applicants')",
        )
        .fetch_one(db.pool())
        .await
        .expect("fetch tables");
        assert_eq!(tables.0, 3);
    }

    #[tokio::test]
    async fn connect_creates_missing_database_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("board.db");
        let url = format!("sqlite://{}", path.display());

        let db = Database::connect(&url).await.expect("connect");
        db.run_migrations().await.expect("migrations");
        seed_company(&db, "Acme").await;

        assert!(path.exists());
        assert_eq!(count(&db, "companies").await, 1);
    }

    #[tokio::test]
    async fn company_round_trips() {
        let db = setup_db().await;
        let company = seed_company(&db, "Acme").await;

        let loaded = db
            .companies()
            .fetch(&company.id)
            .await
            .expect("fetch")
            .expect("company exists");
        assert_eq!(loaded, company);

        let missing = db.companies().fetch("missing").await.expect("fetch");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn job_insert_requires_existing_company() {
        let db = setup_db().await;
        let err = db
            .job_posts()
            .insert(&NewJobPost::new("missing", "t", "d", 1, "l", ts(0)))
            .await
            .unwrap_err();
        assert!(matches!(err, JobPostError::MissingCompany));
        assert_eq!(count(&db, "job_posts").await, 0);
    }

    #[tokio::test]
    async fn jobs_list_newest_first_with_company() {
        let db = setup_db().await;
        let company = seed_company(&db, "Acme").await;
        let first = seed_job(&db, &company.id, "First", 10).await;
        let second = seed_job(&db, &company.id, "Second", 20).await;
        let tied = seed_job(&db, &company.id, "Tied", 20).await;

        let jobs = db.job_posts().list_with_company().await.expect("list");
        let ids: Vec<&str> = jobs.iter().map(|job| job.job.id.as_str()).collect();
        assert_eq!(ids, vec![tied.id.as_str(), second.id.as_str(), first.id.as_str()]);
        assert_eq!(jobs[0].company.name, "Acme");
        assert_eq!(jobs[0].company.location, "Berlin");
    }

    #[tokio::test]
    async fn fetch_with_company_joins_company_name() {
        let db = setup_db().await;
        let company = seed_company(&db, "Acme").await;
        let job = seed_job(&db, &company.id, "Engineer", 0).await;

        let loaded = db
            .job_posts()
            .fetch_with_company(&job.id)
            .await
            .expect("fetch")
            .expect("job exists");
        assert_eq!(loaded.job, job);
        assert_eq!(loaded.company.id, company.id);
        assert_eq!(loaded.to_string(), "Engineer at Acme");
    }

    #[tokio::test]
    async fn unique_index_rejects_second_application() {
        let db = setup_db().await;
        let company = seed_company(&db, "Acme").await;
        let job = seed_job(&db, &company.id, "Engineer", 0).await;
        let other = seed_job(&db, &company.id, "Designer", 1).await;
        seed_applicant(&db, &job.id, "jane@example.com", 0).await;

        let err = db
            .applicants()
            .insert(&NewApplicant::new(
                "Jane Again",
                "jane@example.com",
                "https://cv.example.com/jane",
                &job.id,
                ts(5),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicantError::Duplicate));

        seed_applicant(&db, &other.id, "jane@example.com", 6).await;
        assert_eq!(count(&db, "applicants").await, 2);
    }

    #[tokio::test]
    async fn applicant_insert_requires_existing_job() {
        let db = setup_db().await;
        let err = db
            .applicants()
            .insert(&NewApplicant::new(
                "Jane",
                "jane@example.com",
                "https://cv.example.com",
                "missing",
                ts(0),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicantError::MissingJob));
    }

    #[tokio::test]
    async fn applicants_listed_per_job_newest_first() {
        let db = setup_db().await;
        let company = seed_company(&db, "Acme").await;
        let job = seed_job(&db, &company.id, "Engineer", 0).await;
        let other = seed_job(&db, &company.id, "Designer", 0).await;
        let early = seed_applicant(&db, &job.id, "a@example.com", 1).await;
        let late = seed_applicant(&db, &job.id, "b@example.com", 2).await;
        seed_applicant(&db, &other.id, "c@example.com", 3).await;

        let listed = db.applicants().list_for_job(&job.id).await.expect("list");
        assert_eq!(listed, vec![late, early.clone()]);

        let found = db
            .applicants()
            .find_by_email_and_job("a@example.com", &job.id)
            .await
            .expect("find");
        assert_eq!(found, Some(early));
        let absent = db
            .applicants()
            .find_by_email_and_job("a@example.com", &other.id)
            .await
            .expect("find");
        assert!(absent.is_none());
    }

    #[tokio::test]
    async fn deleting_company_cascades_to_jobs_and_applicants() {
        let db = setup_db().await;
        let acme = seed_company(&db, "Acme").await;
        let globex = seed_company(&db, "Globex").await;
        let job = seed_job(&db, &acme.id, "Engineer", 0).await;
        let kept = seed_job(&db, &globex.id, "Analyst", 0).await;
        seed_applicant(&db, &job.id, "a@example.com", 1).await;
        seed_applicant(&db, &job.id, "b@example.com", 2).await;
        seed_applicant(&db, &kept.id, "a@example.com", 3).await;

        let summary = db.companies().delete(&acme.id).await.expect("delete");
        assert_eq!(
            summary,
            CascadeSummary {
                companies: 1,
                job_posts: 1,
                applicants: 2,
            }
        );
        assert_eq!(count(&db, "companies").await, 1);
        assert_eq!(count(&db, "job_posts").await, 1);
        assert_eq!(count(&db, "applicants").await, 1);
    }

    #[tokio::test]
    async fn deleting_job_cascades_to_applicants() {
        let db = setup_db().await;
        let company = seed_company(&db, "Acme").await;
        let job = seed_job(&db, &company.id, "Engineer", 0).await;
        seed_applicant(&db, &job.id, "a@example.com", 1).await;

        let summary = db.job_posts().delete(&job.id).await.expect("delete");
        assert_eq!(summary.job_posts, 1);
        assert_eq!(summary.applicants, 1);
        assert_eq!(count(&db, "companies").await, 1);

        let missing = db.job_posts().delete(&job.id).await.expect("delete again");
        assert_eq!(missing, CascadeSummary::default());
    }
}
