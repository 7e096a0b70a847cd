use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use job_board_storage::Database;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::applications::ApplicationService;
use crate::listing::Listing;
use crate::postings::JobPostingService;
use crate::registry::CompanyRegistry;
use crate::service::Clock;
use crate::{api, telemetry};

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    storage: Database,
    registry: CompanyRegistry,
    postings: JobPostingService,
    applications: ApplicationService,
    listing: Listing,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, storage: Database) -> Self {
        let clock: Clock = Arc::new(Utc::now);
        Self {
            metrics,
            registry: CompanyRegistry::new(storage.clone(), clock.clone()),
            postings: JobPostingService::new(storage.clone(), clock.clone()),
            applications: ApplicationService::new(storage.clone(), clock),
            listing: Listing::new(storage.clone()),
            storage,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.registry = CompanyRegistry::new(self.storage.clone(), clock.clone());
        self.postings = JobPostingService::new(self.storage.clone(), clock.clone());
        self.applications = ApplicationService::new(self.storage.clone(), clock);
        self
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn registry(&self) -> &CompanyRegistry {
        &self.registry
    }

    pub fn postings(&self) -> &JobPostingService {
        &self.postings
    }

    pub fn applications(&self) -> &ApplicationService {
        &self.applications
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api/create-company/", post(api::create_company))
        .route("/api/post-job/", post(api::post_job))
        .route("/api/jobs/", get(api::list_jobs))
        .route("/api/apply/", post(api::apply))
        .route("/api/applicants/:job_id/", get(api::list_applicants))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> Response {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
