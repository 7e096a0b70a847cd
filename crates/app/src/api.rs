use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde::Serialize;

use job_board_core::{
    decode_payload,
    types::{ApplicantList, Company, JobList, PostedJob, SubmittedApplication},
};

use crate::problem::ProblemResponse;
use crate::router::AppState;

#[derive(Debug, Serialize)]
struct CompanyCreated {
    message: &'static str,
    company: Company,
}

#[derive(Debug, Serialize)]
struct JobPosted {
    message: &'static str,
    job: PostedJob,
}

#[derive(Debug, Serialize)]
struct ApplicationSubmitted {
    message: &'static str,
    application: SubmittedApplication,
}

pub async fn create_company(State(state): State<AppState>, body: Bytes) -> Response {
    let result = async {
        let payload = decode_payload(&body)?;
        let company = state.registry().create(&payload).await?;
        Ok::<_, ProblemResponse>(CompanyCreated {
            message: "Company created successfully",
            company,
        })
    }
    .await;
    finish("create_company", StatusCode::CREATED, result)
}

pub async fn post_job(State(state): State<AppState>, body: Bytes) -> Response {
    let result = async {
        let payload = decode_payload(&body)?;
        let job = state.postings().create(&payload).await?;
        Ok::<_, ProblemResponse>(JobPosted {
            message: "Job posted successfully",
            job,
        })
    }
    .await;
    finish("post_job", StatusCode::CREATED, result)
}

pub async fn list_jobs(State(state): State<AppState>) -> Response {
    let result: Result<JobList, ProblemResponse> =
        state.listing().list_postings().await.map_err(Into::into);
    finish("list_jobs", StatusCode::OK, result)
}

pub async fn apply(State(state): State<AppState>, body: Bytes) -> Response {
    let result = async {
        let payload = decode_payload(&body)?;
        let application = state.applications().apply(&payload).await?;
        Ok::<_, ProblemResponse>(ApplicationSubmitted {
            message: "Application submitted successfully",
            application,
        })
    }
    .await;
    finish("apply", StatusCode::CREATED, result)
}

pub async fn list_applicants(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let result: Result<ApplicantList, ProblemResponse> = state
        .listing()
        .list_applicants(&job_id)
        .await
        .map_err(Into::into);
    finish("list_applicants", StatusCode::OK, result)
}

fn finish<T: Serialize>(
    route: &'static str,
    success: StatusCode,
    result: Result<T, ProblemResponse>,
) -> Response {
    let response = match result {
        Ok(body) => (success, Json(body)).into_response(),
        Err(problem) => problem.into_response(),
    };
    counter!(
        "api_requests_total",
        "route" => route,
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);
    response
}
