use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::{DateTime, Duration, Utc};
use job_board_core::Payload;
use job_board_storage::Database;
use serde_json::Value;

use crate::router::AppState;
use crate::service::Clock;
use crate::telemetry;

pub const FIXED_NOW: &str = "2024-01-01T00:00:00Z";

pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_NOW)
        .expect("fixed time")
        .with_timezone(&Utc)
}

/// Clock that advances one second per reading, starting at [`FIXED_NOW`].
pub fn stepping_clock() -> Clock {
    let ticks = Arc::new(AtomicI64::new(0));
    Arc::new(move || fixed_now() + Duration::seconds(ticks.fetch_add(1, Ordering::SeqCst)))
}

pub async fn setup_database() -> Database {
    let database = Database::connect("sqlite::memory:")
        .await
        .expect("connect");
    database.run_migrations().await.expect("migrations");
    database
}

pub async fn setup_state() -> AppState {
    let metrics = telemetry::init_metrics().expect("metrics init");
    AppState::new(metrics, setup_database().await).with_clock(stepping_clock())
}

pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other:?}"),
    }
}
