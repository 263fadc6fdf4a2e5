//! Liveness reporting for `GET /api/health`.
//!
//! The reporter owns the process start time (injected once at boot) and a
//! handle to the data store. Each snapshot does one ping and never fails:
//! an unreachable database is reported in the body, not as an HTTP error.

use crate::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use configuration::AppSettings;
use core_types::{DependencyState, HealthSnapshot};
use database::{CatalogStore, DbError};
use serde::Serialize;
use std::sync::Arc;

/// Receives dependency failures observed during a health check.
pub trait FailureSink: Send + Sync {
    fn dependency_unreachable(&self, error: &DbError);
}

/// Logs failures at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn dependency_unreachable(&self, error: &DbError) {
        tracing::warn!(error = %error, "Database health check failed.");
    }
}

/// Drops failures.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl FailureSink for SilentSink {
    fn dependency_unreachable(&self, _error: &DbError) {}
}

#[derive(Clone)]
pub struct LivenessReporter {
    started_at: DateTime<Utc>,
    store: Arc<dyn CatalogStore>,
    sink: Arc<dyn FailureSink>,
}

impl LivenessReporter {
    /// Creates a reporter that logs dependency failures through `tracing`.
    pub fn new(started_at: DateTime<Utc>, store: Arc<dyn CatalogStore>) -> Self {
        Self {
            started_at,
            store,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Same reporter, but failures are not logged.
    pub fn silent(&self) -> Self {
        self.clone().with_sink(Arc::new(SilentSink))
    }

    pub async fn snapshot(&self) -> HealthSnapshot {
        let state = self.check_dependency().await;
        HealthSnapshot::new(self.started_at, Utc::now(), state)
    }

    /// Like `snapshot`, with the generation time supplied by the caller.
    pub async fn snapshot_at(&self, now: DateTime<Utc>) -> HealthSnapshot {
        let state = self.check_dependency().await;
        HealthSnapshot::new(self.started_at, now, state)
    }

    // One attempt, no retry. Any error classifies the store as unreachable.
    async fn check_dependency(&self) -> DependencyState {
        match self.store.ping().await {
            Ok(()) => DependencyState::Connected,
            Err(error) => {
                self.sink.dependency_unreachable(&error);
                DependencyState::Unreachable
            }
        }
    }
}

/// The eager connection check run once at startup. A failure is logged once,
/// here, and does not stop the process.
pub async fn check_database_at_boot(liveness: &LivenessReporter) -> bool {
    let snapshot = liveness.silent().snapshot().await;
    if snapshot.dependency_reachable {
        tracing::info!("Database connected successfully.");
    } else {
        tracing::warn!("Database is not reachable; starting anyway. Start the database and the API will pick it up.");
    }
    snapshot.dependency_reachable
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub uptime: String,
    pub uptime_ms: i64,
    pub database: DatabaseHealth,
    pub environment: String,
    pub version: String,
}

impl HealthResponse {
    pub fn new(snapshot: &HealthSnapshot, app: &AppSettings) -> Self {
        let state = snapshot.dependency_state;
        let message = if state.is_connected() {
            "AnimeHeaven Backend API is running"
        } else {
            "AnimeHeaven Backend API is running, but the database is unreachable"
        };

        Self {
            success: true,
            status: state.service_label(),
            message: message.to_string(),
            timestamp: snapshot.generated_at,
            start_time: snapshot.process_started_at,
            uptime: snapshot.uptime_display(),
            uptime_ms: snapshot.uptime_ms(),
            database: DatabaseHealth {
                connected: snapshot.dependency_reachable,
                status: state.database_label(),
            },
            environment: app.environment.clone(),
            version: app.version.clone(),
        }
    }
}

/// # GET /api/health
/// Always answers 200; a database outage shows up in `database` and `status`.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.liveness.snapshot().await;
    Json(HealthResponse::new(&snapshot, &state.app))
}
