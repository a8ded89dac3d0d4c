//! Shared server state

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crab_printer::NetworkConnector;
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::error::FetchError;
use crate::fetch::HttpFetcher;
use crate::job::{JobRunner, RunnerSettings};

/// Status of a submitted job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Failure cause
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// In-memory job status table
///
/// Best effort bookkeeping: entries live as long as the process.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: DashMap<String, JobRecord>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job as `processing` and return its id
    pub fn start(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        self.jobs.insert(
            id.clone(),
            JobRecord {
                status: JobStatus::Processing,
                created_at: now,
                updated_at: now,
                error: None,
            },
        );
        id
    }

    pub fn complete(&self, id: &str) {
        self.update(id, JobStatus::Completed, None);
    }

    pub fn fail(&self, id: &str, error: impl Into<String>) {
        self.update(id, JobStatus::Failed, Some(error.into()));
    }

    fn update(&self, id: &str, status: JobStatus, error: Option<String>) {
        if let Some(mut record) = self.jobs.get_mut(id) {
            record.status = status;
            record.updated_at = Utc::now();
            record.error = error;
        }
    }

    pub fn get(&self, id: &str) -> Option<JobRecord> {
        self.jobs.get(id).map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jobs: Arc<JobTable>,
    connector: NetworkConnector,
    fetcher: HttpFetcher,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(config.fetch_timeout())?;
        Ok(Self {
            config: Arc::new(config),
            jobs: Arc::new(JobTable::new()),
            connector: NetworkConnector::new(),
            fetcher,
        })
    }

    pub fn runner_settings(&self) -> RunnerSettings {
        self.config.runner_settings()
    }

    /// Fresh runner for one request
    pub fn job_runner(&self) -> JobRunner<NetworkConnector, HttpFetcher> {
        JobRunner::new(self.connector, self.fetcher.clone(), self.runner_settings())
    }
}
