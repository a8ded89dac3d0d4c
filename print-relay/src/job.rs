//! Print job orchestration
//!
//! A job runs through a fixed sequence of states:
//!
//! ```text
//! Idle -> Connecting -> Initializing -> Executing(0..n) -> Finalizing -> Disconnecting -> Done
//!                  \            \               \               \
//!                   +------------+---------------+---------------+--> Disconnecting -> Failed
//! ```
//!
//! `Disconnecting` runs on every path once the job has started, so a
//! connection that was opened is always closed before
//! [`JobRunner::execute_job`] returns.

use std::fmt;
use std::time::Duration;

use crab_printer::{Connector, PrintError, PrinterDriver, PrinterTarget};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::command::{CommandMap, PrintCommand};
use crate::dispatch::{DispatchOutcome, Dispatcher, FORM_FEED};
use crate::error::{CleanupError, JobError};
use crate::fetch::ImageFetcher;

/// Select character code table 16, sent before the reset
const CODE_TABLE: &[u8] = b"\x1b\x74\x10";
/// ESC @
const RESET: &[u8] = b"\x1b\x40";
const FLUSH: &[u8] = b"\n\n";

/// Lifecycle position of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Connecting,
    Initializing,
    /// Running the command at this index
    Executing(usize),
    Finalizing,
    Disconnecting,
    Done,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Connecting => f.write_str("connecting"),
            Self::Initializing => f.write_str("initializing"),
            Self::Executing(i) => write!(f, "executing #{}", i),
            Self::Finalizing => f.write_str("finalizing"),
            Self::Disconnecting => f.write_str("disconnecting"),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

/// One print job: where to print and what
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrintJobRequest {
    pub host: String,
    pub port: u16,
    pub commands: Vec<CommandMap>,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

impl PrintJobRequest {
    pub fn new(host: impl Into<String>, port: u16, commands: Vec<CommandMap>) -> Self {
        Self {
            host: host.into(),
            port,
            commands,
            encoding: default_encoding(),
        }
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }
}

/// Summary of a successful job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobReport {
    /// Command entries sent to the printer
    pub applied: usize,
    /// Names of unrecognized entries, in order
    pub skipped: Vec<String>,
}

/// Settings shared by every job a runner executes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    pub connect_timeout: Duration,
    pub profile: String,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            profile: "NT-80-V-UL".to_string(),
        }
    }
}

/// Drives print jobs; holds at most one printer connection
pub struct JobRunner<C: Connector, F: ImageFetcher> {
    connector: C,
    fetcher: F,
    settings: RunnerSettings,
    connection: Option<C::Connection>,
    state: JobState,
    trail: Vec<JobState>,
}

impl<C: Connector, F: ImageFetcher> JobRunner<C, F> {
    pub fn new(connector: C, fetcher: F, settings: RunnerSettings) -> Self {
        Self {
            connector,
            fetcher,
            settings,
            connection: None,
            state: JobState::Idle,
            trail: Vec::new(),
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// States visited by the last job, in order
    pub fn trail(&self) -> &[JobState] {
        &self.trail
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn enter(&mut self, state: JobState) {
        debug!(state = %state, "Job state");
        self.state = state;
        self.trail.push(state);
    }

    /// Run one job end to end
    #[instrument(
        skip(self, request),
        fields(host = %request.host, port = request.port, commands = request.commands.len())
    )]
    pub async fn execute_job(&mut self, request: &PrintJobRequest) -> Result<JobReport, JobError> {
        self.trail.clear();
        self.state = JobState::Idle;

        let result = self.run(request).await;

        self.enter(JobState::Disconnecting);
        self.disconnect().await;

        match result {
            Ok(report) => {
                self.enter(JobState::Done);
                info!(
                    applied = report.applied,
                    skipped = report.skipped.len(),
                    "Print job completed"
                );
                Ok(report)
            }
            Err(e) => {
                self.enter(JobState::Failed);
                error!(error = %e, "Print job failed");
                Err(e)
            }
        }
    }

    async fn run(&mut self, request: &PrintJobRequest) -> Result<JobReport, JobError> {
        self.enter(JobState::Connecting);
        let target = PrinterTarget::new(request.host.clone(), request.port)
            .with_timeout(self.settings.connect_timeout)
            .with_profile(self.settings.profile.clone())
            .with_encoding(request.encoding.clone());
        self.connect(&target).await?;

        self.enter(JobState::Initializing);
        let addr = target.to_string();
        let conn = self.connection.as_mut().ok_or_else(|| JobError::Connection {
            addr: addr.clone(),
            source: PrintError::NotConnected,
        })?;
        for bytes in [CODE_TABLE, RESET] {
            conn.raw(bytes).await.map_err(|source| JobError::Connection {
                addr: addr.clone(),
                source,
            })?;
        }

        let mut report = JobReport::default();
        for (index, entry) in request.commands.iter().enumerate() {
            self.enter(JobState::Executing(index));
            let Some(conn) = self.connection.as_mut() else {
                return Err(JobError::Connection {
                    addr,
                    source: PrintError::NotConnected,
                });
            };
            let dispatcher = Dispatcher::new(&self.fetcher);
            execute_entry(&dispatcher, conn, index, entry, &mut report).await?;
        }

        self.enter(JobState::Finalizing);
        if let Some(conn) = self.connection.as_mut() {
            conn.raw(FLUSH).await.map_err(JobError::Finalize)?;
            conn.raw(FORM_FEED).await.map_err(JobError::Finalize)?;
        }

        Ok(report)
    }

    /// Open a connection, closing any connection this runner still holds
    pub async fn connect(&mut self, target: &PrinterTarget) -> Result<(), JobError> {
        if let Some(mut previous) = self.connection.take()
            && let Err(e) = previous.close().await
        {
            debug!(error = %e, "Ignoring error closing previous connection");
        }

        match self.connector.open(target).await {
            Ok(conn) => {
                self.connection = Some(conn);
                Ok(())
            }
            Err(source) => {
                error!(printer = %target, error = %source, "Cannot connect to printer");
                Err(JobError::Connection {
                    addr: target.to_string(),
                    source,
                })
            }
        }
    }

    /// Flush and close the held connection, if any
    ///
    /// Never fails: errors are logged and the connection is dropped.
    pub async fn disconnect(&mut self) {
        let Some(mut conn) = self.connection.take() else {
            return;
        };

        if let Err(e) = conn.raw(FORM_FEED).await {
            warn!(error = %CleanupError::Close(e), "Final form feed not sent");
        }
        if let Err(e) = conn.close().await {
            warn!(error = %CleanupError::Close(e), "Printer connection not closed cleanly");
        }
    }
}

/// Run every entry of one command object, in order
async fn execute_entry<F: ImageFetcher + ?Sized, D: PrinterDriver + ?Sized>(
    dispatcher: &Dispatcher<'_, F>,
    driver: &mut D,
    index: usize,
    entry: &CommandMap,
    report: &mut JobReport,
) -> Result<(), JobError> {
    for command in PrintCommand::from_map(entry) {
        let outcome = dispatcher
            .dispatch(driver, &command)
            .await
            .map_err(|source| JobError::Dispatch {
                index,
                command: command.name.clone(),
                source,
            })?;

        match outcome {
            DispatchOutcome::Applied => report.applied += 1,
            DispatchOutcome::Skipped(name) => report.skipped.push(name),
        }
        if command.ends_mapping() {
            break;
        }
    }
    Ok(())
}
