use std::sync::{Arc, Mutex};
use chrono::Utc;
use log::{debug, info, warn};
use reqwest::Method;
use sym_core::job::{MISSING_OUTPUT_MESSAGE, UNKNOWN_WORKER_ERROR};
use sym_core::{ClientError, FailureKind, HttpError, JobHandle, JobOutcome, JobRequest, JobStatus};
use crate::events::{EventSink, JobEvent, ProgressEvent};
use crate::gateway::{decode, Gateway};
use crate::generator::schemas::{JobCreateResponse, JobListResponse, JobSnapshot, JobStatusResponse, JobSummary};

pub mod schemas;
mod poll;

pub use poll::{PollGuard, PollOptions, PollSession, PollingFlag, DEFAULT_POLL_INTERVAL_MS, DEFAULT_POLL_TIMEOUT_MS};

const JOBS_PATH: &str = "/image/jobs";
const MAX_LIST_LIMIT: u32 = 100;

/// Submits image jobs and follows them until they finish.
///
/// Clones share the polling flag, so at most one poll loop runs per client
/// family no matter how many handles are being tracked.
#[derive(Clone)]
pub struct JobLifecycleClient {
    gateway: Arc<dyn Gateway>,
    events: EventSink,
    polling: PollingFlag,
    last_observed: Arc<Mutex<Option<(JobHandle, JobStatus)>>>,
}

impl JobLifecycleClient {
    pub fn new(gateway: Arc<dyn Gateway>, events: EventSink) -> Self {
        Self {
            gateway,
            events,
            polling: PollingFlag::default(),
            last_observed: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_polling(&self) -> bool {
        self.polling.is_active()
    }

    /// Most recent status seen by any poll loop of this client.
    pub fn last_observed(&self) -> Option<(JobHandle, JobStatus)> {
        self.last_observed
            .lock()
            .map(|last| last.clone())
            .unwrap_or(None)
    }

    pub async fn submit(&self, req: &JobRequest) -> Result<JobHandle, ClientError> {
        req.validate()?;

        let body = serde_json::to_value(req)
            .map_err(|e| ClientError::Validation(format!("Invalid job parameters: {}", e)))?;

        info!(
            "Submitting job: '{}' ({} steps, guidance {}, {}x{})",
            req.prompt, req.steps, req.guidance, req.width, req.height
        );

        let value = self.gateway.request(Method::POST, JOBS_PATH, Some(&body)).await?;
        let resp: JobCreateResponse = decode(value)?;

        let id = resp
            .job_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ClientError::Protocol("Job submission response did not include a job_id".into()))?;

        info!("Job {} accepted ({})", id, resp.status.as_deref().unwrap_or("queued"));

        Ok(JobHandle::new(id))
    }

    /// One `GET /image/jobs/{id}`. A missing `job` object reads as an empty snapshot.
    pub async fn fetch_status(&self, handle: &JobHandle) -> Result<JobSnapshot, HttpError> {
        let path = format!("{}/{}", JOBS_PATH, urlencoding::encode(&handle.id));
        let value = self.gateway.request(Method::GET, &path, None).await?;

        if value.is_null() {
            return Ok(JobSnapshot::default());
        }

        let resp: JobStatusResponse = decode(value)?;
        Ok(resp.job.unwrap_or_default())
    }

    /// Recent jobs, newest first as the server orders them.
    pub async fn list_jobs(&self, limit: u32) -> Result<Vec<JobSummary>, HttpError> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);
        let path = format!("{}?limit={}", JOBS_PATH, limit);
        let value = self.gateway.request(Method::GET, &path, None).await?;

        if value.is_null() {
            return Ok(Vec::new());
        }

        let resp: JobListResponse = decode(value)?;
        Ok(resp.jobs)
    }

    /// Polls `handle` until it reaches a terminal state or `options.timeout` runs out.
    ///
    /// Returns `None` without touching the network when another poll loop is
    /// already running. Progress and the terminal event go to the event sink.
    pub async fn poll(&self, handle: &JobHandle, options: &PollOptions) -> Option<JobOutcome> {
        let Some(_guard) = self.polling.try_acquire() else {
            debug!("Already polling, ignoring poll request for job {}", handle);
            return None;
        };

        let mut session = PollSession::start();
        let outcome = self.run_session(handle, options, &mut session).await;

        info!(
            "Job {} finished after {} attempt(s) in {}ms: {:?}",
            handle,
            session.attempts(),
            session.elapsed().as_millis(),
            outcome
        );
        self.events.emit(JobEvent::from_outcome(handle, &outcome));

        Some(outcome)
    }

    async fn run_session(&self, handle: &JobHandle, options: &PollOptions, session: &mut PollSession) -> JobOutcome {
        loop {
            let attempt = session.next_attempt();
            debug!("Polling job {} (attempt {})", handle, attempt);

            let snapshot = match self.fetch_status(handle).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("Polling job {} failed: {}", handle, e);
                    return JobOutcome::Failure {
                        message: e.to_string(),
                        kind: FailureKind::from(&e),
                    };
                }
            };

            let status = JobStatus::from_wire(snapshot.status.as_deref());
            session.observe(status);
            self.record(handle, status);

            match status {
                JobStatus::Done => {
                    return match non_empty(snapshot.output_url) {
                        Some(artifact_url) => JobOutcome::Success { artifact_url },
                        None => JobOutcome::Failure {
                            message: MISSING_OUTPUT_MESSAGE.to_string(),
                            kind: FailureKind::ProtocolViolation,
                        },
                    };
                }
                JobStatus::Error => {
                    return JobOutcome::Failure {
                        message: non_empty(snapshot.error).unwrap_or_else(|| UNKNOWN_WORKER_ERROR.to_string()),
                        kind: FailureKind::Remote,
                    };
                }
                JobStatus::Queued | JobStatus::Running => {
                    let elapsed = session.elapsed();
                    self.events.emit(JobEvent::JobProgress(ProgressEvent {
                        job_id: handle.id.clone(),
                        status,
                        elapsed_ms: elapsed.as_millis() as u64,
                        attempt,
                        observed_at: Utc::now(),
                    }));

                    if elapsed > options.timeout {
                        return JobOutcome::TimedOut {
                            elapsed_ms: elapsed.as_millis() as u64,
                            last_status: session.last_status(),
                            timeout_ms: options.timeout.as_millis() as u64,
                        };
                    }

                    tokio::time::sleep(options.interval).await;
                }
            }
        }
    }

    fn record(&self, handle: &JobHandle, status: JobStatus) {
        if let Ok(mut last) = self.last_observed.lock() {
            *last = Some((handle.clone(), status));
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
