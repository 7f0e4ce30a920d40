use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use sym_core::{JobHandle, JobOutcome, JobStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub job_id: String,
    pub status: JobStatus,
    pub elapsed_ms: u64,
    pub attempt: u32,
    pub observed_at: DateTime<Utc>,
}

/// What the poll loop tells the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    JobProgress(ProgressEvent),
    JobComplete {
        job_id: String,
        artifact_url: String,
    },
    JobFailed {
        job_id: String,
        message: String,
    },
}

impl JobEvent {
    /// Terminal event for a resolved outcome. Timeouts are reported as failures.
    pub fn from_outcome(handle: &JobHandle, outcome: &JobOutcome) -> Self {
        match outcome {
            JobOutcome::Success { artifact_url } => Self::JobComplete {
                job_id: handle.id.clone(),
                artifact_url: artifact_url.clone(),
            },
            other => Self::JobFailed {
                job_id: handle.id.clone(),
                message: other.message(),
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::JobProgress(_))
    }
}

/// Fire-and-forget sender for [`JobEvent`]s.
///
/// Unbounded so the poll loop never waits on the consumer. A dropped receiver
/// is not an error.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<JobEvent>>,
}

impl EventSink {
    pub fn channel() -> (Self, UnboundedReceiver<JobEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops everything.
    pub fn disconnected() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: JobEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
