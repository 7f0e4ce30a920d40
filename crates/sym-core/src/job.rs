use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::ClientError;

pub const DEFAULT_STEPS: u32 = 28;
pub const DEFAULT_GUIDANCE: f32 = 7.5;
pub const DEFAULT_WIDTH: u32 = 512;
pub const DEFAULT_HEIGHT: u32 = 512;

/// Shown when the remote reports `done` without telling us where the image is.
pub const MISSING_OUTPUT_MESSAGE: &str = "Job marked done but no output_url returned.";
pub const UNKNOWN_WORKER_ERROR: &str = "Unknown worker error";

/// Parameters of one image generation job, serialized as the body of `POST /image/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRequest {
    pub prompt: String,
    pub steps: u32,
    pub guidance: f32,
    pub width: u32,
    pub height: u32,
    pub seed: Option<i64>,
    pub model_id: Option<String>,
}

impl JobRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into().trim().to_string(),
            steps: DEFAULT_STEPS,
            guidance: DEFAULT_GUIDANCE,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: None,
            model_id: None,
        }
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_guidance(mut self, guidance: f32) -> Self {
        self.guidance = guidance;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_seed(mut self, seed: Option<i64>) -> Self {
        self.seed = seed;
        self
    }

    /// Blank model ids are sent as `null` so the worker picks its default.
    pub fn with_model_id(mut self, model_id: Option<String>) -> Self {
        self.model_id = model_id
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.prompt.trim().is_empty() {
            return Err(ClientError::Validation("Prompt must not be empty".into()));
        }
        Ok(())
    }
}

/// Opaque identifier of a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
}

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Error,
}

impl JobStatus {
    /// Maps the remote status string. Anything we don't recognise, including a
    /// missing status, is treated as still waiting in the queue.
    pub fn from_wire(status: Option<&str>) -> Self {
        match status.map(str::trim) {
            Some("running") => Self::Running,
            Some("done") => Self::Done,
            Some("error") => Self::Error,
            _ => Self::Queued,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a failed outcome came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The worker reported `error`.
    Remote,
    /// `done` without an artifact location.
    ProtocolViolation,
    Transport,
    Status,
    Decode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Success {
        artifact_url: String,
    },
    Failure {
        message: String,
        kind: FailureKind,
    },
    TimedOut {
        elapsed_ms: u64,
        last_status: JobStatus,
        timeout_ms: u64,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn artifact_url(&self) -> Option<&str> {
        match self {
            Self::Success { artifact_url } => Some(artifact_url),
            _ => None,
        }
    }

    /// Text the UI shows for this outcome.
    pub fn message(&self) -> String {
        match self {
            Self::Success { artifact_url } => artifact_url.clone(),
            Self::Failure { message, .. } => message.clone(),
            Self::TimedOut { last_status, timeout_ms, .. } => {
                format!("Timed out after {}s. Job still {}.", timeout_ms / 1000, last_status)
            }
        }
    }
}
