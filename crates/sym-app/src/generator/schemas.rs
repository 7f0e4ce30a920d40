use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JobCreateResponse {
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `GET /image/jobs/{id}`. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct JobStatusResponse {
    #[serde(default)]
    pub job: Option<JobSnapshot>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct JobSnapshot {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub output_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct JobListResponse {
    #[serde(default)]
    pub jobs: Vec<JobSummary>,
}

/// One row of `GET /image/jobs`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JobSummary {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub output_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobSummary {
    pub fn status(&self) -> sym_core::JobStatus {
        sym_core::JobStatus::from_wire(self.status.as_deref())
    }
}
