use std::sync::Arc;
use reqwest::Method;
use serde::Deserialize;
use sym_core::HttpError;
use crate::gateway::{decode, Gateway};

#[derive(Debug, Clone, Default, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: Option<String>,
}

/// Liveness of the remote API as the UI shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub ok: bool,
    pub label: String,
}

impl HealthStatus {
    pub fn from_result(result: Result<HealthStatus, HttpError>) -> Self {
        result.unwrap_or_else(|_| Self { ok: false, label: "down".into() })
    }
}

#[derive(Clone)]
pub struct HealthProbe {
    gateway: Arc<dyn Gateway>,
}

impl HealthProbe {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn check(&self) -> Result<HealthStatus, HttpError> {
        let value = self.gateway.request(Method::GET, "/health", None).await?;
        let resp: HealthResponse = if value.is_null() { HealthResponse::default() } else { decode(value)? };

        Ok(HealthStatus {
            ok: true,
            label: resp.status.unwrap_or_else(|| "ok".into()),
        })
    }
}
