use std::time::Duration;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::CACHE_CONTROL;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sym_core::HttpError;

/// The single seam through which the clients talk to the remote API.
///
/// `path` is relative to the API base and may already carry an encoded query
/// string. Implementations never retry.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, HttpError>;
}

/// `reqwest` backed gateway.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> anyhow::Result<Self> {
        // The API ties jobs to the anonymous session cookie it hands out.
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, HttpError> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut req = self.client.request(method.clone(), url.as_str());
        if method == Method::GET {
            req = req.header(CACHE_CONTROL, "no-store");
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(|e| {
            warn!("{} {} failed: {}", method, url, e);
            HttpError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok();
            return Err(HttpError::from_status(status.as_u16(), body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| HttpError::Decode(e.to_string()))
    }
}

/// Turns a gateway JSON value into a typed response.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, HttpError> {
    serde_json::from_value(value).map_err(|e| HttpError::Decode(e.to_string()))
}
