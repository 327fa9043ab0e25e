use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::domain::DomainError;
use crate::infrastructure::retry::RetryPolicy;

/// JSON-over-HTTP client shared by the Ollama adapters.
#[derive(Debug, Clone)]
pub struct JsonClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl JsonClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, DomainError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned + Send,
    {
        let url = format!("{}{}", self.base_url, path);
        let url = url.as_str();

        self.retry
            .run(path, || async move {
                let response = self
                    .client
                    .post(url)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| transport_error(url, e))?;

                let status = response.status();
                if !status.is_success() {
                    let detail = response.text().await.unwrap_or_default();
                    return Err(status_error(url, status, &detail));
                }

                response
                    .json::<R>()
                    .await
                    .map_err(|e| transport_error(url, e))
            })
            .await
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> DomainError {
    if e.is_timeout() {
        DomainError::timeout(format!("{url}: {e}"))
    } else if e.is_connect() || e.is_request() {
        DomainError::unavailable(format!("{url}: {e}"))
    } else {
        DomainError::external(format!("{url}: {e}"))
    }
}

fn status_error(url: &str, status: StatusCode, detail: &str) -> DomainError {
    let msg = format!("{url} returned {status}: {detail}");
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        DomainError::unavailable(msg)
    } else {
        DomainError::external(msg)
    }
}
