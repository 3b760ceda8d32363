//! HTTP transport shared by the catalog, DataCite and Crossref adapters.

use crate::domain::model::HttpSettings;
use crate::utils::error::Result;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// 成功時為解析後的 JSON，否則為非成功的狀態碼
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Json(serde_json::Value),
    Status(StatusCode),
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    settings: HttpSettings,
}

impl HttpClient {
    pub fn new(settings: HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &HttpSettings {
        &self.settings
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// GET 沒有副作用，所以連線錯誤、5xx 與 429 會依設定重試；其他 4xx 直接回傳。
    pub async fn get_json(&self, url: &str) -> Result<FetchOutcome> {
        let mut attempt = 0;

        loop {
            let can_retry = attempt < self.settings.retry_attempts;
            attempt += 1;

            let delay = match self
                .client
                .get(url)
                .header(ACCEPT, "application/json")
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    tracing::debug!(url, %status, attempt, "response received");

                    if status.is_success() {
                        return Ok(FetchOutcome::Json(response.json().await?));
                    }
                    if !(is_transient(status) && can_retry) {
                        return Ok(FetchOutcome::Status(status));
                    }

                    let delay = retry_after(&response).unwrap_or(self.settings.retry_delay);
                    tracing::warn!(url, %status, attempt, ?delay, "transient status, retrying");
                    delay
                }
                Err(e) if can_retry && (e.is_timeout() || e.is_connect() || e.is_request()) => {
                    tracing::warn!(url, error = %e, attempt, "request failed, retrying");
                    self.settings.retry_delay
                }
                Err(e) => return Err(e.into()),
            };

            tokio::time::sleep(delay).await;
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// `Retry-After` 的秒數形式，上限 [`MAX_RETRY_AFTER`]
fn retry_after(response: &Response) -> Option<Duration> {
    let seconds = response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()?;
    Some(Duration::from_secs(seconds).min(MAX_RETRY_AFTER))
}
