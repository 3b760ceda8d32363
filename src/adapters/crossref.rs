//! Crossref bibliographic metadata.

use crate::adapters::http::{FetchOutcome, HttpClient};
use crate::domain::model::CitationRecord;
use crate::domain::ports::MetadataSource;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

pub const CROSSREF_API_BASE: &str = "https://api.crossref.org/works/";

#[derive(Debug, Clone)]
pub struct CrossRefSource {
    http: HttpClient,
    base_url: String,
}

impl CrossRefSource {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MetadataSource for CrossRefSource {
    async fn fetch_metadata(&self, doi: &str) -> Result<CitationRecord> {
        let url = format!("{}{}", self.base_url, doi);
        tracing::info!(url = %url, "querying crossref");

        let resolution_error = |message: String| EtlError::MetadataResolutionError {
            doi: doi.to_string(),
            message,
        };

        match self
            .http
            .get_json(&url)
            .await
            .map_err(|e| resolution_error(e.to_string()))?
        {
            FetchOutcome::Json(body) => {
                parse_work(doi, body).map_err(|e| resolution_error(format!("invalid response: {}", e)))
            }
            FetchOutcome::Status(status) => Err(resolution_error(format!("status {}", status))),
        }
    }
}

/// Builds a [`CitationRecord`] from a Crossref `works` response.
pub fn parse_work(doi: &str, body: serde_json::Value) -> Result<CitationRecord> {
    let response: CRResponse = serde_json::from_value(body)?;
    let work = response.message.unwrap_or_default();

    let creators_str = work
        .author
        .unwrap_or_default()
        .iter()
        .filter_map(CRAuthor::display_name)
        .collect::<Vec<_>>()
        .join(", ");

    let title = work.title.unwrap_or_default().into_iter().next();

    // created.timestamp 為毫秒，以 UTC 換算日期
    let created = work
        .created
        .and_then(|created| created.timestamp)
        .and_then(DateTime::from_timestamp_millis)
        .map(|datetime| datetime.date_naive());

    Ok(CitationRecord::new(doi, creators_str, title, work.publisher, created))
}

// ===== CrossRef API Types =====

#[derive(Debug, Deserialize)]
struct CRResponse {
    message: Option<CRWork>,
}

#[derive(Debug, Default, Deserialize)]
struct CRWork {
    author: Option<Vec<CRAuthor>>,
    title: Option<Vec<String>>,
    publisher: Option<String>,
    created: Option<CRDate>,
}

#[derive(Debug, Deserialize)]
struct CRAuthor {
    given: Option<String>,
    family: Option<String>,
    // 機構作者只有 name
    name: Option<String>,
}

impl CRAuthor {
    fn display_name(&self) -> Option<String> {
        let full = format!(
            "{} {}",
            self.given.as_deref().unwrap_or_default(),
            self.family.as_deref().unwrap_or_default()
        );
        let full = full.trim();

        if !full.is_empty() {
            Some(full.to_string())
        } else {
            self.name.clone().filter(|name| !name.trim().is_empty())
        }
    }
}

#[derive(Debug, Deserialize)]
struct CRDate {
    timestamp: Option<i64>,
}
