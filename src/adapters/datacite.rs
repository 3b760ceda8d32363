//! DataCite citation relationships.

use crate::adapters::http::{FetchOutcome, HttpClient};
use crate::domain::model::Doi;
use crate::domain::ports::CitationSource;
use crate::utils::doi::doi_key;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};

pub const DATACITE_API_BASE: &str = "https://api.datacite.org/dois/";

#[derive(Debug, Clone)]
pub struct DataCiteSource {
    http: HttpClient,
    base_url: String,
}

impl DataCiteSource {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CitationSource for DataCiteSource {
    async fn fetch_citations(&self, doi: &str) -> Result<BTreeSet<Doi>> {
        let url = format!("{}{}", self.base_url, doi);
        tracing::info!(url = %url, "querying datacite");

        let fetch_error = |message: String| EtlError::CitationFetchError {
            doi: doi.to_string(),
            message,
        };

        match self.http.get_json(&url).await.map_err(|e| fetch_error(e.to_string()))? {
            FetchOutcome::Json(body) => {
                let response: DataCiteResponse = serde_json::from_value(body)
                    .map_err(|e| fetch_error(format!("invalid response: {}", e)))?;
                Ok(response.citations())
            }
            FetchOutcome::Status(status) => Err(fetch_error(format!("status {}", status))),
        }
    }
}

/// Citation ids of a DataCite record minus its declared related identifiers.
pub fn parse_citations(body: serde_json::Value) -> Result<BTreeSet<Doi>> {
    let response: DataCiteResponse = serde_json::from_value(body)?;
    Ok(response.citations())
}

// ===== DataCite API Types =====

#[derive(Debug, Default, Deserialize)]
struct DataCiteResponse {
    data: Option<DataCiteRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct DataCiteRecord {
    attributes: Option<DataCiteAttributes>,
    relationships: Option<DataCiteRelationships>,
}

#[derive(Debug, Default, Deserialize)]
struct DataCiteAttributes {
    #[serde(rename = "relatedIdentifiers")]
    related_identifiers: Option<Vec<RelatedIdentifier>>,
}

#[derive(Debug, Deserialize)]
struct RelatedIdentifier {
    #[serde(rename = "relatedIdentifier")]
    related_identifier: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DataCiteRelationships {
    citations: Option<RelationshipList>,
}

#[derive(Debug, Default, Deserialize)]
struct RelationshipList {
    data: Option<Vec<RelationshipItem>>,
}

#[derive(Debug, Deserialize)]
struct RelationshipItem {
    id: Option<String>,
}

impl DataCiteResponse {
    fn citations(self) -> BTreeSet<Doi> {
        let record = self.data.unwrap_or_default();

        // DOI 不分大小寫
        let related: HashSet<String> = record
            .attributes
            .and_then(|attributes| attributes.related_identifiers)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|identifier| identifier.related_identifier)
            .map(|identifier| doi_key(&identifier))
            .collect();

        record
            .relationships
            .and_then(|relationships| relationships.citations)
            .and_then(|citations| citations.data)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| item.id)
            .filter(|id| !id.is_empty() && !related.contains(&doi_key(id)))
            .collect()
    }
}
