use crate::adapters::http::{FetchOutcome, HttpClient};
use crate::domain::model::{CatalogPage, Resource};
use crate::domain::ports::CatalogSource;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::collections::HashSet;

/// Paginated resource catalog; `next` links are followed until they run out.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    http: HttpClient,
    url: String,
}

impl HttpCatalog {
    pub fn new(http: HttpClient, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<CatalogPage> {
        let fetch_error = |message: String| EtlError::CatalogFetchError {
            url: url.to_string(),
            message,
        };

        let outcome = self
            .http
            .get_json(url)
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        match outcome {
            FetchOutcome::Json(body) => {
                serde_json::from_value(body).map_err(|e| fetch_error(format!("invalid page: {}", e)))
            }
            FetchOutcome::Status(status) => Err(fetch_error(format!("status {}", status))),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch_catalog(&self) -> Result<Vec<Resource>> {
        let mut resources = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(self.url.clone());

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                tracing::warn!(url = %url, "catalog page already visited, stopping pagination");
                break;
            }

            tracing::info!(url = %url, "querying catalog");
            let page = self.fetch_page(&url).await?;
            resources.extend(page.results);
            next = page.next.filter(|next| !next.is_empty());
        }

        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::HttpSettings;
    use httpmock::prelude::*;

    fn catalog(url: String) -> HttpCatalog {
        let http = HttpClient::new(HttpSettings {
            retry_attempts: 0,
            ..Default::default()
        })
        .unwrap();
        HttpCatalog::new(http, url)
    }

    #[tokio::test]
    async fn test_pages_are_concatenated_in_order() {
        let server = MockServer::start();
        let second_url = server.url("/resources/page-2");

        let first = server.mock(|when, then| {
            when.method(GET).path("/resources/");
            then.status(200).json_body(serde_json::json!({
                "results": [{"doi": "10.1/a"}, {"doi": "10.1/b"}],
                "next": second_url
            }));
        });
        let second = server.mock(|when, then| {
            when.method(GET).path("/resources/page-2");
            then.status(200).json_body(serde_json::json!({
                "results": [{"doi": "10.1/c", "previous_version": "10.1/a"}],
                "next": null
            }));
        });

        let resources = catalog(server.url("/resources/")).fetch_catalog().await.unwrap();

        first.assert();
        second.assert();
        let dois: Vec<&str> = resources.iter().map(|r| r.doi.as_str()).collect();
        assert_eq!(dois, vec!["10.1/a", "10.1/b", "10.1/c"]);
        assert_eq!(resources[2].previous_version(), Some("10.1/a"));
    }

    #[tokio::test]
    async fn test_error_status_is_catalog_failure() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/resources/");
            then.status(500);
        });

        let err = catalog(server.url("/resources/")).fetch_catalog().await.unwrap_err();

        mock.assert();
        assert!(matches!(err, EtlError::CatalogFetchError { .. }));
    }

    #[tokio::test]
    async fn test_self_referencing_next_stops() {
        let server = MockServer::start();
        let url = server.url("/resources/");
        let mock = server.mock(|when, then| {
            when.method(GET).path("/resources/");
            then.status(200).json_body(serde_json::json!({
                "results": [{"doi": "10.1/a"}],
                "next": url
            }));
        });

        let resources = catalog(server.url("/resources/")).fetch_catalog().await.unwrap();

        mock.assert_hits(1);
        assert_eq!(resources.len(), 1);
    }
}
