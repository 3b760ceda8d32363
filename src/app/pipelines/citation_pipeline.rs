use crate::adapters::{CrossRefSource, DataCiteSource, HttpCatalog, HttpClient};
use crate::core::aggregator::Aggregator;
use crate::core::{AggregateResult, CatalogSource, ConfigProvider, Pipeline, Resource, Storage};
use crate::report;
use crate::utils::error::Result;
use crate::utils::validation::validate_output_format;

/// 目錄 → DataCite/Crossref 彙整 → 報表輸出
pub struct CitationPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    catalog: HttpCatalog,
    aggregator: Aggregator<DataCiteSource, CrossRefSource>,
}

impl<S: Storage, C: ConfigProvider> CitationPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let http = HttpClient::new(config.http_settings())?;
        let catalog = HttpCatalog::new(http.clone(), config.catalog_url());
        let aggregator = Aggregator::new(
            DataCiteSource::new(http.clone(), config.datacite_url()),
            CrossRefSource::new(http, config.crossref_url()),
        )
        .with_policy(config.citation_failure_policy());

        Ok(Self {
            storage,
            config,
            catalog,
            aggregator,
        })
    }

    pub fn aggregator(&self) -> &Aggregator<DataCiteSource, CrossRefSource> {
        &self.aggregator
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CitationPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Resource>> {
        tracing::debug!("Fetching catalog from: {}", self.config.catalog_url());
        self.catalog.fetch_catalog().await
    }

    async fn transform(&self, data: Vec<Resource>) -> Result<AggregateResult> {
        let selection = self.config.selection();
        tracing::debug!(
            "Selection: all versions = {}, {} skipped DOIs",
            selection.include_all_versions,
            selection.skip_dois.len()
        );
        self.aggregator.aggregate(&data, &selection).await
    }

    async fn load(&self, result: AggregateResult) -> Result<String> {
        let output_path = self.config.output_path();
        let format = validate_output_format("output_path", output_path)?;
        let today = chrono::Local::now().date_naive();

        let data = report::render(
            &result.records,
            format,
            &self.config.report_settings(),
            today,
        )
        .await?;

        self.storage.write_file(output_path, &data).await?;
        tracing::debug!("Wrote {:?} output ({} bytes)", format, data.len());

        Ok(output_path.to_string())
    }
}
