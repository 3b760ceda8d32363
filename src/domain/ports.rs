use crate::domain::model::{
    AggregateResult, CitationFailurePolicy, CitationRecord, Doi, HttpSettings, ReportSettings,
    Resource, Selection,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn catalog_url(&self) -> &str;
    fn datacite_url(&self) -> &str;
    fn crossref_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn http_settings(&self) -> HttpSettings;
    fn selection(&self) -> Selection;
    fn citation_failure_policy(&self) -> CitationFailurePolicy;
    fn report_settings(&self) -> ReportSettings;
}

/// 分頁的資源目錄
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<Resource>>;
}

/// 回傳引用某個 DOI 的 DOI 集合（已扣除 related identifiers）
#[async_trait]
pub trait CitationSource: Send + Sync {
    async fn fetch_citations(&self, doi: &str) -> Result<BTreeSet<Doi>>;
}

#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_metadata(&self, doi: &str) -> Result<CitationRecord>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Resource>>;
    async fn transform(&self, data: Vec<Resource>) -> Result<AggregateResult>;
    async fn load(&self, result: AggregateResult) -> Result<String>;
}
