use crate::core::citations::CitationFetcher;
use crate::core::metadata::MetadataResolver;
use crate::core::versions::CatalogIndex;
use crate::domain::model::{
    AggregateResult, CitationFailurePolicy, Doi, OutputRecord, Resource, Selection,
};
use crate::domain::ports::{CitationSource, MetadataSource};
use crate::utils::doi::doi_key;
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;

/// 串起版本解析、引用查詢與書目解析，每個選取的資源輸出一筆 [`OutputRecord`]。
///
/// 兩個快取都屬於 Aggregator 本身，生命週期等同一次執行。
pub struct Aggregator<C: CitationSource, M: MetadataSource> {
    citations: CitationFetcher<C>,
    metadata: MetadataResolver<M>,
    policy: CitationFailurePolicy,
}

impl<C: CitationSource, M: MetadataSource> Aggregator<C, M> {
    pub fn new(citation_source: C, metadata_source: M) -> Self {
        Self {
            citations: CitationFetcher::new(citation_source),
            metadata: MetadataResolver::new(metadata_source),
            policy: CitationFailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CitationFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn citation_fetcher(&self) -> &CitationFetcher<C> {
        &self.citations
    }

    pub fn metadata_resolver(&self) -> &MetadataResolver<M> {
        &self.metadata
    }

    pub async fn aggregate(
        &self,
        catalog: &[Resource],
        selection: &Selection,
    ) -> Result<AggregateResult> {
        let index = CatalogIndex::new(catalog);
        let mut result = AggregateResult::default();

        for resource in catalog {
            if !selection.includes(resource) {
                tracing::debug!(doi = %resource.doi, "skipping resource");
                continue;
            }

            match self.aggregate_resource(&index, resource).await {
                Ok(record) => result.records.push(record),
                Err(e @ EtlError::CitationFetchError { .. })
                    if self.policy == CitationFailurePolicy::SkipResource =>
                {
                    tracing::warn!(doi = %resource.doi, error = %e, "citation fetch failed, skipping resource");
                    result.skipped_resources.push(resource.doi.clone());
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            "✅ Aggregated {} resources ({} citation sets, {} metadata records cached)",
            result.records.len(),
            self.citations.cached_len(),
            self.metadata.cached_len()
        );

        Ok(result)
    }

    async fn aggregate_resource(
        &self,
        index: &CatalogIndex<'_>,
        resource: &Resource,
    ) -> Result<OutputRecord> {
        let versions = index.resolve_chain(resource);

        // 新版本吸收所有舊版本的引用，以不分大小寫的 DOI 去重，保留第一次出現的寫法
        let mut citing: BTreeMap<String, Doi> = BTreeMap::new();
        for doi in &versions {
            for citing_doi in self.citations.citations_for(doi).await? {
                citing.entry(doi_key(&citing_doi)).or_insert(citing_doi);
            }
        }

        let mut citations = Vec::with_capacity(citing.len());
        for doi in citing.values() {
            if let Some(record) = self.metadata.metadata_for(doi).await {
                citations.push(record);
            }
        }

        tracing::info!(
            doi = %resource.doi,
            versions = versions.len(),
            citing = citing.len(),
            resolved = citations.len(),
            "resolved citations"
        );

        Ok(OutputRecord::new(resource, citations))
    }
}
