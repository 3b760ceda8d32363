use crate::core::cache::MemoCache;
use crate::domain::model::Doi;
use crate::domain::ports::CitationSource;
use crate::utils::doi::doi_key;
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeSet;

/// 失敗也會被記住，同一次執行內不會對同一個 DOI 再查詢
type CitationLookup = std::result::Result<BTreeSet<Doi>, String>;

/// Memoized front of a [`CitationSource`].
pub struct CitationFetcher<C: CitationSource> {
    source: C,
    cache: MemoCache<Doi, CitationLookup>,
}

impl<C: CitationSource> CitationFetcher<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            cache: MemoCache::new(),
        }
    }

    pub async fn citations_for(&self, doi: &str) -> Result<BTreeSet<Doi>> {
        let key = doi_key(doi);
        if self.cache.contains_key(&key) {
            tracing::debug!(doi, "citations cache hit");
        }

        let source = &self.source;
        let lookup = self
            .cache
            .get_or_compute(key, || async move {
                source.fetch_citations(doi).await.map_err(|e| match e {
                    EtlError::CitationFetchError { message, .. } => message,
                    other => other.to_string(),
                })
            })
            .await;

        lookup.map_err(|message| EtlError::CitationFetchError {
            doi: doi.to_string(),
            message,
        })
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn source(&self) -> &C {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        citations: HashMap<String, Vec<&'static str>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CitationSource for CountingSource {
        async fn fetch_citations(&self, doi: &str) -> Result<BTreeSet<Doi>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.citations.get(doi) {
                Some(dois) => Ok(dois.iter().map(|d| d.to_string()).collect()),
                None => Err(EtlError::CitationFetchError {
                    doi: doi.to_string(),
                    message: "status 500".to_string(),
                }),
            }
        }
    }

    fn fetcher() -> CitationFetcher<CountingSource> {
        CitationFetcher::new(CountingSource {
            citations: HashMap::from([("R1".to_string(), vec!["C1", "C2"])]),
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_second_call_uses_cache() {
        let fetcher = fetcher();

        let first = fetcher.citations_for("R1").await.unwrap();
        let second = fetcher.citations_for("R1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(fetcher.source().calls.load(Ordering::SeqCst), 1);
        assert_eq!(fetcher.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_cache_key_ignores_doi_case() {
        let fetcher = fetcher();

        fetcher.citations_for("R1").await.unwrap();
        let second = fetcher.citations_for("r1").await.unwrap();

        assert_eq!(second.len(), 2);
        assert_eq!(fetcher.source().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_requeried() {
        let fetcher = fetcher();

        let err = fetcher.citations_for("R9").await.unwrap_err();
        match err {
            EtlError::CitationFetchError { doi, message } => {
                assert_eq!(doi, "R9");
                assert_eq!(message, "status 500");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(fetcher.citations_for("R9").await.is_err());
        assert_eq!(fetcher.source().calls.load(Ordering::SeqCst), 1);
    }
}
