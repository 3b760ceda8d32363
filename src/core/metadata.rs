use crate::core::cache::MemoCache;
use crate::domain::model::{CitationRecord, Doi};
use crate::domain::ports::MetadataSource;
use crate::utils::doi::doi_key;

/// Memoized front of a [`MetadataSource`]. Lookup failures are logged and cached as `None`.
pub struct MetadataResolver<M: MetadataSource> {
    source: M,
    cache: MemoCache<Doi, Option<CitationRecord>>,
}

impl<M: MetadataSource> MetadataResolver<M> {
    pub fn new(source: M) -> Self {
        Self {
            source,
            cache: MemoCache::new(),
        }
    }

    pub async fn metadata_for(&self, doi: &str) -> Option<CitationRecord> {
        let key = doi_key(doi);
        if self.cache.contains_key(&key) {
            tracing::debug!(doi, "metadata cache hit");
        }

        let source = &self.source;
        self.cache
            .get_or_compute(key, || async move {
                match source.fetch_metadata(doi).await {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::error!(doi, error = %e, "error with metadata api, skipping citation");
                        None
                    }
                }
            })
            .await
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn source(&self) -> &M {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{EtlError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataSource for CountingSource {
        async fn fetch_metadata(&self, doi: &str) -> Result<CitationRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if doi == "missing" {
                return Err(EtlError::MetadataResolutionError {
                    doi: doi.to_string(),
                    message: "status 404".to_string(),
                });
            }
            Ok(CitationRecord::new(doi, "Jane Doe".to_string(), None, None, None))
        }
    }

    #[tokio::test]
    async fn test_metadata_is_memoized() {
        let resolver = MetadataResolver::new(CountingSource {
            calls: AtomicUsize::new(0),
        });

        let first = resolver.metadata_for("10.1/a").await.unwrap();
        let second = resolver.metadata_for("10.1/a").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(resolver.source().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_resolves_to_none_once() {
        let resolver = MetadataResolver::new(CountingSource {
            calls: AtomicUsize::new(0),
        });

        assert!(resolver.metadata_for("missing").await.is_none());
        assert!(resolver.metadata_for("missing").await.is_none());
        assert_eq!(resolver.source().calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached_len(), 1);
    }
}
