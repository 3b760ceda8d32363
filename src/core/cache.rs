use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// 單次執行期間的記憶化快取：每個 key 最多計算一次，之後不再失效。
///
/// 每個 key 各自持有一個 [`OnceCell`]，同一個 key 同時只會有一個計算在進行，
/// 其他呼叫者會等待同一個結果。
pub struct MemoCache<K, V> {
    entries: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key`, running `compute` only if no value exists yet.
    pub async fn get_or_compute<F, Fut>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let cell = self.cell(key);
        cell.get_or_init(compute).await.clone()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// 已完成計算的 key 數量
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, key: K) -> Arc<OnceCell<V>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key).or_default())
    }
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_computes_once_per_key() {
        let cache: MemoCache<String, usize> = MemoCache::new();
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        for _ in 0..3 {
            let value = cache
                .get_or_compute("a".to_string(), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    42
                })
                .await;
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(42));
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains_key(&"b".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_computation() {
        let cache: MemoCache<&'static str, Option<u32>> = MemoCache::new();
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        let compute = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            None
        };

        let (first, second) = tokio::join!(
            cache.get_or_compute("doi", compute),
            cache.get_or_compute("doi", compute)
        );

        assert_eq!(first, None);
        assert_eq!(second, None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // None 也是快取值
        assert!(cache.contains_key(&"doi"));
    }
}
