use crate::models::Region;
use crate::services::region_catalog::RegionCatalog;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Memoizing decorator over a [`RegionCatalog`]
///
/// Only non-empty results are cached, since an empty list may be a swallowed
/// upstream failure. Concurrent misses on one key share a single fetch.
pub struct CachedRegionCatalog {
    inner: Arc<dyn RegionCatalog>,
    cache: moka::future::Cache<String, Arc<Vec<Region>>>,
}

impl CachedRegionCatalog {
    /// Wrap `inner` with a TTL cache holding at most `max_entries` lists
    pub fn new(inner: Arc<dyn RegionCatalog>, max_entries: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner, cache }
    }

    async fn get_or_fetch<F>(&self, key: String, fetch: F) -> Vec<Region>
    where
        F: std::future::Future<Output = Vec<Region>>,
    {
        let cached = self
            .cache
            .optionally_get_with(key.clone(), async {
                let regions = fetch.await;
                tracing::trace!("Region cache miss: {} ({} fetched)", key, regions.len());
                (!regions.is_empty()).then(|| Arc::new(regions))
            })
            .await;

        match cached {
            Some(regions) => regions.as_ref().clone(),
            None => Vec::new(),
        }
    }

    /// Drop everything cached
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
        tracing::debug!("Invalidated region cache");
    }
}

#[async_trait]
impl RegionCatalog for CachedRegionCatalog {
    async fn fetch_provinces(&self) -> Vec<Region> {
        self.get_or_fetch(CacheKey::provinces(), self.inner.fetch_provinces())
            .await
    }

    async fn fetch_wards(&self, province_code: &str) -> Vec<Region> {
        if province_code.is_empty() {
            return Vec::new();
        }

        self.get_or_fetch(
            CacheKey::wards(province_code),
            self.inner.fetch_wards(province_code),
        )
        .await
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for the province list
    pub fn provinces() -> String {
        "provinces".to_string()
    }

    /// Build a cache key for the wards of a province
    pub fn wards(province_code: &str) -> String {
        format!("wards:{}", province_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCatalog {
        calls: AtomicUsize,
        wards: Vec<Region>,
    }

    #[async_trait]
    impl RegionCatalog for CountingCatalog {
        async fn fetch_provinces(&self) -> Vec<Region> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            vec![Region::province("01", "Hà Nội")]
        }

        async fn fetch_wards(&self, _province_code: &str) -> Vec<Region> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.wards.clone()
        }
    }

    #[tokio::test]
    async fn test_provinces_cached() {
        let inner = Arc::new(CountingCatalog {
            calls: AtomicUsize::new(0),
            wards: vec![],
        });
        let cached = CachedRegionCatalog::new(inner.clone(), 16, 60);

        assert_eq!(cached.fetch_provinces().await.len(), 1);
        assert_eq!(cached.fetch_provinces().await.len(), 1);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_results_not_cached() {
        let inner = Arc::new(CountingCatalog {
            calls: AtomicUsize::new(0),
            wards: vec![],
        });
        let cached = CachedRegionCatalog::new(inner.clone(), 16, 60);

        assert!(cached.fetch_wards("01").await.is_empty());
        assert!(cached.fetch_wards("01").await.is_empty());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);

        assert!(cached.fetch_wards("").await.is_empty());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all_refetches() {
        let inner = Arc::new(CountingCatalog {
            calls: AtomicUsize::new(0),
            wards: vec![Region::ward("0105", "Đông Anh", "01")],
        });
        let cached = CachedRegionCatalog::new(inner.clone(), 16, 60);

        assert_eq!(cached.fetch_wards("01").await.len(), 1);
        assert_eq!(cached.fetch_wards("01").await.len(), 1);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        cached.invalidate_all();
        assert_eq!(cached.fetch_wards("01").await.len(), 1);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let inner = Arc::new(CountingCatalog {
            calls: AtomicUsize::new(0),
            wards: vec![Region::ward("0105", "Đông Anh", "01")],
        });
        let cached = CachedRegionCatalog::new(inner.clone(), 16, 60);

        let (first, second) = tokio::join!(cached.fetch_wards("01"), cached.fetch_wards("01"));
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::provinces(), "provinces");
        assert_eq!(CacheKey::wards("01"), "wards:01");
    }
}
