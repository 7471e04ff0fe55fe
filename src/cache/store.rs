//! Cached decorator over a content source.
//!
//! Content is eventually consistent with a bounded staleness window: a
//! page younger than the TTL is served from memory without contacting the
//! upstream, a stale page is revalidated on access, and when revalidation
//! fails the stale copy keeps the read-only surface alive.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use metrics::counter;
use tracing::warn;

use crate::application::repos::{ContentSource, ListQuery, SourceError};

use super::config::CacheConfig;
use super::lock::rw_write;

const SOURCE: &str = "cache::store";

#[derive(Clone)]
struct CachedPage {
    fetched_at: Instant,
    body: serde_json::Value,
}

/// A [`ContentSource`] decorator with bounded staleness and LRU capacity.
pub struct CachedSource {
    inner: Arc<dyn ContentSource>,
    ttl: Duration,
    pages: RwLock<LruCache<(String, String), CachedPage>>,
}

impl CachedSource {
    pub fn new(inner: Arc<dyn ContentSource>, config: &CacheConfig) -> Self {
        Self {
            inner,
            ttl: config.ttl,
            pages: RwLock::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    fn key(collection: &str, query: &ListQuery) -> (String, String) {
        (collection.to_string(), query.canonical())
    }

    fn lookup(&self, key: &(String, String)) -> Option<CachedPage> {
        // LRU bookkeeping needs the write half even for reads.
        rw_write(&self.pages, SOURCE, "lookup").get(key).cloned()
    }

    fn store(&self, key: (String, String), page: CachedPage) {
        let mut pages = rw_write(&self.pages, SOURCE, "store");
        if let Some((evicted, _)) = pages.push(key.clone(), page) {
            if evicted != key {
                counter!("onepage_content_cache_evict_total").increment(1);
            }
        }
    }
}

#[async_trait]
impl ContentSource for CachedSource {
    async fn list_raw(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<serde_json::Value, SourceError> {
        let key = Self::key(collection, query);

        if let Some(cached) = self.lookup(&key) {
            if cached.fetched_at.elapsed() < self.ttl {
                counter!("onepage_content_cache_hit_total").increment(1);
                return Ok(cached.body);
            }

            // Stale: revalidate, but keep serving the old page when the
            // upstream is unavailable.
            counter!("onepage_content_cache_stale_total").increment(1);
            return match self.inner.list_raw(collection, query).await {
                Ok(body) => {
                    self.store(
                        key,
                        CachedPage {
                            fetched_at: Instant::now(),
                            body: body.clone(),
                        },
                    );
                    Ok(body)
                }
                Err(err) => {
                    warn!(collection, error = %err, "revalidation failed, serving stale page");
                    Ok(cached.body)
                }
            };
        }

        counter!("onepage_content_cache_miss_total").increment(1);
        let body = self.inner.list_raw(collection, query).await?;
        self.store(
            key,
            CachedPage {
                fetched_at: Instant::now(),
                body: body.clone(),
            },
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use serde_json::{Value, json};

    use super::*;

    /// Upstream stand-in that counts fetches and can be switched off.
    #[derive(Default)]
    struct CountingSource {
        fetches: AtomicUsize,
        offline: AtomicBool,
    }

    #[async_trait]
    impl ContentSource for CountingSource {
        async fn list_raw(
            &self,
            collection: &str,
            query: &ListQuery,
        ) -> Result<Value, SourceError> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(SourceError::request("upstream offline"));
            }
            let fetch = self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(json!({
                "contents": [],
                "totalCount": fetch,
                "collection": collection,
                "query": query.canonical(),
            }))
        }
    }

    fn cached(inner: Arc<CountingSource>, ttl: Duration, capacity: usize) -> CachedSource {
        CachedSource::new(inner, &CacheConfig { ttl, capacity })
    }

    #[tokio::test]
    async fn fresh_pages_are_served_without_refetching() {
        let inner = Arc::new(CountingSource::default());
        let source = cached(inner.clone(), Duration::from_secs(300), 8);
        let query = ListQuery::new().limit(5);

        let first = source.list_raw("tags", &query).await.expect("first");
        let second = source.list_raw("tags", &query).await.expect("second");

        assert_eq!(first, second);
        assert_eq!(inner.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_queries_are_cached_separately() {
        let inner = Arc::new(CountingSource::default());
        let source = cached(inner.clone(), Duration::from_secs(300), 8);

        source
            .list_raw("tags", &ListQuery::new().limit(5))
            .await
            .expect("limit 5");
        source
            .list_raw("tags", &ListQuery::new().limit(50))
            .await
            .expect("limit 50");

        assert_eq!(inner.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stale_pages_are_revalidated() {
        let inner = Arc::new(CountingSource::default());
        let source = cached(inner.clone(), Duration::ZERO, 8);
        let query = ListQuery::new();

        let first = source.list_raw("blogs", &query).await.expect("first");
        let second = source.list_raw("blogs", &query).await.expect("second");

        assert_ne!(first["totalCount"], second["totalCount"]);
        assert_eq!(inner.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_revalidation_falls_back_to_the_stale_page() {
        let inner = Arc::new(CountingSource::default());
        let source = cached(inner.clone(), Duration::ZERO, 8);
        let query = ListQuery::new();

        let first = source.list_raw("blogs", &query).await.expect("first");
        inner.offline.store(true, Ordering::SeqCst);
        let second = source.list_raw("blogs", &query).await.expect("stale fallback");

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn uncached_failures_still_propagate() {
        let inner = Arc::new(CountingSource::default());
        inner.offline.store(true, Ordering::SeqCst);
        let source = cached(inner, Duration::from_secs(300), 8);

        let err = source
            .list_raw("blogs", &ListQuery::new())
            .await
            .expect_err("no stale copy to fall back to");
        assert!(matches!(err, SourceError::Request(_)));
    }

    #[tokio::test]
    async fn capacity_evicts_the_least_recently_used_page() {
        let inner = Arc::new(CountingSource::default());
        let source = cached(inner.clone(), Duration::from_secs(300), 1);

        source
            .list_raw("tags", &ListQuery::new())
            .await
            .expect("tags");
        source
            .list_raw("categories", &ListQuery::new())
            .await
            .expect("categories");
        // The tags page was evicted, so this is a miss again.
        source
            .list_raw("tags", &ListQuery::new())
            .await
            .expect("tags refetch");

        assert_eq!(inner.fetches.load(Ordering::SeqCst), 3);
    }
}
