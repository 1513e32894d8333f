use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::domain::pagination::Page;
use crate::domain::post::Post;

struct CacheEntry {
    page: Page<Post>,
    expires_at: Instant,
}

/// Short-lived cache of resolved index pages, keyed by the page number
/// actually served.
///
/// Requests past the last page are clipped to it before the lookup, so the
/// map holds at most one entry per existing page. Owned by whoever serves
/// the index; nothing about it is global. Callers that change posts are
/// expected to call [`ListingCache::invalidate`].
pub(crate) struct ListingCache {
    ttl: Option<Duration>,
    entries: RwLock<HashMap<u64, CacheEntry>>,
}

impl ListingCache {
    /// A zero `ttl` disables caching.
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl: (!ttl.is_zero()).then_some(ttl),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub(crate) async fn get(&self, requested: u64) -> Option<Page<Post>> {
        self.ttl?;
        let now = Instant::now();
        let entries = self.entries.read().await;
        // every live entry was resolved against the same total
        let num_pages = entries
            .values()
            .find(|entry| entry.expires_at > now)
            .map(|entry| entry.page.window.num_pages)?;
        let entry = entries.get(&requested.clamp(1, num_pages))?;
        (entry.expires_at > now).then(|| entry.page.clone())
    }

    /// Stores `page` under its own number and sweeps expired entries.
    pub(crate) async fn put(&self, page: Page<Post>) {
        let Some(ttl) = self.ttl else {
            return;
        };
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            page.number(),
            CacheEntry {
                page,
                expires_at: now + ttl,
            },
        );
    }

    pub(crate) async fn invalidate(&self) {
        self.entries.write().await.clear();
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ListingCache;
    use crate::domain::pagination::{Page, Paginator};
    use crate::domain::post::Post;

    /// Page `number` of a listing with `num_pages` single-post pages.
    fn page(number: u64, num_pages: u64) -> Page<Post> {
        let window = Paginator::new(1)
            .expect("valid page size")
            .window(num_pages, number);
        Page {
            items: Vec::new(),
            window,
        }
    }

    #[tokio::test]
    async fn stores_and_returns_pages_until_invalidated() {
        let cache = ListingCache::new(Duration::from_secs(60));
        cache.put(page(1, 2)).await;

        assert_eq!(cache.get(1).await, Some(page(1, 2)));
        assert_eq!(cache.get(2).await, None);

        cache.invalidate().await;
        assert_eq!(cache.get(1).await, None);
    }

    #[tokio::test]
    async fn disabled_cache_never_returns_entries() {
        let cache = ListingCache::disabled();
        cache.put(page(1, 1)).await;
        assert_eq!(cache.get(1).await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn expired_entries_are_dropped() {
        let cache = ListingCache::new(Duration::from_millis(10));
        cache.put(page(1, 1)).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get(1).await, None);
    }

    #[tokio::test]
    async fn requests_past_the_end_share_the_last_page() {
        let cache = ListingCache::new(Duration::from_secs(60));
        cache.put(page(2, 2)).await;

        for requested in [2, 3, 57, u64::MAX] {
            assert_eq!(cache.get(requested).await, Some(page(2, 2)), "{requested}");
        }
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn put_sweeps_expired_entries() {
        let cache = ListingCache::new(Duration::from_millis(5));
        for number in 1..=1000 {
            cache.put(page(number, 1000)).await;
        }
        assert_eq!(cache.len().await, 1000);

        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.put(page(1, 1000)).await;
        assert_eq!(cache.len().await, 1);
    }
}
