use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

/// Full-page cache in front of the home page. Entries are keyed by request
/// path and query, shared by every actor, and only leave by expiry or
/// [`PageCache::invalidate_all`].
#[derive(Clone)]
pub struct PageCache {
    pages: Cache<String, String>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        let pages = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(ttl)
            .build();
        Self { pages }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let hit = self.pages.get(key).await;
        debug!(key, hit = hit.is_some(), "page cache lookup");
        hit
    }

    pub async fn insert(&self, key: String, body: String) {
        self.pages.insert(key, body).await;
    }

    pub fn invalidate_all(&self) {
        self.pages.invalidate_all();
    }
}
