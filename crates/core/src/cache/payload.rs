//! URL-keyed payload store with a fixed time-to-live.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default payload lifetime (10 hours).
pub const DEFAULT_PAYLOAD_TTL: Duration = Duration::from_secs(10 * 60 * 60);

/// Cached payload with its expiry deadline.
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// TTL cache mapping a URL to its last extracted payload.
///
/// Uses a HashMap behind a tokio RwLock so concurrent retrievals can share
/// one instance through an `Arc`.
pub struct PayloadCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl PayloadCache {
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self { entries: RwLock::new(HashMap::new()), ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get the payload cached for `url`, if present and not expired.
    ///
    /// An expired entry found here is removed.
    pub async fn get(&self, url: &str) -> Option<String> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(url) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        // Another writer may have refreshed the entry between the two locks.
        if let Some(entry) = entries.get(url) {
            if !entry.is_expired(Instant::now()) {
                return Some(entry.value.clone());
            }
            entries.remove(url);
            tracing::debug!("evicted expired payload for {}", url);
        }
        None
    }

    /// Store `value` for `url`, replacing any previous entry and restarting its TTL.
    pub async fn set(&self, url: &str, value: impl Into<String>) {
        let entry = CacheEntry { value: value.into(), expires_at: Instant::now() + self.ttl };
        self.entries.write().await.insert(url.to_string(), entry);
    }

    /// Drop every expired entry. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until they are swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for PayloadCache {
    fn default() -> Self {
        Self::new(DEFAULT_PAYLOAD_TTL)
    }
}
