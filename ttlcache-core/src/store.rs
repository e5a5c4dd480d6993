use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::entry::{now_nanos, Entry, Expiration};
use crate::error::{CacheError, Result};
use crate::sweeper::Sweeper;

pub(crate) type Items<V> = Arc<RwLock<HashMap<String, Entry<V>>>>;

/// Internal shared state for the cache
pub(crate) struct CacheInner<V> {
    pub(crate) items: Items<V>,
    default_expiration: Expiration,
    sweep_interval: Duration,
    sweeper: Sweeper,
}

/// Thread-safe in-process key-value cache with per-entry expiration
///
/// All entries live in one `HashMap` behind a reader/writer lock. Reads take
/// the shared lock; writes, the sweep pass and snapshot merges take the
/// exclusive lock, so conditional writes (`add`, `replace`) are atomic.
///
/// Expiration is lazy on read: `get` refuses expired entries but leaves them
/// in place. Each cache owns a background sweeper that removes expired entries
/// every sweep interval, until [`Cache::stop_sweeper`] is called or the last
/// handle is dropped.
///
/// # Example
///
/// ```rust
/// use ttlcache_core::{Cache, Expiration};
/// use std::time::Duration;
///
/// let cache: Cache<String> =
///     Cache::new(Expiration::After(Duration::from_secs(1800)), Duration::from_secs(3)).unwrap();
///
/// cache.set("k1", "hello".to_string(), Expiration::After(Duration::from_secs(5)));
/// assert_eq!(cache.get("k1").as_deref(), Some("hello"));
///
/// cache.stop_sweeper();
/// ```
pub struct Cache<V> {
    pub(crate) inner: Arc<CacheInner<V>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache and starts its sweeper
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidSweepInterval` for a zero interval and
    /// `CacheError::Io` if the sweeper thread cannot be started.
    pub fn new(default_expiration: Expiration, sweep_interval: Duration) -> Result<Self> {
        Self::with_config(
            CacheConfig::new()
                .with_default_expiration(default_expiration)
                .with_sweep_interval(sweep_interval),
        )
    }

    /// Creates a cache from a configuration and starts its sweeper
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        if config.sweep_interval.is_zero() {
            return Err(CacheError::InvalidSweepInterval(config.sweep_interval));
        }

        let items: Items<V> = Arc::new(RwLock::new(HashMap::new()));
        let sweep_items = Arc::clone(&items);
        let sweeper = Sweeper::start(config.sweep_interval, move || {
            Self::evict_expired(&sweep_items)
        })?;

        Ok(Self {
            inner: Arc::new(CacheInner {
                items,
                default_expiration: config.default_expiration,
                sweep_interval: config.sweep_interval,
                sweeper,
            }),
        })
    }

    /// Eviction pass shared by the sweeper and `delete_expired`
    fn evict_expired(items: &RwLock<HashMap<String, Entry<V>>>) -> usize {
        let now = now_nanos();
        let mut items = items.write();
        let before = items.len();
        items.retain(|_, entry| !entry.is_expired_at(now));
        before - items.len()
    }

    fn entry_for(&self, value: V, expiration: Expiration) -> Entry<V> {
        Entry::new(
            value,
            expiration.deadline(self.inner.default_expiration, now_nanos()),
        )
    }

    /// Stores a value, replacing any existing entry for the key
    ///
    /// The expiration is resolved when the call is made: `Never` stores a
    /// non-expiring entry, `After(d)` expires `d` from now and `Default`
    /// uses the cache's default expiration.
    pub fn set(&self, key: impl Into<String>, value: V, expiration: Expiration) {
        let entry = self.entry_for(value, expiration);
        self.inner.items.write().insert(key.into(), entry);
    }

    /// Retrieves a value by key
    ///
    /// Returns `None` if the key doesn't exist or has expired. Expired entries
    /// are left for the sweeper.
    pub fn get(&self, key: &str) -> Option<V> {
        let items = self.inner.items.read();
        let entry = items.get(key)?;
        if entry.is_expired() {
            return None;
        }
        Some(entry.value().clone())
    }

    /// Stores a value only if the key has no live entry
    ///
    /// An expired entry that has not been swept yet counts as absent.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::DuplicateKey` if a live entry exists; the existing
    /// value is left untouched.
    pub fn add(&self, key: impl Into<String>, value: V, expiration: Expiration) -> Result<()> {
        let key = key.into();
        let entry = self.entry_for(value, expiration);

        let mut items = self.inner.items.write();
        if items.get(&key).is_some_and(|e| !e.is_expired()) {
            return Err(CacheError::DuplicateKey(key));
        }
        items.insert(key, entry);
        Ok(())
    }

    /// Stores a value only if the key already has a live entry
    ///
    /// # Errors
    ///
    /// Returns `CacheError::MissingKey` if the key is absent or expired; no
    /// entry is created.
    pub fn replace(&self, key: impl Into<String>, value: V, expiration: Expiration) -> Result<()> {
        let key = key.into();
        let entry = self.entry_for(value, expiration);

        let mut items = self.inner.items.write();
        if !items.get(&key).is_some_and(|e| !e.is_expired()) {
            return Err(CacheError::MissingKey(key));
        }
        items.insert(key, entry);
        Ok(())
    }

    /// Deletes a key from the cache; a missing key is a no-op
    pub fn delete(&self, key: &str) {
        self.inner.items.write().remove(key);
    }

    /// Removes every expired entry now, returning how many were removed
    ///
    /// The sweeper runs the same pass on every sweep interval.
    pub fn delete_expired(&self) -> usize {
        Self::evict_expired(&self.inner.items)
    }

    /// Returns the number of stored entries, including expired ones not yet swept
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.items.read().len()
    }

    /// Returns `true` if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items.read().is_empty()
    }

    /// Checks if a key has a live entry, without touching expired ones
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner
            .items
            .read()
            .get(key)
            .is_some_and(|e| !e.is_expired())
    }

    /// Returns all keys with a live entry, in no particular order
    pub fn keys(&self) -> Vec<String> {
        let now = now_nanos();
        self.inner
            .items
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Deletes all entries
    pub fn flush(&self) {
        self.inner.items.write().clear();
    }

    /// The expiration applied to writes that request `Expiration::Default`
    pub fn default_expiration(&self) -> Expiration {
        self.inner.default_expiration
    }

    /// Interval between automatic sweep passes
    pub fn sweep_interval(&self) -> Duration {
        self.inner.sweep_interval
    }

    /// Stops the background sweeper and waits for its thread to exit
    ///
    /// No automatic eviction happens afterwards; `delete_expired` still works.
    /// Calling this more than once is a no-op. Dropping the last handle stops
    /// the sweeper as well.
    pub fn stop_sweeper(&self) {
        self.inner.sweeper.stop();
    }

    /// Returns `true` until the sweeper has been stopped
    pub fn is_sweeper_running(&self) -> bool {
        self.inner.sweeper.is_running()
    }

    /// Stores an entry with an explicit expiration timestamp
    #[cfg(test)]
    pub(crate) fn set_entry(&self, key: impl Into<String>, entry: Entry<V>) {
        self.inner.items.write().insert(key.into(), entry);
    }
}
