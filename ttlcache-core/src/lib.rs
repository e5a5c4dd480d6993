//! # ttlcache core
//!
//! A thread-safe, in-process key-value cache where every entry carries an
//! optional absolute expiration time.
//!
//! ## Features
//!
//! - One `HashMap` behind a `parking_lot` reader/writer lock; `add` and
//!   `replace` check and write atomically
//! - Lazy expiration on read (`get` never evicts)
//! - A background sweeper thread per cache that evicts expired entries on a
//!   fixed interval and can be stopped any number of times
//! - Snapshot save/load to any `Write`/`Read` (or a file), merging loaded
//!   entries only over absent or expired ones
//!
//! ## Example
//!
//! ```rust
//! use ttlcache_core::{Cache, CacheConfig, Expiration};
//! use std::time::Duration;
//!
//! let config = CacheConfig::default()
//!     .with_default_expiration(Expiration::After(Duration::from_secs(1800)))
//!     .with_sweep_interval(Duration::from_secs(3));
//! let cache: Cache<String> = Cache::with_config(config).unwrap();
//!
//! // Store a value that expires in 5 seconds
//! cache.set("k1", "hello".to_string(), Expiration::After(Duration::from_secs(5)));
//!
//! if let Some(value) = cache.get("k1") {
//!     println!("found k1: {}", value);
//! }
//!
//! // Snapshot to any writer and merge back from any reader
//! let mut snapshot = Vec::new();
//! cache.save(&mut snapshot).unwrap();
//! cache.load(snapshot.as_slice()).unwrap();
//!
//! cache.stop_sweeper();
//! ```

mod codec;
mod config;
mod entry;
mod error;
mod store;
mod sweeper;

pub use codec::SNAPSHOT_LIMIT_BYTES;
pub use config::{
    expiration_from_secs, CacheConfig, ENV_DEFAULT_EXPIRATION_SECS, ENV_SWEEP_INTERVAL_MS,
};
pub use entry::{Entry, Expiration, NO_EXPIRATION};
pub use error::{CacheError, Result};
pub use store::Cache;
