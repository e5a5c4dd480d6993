use std::time::Duration;

use crate::entry::Expiration;

/// Environment variable holding the default expiration in seconds
/// (negative = never, `0` = library default, positive = seconds)
pub const ENV_DEFAULT_EXPIRATION_SECS: &str = "TTLCACHE_DEFAULT_EXPIRATION_SECS";

/// Environment variable holding the sweep interval in milliseconds
pub const ENV_SWEEP_INTERVAL_MS: &str = "TTLCACHE_SWEEP_INTERVAL_MS";

/// Configuration for a cache and its background sweeper
///
/// # Example
///
/// ```rust
/// use ttlcache_core::{CacheConfig, Expiration};
/// use std::time::Duration;
///
/// let config = CacheConfig::default()
///     .with_default_expiration(Expiration::After(Duration::from_secs(1800)))
///     .with_sweep_interval(Duration::from_secs(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Expiration applied when a write asks for [`Expiration::Default`]
    /// (default: never expire)
    pub default_expiration: Expiration,
    /// Interval between sweep passes (default: 60 seconds)
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_expiration: Expiration::Never,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from defaults overridden by the environment.
    ///
    /// See [`CacheConfig::with_env_overrides`].
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Sets the expiration used by writes that request the default
    pub fn with_default_expiration(mut self, expiration: Expiration) -> Self {
        self.default_expiration = expiration;
        self
    }

    /// Sets the sweep interval
    ///
    /// This determines how often the background sweeper removes expired entries.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Overrides fields from environment variables when they are set.
    ///
    /// Reads:
    /// - `TTLCACHE_DEFAULT_EXPIRATION_SECS` - negative for never, `0` for the
    ///   library default, otherwise seconds
    /// - `TTLCACHE_SWEEP_INTERVAL_MS` - sweep interval in milliseconds
    ///
    /// Values that fail to parse are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(secs) = read_env::<i64>(ENV_DEFAULT_EXPIRATION_SECS) {
            self.default_expiration = expiration_from_secs(secs);
        }
        if let Some(ms) = read_env::<u64>(ENV_SWEEP_INTERVAL_MS) {
            self.sweep_interval = Duration::from_millis(ms);
        }
        self
    }
}

fn read_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring unparsable environment value");
            None
        }
    }
}

/// Maps the signed-seconds convention onto [`Expiration`]
pub fn expiration_from_secs(secs: i64) -> Expiration {
    match secs {
        s if s < 0 => Expiration::Never,
        0 => Expiration::Default,
        s => Expiration::After(Duration::from_secs(s.unsigned_abs())),
    }
}
