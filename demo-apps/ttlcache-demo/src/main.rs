use anyhow::Result;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ttlcache_core::{Cache, CacheConfig, Expiration};

/// Optional snapshot file: loaded on start when present, written on exit
const ENV_SNAPSHOT_PATH: &str = "TTLCACHE_SNAPSHOT_PATH";

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttlcache_demo=info,ttlcache_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::new()
        .with_default_expiration(Expiration::After(Duration::from_secs(30 * 60)))
        .with_sweep_interval(Duration::from_secs(3))
        .with_env_overrides();

    tracing::info!("ttlcache demo");
    tracing::info!("   Default expiration: {:?}", config.default_expiration);
    tracing::info!("   Sweep interval: {:?}", config.sweep_interval);

    let cache: Cache<String> = Cache::with_config(config)?;

    let snapshot = std::env::var(ENV_SNAPSHOT_PATH).ok().map(PathBuf::from);
    if let Some(path) = snapshot.as_ref().filter(|p| p.exists()) {
        let merged = cache.load_file(path)?;
        tracing::info!("Loaded {} entries from {}", merged, path.display());
    }

    cache.set(
        "k1",
        "hello, I am a cached value".to_string(),
        Expiration::After(Duration::from_secs(5)),
    );
    report(&cache, "k1");

    tracing::info!("Sleeping 10s so k1 expires and gets swept");
    thread::sleep(Duration::from_secs(10));
    report(&cache, "k1");
    tracing::info!("Entries still stored: {}", cache.count());

    if let Some(path) = snapshot {
        cache.set("saved_at_exit", "persisted".to_string(), Expiration::Never);
        cache.save_to_file(&path)?;
        tracing::info!("Saved snapshot to {}", path.display());
    }

    cache.stop_sweeper();
    Ok(())
}

fn report(cache: &Cache<String>, key: &str) {
    match cache.get(key) {
        Some(value) => tracing::info!("found {}: {}", key, value),
        None => tracing::info!("not found {}", key),
    }
}
