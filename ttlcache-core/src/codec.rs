//! Snapshot persistence for [`Cache`].
//!
//! A snapshot is a single bincode (standard config, serde mode) encoding of
//! the whole `HashMap<String, Entry<V>>`. It has no header or version tag;
//! every save writes the full map.
//!
//! Decoding is capped at [`SNAPSHOT_LIMIT_BYTES`]: length prefixes are checked
//! against the cap before anything is allocated, so a corrupt stream fails
//! with `CacheError::Decode` instead of exhausting memory.

use bincode::config::{self, Config};
use bincode::error::DecodeError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

use crate::entry::{now_nanos, Entry};
use crate::error::{CacheError, Result};
use crate::store::Cache;

/// Largest snapshot, in decoded container bytes, that `load` accepts (256 MiB)
pub const SNAPSHOT_LIMIT_BYTES: usize = 256 * 1024 * 1024;

fn decode_config() -> impl Config {
    config::standard().with_limit::<SNAPSHOT_LIMIT_BYTES>()
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Writes a snapshot of every stored entry to `writer`
    ///
    /// Holds the shared lock while encoding: concurrent reads proceed,
    /// writes wait.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Encode` if a value fails to serialize or the
    /// writer fails.
    pub fn save<W: Write>(&self, mut writer: W) -> Result<()>
    where
        V: Serialize,
    {
        let items = self.inner.items.read();
        let bytes = bincode::serde::encode_into_std_write(&*items, &mut writer, config::standard())?;
        debug!(entries = items.len(), bytes, "saved cache snapshot");
        Ok(())
    }

    /// Reads a snapshot from `reader` and merges it into the cache
    ///
    /// A decoded entry is taken only when the key is absent or its current
    /// entry has expired; live entries win. Returns how many entries were
    /// taken from the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Decode` if the stream is malformed or claims more
    /// than [`SNAPSHOT_LIMIT_BYTES`]; the cache is not modified in that case.
    pub fn load<R: Read>(&self, mut reader: R) -> Result<usize>
    where
        V: DeserializeOwned,
    {
        let decoded: HashMap<String, Entry<V>> =
            bincode::serde::decode_from_std_read(&mut reader, decode_config())?;
        let total = decoded.len();

        let now = now_nanos();
        let mut items = self.inner.items.write();
        let mut merged = 0;
        for (key, entry) in decoded {
            let take = items.get(&key).map_or(true, |live| live.is_expired_at(now));
            if take {
                items.insert(key, entry);
                merged += 1;
            }
        }
        drop(items);

        debug!(decoded = total, merged, "loaded cache snapshot");
        Ok(merged)
    }

    /// Saves a snapshot to `path`, creating or truncating the file
    ///
    /// The file is flushed and synced before returning so late write errors
    /// are reported; the first error encountered is returned.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()>
    where
        V: Serialize,
    {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.save(&mut writer)?;

        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    }

    /// Loads and merges a snapshot from `path`
    ///
    /// See [`Cache::load`] for the merge rules. Files larger than
    /// [`SNAPSHOT_LIMIT_BYTES`] are rejected before reading.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<usize>
    where
        V: DeserializeOwned,
    {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        if usize::try_from(len).map_or(true, |len| len > SNAPSHOT_LIMIT_BYTES) {
            return Err(CacheError::Decode(DecodeError::LimitExceeded));
        }
        self.load(BufReader::new(file))
    }
}
