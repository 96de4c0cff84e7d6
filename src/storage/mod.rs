//! Storage module: abstraction over ordered key-value backends.
//!
//! Engines: file-per-key (default persistent engine), in-memory, RocksDB (feature "rocksdb-db").
//! Use `storage::open(path, StorageEngine)` to create an Arc<dyn KvStore> for the ledger store.

pub mod traits;
pub mod fs_store;
pub mod mem_store;

#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;

pub use traits::{KvStore, KvIter};
pub use fs_store::FsKvStore;
pub use mem_store::MemKvStore;

#[cfg(feature = "rocksdb")]
pub use rocksdb_store::RocksKvStore;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Engine selection enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngine {
    #[default]
    Fs,
    Memory,
    #[cfg(feature = "rocksdb")]
    RocksDb,
}

impl std::str::FromStr for StorageEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fs" => Ok(StorageEngine::Fs),
            "memory" | "mem" => Ok(StorageEngine::Memory),
            #[cfg(feature = "rocksdb")]
            "rocksdb" => Ok(StorageEngine::RocksDb),
            other => Err(anyhow::anyhow!("unknown storage engine: {}", other)),
        }
    }
}

/// Open a KvStore at `path` with the given engine. `path` is ignored by the memory engine.
pub fn open(path: impl AsRef<Path>, engine: StorageEngine) -> Result<Arc<dyn KvStore>> {
    match engine {
        StorageEngine::Fs => {
            let s = FsKvStore::open(path)?;
            Ok(Arc::new(s))
        }
        StorageEngine::Memory => Ok(Arc::new(MemKvStore::new())),
        #[cfg(feature = "rocksdb")]
        StorageEngine::RocksDb => {
            let s = RocksKvStore::open(path)?;
            Ok(Arc::new(s))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_scan_respects_bounds() {
        let store = open("unused", StorageEngine::Memory).unwrap();
        for n in 1u64..=5 {
            store.put(&n.to_be_bytes(), &[n as u8]).unwrap();
        }
        store.put(b"zz-sentinel", b"x").unwrap();

        let bounded = store.scan_range(&2u64.to_be_bytes(), &5u64.to_be_bytes()).unwrap();
        let vals: Vec<u8> = bounded.into_iter().map(|(_, v)| v[0]).collect();
        assert_eq!(vals, vec![2, 3, 4]);

        let all = store.scan_range(&0u64.to_be_bytes(), &[]).unwrap();
        assert_eq!(all.items.len(), 6);
    }

    #[test]
    fn engine_names_parse() {
        assert_eq!("FS".parse::<StorageEngine>().unwrap(), StorageEngine::Fs);
        assert_eq!("memory".parse::<StorageEngine>().unwrap(), StorageEngine::Memory);
        assert!("leveldb".parse::<StorageEngine>().is_err());
    }
}
