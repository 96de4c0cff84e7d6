#[cfg(feature = "rocksdb")]
use crate::storage::traits::{in_range, KvIter, KvStore};
#[cfg(feature = "rocksdb")]
use anyhow::Result;
#[cfg(feature = "rocksdb")]
use rocksdb::{Direction, IteratorMode, Options, DB};
#[cfg(feature = "rocksdb")]
use std::path::{Path, PathBuf};

#[cfg(feature = "rocksdb")]
pub struct RocksKvStore {
    db: DB,
    path: PathBuf,
}

#[cfg(feature = "rocksdb")]
impl RocksKvStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path.as_ref())?;
        Ok(Self { db, path: path.as_ref().to_path_buf() })
    }
}

#[cfg(feature = "rocksdb")]
impl KvStore for RocksKvStore {
    fn name(&self) -> String { "rocksdb".into() }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db.put(key, value)?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.db.delete(key)?;
        Ok(())
    }

    fn scan_range(&self, start: &[u8], end: &[u8]) -> Result<KvIter> {
        let mut items = Vec::new();
        let iter = self.db.iterator(IteratorMode::From(start, Direction::Forward));
        for item in iter {
            let (k, v) = item?;
            if !in_range(&k, start, end) {
                break;
            }
            items.push((k.to_vec(), v.to_vec()));
        }
        Ok(KvIter { items })
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    fn path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}
