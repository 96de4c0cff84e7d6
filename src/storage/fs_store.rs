use crate::storage::traits::{in_range, KvIter, KvStore};
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File-per-key store. Filenames are the hex of the key, so a sorted
/// directory listing is key order.
pub struct FsKvStore {
    dir: PathBuf,
}

impl FsKvStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let dir = path.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &[u8]) -> PathBuf {
        self.dir.join(hex::encode(key))
    }

    fn tmp_path(&self, key: &[u8]) -> PathBuf {
        self.dir.join(format!(".{}.tmp", hex::encode(key)))
    }
}

impl KvStore for FsKvStore {
    fn name(&self) -> String { "fs".into() }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        // write-then-rename so a crash never leaves a torn value under the real name
        let tmp = self.tmp_path(key);
        let mut f = OpenOptions::new().create(true).write(true).truncate(true).open(&tmp)?;
        f.write_all(value)?;
        f.sync_all()?;
        fs::rename(&tmp, self.key_path(key))?;
        self.flush()
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match fs::read(self.key_path(key)) {
            Ok(buf) => Ok(Some(buf)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn scan_range(&self, start: &[u8], end: &[u8]) -> Result<KvIter> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().into_string().unwrap_or_default();
            // skips temp files and anything foreign
            let key = match hex::decode(&name) {
                Ok(k) => k,
                Err(_) => continue,
            };
            if in_range(&key, start, end) {
                keys.push(key);
            }
        }
        keys.sort();

        let mut items = Vec::with_capacity(keys.len());
        for key in keys {
            let value = fs::read(self.key_path(&key))?;
            items.push((key, value));
        }
        Ok(KvIter { items })
    }

    fn flush(&self) -> Result<()> {
        // persist the renames
        #[cfg(unix)]
        File::open(&self.dir)?.sync_all()?;
        Ok(())
    }

    fn path(&self) -> Option<PathBuf> {
        Some(self.dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_delete_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsKvStore::open(dir.path()).unwrap();
        store.put(b"k1", b"v1").unwrap();
        store.put(b"k1", b"v2").unwrap();
        assert_eq!(store.get(b"k1").unwrap(), Some(b"v2".to_vec()));
        assert!(store.get(b"nope").unwrap().is_none());
        store.flush().unwrap();
        drop(store);

        let store = FsKvStore::open(dir.path()).unwrap();
        assert_eq!(store.get(b"k1").unwrap(), Some(b"v2".to_vec()));
        store.delete(b"k1").unwrap();
        store.delete(b"k1").unwrap();
        assert!(!store.exists(b"k1").unwrap());
    }

    #[test]
    fn scan_is_ordered_by_key_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsKvStore::open(dir.path()).unwrap();
        for n in [300u64, 2, 70_000, 1] {
            store.put(&n.to_be_bytes(), b"x").unwrap();
        }
        let keys: Vec<u64> = store
            .scan_range(&1u64.to_be_bytes(), &300u64.to_be_bytes())
            .unwrap()
            .into_iter()
            .map(|(k, _)| u64::from_be_bytes(k.try_into().unwrap()))
            .collect();
        assert_eq!(keys, vec![1, 2]);
    }
}
