use crate::storage::traits::{in_range, KvIter, KvStore};
use anyhow::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// In-memory ordered store (good for tests/dev). Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemKvStore {
    inner: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemKvStore {
    fn name(&self) -> String { "memory".into() }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.read().get(key).cloned())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.inner.write().remove(key);
        Ok(())
    }

    fn scan_range(&self, start: &[u8], end: &[u8]) -> Result<KvIter> {
        let map = self.inner.read();
        let items = map
            .range(start.to_vec()..)
            .take_while(|(k, _)| in_range(k, start, end))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(KvIter { items })
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn path(&self) -> Option<PathBuf> {
        None
    }
}
