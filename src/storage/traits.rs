use anyhow::Result;
use std::path::PathBuf;

/// Owned (key, value) pairs returned by scans, in ascending key order.
pub struct KvIter {
    pub items: Vec<(Vec<u8>, Vec<u8>)>,
}

impl IntoIterator for KvIter {
    type Item = (Vec<u8>, Vec<u8>);
    type IntoIter = std::vec::IntoIter<(Vec<u8>, Vec<u8>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Ordered key-value store.
///
/// Keys compare bytewise, so fixed-width big-endian integer keys iterate in
/// numeric order. Engines do no internal write coordination: callers keep a
/// single writer per store.
pub trait KvStore: Send + Sync + 'static {
    fn name(&self) -> String;

    /// Put a key / value, overwriting any previous value
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Get a key
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Delete a key
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Check existence
    fn exists(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Scan keys in `[start, end)`, ascending. An empty `end` means unbounded.
    fn scan_range(&self, start: &[u8], end: &[u8]) -> Result<KvIter>;

    /// Make previous writes durable
    fn flush(&self) -> Result<()>;

    /// Path where the engine stores data (useful for debugging)
    fn path(&self) -> Option<PathBuf>;
}

pub(crate) fn in_range(key: &[u8], start: &[u8], end: &[u8]) -> bool {
    key >= start && (end.is_empty() || key < end)
}
