//! Local copy of one sub-ledger: sequence number -> record JSON, plus a
//! sentinel holding the highest sequence number cached so far.
//!
//! Keys are fixed-width big-endian `u64`s so the engine's byte order is the
//! numeric order. Entries `1..=high_water_mark` are always present; at most
//! one entry past the mark may exist after a crash between `put` and
//! `set_high_water_mark`, and the next update overwrites it.

use crate::ledger::transaction::Transaction;
use crate::storage::{self, KvStore, StorageEngine};
use crate::utils::{LedgerError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sentinel key for the high-water mark. Never collides with an 8-byte sequence key.
pub const HIGH_WATER_MARK_KEY: &[u8] = b"lastTxnDownloaded";

const VERIFY_CHUNK: u64 = 4096;

pub fn seq_key(seq_no: u64) -> [u8; 8] {
    seq_no.to_be_bytes()
}

fn decode_u64(bytes: &[u8], what: &str) -> Result<u64> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LedgerError::CorruptedCache(format!("{} has {} bytes, expected 8", what, bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}

pub struct LedgerStore {
    kv: Arc<dyn KvStore>,
}

impl LedgerStore {
    /// Open or create the store at `path`. Creating is not an error.
    pub fn open(path: impl AsRef<Path>, engine: StorageEngine) -> Result<Self> {
        let path = path.as_ref();
        if engine != StorageEngine::Memory && !path.exists() {
            info!("local ledger database not found at {}; creating a new one", path.display());
        }
        let kv = storage::open(path, engine)?;
        Ok(Self::with_kv(kv))
    }

    pub fn with_kv(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Store (or overwrite) the record for `seq_no`.
    pub fn put(&self, seq_no: u64, txn: &Transaction) -> Result<()> {
        self.kv.put(&seq_key(seq_no), &txn.to_vec()?)?;
        Ok(())
    }

    /// Raw record bytes for `seq_no`
    pub fn get(&self, seq_no: u64) -> Result<Option<Vec<u8>>> {
        Ok(self.kv.get(&seq_key(seq_no))?)
    }

    pub fn get_txn(&self, seq_no: u64) -> Result<Option<Transaction>> {
        match self.get(seq_no)? {
            Some(bytes) => Ok(Some(Transaction::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Highest cached sequence number, 0 for an empty cache.
    pub fn high_water_mark(&self) -> Result<u64> {
        match self.kv.get(HIGH_WATER_MARK_KEY)? {
            Some(bytes) => decode_u64(&bytes, "high-water mark"),
            None => Ok(0),
        }
    }

    /// Only call once the `put` for `seq_no` has returned.
    pub fn set_high_water_mark(&self, seq_no: u64) -> Result<()> {
        self.kv.put(HIGH_WATER_MARK_KEY, &seq_key(seq_no))?;
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        Ok(self.kv.flush()?)
    }

    pub fn engine_name(&self) -> String {
        self.kv.name()
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.kv.path()
    }

    /// Walk the stored keys in order and check they are exactly
    /// `1..=high_water_mark` (plus at most one pending entry).
    /// Returns the number of contiguous entries found.
    pub fn verify(&self) -> Result<u64> {
        let hwm = self.high_water_mark()?;
        let mut expected = 1u64;
        let mut lo = 0u64;

        while lo <= hwm.saturating_add(1) {
            let hi = lo.saturating_add(VERIFY_CHUNK);
            for (key, _) in self.kv.scan_range(&seq_key(lo), &seq_key(hi))? {
                if key.len() != 8 {
                    continue;
                }
                let seq_no = decode_u64(&key, "sequence key")?;
                if seq_no != expected {
                    return Err(LedgerError::CorruptedCache(format!(
                        "expected transaction {}, found {}",
                        expected, seq_no
                    )));
                }
                expected += 1;
            }
            if hi == u64::MAX {
                break;
            }
            lo = hi;
        }

        let stored = expected - 1;
        if stored < hwm {
            return Err(LedgerError::CorruptedCache(format!(
                "high-water mark is {} but only {} transactions are stored",
                hwm, stored
            )));
        }
        if stored > hwm.saturating_add(1) {
            return Err(LedgerError::CorruptedCache(format!(
                "{} transactions stored beyond high-water mark {}",
                stored - hwm,
                hwm
            )));
        }
        let stray = self
            .kv
            .scan_range(&seq_key(expected), &[])?
            .into_iter()
            .filter(|(k, _)| k.len() == 8)
            .count();
        if stray > 0 {
            return Err(LedgerError::CorruptedCache(format!(
                "{} transactions stored after a gap at {}",
                stray, expected
            )));
        }

        if stored == hwm.saturating_add(1) {
            warn!("transaction {} is stored but not yet counted; the next update rewrites it", stored);
        }
        debug!(hwm, stored, "ledger store verified");
        Ok(stored)
    }
}
