//! Things a query can run over: the mirror's store (dense, `1..=count`) or an
//! already materialised subset of transactions (any keys, possibly sparse).

use crate::ledger::{LedgerStore, Transaction};
use crate::mirror::{LedgerClient, Mirror};
use crate::utils::Result;
use serde::Serialize;
use std::collections::btree_map;
use std::collections::BTreeMap;

pub trait TxnSource {
    /// Number of transactions available
    fn count(&self) -> Result<u64>;

    /// Lowest and highest sequence number, inclusive. `None` when empty.
    fn bounds(&self) -> Result<Option<(u64, u64)>>;

    fn get(&self, seq_no: u64) -> Result<Option<Transaction>>;

    /// First transaction at or after `seq_no`. Dense sources only need the
    /// point lookup.
    fn seek(&self, seq_no: u64) -> Result<Option<(u64, Transaction)>> {
        Ok(self.get(seq_no)?.map(|txn| (seq_no, txn)))
    }

    /// Every transaction in `lo..=hi`, fetched one sequence number at a time.
    fn range(&self, lo: u64, hi: u64) -> Result<TransactionMap> {
        let mut out = TransactionMap::new();
        if hi < lo {
            return Ok(out);
        }
        for seq_no in lo..=hi {
            if let Some(txn) = self.get(seq_no)? {
                out.insert(seq_no, txn);
            }
        }
        Ok(out)
    }
}

impl TxnSource for LedgerStore {
    fn count(&self) -> Result<u64> {
        self.high_water_mark()
    }

    fn bounds(&self) -> Result<Option<(u64, u64)>> {
        Ok(match self.high_water_mark()? {
            0 => None,
            hwm => Some((1, hwm)),
        })
    }

    fn get(&self, seq_no: u64) -> Result<Option<Transaction>> {
        // an entry past the mark is an interrupted write, not data
        if seq_no == 0 || seq_no > self.high_water_mark()? {
            return Ok(None);
        }
        self.get_txn(seq_no)
    }
}

impl<C: LedgerClient> TxnSource for Mirror<C> {
    fn count(&self) -> Result<u64> {
        self.store().count()
    }

    fn bounds(&self) -> Result<Option<(u64, u64)>> {
        self.store().bounds()
    }

    fn get(&self, seq_no: u64) -> Result<Option<Transaction>> {
        TxnSource::get(self.store(), seq_no)
    }
}

/// Ordered sequence number -> transaction map; the result type of range and
/// sender queries, and a query source in its own right.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransactionMap {
    txns: BTreeMap<u64, Transaction>,
}

impl TransactionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, seq_no: u64, txn: Transaction) -> Option<Transaction> {
        self.txns.insert(seq_no, txn)
    }

    pub fn get(&self, seq_no: u64) -> Option<&Transaction> {
        self.txns.get(&seq_no)
    }

    pub fn contains(&self, seq_no: u64) -> bool {
        self.txns.contains_key(&seq_no)
    }

    pub fn len(&self) -> usize {
        self.txns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txns.is_empty()
    }

    pub fn seq_nos(&self) -> impl Iterator<Item = u64> + '_ {
        self.txns.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, u64, Transaction> {
        self.txns.iter()
    }

    pub fn first(&self) -> Option<(u64, &Transaction)> {
        self.txns.iter().next().map(|(k, v)| (*k, v))
    }

    pub fn last(&self) -> Option<(u64, &Transaction)> {
        self.txns.iter().next_back().map(|(k, v)| (*k, v))
    }

    pub fn into_inner(self) -> BTreeMap<u64, Transaction> {
        self.txns
    }
}

impl FromIterator<(u64, Transaction)> for TransactionMap {
    fn from_iter<I: IntoIterator<Item = (u64, Transaction)>>(iter: I) -> Self {
        Self { txns: iter.into_iter().collect() }
    }
}

impl IntoIterator for TransactionMap {
    type Item = (u64, Transaction);
    type IntoIter = btree_map::IntoIter<u64, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.txns.into_iter()
    }
}

impl<'a> IntoIterator for &'a TransactionMap {
    type Item = (&'a u64, &'a Transaction);
    type IntoIter = btree_map::Iter<'a, u64, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.txns.iter()
    }
}

impl TxnSource for TransactionMap {
    fn count(&self) -> Result<u64> {
        Ok(self.txns.len() as u64)
    }

    fn bounds(&self) -> Result<Option<(u64, u64)>> {
        Ok(self.first().map(|(lo, _)| lo).zip(self.last().map(|(hi, _)| hi)))
    }

    fn get(&self, seq_no: u64) -> Result<Option<Transaction>> {
        Ok(self.txns.get(&seq_no).cloned())
    }

    fn seek(&self, seq_no: u64) -> Result<Option<(u64, Transaction)>> {
        Ok(self.txns.range(seq_no..).next().map(|(k, v)| (*k, v.clone())))
    }

    fn range(&self, lo: u64, hi: u64) -> Result<TransactionMap> {
        if hi < lo {
            return Ok(TransactionMap::new());
        }
        Ok(self.txns.range(lo..=hi).map(|(k, v)| (*k, v.clone())).collect())
    }
}
