//! Queries over a mirrored ledger or a subset of it: by sequence number, by
//! timestamp, by sender, and by range in either coordinate.
//!
//! Callers run `Mirror::update` first; queries never touch the network.

pub mod search;
pub mod source;

pub use source::{TransactionMap, TxnSource};

use crate::ledger::Transaction;
use crate::mirror::DEFAULT_GENESIS_WINDOW;
use crate::utils::{LedgerError, Result};
use tracing::debug;

/// One edge of a range, given either as a timestamp or a sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Time(u64),
    Seq(u64),
}

/// Loose range parameters, as they arrive from a command line.
/// Exactly one of each `start_*` / `end_*` pair must be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeQuery {
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub start_seq: Option<u64>,
    pub end_seq: Option<u64>,
}

impl RangeQuery {
    pub fn into_bounds(self) -> Result<(RangeBound, RangeBound)> {
        let start = pick("start", self.start_time, self.start_seq)?;
        let end = pick("end", self.end_time, self.end_seq)?;
        Ok((start, end))
    }
}

fn pick(edge: &str, time: Option<u64>, seq: Option<u64>) -> Result<RangeBound> {
    match (time, seq) {
        (Some(t), None) => Ok(RangeBound::Time(t)),
        (None, Some(s)) => Ok(RangeBound::Seq(s)),
        (Some(_), Some(_)) => Err(LedgerError::InvalidArgument(format!(
            "give either a {edge} time or a {edge} sequence number, not both"
        ))),
        (None, None) => Err(LedgerError::InvalidArgument(format!("missing {edge} of range"))),
    }
}

pub struct LedgerQuery<'a, S: TxnSource + ?Sized> {
    source: &'a S,
    genesis_window: u64,
}

impl<'a, S: TxnSource + ?Sized> LedgerQuery<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source, genesis_window: DEFAULT_GENESIS_WINDOW }
    }

    /// Sequence numbers `1..=window` may lack timestamps (genesis records).
    pub fn with_genesis_window(mut self, window: u64) -> Self {
        self.genesis_window = window;
        self
    }

    pub fn count(&self) -> Result<u64> {
        self.source.count()
    }

    pub fn get_by_seq(&self, seq_no: u64) -> Result<Option<Transaction>> {
        self.source.get(seq_no)
    }

    pub fn get_by_timestamp(&self, ts: u64) -> Result<Option<(u64, Transaction)>> {
        search::search_timestamp(self.source, ts, self.genesis_window)
    }

    /// Exactly one selector must be given.
    pub fn get_txn(&self, seq_no: Option<u64>, timestamp: Option<u64>) -> Result<Option<Transaction>> {
        match (seq_no, timestamp) {
            (Some(n), None) => self.get_by_seq(n),
            (None, Some(ts)) => Ok(self.get_by_timestamp(ts)?.map(|(_, txn)| txn)),
            (Some(_), Some(_)) => Err(LedgerError::InvalidArgument(
                "cannot look up by sequence number and timestamp at once".into(),
            )),
            (None, None) => Err(LedgerError::InvalidArgument("sequence number or timestamp required".into())),
        }
    }

    /// All transactions submitted by `sender`. Full scan.
    pub fn get_by_sender(&self, sender: &str) -> Result<TransactionMap> {
        let (lowest, highest) = match self.source.bounds()? {
            Some(bounds) => bounds,
            None => return Ok(TransactionMap::new()),
        };
        Ok(self
            .source
            .range(lowest, highest)?
            .into_iter()
            .filter(|(_, txn)| txn.get_sender() == Some(sender))
            .collect())
    }

    /// Inclusive range. A time-based end resolves to the last transaction at
    /// or before that time.
    pub fn get_range(&self, start: RangeBound, end: RangeBound) -> Result<TransactionMap> {
        let highest = match self.source.bounds()? {
            Some((_, highest)) => highest,
            None => return Ok(TransactionMap::new()),
        };

        let start_seq = match start {
            RangeBound::Seq(n) => n,
            RangeBound::Time(ts) => match self.get_by_timestamp(ts)? {
                Some((seq_no, _)) => seq_no,
                // starts after the last transaction
                None => return Ok(TransactionMap::new()),
            },
        };
        let end_seq = match end {
            RangeBound::Seq(n) => n,
            RangeBound::Time(ts) => match self.get_by_timestamp(ts)? {
                Some((seq_no, txn)) => match txn.get_timestamp() {
                    Some(found) if found > ts => seq_no.saturating_sub(1),
                    _ => seq_no,
                },
                None => highest,
            },
        };

        if start_seq < 1 || end_seq < start_seq || end_seq > highest {
            return Err(LedgerError::InvalidRange { start: start_seq, end: end_seq, available: highest });
        }
        debug!(start_seq, end_seq, "range resolved");
        self.source.range(start_seq, end_seq)
    }

    pub fn query_range(&self, query: RangeQuery) -> Result<TransactionMap> {
        let (start, end) = query.into_bounds()?;
        self.get_range(start, end)
    }
}
