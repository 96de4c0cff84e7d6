//! Local mirror of a permissioned ledger.
//!
//! - `storage`: ordered key-value engines
//! - `ledger`: transaction records and the sequence-keyed local store
//! - `mirror`: incremental, resumable download from a ledger node
//! - `query`: lookups by sequence number, timestamp, sender and range

pub mod cli;
pub mod ledger;
pub mod mirror;
pub mod query;
pub mod storage;
pub mod utils;

pub use ledger::{LedgerStore, SubLedger, Transaction};
pub use mirror::{Credentials, LedgerClient, Mirror, MirrorConfig, ReplayClient};
pub use query::{LedgerQuery, RangeBound, RangeQuery, TransactionMap, TxnSource};
pub use utils::{LedgerError, Result};
