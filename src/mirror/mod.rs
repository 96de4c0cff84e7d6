//! Ledger mirror: keeps a local copy of one sub-ledger caught up with the network.
//!
//! Sequence numbers on the remote ledger are dense from 1, so the mirror
//! resumes at `high_water_mark + 1` and fetches one transaction per request
//! until the node answers that the next one does not exist.

pub mod client;
pub mod config;
pub mod replay;
pub mod reply;

pub use client::{Credentials, LedgerClient};
pub use config::{MirrorConfig, DEFAULT_GENESIS_WINDOW};
pub use replay::ReplayClient;

use crate::ledger::{LedgerStore, SubLedger};
use crate::utils::metrics::{HIGH_WATER_MARK, TXNS_DOWNLOADED, UPDATE_RUNS};
use crate::utils::{LedgerError, Result, METRICS};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorState {
    Disconnected,
    Connected,
}

pub struct Mirror<C: LedgerClient> {
    client: C,
    store: LedgerStore,
    network: String,
    sub_ledger: SubLedger,
    credentials: Credentials,
    state: MirrorState,
}

impl<C: LedgerClient> Mirror<C> {
    /// Open (or create) the local store named in `cfg`.
    pub fn new(cfg: &MirrorConfig, client: C) -> Result<Self> {
        let store = LedgerStore::open(&cfg.db_path, cfg.engine)?;
        Ok(Self::with_store(
            store,
            cfg.network.clone(),
            cfg.sub_ledger,
            cfg.credentials.clone(),
            client,
        ))
    }

    pub fn with_store(
        store: LedgerStore,
        network: String,
        sub_ledger: SubLedger,
        credentials: Credentials,
        client: C,
    ) -> Self {
        Self { client, store, network, sub_ledger, credentials, state: MirrorState::Disconnected }
    }

    pub fn state(&self) -> MirrorState {
        self.state
    }

    pub fn sub_ledger(&self) -> SubLedger {
        self.sub_ledger
    }

    /// Read access for queries. Holding it blocks `update` at compile time.
    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Number of transactions cached locally
    pub fn count(&self) -> Result<u64> {
        self.store.high_water_mark()
    }

    pub async fn connect(&mut self) -> Result<()> {
        if self.state == MirrorState::Connected {
            return Ok(());
        }
        self.client
            .connect(&self.network, &self.credentials)
            .await
            .map_err(|e| match e {
                LedgerError::Connection(msg) => LedgerError::Connection(msg),
                other => LedgerError::Connection(other.to_string()),
            })?;
        self.state = MirrorState::Connected;
        info!(network = %self.network, sub_ledger = %self.sub_ledger, "connected to ledger");
        Ok(())
    }

    /// Best effort; teardown failures are logged, never returned.
    pub async fn disconnect(&mut self) {
        if self.state == MirrorState::Disconnected {
            return;
        }
        if let Err(e) = self.client.disconnect().await {
            warn!("error closing ledger session: {}", e);
        }
        self.state = MirrorState::Disconnected;
        debug!(network = %self.network, "disconnected from ledger");
    }

    /// Fetch every transaction past the high-water mark. Returns how many were stored.
    ///
    /// On error the mark stays at the last fully stored transaction, so the
    /// next call resumes from the same point.
    pub async fn update(&mut self) -> Result<u64> {
        if self.state != MirrorState::Connected {
            return Err(LedgerError::Connection("update called on a disconnected mirror".into()));
        }
        METRICS.inc_counter(UPDATE_RUNS);

        let start = self.store.high_water_mark()?;
        info!(sub_ledger = %self.sub_ledger, "last transaction sequence number: {}", start);

        let mut next = start + 1;
        loop {
            let response = self
                .client
                .fetch_txn(self.sub_ledger, &self.credentials.submitter_did, next)
                .await?;
            let txn = match reply::parse_get_txn_reply(&response, next)? {
                Some(txn) => txn,
                None => break,
            };

            self.store.put(next, &txn)?;
            self.store.set_high_water_mark(next)?;
            METRICS.inc_counter(TXNS_DOWNLOADED);
            debug!(seq_no = next, "stored transaction");
            next += 1;
        }

        let fetched = next - 1 - start;
        self.store.flush()?;
        METRICS.set_gauge(HIGH_WATER_MARK, (next - 1) as f64);
        info!(fetched, high_water_mark = next - 1, "local ledger copy is up to date");
        Ok(fetched)
    }

    /// Connect, update, and disconnect on every path out.
    pub async fn refresh(&mut self) -> Result<u64> {
        self.connect().await?;
        let result = self.update().await;
        self.disconnect().await;
        result
    }
}

impl<C: LedgerClient> Drop for Mirror<C> {
    fn drop(&mut self) {
        if self.state == MirrorState::Connected {
            warn!(network = %self.network, "mirror dropped with an open ledger session");
        }
    }
}
