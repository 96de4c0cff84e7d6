//! The one capability the mirror needs from a ledger node client.

use crate::ledger::SubLedger;
use crate::utils::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Wallet credentials and the identity that signs read requests.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub wallet_name: String,
    pub wallet_key: String,
    pub submitter_did: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("wallet_name", &self.wallet_name)
            .field("wallet_key", &"<redacted>")
            .field("submitter_did", &self.submitter_did)
            .finish()
    }
}

/// Session-oriented ledger client.
///
/// `fetch_txn` returns the node's raw GET_TXN reply; interpreting it is the
/// mirror's job (see [`crate::mirror::reply`]). Transport and auth failures
/// are `LedgerError::Connection`.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn connect(&mut self, network: &str, credentials: &Credentials) -> Result<()>;

    async fn fetch_txn(&self, sub_ledger: SubLedger, submitter_did: &str, seq_no: u64) -> Result<Value>;

    async fn disconnect(&mut self) -> Result<()>;
}
