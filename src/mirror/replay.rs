//! File-backed ledger client: answers GET_TXN from an exported set of records,
//! the way a node would. Handy for seeding a mirror offline and for tests.

use crate::ledger::{SubLedger, Transaction};
use crate::mirror::client::{Credentials, LedgerClient};
use crate::utils::{LedgerError, Result};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

#[derive(Default)]
pub struct ReplayClient {
    records: RwLock<BTreeMap<u64, Value>>,
    requests: Mutex<Vec<u64>>,
    connected: bool,
}

impl ReplayClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records must carry `txnMetadata.seqNo`.
    pub fn from_records(records: impl IntoIterator<Item = Value>) -> Result<Self> {
        let client = Self::new();
        for record in records {
            client.push(record)?;
        }
        Ok(client)
    }

    /// Load a JSON array of records, or one record per line.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::InvalidArgument(format!("reading {}: {}", path.display(), e)))?;

        let records: Vec<Value> = if text.trim_start().starts_with('[') {
            serde_json::from_str(&text)?
        } else {
            text.lines()
                .filter(|l| !l.trim().is_empty())
                .map(serde_json::from_str::<Value>)
                .collect::<std::result::Result<_, _>>()?
        };
        info!("loaded {} ledger records from {}", records.len(), path.display());
        Self::from_records(records)
    }

    /// Append (or replace) a record on the simulated remote ledger.
    pub fn push(&self, record: Value) -> Result<u64> {
        let txn = Transaction::parse(record)?;
        let seq_no = txn
            .get_seq_no()
            .ok_or_else(|| LedgerError::InvalidArgument(format!("record without txnMetadata.seqNo: {}", txn)))?;
        self.records.write().insert(seq_no, txn.into_payload());
        Ok(seq_no)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every sequence number asked for so far, in order
    pub fn requests(&self) -> Vec<u64> {
        self.requests.lock().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

#[async_trait]
impl LedgerClient for ReplayClient {
    async fn connect(&mut self, network: &str, credentials: &Credentials) -> Result<()> {
        if self.connected {
            return Err(LedgerError::Connection("replay session already open".into()));
        }
        debug!(network, wallet = %credentials.wallet_name, "opening replay session");
        self.connected = true;
        Ok(())
    }

    async fn fetch_txn(&self, sub_ledger: SubLedger, _submitter_did: &str, seq_no: u64) -> Result<Value> {
        if !self.connected {
            return Err(LedgerError::Connection("replay session is not open".into()));
        }
        self.requests.lock().push(seq_no);
        let reply = match self.records.read().get(&seq_no) {
            Some(record) => json!({
                "op": "REPLY",
                "result": {"type": "3", "ledgerId": sub_ledger.ledger_id(), "seqNo": seq_no, "data": record}
            }),
            None => json!({
                "op": "REPLY",
                "result": {"type": "3", "ledgerId": sub_ledger.ledger_id(), "seqNo": null, "data": null}
            }),
        };
        Ok(reply)
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_json_lines() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, r#"{{"txnMetadata": {{"seqNo": 1}}}}"#).unwrap();
        writeln!(f).unwrap();
        writeln!(f, r#"{{"txnMetadata": {{"seqNo": 2, "txnTime": 10}}}}"#).unwrap();
        let client = ReplayClient::from_file(f.path()).unwrap();
        assert_eq!(client.len(), 2);
    }

    #[test]
    fn loads_json_array_and_rejects_unnumbered() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"[{{"txnMetadata": {{"seqNo": 1}}}}, {{"txn": {{}}}}]"#).unwrap();
        assert!(matches!(ReplayClient::from_file(f.path()), Err(LedgerError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn fetch_requires_session() {
        let mut client = ReplayClient::from_records(vec![json!({"txnMetadata": {"seqNo": 1}})]).unwrap();
        let creds = Credentials::default();
        assert!(matches!(
            client.fetch_txn(SubLedger::Domain, "did", 1).await,
            Err(LedgerError::Connection(_))
        ));

        client.connect("pool", &creds).await.unwrap();
        assert!(client.connect("pool", &creds).await.is_err());
        let reply = client.fetch_txn(SubLedger::Domain, "did", 1).await.unwrap();
        assert_eq!(reply["result"]["seqNo"], 1);
        let end = client.fetch_txn(SubLedger::Domain, "did", 2).await.unwrap();
        assert!(end["result"]["data"].is_null());
        assert_eq!(client.requests(), vec![1, 2]);
        client.disconnect().await.unwrap();
        assert!(!client.is_connected());
    }
}
