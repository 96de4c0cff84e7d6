//! Typed view over one ledger record.
//!
//! A record looks like
//! `{"txn": {"type": "1", "metadata": {"from": <did>}, ...}, "txnMetadata": {"seqNo": 42, "txnTime": 1546326000}, ...}`.
//! Accessors return `None` when a path is missing; a missing timestamp means
//! "unknown", never zero.

use crate::utils::{LedgerError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Transaction {
    data: Value,
}

impl Transaction {
    /// Wrap a decoded record. A top-level `data` key means the caller passed
    /// the reply envelope instead of the record itself.
    pub fn parse(data: Value) -> Result<Self> {
        match &data {
            Value::Object(map) if map.contains_key("data") => Err(LedgerError::Format(
                "record has a top-level `data` field (reply envelope?)".into(),
            )),
            Value::Object(_) => Ok(Self { data }),
            other => Err(LedgerError::Format(format!("expected a JSON object, got {}", kind(other)))),
        }
    }

    /// Decode a stored record.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::parse(serde_json::from_slice(bytes)?)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.data)?)
    }

    pub fn get_type(&self) -> Option<&str> {
        self.data.pointer("/txn/type").and_then(Value::as_str)
    }

    pub fn get_timestamp(&self) -> Option<u64> {
        self.data.pointer("/txnMetadata/txnTime").and_then(Value::as_u64)
    }

    pub fn get_seq_no(&self) -> Option<u64> {
        self.data.pointer("/txnMetadata/seqNo").and_then(Value::as_u64)
    }

    pub fn get_sender(&self) -> Option<&str> {
        self.data.pointer("/txn/metadata/from").and_then(Value::as_str)
    }

    pub fn payload(&self) -> &Value {
        &self.data
    }

    pub fn into_payload(self) -> Value {
        self.data
    }

    pub fn as_key_value(&self) -> (Option<u64>, &Self) {
        (self.get_seq_no(), self)
    }

    pub fn to_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.data).unwrap_or_else(|_| self.data.to_string())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
