//! GET_TXN reply interpretation.
//!
//! `{"op": "REPLY", "result": {"seqNo": N, "data": {..record..}}}`; a null
//! `data` means there is no transaction at that sequence number yet.

use crate::ledger::Transaction;
use crate::utils::{LedgerError, Result};
use serde_json::Value;

pub fn parse_get_txn_reply(reply: &Value, requested: u64) -> Result<Option<Transaction>> {
    if let Some(op) = reply.get("op").and_then(Value::as_str) {
        if op == "REJECT" || op == "REQNACK" {
            let reason = reply.get("reason").and_then(Value::as_str).unwrap_or("no reason given");
            return Err(LedgerError::InvalidResponse(format!("{} for {}: {}", op, requested, reason)));
        }
    }

    let result = reply
        .get("result")
        .ok_or_else(|| LedgerError::InvalidResponse(format!("reply for {} has no `result`: {}", requested, reply)))?;
    let data = result
        .get("data")
        .ok_or_else(|| LedgerError::InvalidResponse(format!("reply for {} has no `result.data`", requested)))?;
    if data.is_null() {
        return Ok(None);
    }

    let seq_no = result
        .get("seqNo")
        .and_then(Value::as_u64)
        .ok_or_else(|| LedgerError::InvalidResponse(format!("reply for {} has no `result.seqNo`", requested)))?;
    if seq_no != requested {
        return Err(LedgerError::InvalidResponse(format!(
            "asked for transaction {}, node answered with {}",
            requested, seq_no
        )));
    }
    if !data.is_object() {
        return Err(LedgerError::InvalidResponse(format!("transaction {} is not a JSON object", requested)));
    }

    Transaction::parse(data.clone()).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_is_unwrapped() {
        let reply = json!({"op": "REPLY", "result": {"seqNo": 5, "data": {"txnMetadata": {"seqNo": 5}}}});
        let txn = parse_get_txn_reply(&reply, 5).unwrap().unwrap();
        assert_eq!(txn.get_seq_no(), Some(5));
    }

    #[test]
    fn null_data_is_end_of_ledger() {
        let reply = json!({"op": "REPLY", "result": {"seqNo": null, "data": null}});
        assert!(parse_get_txn_reply(&reply, 9).unwrap().is_none());
    }

    #[test]
    fn malformed_replies_are_invalid() {
        let cases = [
            json!({"op": "REPLY"}),
            json!({"result": {"seqNo": 1}}),
            json!({"result": {"data": {"txn": {}}}}),
            json!({"result": {"seqNo": 2, "data": {"txn": {}}}}),
            json!({"result": {"seqNo": 1, "data": "oops"}}),
            json!({"op": "REQNACK", "reason": "unknown did"}),
        ];
        for reply in cases {
            assert!(
                matches!(parse_get_txn_reply(&reply, 1), Err(LedgerError::InvalidResponse(_))),
                "{}",
                reply
            );
        }
    }

    #[test]
    fn nested_envelope_is_a_format_error() {
        let reply = json!({"result": {"seqNo": 1, "data": {"data": {"txn": {}}}}});
        assert!(matches!(parse_get_txn_reply(&reply, 1), Err(LedgerError::Format(_))));
    }
}
