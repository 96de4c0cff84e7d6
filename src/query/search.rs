//! Binary search for the first transaction at or after a timestamp.

use crate::ledger::Transaction;
use crate::query::source::TxnSource;
use crate::utils::metrics::SEARCH_PROBES;
use crate::utils::{LedgerError, Result, METRICS};
use tracing::{trace, warn};

/// Earliest transaction whose timestamp is `>= ts`, or `None` if `ts` is past
/// the last one.
///
/// Timestamps are assumed non-decreasing in sequence order. A probe that hits
/// a record without a timestamp inside `1..=genesis_window` gives up and
/// answers with the lowest transaction (an approximation); anywhere else it is
/// `InconsistentData`.
pub fn search_timestamp<S: TxnSource + ?Sized>(
    source: &S,
    ts: u64,
    genesis_window: u64,
) -> Result<Option<(u64, Transaction)>> {
    let (lowest, highest) = match source.bounds()? {
        Some(bounds) => bounds,
        None => return Ok(None),
    };

    let mut left = lowest;
    let mut right = highest;
    while left <= right {
        let mid = left + (right - left) / 2;
        METRICS.inc_counter(SEARCH_PROBES);

        // sparse sources answer with the next key; past `right` means the
        // upper half of the window is empty
        let (seq_no, txn) = match source.seek(mid)? {
            Some((seq_no, txn)) if seq_no <= right => (seq_no, txn),
            _ => match mid.checked_sub(1) {
                Some(r) => {
                    right = r;
                    continue;
                }
                None => break,
            },
        };

        let found = match txn.get_timestamp() {
            Some(found) => found,
            None if seq_no <= genesis_window => {
                warn!(seq_no, "probed a genesis transaction without timestamp; answering with the first transaction");
                return source.seek(lowest);
            }
            None => return Err(LedgerError::InconsistentData { seq_no }),
        };
        trace!(seq_no, found, ts, "timestamp probe");

        if ts == found {
            return Ok(Some((seq_no, txn)));
        } else if ts < found {
            match mid.checked_sub(1) {
                Some(r) => right = r,
                None => break,
            }
        } else {
            match seq_no.checked_add(1) {
                Some(l) => left = l,
                None => return Ok(None),
            }
        }
    }

    if left > highest {
        return Ok(None);
    }
    source.seek(left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerStore;
    use crate::mirror::DEFAULT_GENESIS_WINDOW;
    use crate::query::source::TransactionMap;
    use crate::storage::MemKvStore;
    use serde_json::json;
    use std::sync::Arc;

    fn txn(seq_no: u64, ts: Option<u64>) -> Transaction {
        let mut meta = json!({"seqNo": seq_no});
        if let Some(ts) = ts {
            meta["txnTime"] = json!(ts);
        }
        Transaction::parse(json!({"txn": {"type": "1"}, "txnMetadata": meta})).unwrap()
    }

    fn store_with(timestamps: &[Option<u64>]) -> LedgerStore {
        let store = LedgerStore::with_kv(Arc::new(MemKvStore::new()));
        for (i, ts) in timestamps.iter().enumerate() {
            let seq_no = i as u64 + 1;
            store.put(seq_no, &txn(seq_no, *ts)).unwrap();
            store.set_high_water_mark(seq_no).unwrap();
        }
        store
    }

    fn seq_of(res: Option<(u64, Transaction)>) -> Option<u64> {
        res.map(|(seq_no, _)| seq_no)
    }

    #[test]
    fn next_at_or_after() {
        let store = store_with(&[Some(100), Some(200), Some(200), Some(300)]);
        assert_eq!(seq_of(search_timestamp(&store, 150, 17).unwrap()), Some(2));
        assert_eq!(seq_of(search_timestamp(&store, 200, 17).unwrap()), Some(2));
        assert_eq!(seq_of(search_timestamp(&store, 350, 17).unwrap()), None);
        assert_eq!(seq_of(search_timestamp(&store, 50, 17).unwrap()), Some(1));
        assert_eq!(seq_of(search_timestamp(&store, 300, 17).unwrap()), Some(4));
        assert_eq!(seq_of(search_timestamp(&store, 201, 17).unwrap()), Some(4));
    }

    #[test]
    fn empty_source_is_none() {
        let store = store_with(&[]);
        assert!(search_timestamp(&store, 1, 17).unwrap().is_none());
        assert!(search_timestamp(&TransactionMap::new(), 1, 17).unwrap().is_none());
    }

    #[test]
    fn every_target_matches_linear_scan() {
        let timestamps: Vec<Option<u64>> = (0..37u64).map(|i| Some(1_000 + (i / 3) * 10)).collect();
        let store = store_with(&timestamps);
        for target in 990..1_140 {
            let expected = timestamps
                .iter()
                .position(|t| t.unwrap() >= target)
                .map(|i| i as u64 + 1);
            let got = seq_of(search_timestamp(&store, target, 0).unwrap());
            match (expected, got) {
                (None, None) => {}
                (Some(_), Some(seq_no)) => {
                    // ties may resolve to any member of the run with that timestamp
                    let found = timestamps[seq_no as usize - 1].unwrap();
                    let want = timestamps[expected.unwrap() as usize - 1].unwrap();
                    assert_eq!(found, want, "target {}", target);
                }
                other => panic!("target {}: {:?}", target, other),
            }
        }
    }

    #[test]
    fn genesis_window_tolerates_missing_timestamps() {
        let mut timestamps = vec![None; 10];
        timestamps.extend((0..30).map(|i| Some(5_000 + i)));
        let store = store_with(&timestamps);
        // first probe is 20 (has a timestamp), then the search walks down into 1..=10
        for target in [0, 4_000, 5_000] {
            let (seq_no, _) = search_timestamp(&store, target, DEFAULT_GENESIS_WINDOW).unwrap().unwrap();
            assert!(seq_no == 1 || seq_no == 11, "target {} -> {}", target, seq_no);
        }
        assert_eq!(seq_of(search_timestamp(&store, 5_010, DEFAULT_GENESIS_WINDOW).unwrap()), Some(21));
    }

    #[test]
    fn missing_timestamp_outside_window_is_inconsistent() {
        let mut timestamps: Vec<Option<u64>> = (0..30).map(|i| Some(100 + i)).collect();
        timestamps[17] = None; // seq 18
        let store = store_with(&timestamps);
        // 1..=30 -> first probe is 15, then 23, then 19, then 17, then 18
        let err = search_timestamp(&store, 117, DEFAULT_GENESIS_WINDOW).unwrap_err();
        assert!(matches!(err, LedgerError::InconsistentData { seq_no: 18 }));
    }

    #[test]
    fn sparse_map_search() {
        let map: TransactionMap = [(10, 100), (20, 200), (30, 300), (45, 450)]
            .into_iter()
            .map(|(seq_no, ts)| (seq_no, txn(seq_no, Some(ts))))
            .collect();
        assert_eq!(seq_of(search_timestamp(&map, 0, 0).unwrap()), Some(10));
        assert_eq!(seq_of(search_timestamp(&map, 250, 0).unwrap()), Some(30));
        assert_eq!(seq_of(search_timestamp(&map, 300, 0).unwrap()), Some(30));
        assert_eq!(seq_of(search_timestamp(&map, 301, 0).unwrap()), Some(45));
        assert_eq!(seq_of(search_timestamp(&map, 451, 0).unwrap()), None);
    }
}
