pub mod store;
pub mod transaction;

pub use store::LedgerStore;
pub use transaction::Transaction;

use crate::utils::LedgerError;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Named partition of the ledger, queried independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubLedger {
    Pool,
    #[default]
    Domain,
    Config,
    Audit,
}

impl SubLedger {
    /// Wire name used in GET_TXN requests
    pub fn as_str(&self) -> &'static str {
        match self {
            SubLedger::Pool => "POOL",
            SubLedger::Domain => "DOMAIN",
            SubLedger::Config => "CONFIG",
            SubLedger::Audit => "AUDIT",
        }
    }

    pub fn ledger_id(&self) -> u8 {
        match self {
            SubLedger::Pool => 0,
            SubLedger::Domain => 1,
            SubLedger::Config => 2,
            SubLedger::Audit => 3,
        }
    }
}

impl fmt::Display for SubLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubLedger {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POOL" | "0" => Ok(SubLedger::Pool),
            "DOMAIN" | "1" => Ok(SubLedger::Domain),
            "CONFIG" | "2" => Ok(SubLedger::Config),
            "AUDIT" | "3" => Ok(SubLedger::Audit),
            other => Err(LedgerError::InvalidArgument(format!("unknown sub-ledger: {}", other))),
        }
    }
}

impl<'de> Deserialize<'de> for SubLedger {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
